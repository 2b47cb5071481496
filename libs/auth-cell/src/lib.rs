use std::sync::Arc;

use shared_utils::session::SessionService;

pub mod handlers;
pub mod router;
pub mod services;

pub use services::directory::{AuthError, UserDirectory};

#[derive(Clone)]
pub struct AuthState {
    pub sessions: Arc<SessionService>,
    pub users: Arc<UserDirectory>,
}
