use tracing::{info, warn};

use auth_cell::UserDirectory;
use doctor_cell::{DoctorRegistry, NewDoctor, Specialty};

/// Development seed data: the clinic's doctor roster and the two default
/// back-office accounts.
pub async fn seed_demo_data(users: &UserDirectory, doctors: &DoctorRegistry) {
    seed_doctors(doctors).await;
    seed_users(users).await;
}

async fn seed_doctors(doctors: &DoctorRegistry) {
    if !doctors.list().await.is_empty() {
        return;
    }

    let roster = vec![
        NewDoctor {
            name_en: "Dr. Ahmed Hassan".to_string(),
            name_ar: "د. أحمد حسن".to_string(),
            specialty: Specialty::Cardiology,
            years_of_experience: 15,
            consultation_duration_minutes: 30,
        },
        NewDoctor {
            name_en: "Dr. Fatima Al-Rashid".to_string(),
            name_ar: "د. فاطمة الراشد".to_string(),
            specialty: Specialty::Dermatology,
            years_of_experience: 10,
            consultation_duration_minutes: 20,
        },
        NewDoctor {
            name_en: "Dr. Omar Khalil".to_string(),
            name_ar: "د. عمر خليل".to_string(),
            specialty: Specialty::Pediatrics,
            years_of_experience: 12,
            consultation_duration_minutes: 25,
        },
        NewDoctor {
            name_en: "Dr. Sara Nouri".to_string(),
            name_ar: "د. سارة نوري".to_string(),
            specialty: Specialty::GeneralPractice,
            years_of_experience: 8,
            consultation_duration_minutes: 15,
        },
        NewDoctor {
            name_en: "Dr. Khalid Al-Mansour".to_string(),
            name_ar: "د. خالد المنصور".to_string(),
            specialty: Specialty::Orthopedics,
            years_of_experience: 20,
            consultation_duration_minutes: 30,
        },
    ];

    let count = roster.len();
    for doctor in roster {
        doctors.register(doctor).await;
    }
    info!("Seeded {} doctors", count);
}

async fn seed_users(users: &UserDirectory) {
    for (username, password, role) in [
        ("admin", "admin123", "ADMIN"),
        ("receptionist", "recep123", "RECEPTIONIST"),
    ] {
        if let Err(e) = users.add_user(username, password, role, true).await {
            warn!("Failed to seed user {}: {}", username, e);
        }
    }
    info!("Seeded default users: admin, receptionist");
}
