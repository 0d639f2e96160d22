// libs/directory-cell/src/services/directory.rs
use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::debug;
use uuid::Uuid;

use shared_models::external::{Directory, DoctorRecord, ExternalError, PatientRecord};

/// The patient/doctor record lookup the core snapshots names and addresses
/// from. Profile editing proper lives outside the core; this service keeps
/// just the fields booking and notification bodies need.
pub struct DirectoryService {
    doctors: RwLock<HashMap<Uuid, DoctorRecord>>,
    patients: RwLock<HashMap<Uuid, PatientRecord>>,
}

impl DirectoryService {
    pub fn new() -> Self {
        Self {
            doctors: RwLock::new(HashMap::new()),
            patients: RwLock::new(HashMap::new()),
        }
    }

    pub async fn upsert_doctor(&self, record: DoctorRecord) {
        debug!("Upserting doctor {}", record.id);
        self.doctors.write().await.insert(record.id, record);
    }

    pub async fn upsert_patient(&self, record: PatientRecord) {
        debug!("Upserting patient {}", record.id);
        self.patients.write().await.insert(record.id, record);
    }
}

impl Default for DirectoryService {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Directory for DirectoryService {
    async fn get_doctor(&self, id: Uuid) -> Result<DoctorRecord, ExternalError> {
        self.doctors
            .read()
            .await
            .get(&id)
            .cloned()
            .ok_or_else(|| ExternalError::NotFound(format!("doctor {}", id)))
    }

    async fn get_patient(&self, id: Uuid) -> Result<PatientRecord, ExternalError> {
        self.patients
            .read()
            .await
            .get(&id)
            .cloned()
            .ok_or_else(|| ExternalError::NotFound(format!("patient {}", id)))
    }
}
