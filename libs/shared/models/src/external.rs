use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;
use uuid::Uuid;

/// Failures from the collaborators outside this core. `Unavailable` is
/// transient; the caller's next scheduled pass retries naturally.
#[derive(Error, Debug, Clone)]
pub enum ExternalError {
    #[error("record not found: {0}")]
    NotFound(String),

    #[error("collaborator unavailable: {0}")]
    Unavailable(String),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DoctorRecord {
    pub id: Uuid,
    pub name: String,
    pub address: String,
    pub specialization: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PatientRecord {
    pub id: Uuid,
    pub name: String,
}

/// Patient/doctor record lookup, used to snapshot names and addresses into
/// appointments and notification bodies at write time.
#[async_trait]
pub trait Directory: Send + Sync {
    async fn get_doctor(&self, id: Uuid) -> Result<DoctorRecord, ExternalError>;
    async fn get_patient(&self, id: Uuid) -> Result<PatientRecord, ExternalError>;
}

#[async_trait]
pub trait PushTokenRegistry: Send + Sync {
    async fn get_token(&self, user_id: Uuid) -> Result<Option<String>, ExternalError>;
}

/// Push delivery. Returns the gateway's delivery identifier on success.
#[async_trait]
pub trait PushGateway: Send + Sync {
    async fn send(
        &self,
        token: &str,
        title: &str,
        body: &str,
        data: HashMap<String, String>,
    ) -> Result<String, ExternalError>;
}

pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}
