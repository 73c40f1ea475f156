use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;

use super::{PatientId, UserId};

#[derive(Debug, Clone, Serialize)]
pub struct Patient {
    pub id: PatientId,
    pub user_id: UserId,
    pub name: String,
    pub date_of_birth: Option<NaiveDate>,
    pub gender: Option<String>,
    pub medical_notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Patient fields supplied by a caller; the id is assigned by storage.
#[derive(Debug, Clone)]
pub struct NewPatient {
    pub user_id: UserId,
    pub name: String,
    pub date_of_birth: Option<NaiveDate>,
    pub gender: Option<String>,
    pub medical_notes: Option<String>,
}
