use async_trait::async_trait;

use crate::domain::{NewPatient, Patient, PatientId, UserId};

use super::RepositoryError;

#[async_trait]
pub trait PatientRepository: Send + Sync {
    async fn create(&self, patient: &NewPatient) -> Result<Patient, RepositoryError>;

    async fn find_by_id(&self, id: PatientId) -> Result<Option<Patient>, RepositoryError>;

    async fn list_for_user(&self, user_id: UserId) -> Result<Vec<Patient>, RepositoryError>;
}
