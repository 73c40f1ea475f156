//! Process-local repositories used by the `memory` database backend and tests.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use crate::application::ports::{
    ConversationRepository, PatientRepository, RepositoryError, UserRepository,
};
use crate::domain::{ConversationTurn, NewPatient, Patient, PatientId, User, UserId};

#[derive(Default)]
pub struct InMemoryUserRepository {
    users: RwLock<HashMap<UserId, User>>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn create(&self, user: &User) -> Result<(), RepositoryError> {
        let mut users = self.users.write().await;
        let duplicate = users.values().any(|existing| {
            existing.id == user.id
                || existing.email == user.email
                || existing.identity_id == user.identity_id
        });
        if duplicate {
            return Err(RepositoryError::ConstraintViolation(format!(
                "user already exists: {}",
                user.email
            )));
        }
        users.insert(user.id, user.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, RepositoryError> {
        Ok(self.users.read().await.get(&id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepositoryError> {
        Ok(self
            .users
            .read()
            .await
            .values()
            .find(|user| user.email == email)
            .cloned())
    }
}

#[derive(Default)]
struct PatientTable {
    rows: Vec<Patient>,
    next_id: i64,
}

#[derive(Default)]
pub struct InMemoryPatientRepository {
    table: RwLock<PatientTable>,
}

impl InMemoryPatientRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PatientRepository for InMemoryPatientRepository {
    async fn create(&self, patient: &NewPatient) -> Result<Patient, RepositoryError> {
        let mut table = self.table.write().await;
        table.next_id += 1;
        let stored = Patient {
            id: PatientId::new(table.next_id),
            user_id: patient.user_id,
            name: patient.name.clone(),
            date_of_birth: patient.date_of_birth,
            gender: patient.gender.clone(),
            medical_notes: patient.medical_notes.clone(),
            created_at: Utc::now(),
        };
        table.rows.push(stored.clone());
        Ok(stored)
    }

    async fn find_by_id(&self, id: PatientId) -> Result<Option<Patient>, RepositoryError> {
        Ok(self
            .table
            .read()
            .await
            .rows
            .iter()
            .find(|patient| patient.id == id)
            .cloned())
    }

    async fn list_for_user(&self, user_id: UserId) -> Result<Vec<Patient>, RepositoryError> {
        Ok(self
            .table
            .read()
            .await
            .rows
            .iter()
            .filter(|patient| patient.user_id == user_id)
            .cloned()
            .collect())
    }
}

#[derive(Default)]
pub struct InMemoryConversationRepository {
    turns: RwLock<HashMap<UserId, Vec<ConversationTurn>>>,
}

impl InMemoryConversationRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every stored turn for a user in append order.
    pub async fn turns_for(&self, user_id: UserId) -> Vec<ConversationTurn> {
        self.turns
            .read()
            .await
            .get(&user_id)
            .cloned()
            .unwrap_or_default()
    }
}

#[async_trait]
impl ConversationRepository for InMemoryConversationRepository {
    async fn append_turn(&self, turn: &ConversationTurn) -> Result<(), RepositoryError> {
        self.turns
            .write()
            .await
            .entry(turn.user_id)
            .or_default()
            .push(turn.clone());
        Ok(())
    }

    async fn recent_turns(
        &self,
        user_id: UserId,
        limit: usize,
    ) -> Result<Vec<ConversationTurn>, RepositoryError> {
        let turns = self.turns.read().await;
        let all = turns.get(&user_id).map(Vec::as_slice).unwrap_or_default();
        let start = all.len().saturating_sub(limit);
        Ok(all[start..].to_vec())
    }

    async fn count_for_user(&self, user_id: UserId) -> Result<u64, RepositoryError> {
        Ok(self
            .turns
            .read()
            .await
            .get(&user_id)
            .map_or(0, |turns| turns.len() as u64))
    }
}
