use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::PgPool;
use tracing::instrument;
use uuid::Uuid;

use crate::application::ports::{PatientRepository, RepositoryError};
use crate::domain::{NewPatient, Patient, PatientId, UserId};
use crate::infrastructure::persistence::pg_pool::map_sqlx_error;

pub struct PgPatientRepository {
    pool: PgPool,
}

impl PgPatientRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct PatientRow {
    id: i64,
    user_id: Uuid,
    name: String,
    date_of_birth: Option<NaiveDate>,
    gender: Option<String>,
    medical_notes: Option<String>,
    created_at: DateTime<Utc>,
}

impl From<PatientRow> for Patient {
    fn from(row: PatientRow) -> Self {
        Patient {
            id: PatientId::new(row.id),
            user_id: UserId::from_uuid(row.user_id),
            name: row.name,
            date_of_birth: row.date_of_birth,
            gender: row.gender,
            medical_notes: row.medical_notes,
            created_at: row.created_at,
        }
    }
}

#[async_trait]
impl PatientRepository for PgPatientRepository {
    #[instrument(skip(self, patient), fields(user_id = %patient.user_id))]
    async fn create(&self, patient: &NewPatient) -> Result<Patient, RepositoryError> {
        let row = sqlx::query_as::<_, PatientRow>(
            r#"
            INSERT INTO patients (user_id, name, date_of_birth, gender, medical_notes, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, user_id, name, date_of_birth, gender, medical_notes, created_at
            "#,
        )
        .bind(patient.user_id.as_uuid())
        .bind(&patient.name)
        .bind(patient.date_of_birth)
        .bind(&patient.gender)
        .bind(&patient.medical_notes)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        Ok(row.into())
    }

    #[instrument(skip(self), fields(patient_id = %id))]
    async fn find_by_id(&self, id: PatientId) -> Result<Option<Patient>, RepositoryError> {
        let row = sqlx::query_as::<_, PatientRow>(
            r#"
            SELECT id, user_id, name, date_of_birth, gender, medical_notes, created_at
            FROM patients
            WHERE id = $1
            "#,
        )
        .bind(id.value())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        Ok(row.map(Patient::from))
    }

    #[instrument(skip(self), fields(user_id = %user_id))]
    async fn list_for_user(&self, user_id: UserId) -> Result<Vec<Patient>, RepositoryError> {
        let rows = sqlx::query_as::<_, PatientRow>(
            r#"
            SELECT id, user_id, name, date_of_birth, gender, medical_notes, created_at
            FROM patients
            WHERE user_id = $1
            ORDER BY id
            "#,
        )
        .bind(user_id.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        Ok(rows.into_iter().map(Patient::from).collect())
    }
}
