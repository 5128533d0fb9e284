use async_trait::async_trait;
use sqlx::{FromRow, PgPool};
use tracing::instrument;
use uuid::Uuid;

use bookease_core::DomainError;
use bookease_models::Patient;

use super::{ROLE_JOINS, USER_COLUMNS, UserRow, map_db_error, upsert_user};
use crate::repository::Repository;

#[derive(Debug, FromRow)]
struct PatientRow {
    id: Uuid,
    cpf: String,
    active: bool,
    #[sqlx(flatten)]
    user: UserRow,
}

impl From<PatientRow> for Patient {
    fn from(row: PatientRow) -> Self {
        Patient {
            id: row.id,
            user: row.user.into(),
            cpf: row.cpf,
            active: row.active,
        }
    }
}

fn select_active(filter: &str) -> String {
    format!(
        "SELECT p.id, p.cpf, p.active, {USER_COLUMNS} \
         FROM patients p JOIN users u ON u.id = p.user_id {ROLE_JOINS} \
         WHERE p.active AND {filter} GROUP BY p.id, u.id"
    )
}

#[derive(Debug, Clone)]
pub struct PgPatientRepository {
    pool: PgPool,
}

impl PgPatientRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Returns `false` when the patient or its account is no longer active.
    async fn upsert(&self, patient: &Patient) -> Result<bool, sqlx::Error> {
        let mut tx = self.pool.begin().await?;

        if !upsert_user(&mut tx, &patient.user).await? {
            return Ok(false);
        }
        let written = sqlx::query(
            r#"
            INSERT INTO patients (id, user_id, cpf, active)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (id) DO UPDATE SET cpf = EXCLUDED.cpf, active = EXCLUDED.active
            WHERE patients.active
            "#,
        )
        .bind(patient.id)
        .bind(patient.user.id)
        .bind(&patient.cpf)
        .bind(patient.active)
        .execute(&mut *tx)
        .await?
        .rows_affected()
            == 1;

        if !written {
            return Ok(false);
        }
        tx.commit().await?;
        Ok(true)
    }
}

#[async_trait]
impl Repository<Patient> for PgPatientRepository {
    #[instrument(skip(self))]
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Patient>, DomainError> {
        let row = sqlx::query_as::<_, PatientRow>(&select_active("p.id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_db_error)?;

        Ok(row.map(Patient::from))
    }

    #[instrument(skip(self))]
    async fn find_by_document(&self, cpf: &str) -> Result<Option<Patient>, DomainError> {
        let row = sqlx::query_as::<_, PatientRow>(&select_active("p.cpf = $1"))
            .bind(cpf)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_db_error)?;

        Ok(row.map(Patient::from))
    }

    #[instrument(skip(self))]
    async fn find_by_name(&self, name: &str) -> Result<Option<Patient>, DomainError> {
        let sql = format!("{} ORDER BY u.username LIMIT 1", select_active("u.name = $1"));
        let row = sqlx::query_as::<_, PatientRow>(&sql)
            .bind(name)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_db_error)?;

        Ok(row.map(Patient::from))
    }

    #[instrument(skip(self))]
    async fn list_all(&self) -> Result<Vec<Patient>, DomainError> {
        let sql = format!("{} ORDER BY u.name", select_active("TRUE"));
        let rows = sqlx::query_as::<_, PatientRow>(&sql)
            .fetch_all(&self.pool)
            .await
            .map_err(map_db_error)?;

        Ok(rows.into_iter().map(Patient::from).collect())
    }

    #[instrument(skip(self, patient), fields(patient_id = %patient.id))]
    async fn save(&self, patient: &Patient) -> Result<(), DomainError> {
        if !self.upsert(patient).await.map_err(map_db_error)? {
            return Err(DomainError::not_found("Patient", patient.id));
        }
        Ok(())
    }
}
