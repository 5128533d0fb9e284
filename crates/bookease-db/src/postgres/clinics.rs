use async_trait::async_trait;
use sqlx::{FromRow, PgPool};
use tracing::instrument;
use uuid::Uuid;

use bookease_core::DomainError;
use bookease_models::Clinic;

use super::{ROLE_JOINS, USER_COLUMNS, UserRow, map_db_error, upsert_user};
use crate::repository::{ClinicDirectory, Repository};

#[derive(Debug, FromRow)]
struct ClinicRow {
    id: Uuid,
    cnpj: String,
    description: Option<String>,
    city: String,
    address: String,
    active: bool,
    #[sqlx(flatten)]
    user: UserRow,
}

impl From<ClinicRow> for Clinic {
    fn from(row: ClinicRow) -> Self {
        Clinic {
            id: row.id,
            user: row.user.into(),
            cnpj: row.cnpj,
            description: row.description,
            city: row.city,
            address: row.address,
            active: row.active,
        }
    }
}

fn select_active(filter: &str) -> String {
    format!(
        "SELECT c.id, c.cnpj, c.description, c.city, c.address, c.active, {USER_COLUMNS} \
         FROM clinics c JOIN users u ON u.id = c.user_id {ROLE_JOINS} \
         WHERE c.active AND {filter} GROUP BY c.id, u.id"
    )
}

fn select_first_active(filter: &str) -> String {
    format!("{} ORDER BY u.username LIMIT 1", select_active(filter))
}

#[derive(Debug, Clone)]
pub struct PgClinicRepository {
    pool: PgPool,
}

impl PgClinicRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn fetch_one(&self, sql: &str, value: &str) -> Result<Option<Clinic>, DomainError> {
        let row = sqlx::query_as::<_, ClinicRow>(sql)
            .bind(value)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_db_error)?;

        Ok(row.map(Clinic::from))
    }

    /// Returns `false` when the clinic or its account is no longer active.
    async fn upsert(&self, clinic: &Clinic) -> Result<bool, sqlx::Error> {
        let mut tx = self.pool.begin().await?;

        if !upsert_user(&mut tx, &clinic.user).await? {
            return Ok(false);
        }
        let written = sqlx::query(
            r#"
            INSERT INTO clinics (id, user_id, cnpj, description, city, address, active)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            ON CONFLICT (id) DO UPDATE SET
                cnpj = EXCLUDED.cnpj,
                description = EXCLUDED.description,
                city = EXCLUDED.city,
                address = EXCLUDED.address,
                active = EXCLUDED.active
            WHERE clinics.active
            "#,
        )
        .bind(clinic.id)
        .bind(clinic.user.id)
        .bind(&clinic.cnpj)
        .bind(&clinic.description)
        .bind(&clinic.city)
        .bind(&clinic.address)
        .bind(clinic.active)
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
impl Repository<Clinic> for PgClinicRepository {
    #[instrument(skip(self))]
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Clinic>, DomainError> {
        let row = sqlx::query_as::<_, ClinicRow>(&select_active("c.id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_db_error)?;

        Ok(row.map(Clinic::from))
    }

    #[instrument(skip(self))]
    async fn find_by_document(&self, cnpj: &str) -> Result<Option<Clinic>, DomainError> {
        self.fetch_one(&select_active("c.cnpj = $1"), cnpj).await
    }

    #[instrument(skip(self))]
    async fn find_by_name(&self, name: &str) -> Result<Option<Clinic>, DomainError> {
        self.fetch_one(&select_first_active("u.name = $1"), name).await
    }

    #[instrument(skip(self))]
    async fn list_all(&self) -> Result<Vec<Clinic>, DomainError> {
        let sql = format!("{} ORDER BY u.name", select_active("TRUE"));
        let rows = sqlx::query_as::<_, ClinicRow>(&sql)
            .fetch_all(&self.pool)
            .await
            .map_err(map_db_error)?;

        Ok(rows.into_iter().map(Clinic::from).collect())
    }

    #[instrument(skip(self, clinic), fields(clinic_id = %clinic.id))]
    async fn save(&self, clinic: &Clinic) -> Result<(), DomainError> {
        if !self.upsert(clinic).await.map_err(map_db_error)? {
            return Err(DomainError::not_found("Clinic", clinic.id));
        }
        Ok(())
    }
}

#[async_trait]
impl ClinicDirectory for PgClinicRepository {
    #[instrument(skip(self))]
    async fn find_by_city(&self, city: &str) -> Result<Option<Clinic>, DomainError> {
        self.fetch_one(&select_first_active("c.city = $1"), city).await
    }
}
