use async_trait::async_trait;
use sqlx::{FromRow, PgPool};
use tracing::instrument;
use uuid::Uuid;

use bookease_core::DomainError;
use bookease_models::Doctor;

use super::{ROLE_JOINS, USER_COLUMNS, UserRow, map_db_error, upsert_user};
use crate::repository::{Repository, SpecialityCatalog};

#[derive(Debug, FromRow)]
struct DoctorRow {
    id: Uuid,
    crm: String,
    specialities: Vec<String>,
    active: bool,
    #[sqlx(flatten)]
    user: UserRow,
}

impl From<DoctorRow> for Doctor {
    fn from(row: DoctorRow) -> Self {
        Doctor {
            id: row.id,
            user: row.user.into(),
            crm: row.crm,
            specialities: row.specialities.into_iter().collect(),
            active: row.active,
        }
    }
}

fn select_active(filter: &str) -> String {
    format!(
        "SELECT d.id, d.crm, d.active, \
         ARRAY(SELECT s.name FROM doctor_specialities ds \
               JOIN specialities s ON s.id = ds.speciality_id \
               WHERE ds.doctor_id = d.id ORDER BY s.name) AS specialities, \
         {USER_COLUMNS} \
         FROM doctors d JOIN users u ON u.id = d.user_id {ROLE_JOINS} \
         WHERE d.active AND {filter} GROUP BY d.id, u.id"
    )
}

#[derive(Debug, Clone)]
pub struct PgDoctorRepository {
    pool: PgPool,
}

impl PgDoctorRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Returns `false` when the doctor or its account is no longer active.
    async fn upsert(&self, doctor: &Doctor) -> Result<bool, sqlx::Error> {
        let mut tx = self.pool.begin().await?;

        if !upsert_user(&mut tx, &doctor.user).await? {
            return Ok(false);
        }
        let written = sqlx::query(
            r#"
            INSERT INTO doctors (id, user_id, crm, active)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (id) DO UPDATE SET crm = EXCLUDED.crm, active = EXCLUDED.active
            WHERE doctors.active
            "#,
        )
        .bind(doctor.id)
        .bind(doctor.user.id)
        .bind(&doctor.crm)
        .bind(doctor.active)
        .execute(&mut *tx)
        .await?
        .rows_affected()
            == 1;

        if !written {
            return Ok(false);
        }

        sqlx::query("DELETE FROM doctor_specialities WHERE doctor_id = $1")
            .bind(doctor.id)
            .execute(&mut *tx)
            .await?;

        let names: Vec<String> = doctor.specialities.iter().cloned().collect();
        sqlx::query(
            "INSERT INTO doctor_specialities (doctor_id, speciality_id) \
             SELECT $1, id FROM specialities WHERE name = ANY($2)",
        )
        .bind(doctor.id)
        .bind(&names)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(true)
    }
}

#[async_trait]
impl Repository<Doctor> for PgDoctorRepository {
    #[instrument(skip(self))]
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Doctor>, DomainError> {
        let row = sqlx::query_as::<_, DoctorRow>(&select_active("d.id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_db_error)?;

        Ok(row.map(Doctor::from))
    }

    #[instrument(skip(self))]
    async fn find_by_document(&self, crm: &str) -> Result<Option<Doctor>, DomainError> {
        let row = sqlx::query_as::<_, DoctorRow>(&select_active("d.crm = $1"))
            .bind(crm)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_db_error)?;

        Ok(row.map(Doctor::from))
    }

    #[instrument(skip(self))]
    async fn find_by_name(&self, name: &str) -> Result<Option<Doctor>, DomainError> {
        let sql = format!("{} ORDER BY u.username LIMIT 1", select_active("u.name = $1"));
        let row = sqlx::query_as::<_, DoctorRow>(&sql)
            .bind(name)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_db_error)?;

        Ok(row.map(Doctor::from))
    }

    #[instrument(skip(self))]
    async fn list_all(&self) -> Result<Vec<Doctor>, DomainError> {
        let sql = format!("{} ORDER BY u.name", select_active("TRUE"));
        let rows = sqlx::query_as::<_, DoctorRow>(&sql)
            .fetch_all(&self.pool)
            .await
            .map_err(map_db_error)?;

        Ok(rows.into_iter().map(Doctor::from).collect())
    }

    #[instrument(skip(self, doctor), fields(doctor_id = %doctor.id))]
    async fn save(&self, doctor: &Doctor) -> Result<(), DomainError> {
        if !self.upsert(doctor).await.map_err(map_db_error)? {
            return Err(DomainError::not_found("Doctor", doctor.id));
        }
        Ok(())
    }
}

#[async_trait]
impl SpecialityCatalog for PgDoctorRepository {
    #[instrument(skip(self))]
    async fn find_specialities(&self, names: &[String]) -> Result<Vec<String>, DomainError> {
        sqlx::query_scalar::<_, String>(
            "SELECT name FROM specialities \
             WHERE active AND LOWER(name) IN (SELECT LOWER(n) FROM UNNEST($1::text[]) AS n) \
             ORDER BY name",
        )
        .bind(names)
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)
    }

    #[instrument(skip(self))]
    async fn find_doctors_by_speciality(&self, name: &str) -> Result<Vec<Doctor>, DomainError> {
        let filter = "EXISTS (SELECT 1 FROM doctor_specialities ds \
                      JOIN specialities s ON s.id = ds.speciality_id \
                      WHERE ds.doctor_id = d.id AND LOWER(s.name) = LOWER($1))";
        let sql = format!("{} ORDER BY u.username", select_active(filter));
        let rows = sqlx::query_as::<_, DoctorRow>(&sql)
            .bind(name)
            .fetch_all(&self.pool)
            .await
            .map_err(map_db_error)?;

        Ok(rows.into_iter().map(Doctor::from).collect())
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use super::*;
    use crate::postgres::fixtures::{account, account_flags};
    use bookease_models::{PersonOwned, RoleName};

    fn doctor(username: &str, crm: &str, specialities: &[&str]) -> Doctor {
        Doctor {
            id: Uuid::new_v4(),
            user: account(username, RoleName::Doctor),
            crm: crm.into(),
            specialities: specialities.iter().map(ToString::to_string).collect(),
            active: true,
        }
    }

    #[sqlx::test(migrations = "../../migrations")]
    async fn test_specialities_round_trip_through_links(pool: PgPool) {
        let repo = PgDoctorRepository::new(pool);
        let mut saved = doctor("house", "123456/SP", &["Ortodontia"]);
        repo.save(&saved).await.unwrap();

        saved.specialities.insert("Periodontia".into());
        repo.save(&saved).await.unwrap();

        let found = repo.find_by_document("123456/SP").await.unwrap().unwrap();
        assert_eq!(
            found.specialities,
            BTreeSet::from(["Ortodontia".to_string(), "Periodontia".to_string()])
        );
        assert_eq!(found.user.authorities(), vec!["ROLE_DOCTOR"]);
    }

    #[sqlx::test(migrations = "../../migrations")]
    async fn test_catalog_lookups_ignore_case(pool: PgPool) {
        let repo = PgDoctorRepository::new(pool);
        repo.save(&doctor("wilson", "654321/RJ", &["Ortodontia"]))
            .await
            .unwrap();
        repo.save(&doctor("house", "123456/SP", &["Ortodontia", "Cirurgia Oral"]))
            .await
            .unwrap();
        repo.save(&doctor("cuddy", "111111/SP", &[])).await.unwrap();

        let names = repo
            .find_specialities(&["ORTODONTIA".into(), "cirurgia oral".into(), "Cardiologia".into()])
            .await
            .unwrap();
        assert_eq!(names, vec!["Cirurgia Oral".to_string(), "Ortodontia".to_string()]);

        let doctors = repo.find_doctors_by_speciality("ortodontia").await.unwrap();
        let usernames: Vec<_> = doctors.iter().map(|d| d.user.username.as_str()).collect();
        assert_eq!(usernames, vec!["house", "wilson"]);
    }

    #[sqlx::test(migrations = "../../migrations")]
    async fn test_duplicate_active_crm_is_reported(pool: PgPool) {
        let repo = PgDoctorRepository::new(pool);
        repo.save(&doctor("house", "123456/SP", &[])).await.unwrap();

        let err = repo
            .save(&doctor("wilson", "123456/SP", &[]))
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "CRM já existe");
    }

    #[sqlx::test(migrations = "../../migrations")]
    async fn test_deactivation_hides_doctor_from_searches(pool: PgPool) {
        let repo = PgDoctorRepository::new(pool.clone());
        let mut saved = doctor("house", "123456/SP", &["Ortodontia"]);
        repo.save(&saved).await.unwrap();

        saved.deactivate();
        repo.save(&saved).await.unwrap();

        assert!(repo.find_by_id(saved.id).await.unwrap().is_none());
        assert!(repo.find_by_name("house").await.unwrap().is_none());
        assert!(repo.find_doctors_by_speciality("Ortodontia").await.unwrap().is_empty());
        assert_eq!(account_flags(&pool, saved.user.id).await, (false, false));
    }
}
