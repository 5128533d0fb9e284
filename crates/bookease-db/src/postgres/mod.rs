//! SQLx repositories.
//!
//! Queries are built at runtime with `query_as::<_, Row>` so the crate builds
//! without a live database. Each entity row flattens a [`UserRow`] carrying the
//! linked account and its aggregated role names.

use sqlx::{FromRow, PgConnection};
use tracing::warn;
use uuid::Uuid;

use bookease_core::DomainError;
use bookease_models::{Role, RoleName, User};

mod clinics;
mod doctors;
mod patients;
mod users;

pub use clinics::PgClinicRepository;
pub use doctors::PgDoctorRepository;
pub use patients::PgPatientRepository;
pub use users::PgUserRepository;

/// Account columns selected alongside every entity. Requires `users u` and
/// [`ROLE_JOINS`] in the query, grouped by the user's id.
pub(crate) const USER_COLUMNS: &str = "u.id AS user_id, u.username, u.password_hash, u.name, \
     u.email, u.phone, u.active AS user_active, u.token_revoked, \
     COALESCE(array_agg(r.name) FILTER (WHERE r.name IS NOT NULL), '{}') AS roles";

pub(crate) const ROLE_JOINS: &str = "LEFT JOIN user_roles ur ON ur.user_id = u.id \
     LEFT JOIN roles r ON r.id = ur.role_id";

#[derive(Debug, FromRow)]
pub(crate) struct UserRow {
    user_id: Uuid,
    username: String,
    password_hash: String,
    name: String,
    email: String,
    phone: Option<String>,
    user_active: bool,
    token_revoked: bool,
    roles: Vec<String>,
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        let roles = row
            .roles
            .iter()
            .filter_map(|name| match name.parse::<RoleName>() {
                Ok(role) => Some(role),
                Err(_) => {
                    warn!(user_id = %row.user_id, role = %name, "Ignoring unknown role");
                    None
                }
            })
            .collect();

        User {
            id: row.user_id,
            username: row.username,
            password_hash: row.password_hash,
            name: row.name,
            email: row.email,
            phone: row.phone,
            active: row.user_active,
            token_revoked: row.token_revoked,
            roles,
        }
    }
}

/// Maps unique index violations on active rows to [`DomainError::DuplicateField`].
pub(crate) fn map_db_error(err: sqlx::Error) -> DomainError {
    let label = err
        .as_database_error()
        .and_then(|db| db.constraint())
        .and_then(constraint_label);

    match label {
        Some(label) => DomainError::duplicate_field(label),
        None => DomainError::Internal(err.into()),
    }
}

fn constraint_label(constraint: &str) -> Option<&'static str> {
    match constraint {
        "users_username_active_idx" => Some("Username"),
        "users_email_active_idx" => Some("Email"),
        "users_phone_active_idx" => Some("Telefone"),
        "clinics_cnpj_active_idx" => Some("CNPJ"),
        "doctors_crm_active_idx" => Some("CRM"),
        "patients_cpf_active_idx" => Some("CPF"),
        _ => None,
    }
}

/// Role rows are created the first time a role is assigned.
async fn get_or_create_role(conn: &mut PgConnection, name: RoleName) -> Result<Role, sqlx::Error> {
    sqlx::query("INSERT INTO roles (id, name) VALUES ($1, $2) ON CONFLICT (name) DO NOTHING")
        .bind(Uuid::new_v4())
        .bind(name.as_str())
        .execute(&mut *conn)
        .await?;

    let id = sqlx::query_scalar::<_, Uuid>("SELECT id FROM roles WHERE name = $1")
        .bind(name.as_str())
        .fetch_one(&mut *conn)
        .await?;

    Ok(Role { id, name })
}

/// Writes the account row and replaces its role links. Runs on the caller's
/// connection so it joins the caller's transaction.
///
/// The revocation flag is only written for new rows, and an inactive row is
/// left untouched. Returns `false` when nothing was written.
pub(crate) async fn upsert_user(conn: &mut PgConnection, user: &User) -> Result<bool, sqlx::Error> {
    let written = sqlx::query(
        r#"
        INSERT INTO users (id, username, password_hash, name, email, phone, active, token_revoked)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
        ON CONFLICT (id) DO UPDATE SET
            username = EXCLUDED.username,
            password_hash = EXCLUDED.password_hash,
            name = EXCLUDED.name,
            email = EXCLUDED.email,
            phone = EXCLUDED.phone,
            active = EXCLUDED.active,
            updated_at = NOW()
        WHERE users.active
        "#,
    )
    .bind(user.id)
    .bind(&user.username)
    .bind(&user.password_hash)
    .bind(&user.name)
    .bind(&user.email)
    .bind(&user.phone)
    .bind(user.active)
    .bind(user.token_revoked)
    .execute(&mut *conn)
    .await?
    .rows_affected()
        == 1;

    if !written {
        return Ok(false);
    }

    sqlx::query("DELETE FROM user_roles WHERE user_id = $1")
        .bind(user.id)
        .execute(&mut *conn)
        .await?;

    for name in &user.roles {
        let role = get_or_create_role(&mut *conn, *name).await?;
        sqlx::query("INSERT INTO user_roles (user_id, role_id) VALUES ($1, $2)")
            .bind(user.id)
            .bind(role.id)
            .execute(&mut *conn)
            .await?;
    }

    Ok(true)
}
