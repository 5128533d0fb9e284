//! User domain models and DTOs.
//!
//! Every clinic, doctor and patient owns exactly one [`User`], which carries
//! the login credentials, contact details, account flags and role set.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use bookease_core::DomainError;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::validation::{digits_only, username_chars};

/// Prefix the authorization layer expects on every role claim.
pub const ROLE_PREFIX: &str = "ROLE_";

/// The fixed set of roles a user may hold.
///
/// Variants are declared in name order so that a `BTreeSet<RoleName>` iterates
/// sorted by role name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "UPPERCASE")]
pub enum RoleName {
    Admin,
    Clinic,
    Doctor,
    Patient,
}

impl RoleName {
    pub const ALL: [RoleName; 4] = [
        RoleName::Admin,
        RoleName::Clinic,
        RoleName::Doctor,
        RoleName::Patient,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            RoleName::Admin => "ADMIN",
            RoleName::Clinic => "CLINIC",
            RoleName::Doctor => "DOCTOR",
            RoleName::Patient => "PATIENT",
        }
    }

    /// The claim value for this role, e.g. `ROLE_ADMIN`.
    pub fn authority(&self) -> String {
        format!("{ROLE_PREFIX}{}", self.as_str())
    }

    pub fn from_authority(authority: &str) -> Option<Self> {
        authority.strip_prefix(ROLE_PREFIX)?.parse().ok()
    }
}

impl fmt::Display for RoleName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RoleName {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        RoleName::ALL
            .into_iter()
            .find(|role| role.as_str() == s)
            .ok_or_else(|| DomainError::not_found("Role", s))
    }
}

/// A persisted role row. Rows are created the first time a role is assigned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Role {
    pub id: Uuid,
    pub name: RoleName,
}

/// A BookEase account.
///
/// A user only exists for lookups while `active` is true. Deactivated rows are
/// kept for auditing and never physically deleted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub password_hash: String,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub active: bool,
    pub token_revoked: bool,
    pub roles: BTreeSet<RoleName>,
}

impl User {
    /// Builds a fresh, active account holding a single role.
    pub fn new(dto: &UserRequestDto, password_hash: String, role: RoleName) -> Self {
        Self {
            id: Uuid::new_v4(),
            username: dto.username.clone(),
            password_hash,
            name: dto.name.clone(),
            email: dto.email.clone(),
            phone: dto.phone.clone(),
            active: true,
            token_revoked: false,
            roles: BTreeSet::from([role]),
        }
    }

    pub fn has_role(&self, role: RoleName) -> bool {
        self.roles.contains(&role)
    }

    /// Role claims sorted by role name.
    pub fn authorities(&self) -> Vec<String> {
        self.roles.iter().map(RoleName::authority).collect()
    }

    /// Reads the value of a unique user field.
    pub fn field(&self, field: UserField) -> Option<&str> {
        match field {
            UserField::Username => Some(&self.username),
            UserField::Email => Some(&self.email),
            UserField::Phone => self.phone.as_deref(),
        }
    }
}

/// User columns that must be unique among active accounts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserField {
    Username,
    Email,
    Phone,
}

impl UserField {
    pub const ALL: [UserField; 3] = [UserField::Username, UserField::Email, UserField::Phone];

    /// User-facing label used in duplicate field errors.
    pub fn label(&self) -> &'static str {
        match self {
            UserField::Username => "Username",
            UserField::Email => "Email",
            UserField::Phone => "Telefone",
        }
    }

    pub fn column(&self) -> &'static str {
        match self {
            UserField::Username => "username",
            UserField::Email => "email",
            UserField::Phone => "phone",
        }
    }
}

/// Account data submitted when registering a clinic, doctor or patient.
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct UserRequestDto {
    #[validate(
        length(min = 4, max = 30, message = "Username deve ter entre 4 e 30 caracteres"),
        custom(function = "username_chars", message = "Username contém caracteres inválidos")
    )]
    #[schema(example = "dr.house")]
    pub username: String,
    #[validate(length(min = 8, max = 72, message = "Senha deve ter entre 8 e 72 caracteres"))]
    pub password: String,
    #[validate(length(min = 1, max = 120, message = "Nome é obrigatório"))]
    pub name: String,
    #[validate(
        length(min = 10, max = 11, message = "Telefone deve ter 10 ou 11 dígitos"),
        custom(function = "digits_only", message = "Telefone deve conter apenas números")
    )]
    #[schema(example = "11987654321")]
    pub phone: Option<String>,
    #[validate(email(message = "Email inválido"))]
    pub email: String,
}

/// Partial profile update. Absent fields are left untouched.
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateUserDto {
    #[validate(
        length(min = 4, max = 30, message = "Username deve ter entre 4 e 30 caracteres"),
        custom(function = "username_chars", message = "Username contém caracteres inválidos")
    )]
    pub username: Option<String>,
    #[validate(length(min = 8, max = 72, message = "Senha deve ter entre 8 e 72 caracteres"))]
    pub password: Option<String>,
    #[validate(length(min = 1, max = 120, message = "Nome é obrigatório"))]
    pub name: Option<String>,
    #[validate(
        length(min = 10, max = 11, message = "Telefone deve ter 10 ou 11 dígitos"),
        custom(function = "digits_only", message = "Telefone deve conter apenas números")
    )]
    pub phone: Option<String>,
    #[validate(email(message = "Email inválido"))]
    pub email: Option<String>,
}

impl UpdateUserDto {
    /// The values this update would write to the unique user columns.
    pub fn unique_candidates(&self) -> impl Iterator<Item = (UserField, &str)> {
        [
            (UserField::Username, self.username.as_deref()),
            (UserField::Email, self.email.as_deref()),
            (UserField::Phone, self.phone.as_deref()),
        ]
        .into_iter()
        .filter_map(|(field, value)| value.map(|v| (field, v)))
    }

    /// Copies the profile fields onto `user`. The password is hashed by the
    /// caller and passed in separately.
    pub fn apply_to(&self, user: &mut User, password_hash: Option<String>) {
        if let Some(username) = &self.username {
            user.username = username.clone();
        }
        if let Some(name) = &self.name {
            user.name = name.clone();
        }
        if let Some(email) = &self.email {
            user.email = email.clone();
        }
        if let Some(phone) = &self.phone {
            user.phone = Some(phone.clone());
        }
        if let Some(hash) = password_hash {
            user.password_hash = hash;
        }
    }
}

/// Public view of a [`User`]. Never exposes the password hash.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UserResponse {
    pub user_id: Uuid,
    pub username: String,
    pub name: String,
    pub phone: Option<String>,
    pub email: String,
    pub active: bool,
    pub token_revoked: bool,
    pub roles: Vec<RoleName>,
}

impl From<&User> for UserResponse {
    fn from(user: &User) -> Self {
        Self {
            user_id: user.id,
            username: user.username.clone(),
            name: user.name.clone(),
            phone: user.phone.clone(),
            email: user.email.clone(),
            active: user.active,
            token_revoked: user.token_revoked,
            roles: user.roles.iter().copied().collect(),
        }
    }
}
