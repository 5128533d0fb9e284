use serde::Deserialize;
use utoipa::IntoParams;

/// Lookup by an account's display name, matched exactly.
#[derive(Debug, Deserialize, IntoParams)]
pub struct NameQuery {
    pub name: String,
}
