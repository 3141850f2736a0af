use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

use super::attributes::bool_from_storage;
use super::model::User;

/// User record in the database.
#[derive(Debug, FromRow)]
pub struct UserRow {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub password: Option<String>,
    pub auth0_id: Option<String>,
    pub photo: Option<String>,
    pub country: Option<String>,
    pub city: Option<String>,
    pub email_verified: i16, // 0/1
    pub remember_token: Option<String>,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

impl From<UserRow> for User {
    fn from(r: UserRow) -> Self {
        Self {
            id: r.id,
            name: r.name,
            email: r.email,
            password: r.password,
            auth0_id: r.auth0_id,
            photo: r.photo,
            country: r.country,
            city: r.city,
            email_verified: bool_from_storage(r.email_verified),
            remember_token: r.remember_token,
            created_at: r.created_at,
            updated_at: r.updated_at,
        }
    }
}
