use anyhow::Context;
use serde_json::{Map, Value};
use sqlx::PgPool;
use tracing::{debug, info, instrument};
use uuid::Uuid;

use super::attributes::bool_to_storage;
use super::model::{AssignmentPolicy, User};
use super::repo_types::UserRow;

impl User {
    /// Find a user by primary key.
    #[instrument(skip(db))]
    pub async fn find_by_id(db: &PgPool, id: Uuid) -> anyhow::Result<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT id, name, email, password, auth0_id, photo, country, city,
                   email_verified, remember_token, created_at, updated_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(db)
        .await
        .context("find user by id")?;
        Ok(row.map(User::from))
    }

    /// Find a user by email.
    #[instrument(skip(db))]
    pub async fn find_by_email(db: &PgPool, email: &str) -> anyhow::Result<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT id, name, email, password, auth0_id, photo, country, city,
                   email_verified, remember_token, created_at, updated_at
            FROM users
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(db)
        .await
        .context("find user by email")?;
        Ok(row.map(User::from))
    }

    /// Find a user by identity-provider reference.
    #[instrument(skip(db))]
    pub async fn find_by_auth0_id(db: &PgPool, auth0_id: &str) -> anyhow::Result<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT id, name, email, password, auth0_id, photo, country, city,
                   email_verified, remember_token, created_at, updated_at
            FROM users
            WHERE auth0_id = $1
            "#,
        )
        .bind(auth0_id)
        .fetch_optional(db)
        .await
        .context("find user by auth0_id")?;
        Ok(row.map(User::from))
    }

    /// Insert an unsaved record. Timestamps come back from the database.
    #[instrument(skip(db, user), fields(user_id = %user.id))]
    pub async fn create(db: &PgPool, user: &User) -> anyhow::Result<User> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            INSERT INTO users (id, name, email, password, auth0_id, photo, country, city,
                               email_verified, remember_token)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING id, name, email, password, auth0_id, photo, country, city,
                      email_verified, remember_token, created_at, updated_at
            "#,
        )
        .bind(user.id)
        .bind(&user.name)
        .bind(&user.email)
        .bind(&user.password)
        .bind(&user.auth0_id)
        .bind(&user.photo)
        .bind(&user.country)
        .bind(&user.city)
        .bind(bool_to_storage(user.email_verified))
        .bind(&user.remember_token)
        .fetch_one(db)
        .await
        .context("insert user")?;
        info!(user_id = %row.id, "user created");
        Ok(row.into())
    }

    /// Persist the fillable columns of an existing record.
    #[instrument(skip(db, user), fields(user_id = %user.id))]
    pub async fn update(db: &PgPool, user: &User) -> anyhow::Result<User> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            UPDATE users
               SET name = $2, email = $3, password = $4, auth0_id = $5, photo = $6,
                   country = $7, city = $8, email_verified = $9, updated_at = now()
             WHERE id = $1
            RETURNING id, name, email, password, auth0_id, photo, country, city,
                      email_verified, remember_token, created_at, updated_at
            "#,
        )
        .bind(user.id)
        .bind(&user.name)
        .bind(&user.email)
        .bind(&user.password)
        .bind(&user.auth0_id)
        .bind(&user.photo)
        .bind(&user.country)
        .bind(&user.city)
        .bind(bool_to_storage(user.email_verified))
        .fetch_one(db)
        .await
        .context("update user")?;
        debug!("user updated");
        Ok(row.into())
    }

    /// Load the account linked to `auth0_id`, or create it from the
    /// identity provider's profile fields. Concurrent first logins for the
    /// same identity all resolve to one row; an email already held by a
    /// different account is an error.
    #[instrument(skip(db, profile))]
    pub async fn find_or_create_by_auth0_id(
        db: &PgPool,
        auth0_id: &str,
        profile: &Map<String, Value>,
    ) -> anyhow::Result<User> {
        if let Some(user) = Self::find_by_auth0_id(db, auth0_id).await? {
            return Ok(user);
        }
        let mut user = User::from_fillable(profile, AssignmentPolicy::Discard)?;
        user.auth0_id = Some(auth0_id.to_string());

        let inserted = sqlx::query_as::<_, UserRow>(
            r#"
            INSERT INTO users (id, name, email, password, auth0_id, photo, country, city,
                               email_verified, remember_token)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            ON CONFLICT DO NOTHING
            RETURNING id, name, email, password, auth0_id, photo, country, city,
                      email_verified, remember_token, created_at, updated_at
            "#,
        )
        .bind(user.id)
        .bind(&user.name)
        .bind(&user.email)
        .bind(&user.password)
        .bind(&user.auth0_id)
        .bind(&user.photo)
        .bind(&user.country)
        .bind(&user.city)
        .bind(bool_to_storage(user.email_verified))
        .bind(&user.remember_token)
        .fetch_optional(db)
        .await
        .context("insert user from identity provider")?;

        match inserted {
            Some(row) => {
                info!(user_id = %row.id, "user created from identity provider");
                Ok(row.into())
            }
            None => {
                debug!("lost insert race, loading existing account");
                Self::find_by_auth0_id(db, auth0_id)
                    .await?
                    .with_context(|| {
                        format!("email {} already belongs to another account", user.email)
                    })
            }
        }
    }

    #[instrument(skip(db))]
    pub async fn mark_email_verified(db: &PgPool, id: Uuid) -> anyhow::Result<User> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            UPDATE users
               SET email_verified = 1, updated_at = now()
             WHERE id = $1
            RETURNING id, name, email, password, auth0_id, photo, country, city,
                      email_verified, remember_token, created_at, updated_at
            "#,
        )
        .bind(id)
        .fetch_one(db)
        .await
        .context("mark email verified")?;
        info!(user_id = %id, "email verified");
        Ok(row.into())
    }

    #[instrument(skip(db, token))]
    pub async fn set_remember_token(
        db: &PgPool,
        id: Uuid,
        token: Option<&str>,
    ) -> anyhow::Result<()> {
        sqlx::query(r#"UPDATE users SET remember_token = $2 WHERE id = $1"#)
            .bind(id)
            .bind(token)
            .execute(db)
            .await
            .context("set remember token")?;
        Ok(())
    }

    /// Returns whether a row was removed.
    #[instrument(skip(db))]
    pub async fn delete(db: &PgPool, id: Uuid) -> anyhow::Result<bool> {
        let res = sqlx::query(r#"DELETE FROM users WHERE id = $1"#)
            .bind(id)
            .execute(db)
            .await
            .context("delete user")?;
        let removed = res.rows_affected() > 0;
        if removed {
            info!(user_id = %id, "user deleted");
        }
        Ok(removed)
    }
}
