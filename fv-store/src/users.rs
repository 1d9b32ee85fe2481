use crate::Database;
use crate::codec::{get, get_enum, get_time, new_id, now};
use crate::error::db_err;
use fv_core::{
    AuthProvider, DEFAULT_MAX_IDEAS_ALLOWED, FvError, Result, SubscriptionTier, UpsertUser, User,
};
use sqlx::sqlite::SqliteRow;

pub(crate) const USER_COLUMNS: &str = "id, email, full_name, avatar_url, provider, \
     subscription_tier, ideas_validated, max_ideas_allowed, team_code, created_at, last_login";

fn parse_provider(raw: &str) -> Option<AuthProvider> {
    match raw {
        "email" => Some(AuthProvider::Email),
        "google" => Some(AuthProvider::Google),
        _ => None,
    }
}

fn provider_str(provider: AuthProvider) -> &'static str {
    match provider {
        AuthProvider::Email => "email",
        AuthProvider::Google => "google",
    }
}

fn parse_tier(raw: &str) -> Option<SubscriptionTier> {
    match raw {
        "free" => Some(SubscriptionTier::Free),
        "pro" => Some(SubscriptionTier::Pro),
        "enterprise" => Some(SubscriptionTier::Enterprise),
        _ => None,
    }
}

pub(crate) fn user_from_row(row: &SqliteRow) -> Result<User> {
    Ok(User {
        id: get(row, "id")?,
        email: get(row, "email")?,
        full_name: get(row, "full_name")?,
        avatar_url: get(row, "avatar_url")?,
        provider: get_enum(row, "provider", parse_provider)?,
        subscription_tier: get_enum(row, "subscription_tier", parse_tier)?,
        ideas_validated: get(row, "ideas_validated")?,
        max_ideas_allowed: get(row, "max_ideas_allowed")?,
        team_code: get(row, "team_code")?,
        created_at: get_time(row, "created_at")?,
        last_login: get_time(row, "last_login")?,
    })
}

impl Database {
    /// Creates the user on first sign-in; afterwards refreshes `last_login` and any profile
    /// fields supplied.
    pub async fn upsert_user(&self, input: &UpsertUser) -> Result<User> {
        let email = input.email.trim();
        let (_, at) = now();
        let provider = input.provider.unwrap_or_default();

        sqlx::query(
            r#"
            INSERT INTO users (id, email, full_name, avatar_url, provider, subscription_tier,
                               ideas_validated, max_ideas_allowed, created_at, last_login)
            VALUES (?, ?, ?, ?, ?, 'free', 0, ?, ?, ?)
            ON CONFLICT(email) DO UPDATE SET
                full_name = COALESCE(excluded.full_name, users.full_name),
                avatar_url = COALESCE(excluded.avatar_url, users.avatar_url),
                last_login = excluded.last_login
            "#,
        )
        .bind(new_id())
        .bind(email)
        .bind(&input.full_name)
        .bind(&input.avatar_url)
        .bind(provider_str(provider))
        .bind(DEFAULT_MAX_IDEAS_ALLOWED)
        .bind(&at)
        .bind(&at)
        .execute(&self.pool)
        .await
        .map_err(|e| db_err("upsert user failed", e))?;

        self.get_user_by_email(email).await?.ok_or_else(|| FvError::not_found("User"))
    }

    pub async fn get_user_by_email(&self, email: &str) -> Result<Option<User>> {
        let row = sqlx::query(&format!("SELECT {USER_COLUMNS} FROM users WHERE email = ?"))
            .bind(email.trim())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| db_err("user lookup failed", e))?;
        row.as_ref().map(user_from_row).transpose()
    }

    pub async fn get_user_by_id(&self, id: &str) -> Result<Option<User>> {
        let row = sqlx::query(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| db_err("user lookup failed", e))?;
        row.as_ref().map(user_from_row).transpose()
    }

    /// Like [`Database::get_user_by_email`] but a missing row is an error.
    pub async fn require_user_by_email(&self, email: &str) -> Result<User> {
        self.get_user_by_email(email).await?.ok_or_else(|| FvError::not_found("User"))
    }

    pub async fn set_max_ideas_allowed(&self, user_id: &str, max_ideas_allowed: i64) -> Result<()> {
        let done = sqlx::query("UPDATE users SET max_ideas_allowed = ? WHERE id = ?")
            .bind(max_ideas_allowed)
            .bind(user_id)
            .execute(&self.pool)
            .await
            .map_err(|e| db_err("update user failed", e))?;
        if done.rows_affected() == 0 {
            return Err(FvError::not_found("User"));
        }
        Ok(())
    }
}
