//! User credentials, login state and votes.

use chrono::{DateTime, Utc};

use sqlx::{Executor, FromRow, Sqlite};

use tally_model::user::User;

use crate::app::{AppError, AppErrorKind};

/// A user row.
#[derive(Clone, Debug, FromRow)]
pub struct UserRecord {
    pub id: i64,
    pub username: String,
    pub password_digest: String,
    pub logged_in: bool,
    pub vote: Option<String>,
    pub is_master: bool,
    pub inserted_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<UserRecord> for User {
    fn from(value: UserRecord) -> Self {
        User {
            id: value.id,
            username: value.username,
            logged_in: value.logged_in,
            vote: value.vote,
            is_master: value.is_master,
        }
    }
}

/// Finds a user by their exact username.
pub async fn find_by_username<'c, E>(db: E, username: &str) -> Result<Option<UserRecord>, sqlx::Error>
where
    E: Executor<'c, Database = Sqlite>,
{
    sqlx::query_as::<_, UserRecord>(
        r#"
        SELECT
            id, username, password_digest, logged_in, vote, is_master,
            inserted_at, updated_at
        FROM user
        WHERE username = $1
        "#,
    )
    .bind(username)
    .fetch_optional(db)
    .await
}

/// Finds a user by their ID.
pub async fn find_by_id<'c, E>(db: E, id: i64) -> Result<Option<UserRecord>, sqlx::Error>
where
    E: Executor<'c, Database = Sqlite>,
{
    sqlx::query_as::<_, UserRecord>(
        r#"
        SELECT
            id, username, password_digest, logged_in, vote, is_master,
            inserted_at, updated_at
        FROM user
        WHERE id = $1
        "#,
    )
    .bind(id)
    .fetch_optional(db)
    .await
}

/// Registers a new user that is immediately logged in.
///
/// Callers should look the username up first; this fails with
/// [`AppErrorKind::Conflict`] if the username is already taken.
pub async fn register<'c, E>(db: E, username: &str, digest: &str) -> Result<UserRecord, AppError>
where
    E: Executor<'c, Database = Sqlite>,
{
    let now = Utc::now();

    let result = sqlx::query_as::<_, UserRecord>(
        r#"
        INSERT INTO user (username, password_digest, logged_in, is_master, inserted_at, updated_at)
        VALUES ($1, $2, TRUE, FALSE, $3, $3)
        RETURNING
            id, username, password_digest, logged_in, vote, is_master,
            inserted_at, updated_at
        "#,
    )
    .bind(username)
    .bind(digest)
    .bind(now)
    .fetch_one(db)
    .await;

    match result {
        Ok(user) => Ok(user),
        Err(sqlx::Error::Database(err)) if err.is_unique_violation() => {
            Err(AppError::from(AppErrorKind::Conflict(username.to_owned()))
                .with_message(format!("The username `{}` is already registered.", username)))
        }
        Err(err) => Err(err.into()),
    }
}

/// Saves a user's login state.
pub async fn set_login_state<'c, E>(
    db: E,
    id: i64,
    logged_in: bool,
    is_master: bool,
) -> Result<(), sqlx::Error>
where
    E: Executor<'c, Database = Sqlite>,
{
    sqlx::query(
        r#"
        UPDATE user
        SET logged_in = $2, is_master = $3, updated_at = $4
        WHERE id = $1
        "#,
    )
    .bind(id)
    .bind(logged_in)
    .bind(is_master)
    .bind(Utc::now())
    .execute(db)
    .await?;

    Ok(())
}

/// Overwrites a user's vote.
///
/// The vote is stored exactly as given.
pub async fn set_vote<'c, E>(db: E, id: i64, vote: Option<&str>) -> Result<(), sqlx::Error>
where
    E: Executor<'c, Database = Sqlite>,
{
    sqlx::query(
        r#"
        UPDATE user
        SET vote = $2, updated_at = $3
        WHERE id = $1
        "#,
    )
    .bind(id)
    .bind(vote)
    .bind(Utc::now())
    .execute(db)
    .await?;

    Ok(())
}

/// Lists every logged-in user, oldest first.
pub async fn logged_in<'c, E>(db: E) -> Result<Vec<UserRecord>, sqlx::Error>
where
    E: Executor<'c, Database = Sqlite>,
{
    sqlx::query_as::<_, UserRecord>(
        r#"
        SELECT
            id, username, password_digest, logged_in, vote, is_master,
            inserted_at, updated_at
        FROM user
        WHERE logged_in = TRUE
        ORDER BY id
        "#,
    )
    .fetch_all(db)
    .await
}

/// Lists every user, oldest first.
pub async fn all<'c, E>(db: E) -> Result<Vec<UserRecord>, sqlx::Error>
where
    E: Executor<'c, Database = Sqlite>,
{
    sqlx::query_as::<_, UserRecord>(
        r#"
        SELECT
            id, username, password_digest, logged_in, vote, is_master,
            inserted_at, updated_at
        FROM user
        ORDER BY id
        "#,
    )
    .fetch_all(db)
    .await
}

/// Counts the logged-in users that have not voted yet.
pub async fn count_pending_votes<'c, E>(db: E) -> Result<i64, sqlx::Error>
where
    E: Executor<'c, Database = Sqlite>,
{
    let (count,) = sqlx::query_as::<_, (i64,)>(
        r#"
        SELECT COUNT(*)
        FROM user
        WHERE logged_in = TRUE AND vote IS NULL
        "#,
    )
    .fetch_one(db)
    .await?;

    Ok(count)
}

/// Clears the vote of every logged-in user.
///
/// Returns how many votes were cleared.
pub async fn clear_votes<'c, E>(db: E) -> Result<u64, sqlx::Error>
where
    E: Executor<'c, Database = Sqlite>,
{
    let res = sqlx::query(
        r#"
        UPDATE user
        SET vote = NULL, updated_at = $1
        WHERE logged_in = TRUE AND vote IS NOT NULL
        "#,
    )
    .bind(Utc::now())
    .execute(db)
    .await?;

    Ok(res.rows_affected())
}

/// Marks every user as logged out.
pub async fn logout_all<'c, E>(db: E) -> Result<u64, sqlx::Error>
where
    E: Executor<'c, Database = Sqlite>,
{
    let res = sqlx::query(
        r#"
        UPDATE user
        SET logged_in = FALSE, is_master = FALSE, updated_at = $1
        WHERE logged_in = TRUE
        "#,
    )
    .bind(Utc::now())
    .execute(db)
    .await?;

    Ok(res.rows_affected())
}
