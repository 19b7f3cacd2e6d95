//! Singleton option rows.

use sqlx::SqliteConnection;

use super::users;

/// The name of the scoreboard visibility option.
pub const SHOW_VOTES: &str = "show_votes";

/// Reads, and possibly updates, whether the scoreboard is revealed.
///
/// With `requested` set, the flag is stored as given. Without it, the flag is
/// switched on once every logged-in user has voted, and otherwise left as it
/// was. Returns the resulting flag; a flag that was never set is `false`.
///
/// The row is created and updated in one statement, so concurrent first
/// reads never race on the insert.
pub async fn show_votes(
    conn: &mut SqliteConnection,
    requested: Option<bool>,
) -> Result<bool, sqlx::Error> {
    // auto-reveal once everyone has voted
    let requested = match requested {
        Some(requested) => Some(requested),
        None => {
            let pending = users::count_pending_votes(&mut *conn).await?;
            (pending == 0).then_some(true)
        }
    };

    // a NULL request keeps whatever is stored
    let (value,) = sqlx::query_as::<_, (Option<String>,)>(
        r#"
        INSERT INTO option (name, value)
        VALUES ($1, $2)
        ON CONFLICT (name) DO UPDATE
        SET value = COALESCE(excluded.value, option.value)
        RETURNING value
        "#,
    )
    .bind(SHOW_VOTES)
    .bind(requested.map(|requested| requested.to_string()))
    .fetch_one(&mut *conn)
    .await?;

    Ok(value.as_deref() == Some("true"))
}
