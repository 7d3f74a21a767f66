use crate::db::models::User;
use crate::error::{AppError, AppResult};
use sqlx::SqlitePool;

pub async fn create_user(pool: &SqlitePool, username: &str, display_name: &str) -> AppResult<User> {
    let user = User::new(username.to_string(), display_name.to_string());

    sqlx::query(
        "INSERT INTO users (id, username, display_name, created_at, updated_at)
         VALUES (?, ?, ?, ?, ?)",
    )
    .bind(&user.id)
    .bind(&user.username)
    .bind(&user.display_name)
    .bind(&user.created_at)
    .bind(&user.updated_at)
    .execute(pool)
    .await?;

    Ok(user)
}

/// Returns `None` instead of an error when the username is unknown
pub async fn lookup_by_username(pool: &SqlitePool, username: &str) -> AppResult<Option<User>> {
    let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE username = ?")
        .bind(username)
        .fetch_optional(pool)
        .await?;

    Ok(user)
}

pub async fn find_by_username(pool: &SqlitePool, username: &str) -> AppResult<User> {
    lookup_by_username(pool, username)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("User '{}' not found", username)))
}

pub async fn find_by_id(pool: &SqlitePool, user_id: &str) -> AppResult<User> {
    let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = ?")
        .bind(user_id)
        .fetch_one(pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::RowNotFound => AppError::NotFound(format!("User with id '{}' not found", user_id)),
            _ => AppError::Database(e),
        })?;

    Ok(user)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::test_support::test_state;

    #[tokio::test]
    async fn create_then_find() {
        let state = test_state().await;
        let created = create_user(&state.db, "alice", "Alice").await.unwrap();

        let by_name = find_by_username(&state.db, "alice").await.unwrap();
        let by_id = find_by_id(&state.db, &created.id).await.unwrap();

        assert_eq!(by_name.id, created.id);
        assert_eq!(by_id.display_name, "Alice");
    }

    #[tokio::test]
    async fn unknown_user_is_not_found() {
        let state = test_state().await;

        assert!(lookup_by_username(&state.db, "nobody").await.unwrap().is_none());
        assert!(matches!(
            find_by_username(&state.db, "nobody").await,
            Err(AppError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn usernames_are_unique() {
        let state = test_state().await;
        create_user(&state.db, "alice", "Alice").await.unwrap();

        assert!(matches!(
            create_user(&state.db, "alice", "Other Alice").await,
            Err(AppError::Database(_))
        ));
    }
}
