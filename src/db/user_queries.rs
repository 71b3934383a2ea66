use sqlx::PgPool;
use tracing::info;

use crate::models::User;

/// Resolves a device identifier to its user row, creating one on first
/// contact. Safe under concurrent first requests from the same device: the
/// insert ignores conflicts and the winner is re-read.
pub async fn get_or_create(pool: &PgPool, device_id: &str) -> Result<User, sqlx::Error> {
    if let Some(user) = sqlx::query_as::<_, User>(
        "SELECT id, device_id, created_at FROM users WHERE device_id = $1",
    )
    .bind(device_id)
    .fetch_optional(pool)
    .await?
    {
        return Ok(user);
    }

    let user = User::new(device_id);
    sqlx::query(
        "INSERT INTO users (id, device_id, created_at)
         VALUES ($1, $2, $3)
         ON CONFLICT (device_id) DO NOTHING",
    )
    .bind(user.id)
    .bind(&user.device_id)
    .bind(user.created_at)
    .execute(pool)
    .await?;

    info!("created user for device {}", device_id);

    sqlx::query_as::<_, User>("SELECT id, device_id, created_at FROM users WHERE device_id = $1")
        .bind(device_id)
        .fetch_one(pool)
        .await
}
