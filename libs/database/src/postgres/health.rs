use sea_orm::{ConnectionTrait, DatabaseConnection, Statement};

use crate::common::{DatabaseError, DatabaseResult};

/// Verify the connection is alive with a trivial round trip
pub async fn check_health(db: &DatabaseConnection) -> DatabaseResult<()> {
    db.query_one_raw(Statement::from_string(
        db.get_database_backend(),
        "SELECT 1".to_string(),
    ))
    .await
    .map_err(|e| DatabaseError::HealthCheckFailed(e.to_string()))?;
    Ok(())
}
