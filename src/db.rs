use std::time::Duration;

use diesel::pg::PgConnection;
use diesel::r2d2::{ConnectionManager, Pool};

pub type DbPool = Pool<ConnectionManager<PgConnection>>;

/// `connection_timeout` caps the wait for a free connection.
pub fn create_pool(
    database_url: &str,
    connection_timeout: Duration,
) -> Result<DbPool, r2d2::Error> {
    let manager = ConnectionManager::<PgConnection>::new(database_url);
    // r2d2 panics on a zero timeout.
    Pool::builder()
        .connection_timeout(connection_timeout.max(Duration::from_millis(1)))
        .build(manager)
}
