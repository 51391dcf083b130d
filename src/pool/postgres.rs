use log::{debug, info};
use sqlx::{
    Executor,
    postgres::{PgConnectOptions, PgPool, PgPoolOptions},
};

use crate::{
    pool::{ConnectError, ExecError, ResourcePool},
    template::RenderedCommand,
};

/// [`ResourcePool`] backed by a PostgreSQL connection pool.
///
/// Commands run through the simple query protocol, so a rendered command
/// may hold several `;`-separated statements.
#[derive(Debug, Clone)]
pub struct PgResourcePool {
    pool: PgPool,
}

impl PgResourcePool {
    /// Opens the pool and establishes a first connection, failing fast when
    /// the server is unreachable or rejects the credentials.
    pub async fn open(options: PgConnectOptions, capacity: usize) -> Result<Self, ConnectError> {
        let pool = pool_options(capacity).connect_with(options).await?;
        info!("connected, pool capacity {capacity}");
        Ok(Self { pool })
    }

    /// Opens the pool without connecting; connections are made on first use.
    pub fn open_lazy(options: PgConnectOptions, capacity: usize) -> Self {
        debug!("lazy pool, capacity {capacity}");
        Self {
            pool: pool_options(capacity).connect_lazy_with(options),
        }
    }
}

fn pool_options(capacity: usize) -> PgPoolOptions {
    PgPoolOptions::new()
        .max_connections(u32::try_from(capacity).unwrap_or(u32::MAX))
        .min_connections(0)
}

impl ResourcePool for PgResourcePool {
    async fn execute(&self, command: &RenderedCommand) -> Result<(), ExecError> {
        // the connection goes back to the pool when `conn` drops, sqlx closes
        // it instead if it was left in a broken state
        let mut conn = self.pool.acquire().await?;
        let result = (&mut *conn).execute(command.as_str()).await?;
        debug!("{} rows affected", result.rows_affected());
        Ok(())
    }

    async fn close(&self) {
        self.pool.close().await;
        info!("pool closed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn capacity_becomes_max_connections() {
        assert_eq!(pool_options(1).get_max_connections(), 1);
        assert_eq!(pool_options(7).get_max_connections(), 7);
        assert_eq!(pool_options(0).get_min_connections(), 0);
    }

    #[test]
    fn oversized_capacity_saturates() {
        if let Ok(capacity) = usize::try_from(u64::from(u32::MAX) + 1) {
            assert_eq!(pool_options(capacity).get_max_connections(), u32::MAX);
        }
        assert_eq!(pool_options(u32::MAX as usize).get_max_connections(), u32::MAX);
    }

    #[tokio::test]
    async fn lazy_pool_keeps_the_requested_capacity() {
        let options = PgConnectOptions::new().host("unreachable.invalid").port(5432);
        let pool = PgResourcePool::open_lazy(options, 3);
        assert_eq!(pool.pool.options().get_max_connections(), 3);
        assert_eq!(pool.pool.size(), 0);
        pool.close().await;
    }
}
