use std::future::Future;

use crate::template::RenderedCommand;

pub mod postgres;

pub use postgres::PgResourcePool;

/// A fixed-capacity pool of connections to a remote service.
///
/// The pool is the only concurrency limit of a run: however many jobs call
/// [`ResourcePool::execute`] at once, at most `capacity` of them hold a
/// connection at any moment, the others wait for a slot.
pub trait ResourcePool: Send + Sync + 'static {
    /// Checks out a connection, runs `command` on it and checks it back in,
    /// whatever the outcome.
    ///
    /// Dropping the returned future while it waits for a slot gives up the
    /// wait. Dropping it mid-execution discards the connection.
    fn execute(&self, command: &RenderedCommand) -> impl Future<Output = Result<(), ExecError>> + Send;

    /// Releases every connection, waiting for outstanding checkouts first.
    fn close(&self) -> impl Future<Output = ()> + Send;
}

#[derive(Debug, thiserror::Error)]
#[error("Connection failed: {0}")]
pub struct ConnectError(#[from] sqlx::Error);

#[derive(Debug, thiserror::Error)]
pub enum ExecError {
    #[error("Failed to execute command: {0}")]
    Database(#[from] sqlx::Error),
}
