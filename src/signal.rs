use log::warn;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// Cancels `cancel` when the process receives Ctrl+C (SIGINT).
///
/// The listener stops on its own once `cancel` is cancelled; otherwise abort
/// the returned handle when the run is over.
pub fn cancel_on_interrupt(cancel: CancellationToken) -> JoinHandle<()> {
    tokio::spawn(async move {
        tokio::select! {
            _ = cancel.cancelled() => {}
            result = tokio::signal::ctrl_c() => match result {
                Ok(()) => {
                    eprintln!("\nReceived Ctrl+C, cancelling jobs...");
                    cancel.cancel();
                }
                Err(err) => warn!("Failed to listen for Ctrl+C: {err}"),
            },
        }
    })
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    #[tokio::test]
    async fn listener_exits_when_the_run_is_cancelled() {
        let cancel = CancellationToken::new();
        let listener = cancel_on_interrupt(cancel.clone());
        cancel.cancel();
        tokio::time::timeout(Duration::from_secs(1), listener)
            .await
            .expect("listener did not stop")
            .unwrap();
    }
}
