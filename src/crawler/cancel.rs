//! Cooperative cancellation
//!
//! The token is checked before every page, link and retry. Sleeps race the
//! token; network requests already in flight always run to completion.

use std::time::Duration;
use tokio::task::JoinHandle;
pub use tokio_util::sync::CancellationToken;

/// Sleeps for `duration` unless the token fires first
///
/// Returns false when cancelled, before or during the sleep.
pub async fn sleep_unless_cancelled(token: &CancellationToken, duration: Duration) -> bool {
    if token.is_cancelled() {
        return false;
    }

    tokio::select! {
        biased;
        _ = token.cancelled() => false,
        _ = tokio::time::sleep(duration) => true,
    }
}

/// Cancels `token` when the process receives Ctrl-C
pub fn cancel_on_ctrl_c(token: CancellationToken) -> JoinHandle<()> {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupt received, finishing the current request before stopping");
            token.cancel();
        }
    })
}
