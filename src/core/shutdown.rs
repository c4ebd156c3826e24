//! # OS termination signals.
//!
//! [`cancel_on_signal`] ties process signals to a simulation's shutdown token.
//!
//! - Unix: `SIGINT`, `SIGTERM`, `SIGQUIT`
//! - Other platforms: Ctrl-C

use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// Completes when a termination signal arrives.
#[cfg(unix)]
pub async fn wait_for_shutdown_signal() -> std::io::Result<&'static str> {
    use tokio::signal::unix::{SignalKind, signal};

    let mut sigint = signal(SignalKind::interrupt())?;
    let mut sigterm = signal(SignalKind::terminate())?;
    let mut sigquit = signal(SignalKind::quit())?;

    let name = tokio::select! {
        _ = sigint.recv()  => "SIGINT",
        _ = sigterm.recv() => "SIGTERM",
        _ = sigquit.recv() => "SIGQUIT",
    };
    Ok(name)
}

/// Completes when a termination signal arrives.
#[cfg(not(unix))]
pub async fn wait_for_shutdown_signal() -> std::io::Result<&'static str> {
    tokio::signal::ctrl_c().await?;
    Ok("ctrl-c")
}

/// Cancels `token` on the first termination signal.
///
/// Returns early without cancelling if `token` is cancelled elsewhere or
/// signal registration fails.
pub async fn cancel_on_signal(token: CancellationToken) {
    tokio::select! {
        res = wait_for_shutdown_signal() => match res {
            Ok(signal) => {
                info!(signal, "termination signal received");
                token.cancel();
            }
            Err(err) => warn!(%err, "failed to register signal handlers"),
        },
        _ = token.cancelled() => {}
    }
}
