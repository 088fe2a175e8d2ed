//! Interrupt handling
//!
//! Turns Ctrl-C (and SIGTERM on unix) into a cancelled token so the driver
//! loop can stop, report what it has and exit.

use tokio::process::Command;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// Wait for the first interrupt signal
async fn interrupt_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::warn!("failed to install Ctrl-C handler: {err}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let sigterm = async {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(err) => {
                tracing::warn!("failed to install SIGTERM handler: {err}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let sigterm = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = sigterm => {}
    }
}

/// Cancel `token` on the first interrupt. The task ends once the token is
/// cancelled for any reason.
pub fn spawn_interrupt_listener(token: CancellationToken) -> JoinHandle<()> {
    tokio::spawn(async move {
        tokio::select! {
            _ = interrupt_signal() => {
                tracing::warn!("interrupt received, stopping after the current step");
                token.cancel();
            }
            _ = token.cancelled() => {}
        }
    })
}

/// Put a child in its own process group so a terminal Ctrl-C reaches only
/// the runner, which then stops the child itself.
pub fn own_process_group(command: &mut Command) -> &mut Command {
    #[cfg(unix)]
    command.process_group(0);
    command
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_listener_exits_when_token_cancelled() {
        let token = CancellationToken::new();
        let handle = spawn_interrupt_listener(token.clone());
        token.cancel();
        tokio_test::assert_ok!(handle.await);
    }
}
