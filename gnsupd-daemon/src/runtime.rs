use gnsupd_core::config::StoreConfig;
use gnsupd_sync::pipeline::{self, PassScope};
use gnsupd_sync::PassReport;
use tokio::signal::unix::{signal, Signal, SignalKind};
use tokio::sync::broadcast;

use crate::error::DaemonError;
use crate::trigger::{hangup_task, subscribe_hangup, worker_task, Trigger, TriggerBus};

/// Start the daemon and block the current thread until it exits.
pub fn start_blocking(scope: PassScope, store: StoreConfig) -> Result<(), DaemonError> {
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(DaemonError::Runtime)?;
    runtime.block_on(run(scope, store))
}

/// Run the daemon: one startup pass, then one pass per SIGHUP, until SIGTERM
/// or Ctrl-C.
pub async fn run(scope: PassScope, store: StoreConfig) -> Result<(), DaemonError> {
    tracing::info!(scope = %scope.label(), api = %store.api_url, "starting gnsupd");
    run_with(move |trigger| run_pass(&scope, &store, trigger)).await
}

/// Wire the trigger bus, SIGHUP producer, termination handler and worker
/// around an arbitrary `pass`.
pub async fn run_with<F>(pass: F) -> Result<(), DaemonError>
where
    F: Fn(Trigger) + Send + Sync + 'static,
{
    let (bus, trigger_rx) = TriggerBus::new();
    let (shutdown_tx, _) = broadcast::channel::<()>(4);
    let hangup = subscribe_hangup()?;
    let terminate = signal(SignalKind::terminate()).map_err(|source| DaemonError::Signal {
        signal: "SIGTERM",
        source,
    })?;

    let worker_handle = {
        let shutdown = shutdown_tx.clone();
        let shutdown_rx = shutdown.subscribe();
        tokio::spawn(async move {
            let result = worker_task(trigger_rx, pass, shutdown_rx).await;
            let _ = shutdown.send(());
            result
        })
    };

    let hangup_handle = {
        let shutdown = shutdown_tx.clone();
        let shutdown_rx = shutdown.subscribe();
        let bus = bus.clone();
        tokio::spawn(async move {
            let result = hangup_task(bus, hangup, shutdown_rx).await;
            let _ = shutdown.send(());
            result
        })
    };

    let termination_handle = {
        let shutdown = shutdown_tx.clone();
        let shutdown_rx = shutdown.subscribe();
        tokio::spawn(async move { termination_task(terminate, shutdown, shutdown_rx).await })
    };

    bus.fire(Trigger::Startup);
    drop(bus);

    let (worker_result, hangup_result, termination_result) =
        tokio::join!(worker_handle, hangup_handle, termination_handle);

    handle_join("worker", worker_result)?;
    handle_join("sighup", hangup_result)?;
    handle_join("termination", termination_result)?;
    tracing::info!("gnsupd stopped");
    Ok(())
}

/// One reconciliation pass with a store client built for this pass only.
/// Logs its outcome; never fails the daemon.
pub fn run_pass(scope: &PassScope, store: &StoreConfig, trigger: Trigger) {
    tracing::info!(trigger = %trigger, scope = %scope.label(), "reconciliation pass started");
    match pipeline::run(scope, store) {
        Ok(report) => log_report(trigger, &report),
        Err(err) => tracing::error!(trigger = %trigger, error = %err, "reconciliation pass aborted"),
    }
}

fn log_report(trigger: Trigger, report: &PassReport) {
    tracing::info!(
        trigger = %trigger,
        sets = report.items.len(),
        created = report.created(),
        updated = report.updated(),
        failed = report.failed(),
        duration_ms = report.duration_ms as u64,
        "reconciliation pass completed",
    );
}

async fn termination_task(
    mut terminate: Signal,
    shutdown: broadcast::Sender<()>,
    mut shutdown_rx: broadcast::Receiver<()>,
) -> Result<(), DaemonError> {
    tokio::select! {
        _ = shutdown_rx.recv() => {}
        _ = terminate.recv() => {
            tracing::info!("received SIGTERM, shutting down");
            let _ = shutdown.send(());
        }
        result = tokio::signal::ctrl_c() => {
            result.map_err(|source| DaemonError::Signal { signal: "SIGINT", source })?;
            tracing::info!("received ctrl-c, shutting down");
            let _ = shutdown.send(());
        }
    }
    Ok(())
}

fn handle_join(
    task: &'static str,
    result: Result<Result<(), DaemonError>, tokio::task::JoinError>,
) -> Result<(), DaemonError> {
    match result {
        Ok(inner) => inner,
        Err(err) => Err(DaemonError::Join {
            task,
            message: err.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn pass_with_unreachable_store_is_logged_not_fatal() {
        let dir = tempfile::TempDir::new().expect("dir");
        std::fs::write(dir.path().join("a.json"), r#"{"nets":["10.0.0.0/8"]}"#).expect("write");
        let scope = PassScope::All {
            dir: dir.path().to_path_buf(),
            extra_label: None,
        };
        let store = StoreConfig {
            api_url: "http://127.0.0.1:1".into(),
            token_file: None,
        };

        run_pass(&scope, &store, Trigger::Startup);
    }

    #[test]
    fn pass_with_missing_directory_is_logged_not_fatal() {
        let scope = PassScope::All {
            dir: PathBuf::from("/nonexistent/gnsupd/definitions"),
            extra_label: None,
        };
        let store = StoreConfig {
            api_url: "http://127.0.0.1:1".into(),
            token_file: None,
        };

        run_pass(&scope, &store, Trigger::Hangup);
    }
}
