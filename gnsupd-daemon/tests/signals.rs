//! End-to-end signal handling in its own test binary: SIGHUP/SIGTERM are
//! delivered to this process.

use std::process::Command;
use std::time::Duration;

use gnsupd_daemon::{run_with, Trigger};
use tokio::sync::mpsc;
use tokio::time::timeout;

fn send_signal(name: &str) {
    let status = Command::new("kill")
        .arg(format!("-{name}"))
        .arg(std::process::id().to_string())
        .status()
        .expect("run kill");
    assert!(status.success(), "kill -{name} failed");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn startup_pass_then_sighup_pass_then_sigterm_stops() {
    let (pass_tx, mut pass_rx) = mpsc::unbounded_channel();
    let daemon = tokio::spawn(run_with(move |trigger| {
        let _ = pass_tx.send(trigger);
    }));

    let first = timeout(Duration::from_secs(5), pass_rx.recv()).await.expect("startup pass");
    assert_eq!(first, Some(Trigger::Startup));

    send_signal("HUP");
    let second = timeout(Duration::from_secs(5), pass_rx.recv()).await.expect("hangup pass");
    assert_eq!(second, Some(Trigger::Hangup));

    send_signal("TERM");
    timeout(Duration::from_secs(5), daemon)
        .await
        .expect("daemon stops on SIGTERM")
        .expect("join")
        .expect("clean shutdown");
}
