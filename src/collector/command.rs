// Bounded subprocess calls (systemctl, who)

use std::collections::BTreeMap;
use std::process::Stdio;
use tokio::process::Command;
use tokio::time::{Duration, timeout};

use crate::error::CollectionError;

/// Run `program args…` and return stdout. The child is killed if it outlives `limit`.
pub(super) async fn run_command(
    program: &'static str,
    args: &[&str],
    limit: Duration,
) -> Result<String, CollectionError> {
    let child = Command::new(program)
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .kill_on_drop(true)
        .spawn()?;
    let output = timeout(limit, child.wait_with_output())
        .await
        .map_err(|_| CollectionError::Timeout(limit))??;
    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}

/// Number of login sessions reported by `who`.
pub(super) async fn count_logged_in_users(limit: Duration) -> Result<u32, CollectionError> {
    let out = run_command("who", &[], limit).await?;
    Ok(out.lines().filter(|l| !l.trim().is_empty()).count() as u32)
}

/// `systemctl is-active` for every configured unit, concurrently. A unit whose check
/// fails or times out is reported as down.
pub(super) async fn service_status(
    services: &BTreeMap<String, String>,
    limit: Duration,
) -> BTreeMap<String, bool> {
    let checks = services.iter().map(|(unit, display_name)| async move {
        let up = match run_command("systemctl", &["is-active", unit.as_str()], limit).await {
            Ok(out) => out.trim() == "active",
            Err(e) => {
                tracing::debug!(unit = %unit, error = %e, operation = "service_status", "service check failed");
                false
            }
        };
        (display_name.clone(), up)
    });
    futures_util::future::join_all(checks)
        .await
        .into_iter()
        .collect()
}
