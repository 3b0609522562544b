use std::time::Duration;
use tokio::process::Child;
use tokio::time::timeout;

pub const TERMINATE_GRACE: Duration = Duration::from_secs(5);

/// SIGTERM first so rsync can clean up its temporary files, SIGKILL if it lingers.
pub async fn terminate(child: &mut Child) {
    if let Some(pid) = child.id() {
        // The child has not been reaped yet, so the pid still refers to it.
        let signalled = unsafe { libc::kill(pid as libc::pid_t, libc::SIGTERM) } == 0;
        if signalled && timeout(TERMINATE_GRACE, child.wait()).await.is_ok() {
            return;
        }
    }
    let _ = child.kill().await;
}
