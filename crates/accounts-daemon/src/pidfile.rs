//! Optional PID file, written on startup and removed on clean shutdown.

use std::path::{Path, PathBuf};

use crate::error::DaemonError;

/// A PID file written on startup and removed on clean shutdown via
/// [`PidFile::remove`].
pub struct PidFile {
    path: PathBuf,
}

impl PidFile {
    /// Writes the current process id to `path`, refusing to overwrite one
    /// left behind by a process that is still alive.
    pub async fn write(path: &Path) -> Result<Self, DaemonError> {
        if let Some(existing) = read_pid(path).await {
            if process_is_alive(existing) {
                return Err(DaemonError::PidFile(std::io::Error::new(
                    std::io::ErrorKind::AlreadyExists,
                    format!("pid file {} names running process {existing}", path.display()),
                )));
            }
            tracing::warn!(path = %path.display(), pid = existing, "removing stale pid file");
        }

        let pid = std::process::id();
        tokio::fs::write(path, pid.to_string()).await.map_err(DaemonError::PidFile)?;
        tracing::info!(pid, path = %path.display(), "wrote pid file");
        Ok(Self { path: path.to_path_buf() })
    }

    /// Removes the PID file. Safe to call more than once; a missing file
    /// is not an error.
    pub async fn remove(&self) {
        if let Err(error) = tokio::fs::remove_file(&self.path).await {
            if error.kind() != std::io::ErrorKind::NotFound {
                tracing::warn!(path = %self.path.display(), %error, "failed to remove pid file");
            }
        }
    }
}

async fn read_pid(path: &Path) -> Option<libc::pid_t> {
    tokio::fs::read_to_string(path).await.ok()?.trim().parse().ok()
}

/// Checks liveness with `kill(pid, 0)`: no signal is sent, but the syscall
/// still fails with `ESRCH` if the process does not exist.
fn process_is_alive(pid: libc::pid_t) -> bool {
    let result = unsafe { libc::kill(pid, 0) };
    result == 0 || std::io::Error::last_os_error().raw_os_error() != Some(libc::ESRCH)
}
