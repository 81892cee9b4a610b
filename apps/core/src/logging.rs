use std::any::Any;
use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, OnceLock};
use std::time::{SystemTime, UNIX_EPOCH};

use tracing_subscriber::EnvFilter;

use crate::config::DEFAULT_LOG_FILTER;

const LOG_FILE_NAME: &str = "sshrunner.log";
const ARCHIVE_PREFIX: &str = "sshrunner-";
const MAX_LOG_BYTES: u64 = 1_000_000;
const MAX_ARCHIVES: usize = 5;

static PANIC_HOOK_INSTALLED: OnceLock<()> = OnceLock::new();

pub fn logs_dir() -> PathBuf {
    crate::config::stable_app_data_dir().join("logs")
}

/// Routes `tracing` output to the log file. `RUST_LOG` wins over `filter`.
pub fn init(filter: &str) -> Result<(), std::io::Error> {
    let log_dir = logs_dir();
    fs::create_dir_all(&log_dir)?;
    let log_path = log_dir.join(LOG_FILE_NAME);
    rotate_if_needed(&log_path, &log_dir)?;

    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)?;

    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(filter))
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_target(true)
        .try_init()
        .map_err(std::io::Error::other)?;

    install_panic_hook();
    Ok(())
}

/// Moves an oversized log aside, then trims old archives.
fn rotate_if_needed(log_path: &Path, log_dir: &Path) -> Result<(), std::io::Error> {
    let size = match fs::metadata(log_path) {
        Ok(meta) => meta.len(),
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(()),
        Err(err) => return Err(err),
    };
    if size < MAX_LOG_BYTES {
        return Ok(());
    }

    fs::rename(log_path, archive_path(log_dir))?;
    prune_old_archives(log_dir)
}

/// `sshrunner-<secs>-<nanos>.log`, with a counter appended if that name is
/// already taken, so a rename never replaces an earlier archive.
fn archive_path(log_dir: &Path) -> PathBuf {
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default();
    let stem = format!(
        "{ARCHIVE_PREFIX}{:010}-{:09}",
        now.as_secs(),
        now.subsec_nanos()
    );

    let mut candidate = log_dir.join(format!("{stem}.log"));
    let mut counter = 1_u32;
    while candidate.exists() {
        candidate = log_dir.join(format!("{stem}-{counter}.log"));
        counter += 1;
    }
    candidate
}

fn is_archive(path: &Path) -> bool {
    path.file_name()
        .and_then(|name| name.to_str())
        .is_some_and(|name| name.starts_with(ARCHIVE_PREFIX) && name.ends_with(".log"))
}

fn prune_old_archives(log_dir: &Path) -> Result<(), std::io::Error> {
    let mut archives: Vec<PathBuf> = fs::read_dir(log_dir)?
        .flatten()
        .map(|entry| entry.path())
        .filter(|path| is_archive(path))
        .collect();
    if archives.len() <= MAX_ARCHIVES {
        return Ok(());
    }

    archives.sort();
    let excess = archives.len() - MAX_ARCHIVES;
    for stale in &archives[..excess] {
        if let Err(error) = fs::remove_file(stale) {
            eprintln!(
                "[sshrunner-core] could not remove old log {}: {error}",
                stale.display()
            );
        }
    }
    Ok(())
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    payload
        .downcast_ref::<&str>()
        .map(|text| (*text).to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "non-string panic payload".to_string())
}

fn install_panic_hook() {
    PANIC_HOOK_INSTALLED.get_or_init(|| {
        let previous = std::panic::take_hook();
        std::panic::set_hook(Box::new(move |info| {
            let location = info
                .location()
                .map(|at| format!("{}:{}", at.file(), at.line()))
                .unwrap_or_else(|| "unknown".to_string());
            tracing::error!(%location, message = %panic_message(info.payload()), "panic");
            previous(info);
        }));
    });
}

#[cfg(test)]
mod tests {
    use super::{
        archive_path, logs_dir, prune_old_archives, rotate_if_needed, MAX_ARCHIVES, MAX_LOG_BYTES,
    };

    #[test]
    fn logs_dir_uses_stable_app_data_layout() {
        let dir = logs_dir();
        assert!(dir.to_string_lossy().to_ascii_lowercase().contains("sshrunner"));
    }

    #[test]
    fn prunes_oldest_archives_beyond_limit() {
        let dir = tempfile::tempdir().unwrap();
        for stamp in 0..MAX_ARCHIVES + 2 {
            std::fs::write(dir.path().join(format!("sshrunner-{stamp:010}-000000000.log")), b"x")
                .unwrap();
        }
        std::fs::write(dir.path().join("unrelated.log"), b"x").unwrap();

        prune_old_archives(dir.path()).unwrap();

        assert!(!dir.path().join("sshrunner-0000000000-000000000.log").exists());
        assert!(!dir.path().join("sshrunner-0000000001-000000000.log").exists());
        assert!(dir.path().join("sshrunner-0000000002-000000000.log").exists());
        assert!(dir.path().join("unrelated.log").exists());
    }

    #[test]
    fn rotates_only_oversized_log() {
        let dir = tempfile::tempdir().unwrap();
        let log_path = dir.path().join("sshrunner.log");

        std::fs::write(&log_path, b"small").unwrap();
        rotate_if_needed(&log_path, dir.path()).unwrap();
        assert!(log_path.exists());

        std::fs::write(&log_path, vec![b'x'; MAX_LOG_BYTES as usize]).unwrap();
        rotate_if_needed(&log_path, dir.path()).unwrap();
        assert!(!log_path.exists());
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[test]
    fn rotations_in_quick_succession_keep_every_archive() {
        let dir = tempfile::tempdir().unwrap();
        let log_path = dir.path().join("sshrunner.log");

        for _ in 0..3 {
            std::fs::write(&log_path, vec![b'x'; MAX_LOG_BYTES as usize]).unwrap();
            rotate_if_needed(&log_path, dir.path()).unwrap();
        }

        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 3);
    }

    #[test]
    fn archive_name_skips_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let first = archive_path(dir.path());
        std::fs::write(&first, b"x").unwrap();

        let second = archive_path(dir.path());

        assert_ne!(first, second);
        assert!(!second.exists());
    }
}
