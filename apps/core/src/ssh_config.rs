use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::SystemTime;

use tracing::debug;

use crate::model::HostEntry;

const HOST_KEYWORD: &str = "host";
const BYTE_ORDER_MARK: char = '\u{feff}';

/// `<home>/.ssh/config`. Falls back to a relative `.ssh/config` when no home
/// directory can be resolved.
pub fn default_config_path() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_default()
        .join(".ssh")
        .join("config")
}

/// Immutable parse result of one read of the SSH config file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigSnapshot {
    entries: Vec<HostEntry>,
    source_modified_at: SystemTime,
}

impl ConfigSnapshot {
    pub fn entries(&self) -> &[HostEntry] {
        &self.entries
    }

    /// Modification time of the file as observed right before it was read.
    pub fn source_modified_at(&self) -> SystemTime {
        self.source_modified_at
    }
}

/// Cached view of the `Host` aliases declared in one SSH config file.
///
/// The file is re-read lazily: every read first compares the cached
/// snapshot's recorded modification time with the file's current one. A
/// missing or unreadable file leaves the store empty until a later read
/// succeeds.
#[derive(Debug)]
pub struct HostConfigStore {
    source_path: PathBuf,
    snapshot: Mutex<Option<Arc<ConfigSnapshot>>>,
}

impl Default for HostConfigStore {
    fn default() -> Self {
        Self::new()
    }
}

impl HostConfigStore {
    pub fn new() -> Self {
        Self::with_path(default_config_path())
    }

    pub fn with_path(source_path: impl Into<PathBuf>) -> Self {
        Self {
            source_path: source_path.into(),
            snapshot: Mutex::new(None),
        }
    }

    pub fn source_path(&self) -> &Path {
        &self.source_path
    }

    /// Current host entries in file order, empty when the file is unreadable.
    pub fn hosts(&self) -> Vec<HostEntry> {
        self.snapshot()
            .map(|snapshot| snapshot.entries.clone())
            .unwrap_or_default()
    }

    /// Refreshes if stale and hands out the published snapshot. The lock is
    /// released before the caller touches the entries.
    pub fn snapshot(&self) -> Option<Arc<ConfigSnapshot>> {
        let mut current = self
            .snapshot
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        refresh_if_stale(&self.source_path, &mut current);
        current.clone()
    }
}

fn refresh_if_stale(path: &Path, current: &mut Option<Arc<ConfigSnapshot>>) {
    let observed = std::fs::metadata(path)
        .and_then(|meta| meta.modified())
        .ok();

    if let (Some(snapshot), Some(modified)) = (current.as_deref(), observed) {
        if snapshot.source_modified_at >= modified {
            return;
        }
    }

    *current = match load_snapshot(path, observed.unwrap_or(SystemTime::UNIX_EPOCH)) {
        Ok(snapshot) => {
            debug!(
                path = %path.display(),
                hosts = snapshot.entries.len(),
                "reloaded ssh config"
            );
            Some(Arc::new(snapshot))
        }
        Err(error) => {
            debug!(path = %path.display(), %error, "ssh config unavailable");
            None
        }
    };
}

fn load_snapshot(path: &Path, modified: SystemTime) -> std::io::Result<ConfigSnapshot> {
    let mut raw = Vec::new();
    File::open(path)?.read_to_end(&mut raw)?;
    let text = String::from_utf8_lossy(&raw);

    Ok(ConfigSnapshot {
        entries: parse_host_entries(&text),
        source_modified_at: modified,
    })
}

/// Extracts one entry per `Host <name>` line, in file order. The remainder of
/// the line is kept verbatim, so `Host a b` yields the single name `a b`.
pub fn parse_host_entries(text: &str) -> Vec<HostEntry> {
    let text = text.strip_prefix(BYTE_ORDER_MARK).unwrap_or(text);
    text.lines().filter_map(parse_host_line).collect()
}

fn parse_host_line(line: &str) -> Option<HostEntry> {
    let line = line.trim();
    let keyword = line.get(..HOST_KEYWORD.len())?;
    if !keyword.eq_ignore_ascii_case(HOST_KEYWORD) {
        return None;
    }

    let rest = &line[HOST_KEYWORD.len()..];
    if !rest.starts_with(char::is_whitespace) {
        return None;
    }

    let name = rest.trim();
    if name.is_empty() {
        return None;
    }
    Some(HostEntry::new(name))
}

#[cfg(test)]
mod tests {
    use super::{parse_host_entries, parse_host_line};

    fn names(text: &str) -> Vec<String> {
        parse_host_entries(text)
            .into_iter()
            .map(|entry| entry.name().to_string())
            .collect()
    }

    #[test]
    fn keeps_only_host_directives_in_file_order() {
        let text = "Host alpha\n  host BETA  \n# comment\nHostName gamma\n\nblank line above\n";
        assert_eq!(names(text), vec!["alpha", "BETA"]);
    }

    #[test]
    fn keeps_multiple_aliases_as_one_name() {
        assert_eq!(names("Host web1 web2\n"), vec!["web1 web2"]);
    }

    #[test]
    fn accepts_tab_after_keyword_and_crlf_endings() {
        assert_eq!(names("HOST\tdb\r\nHost  *.internal \r\n"), vec!["db", "*.internal"]);
    }

    #[test]
    fn rejects_bare_keyword_and_glued_names() {
        assert!(parse_host_line("Host").is_none());
        assert!(parse_host_line("Host   ").is_none());
        assert!(parse_host_line("Hostalpha").is_none());
        assert!(parse_host_line("Hostname example.com").is_none());
        assert!(parse_host_line("hé").is_none());
    }

    #[test]
    fn skips_leading_byte_order_mark() {
        assert_eq!(names("\u{feff}Host first\nHost second"), vec!["first", "second"]);
    }
}
