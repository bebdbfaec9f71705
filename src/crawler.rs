use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use crate::error::ScanError;

/// One entry of a directory listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListedEntry {
    pub name: OsString,
    pub path: PathBuf,
}

/// Counters for a single refresh pass.
#[derive(Debug, Clone, Default)]
pub struct ScanStats {
    pub dirs_listed: u64,
    pub entries_seen: u64,
    pub errors: u64,
    pub duration: Duration,
}

/// Blocking directory lister used by the refresh engine.
///
/// Listings come back sorted by file name so child order is reproducible
/// across platforms and across rescans.
pub struct FileCrawler {
    stats: ScanStats,
    started: Instant,
}

impl FileCrawler {
    pub fn new() -> Self {
        Self {
            stats: ScanStats::default(),
            started: Instant::now(),
        }
    }

    /// List `path`. Entries that fail mid-iteration are skipped and counted.
    pub fn list(&mut self, path: &Path) -> Result<Vec<ListedEntry>, ScanError> {
        let read_dir = match fs::read_dir(path) {
            Ok(rd) => rd,
            Err(err) => {
                self.stats.errors += 1;
                return Err(ScanError::from_io(path, err));
            }
        };
        self.stats.dirs_listed += 1;

        let mut entries = Vec::new();
        for entry in read_dir {
            match entry {
                Ok(entry) => entries.push(ListedEntry {
                    name: entry.file_name(),
                    path: entry.path(),
                }),
                Err(_) => self.stats.errors += 1,
            }
        }
        self.stats.entries_seen += entries.len() as u64;

        entries.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(entries)
    }

    /// Finish the pass and hand back its counters.
    pub fn finish(mut self) -> ScanStats {
        self.stats.duration = self.started.elapsed();
        self.stats
    }
}

impl Default for FileCrawler {
    fn default() -> Self {
        Self::new()
    }
}
