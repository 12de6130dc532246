//! Append-only event log on disk, one RON-encoded event per line

use crate::{Error, Result};
use bout_core::{Event, EventId, EventLog};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::marker::PhantomData;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// File-backed [`EventLog`]
///
/// Writes are flushed after every append but not synced.
pub struct RonFileLog<E> {
    path: PathBuf,
    file: File,
    _events: PhantomData<fn() -> E>,
}

impl<E: Serialize + DeserializeOwned> RonFileLog<E> {
    /// Open (or create) the log at `path`
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let file = Self::append_handle(&path)?;
        debug!(path = %path.display(), "opened event log");
        Ok(Self {
            path,
            file,
            _events: PhantomData,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Decode every line, reporting the first corrupt one
    pub fn events(&self) -> Result<Vec<Event<E>>> {
        let content = fs::read_to_string(&self.path)?;
        content
            .lines()
            .enumerate()
            .filter(|(_, line)| !line.trim().is_empty())
            .map(|(index, line)| {
                ron::from_str(line).map_err(|e| Error::Corrupt {
                    line: index + 1,
                    message: e.to_string(),
                })
            })
            .collect()
    }

    fn append_handle(path: &Path) -> Result<File> {
        Ok(OpenOptions::new().create(true).append(true).open(path)?)
    }

    fn encode(event: &Event<E>) -> Result<String> {
        ron::to_string(event).map_err(|e| Error::Serialization(e.to_string()))
    }

    fn rewrite(&mut self, events: &[Event<E>]) -> Result<()> {
        let staging = self.path.with_extension("rewrite");
        {
            let mut out = File::create(&staging)?;
            for event in events {
                writeln!(out, "{}", Self::encode(event)?)?;
            }
            out.flush()?;
        }
        fs::rename(&staging, &self.path)?;
        // The old handle still points at the replaced file
        self.file = Self::append_handle(&self.path)?;
        Ok(())
    }
}

fn persistence(err: Error) -> bout_core::Error {
    bout_core::Error::Persistence(err.to_string())
}

impl<E: Serialize + DeserializeOwned + Clone> EventLog<E> for RonFileLog<E> {
    fn append(&mut self, event: &Event<E>) -> bout_core::Result<()> {
        let line = Self::encode(event).map_err(persistence)?;
        writeln!(self.file, "{line}")
            .and_then(|()| self.file.flush())
            .map_err(|e| {
                warn!(path = %self.path.display(), error = %e, "append failed");
                bout_core::Error::Persistence(e.to_string())
            })
    }

    fn read_all(&self) -> bout_core::Result<Vec<Event<E>>> {
        self.events().map_err(persistence)
    }

    fn remove(&mut self, ids: &[EventId]) -> bout_core::Result<usize> {
        let events = self.events().map_err(persistence)?;
        let before = events.len();
        let kept: Vec<_> = events.into_iter().filter(|e| !ids.contains(&e.id)).collect();
        let removed = before - kept.len();
        if removed > 0 {
            self.rewrite(&kept).map_err(persistence)?;
            debug!(path = %self.path.display(), removed, "rewrote event log");
        }
        Ok(removed)
    }
}
