//! Persisted workspace selection: a single-line text file.
//!
//! Read at startup as the default workspace. It is advisory input only; the
//! path resolver never reads it.

use std::{
    fs, io,
    path::{Path, PathBuf},
};

use tracing::{debug, info};

use crate::error_handler::{SearchError, SearchResult};

#[derive(Debug, Clone)]
pub struct WorkspaceStore {
    file: PathBuf,
}

impl WorkspaceStore {
    pub fn new(file: impl Into<PathBuf>) -> Self {
        Self { file: file.into() }
    }

    pub fn file(&self) -> &Path {
        &self.file
    }

    /// First line of the file, trimmed. `None` when the file is missing or blank.
    ///
    /// # Errors
    /// [`SearchError::Io`] for read failures other than "not found".
    pub fn load(&self) -> SearchResult<Option<String>> {
        match fs::read_to_string(&self.file) {
            Ok(text) => {
                let ws = text
                    .lines()
                    .next()
                    .map(str::trim)
                    .filter(|l| !l.is_empty())
                    .map(str::to_string);
                debug!(file = %self.file.display(), workspace = ?ws, "loaded workspace");
                Ok(ws)
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Overwrites the file with `workspace` as its only line.
    ///
    /// # Errors
    /// [`SearchError::Validation`] for a blank or multi-line value,
    /// [`SearchError::Io`] on write failure.
    pub fn save(&self, workspace: &str) -> SearchResult<()> {
        let ws = workspace.trim();
        if ws.is_empty() {
            return Err(SearchError::Validation("workspace must not be empty".into()));
        }
        if ws.contains(['\n', '\r']) {
            return Err(SearchError::Validation(
                "workspace must be a single line".into(),
            ));
        }
        if let Some(parent) = self.file.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.file, format!("{ws}\n"))?;
        info!(file = %self.file.display(), workspace = ws, "saved workspace");
        Ok(())
    }
}
