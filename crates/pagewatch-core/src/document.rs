use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::{MonitorError, SourceError};

/// The fixed set of documents the harness can serve and monitor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentId {
    #[default]
    Index,
    Alternative,
}

impl DocumentId {
    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentId::Index => "index",
            DocumentId::Alternative => "alternative",
        }
    }
}

impl std::fmt::Display for DocumentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for DocumentId {
    type Err = MonitorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "index" => Ok(DocumentId::Index),
            "alternative" => Ok(DocumentId::Alternative),
            _ => Err(MonitorError::UnknownDocument(s.to_string())),
        }
    }
}

/// Backing file for each document, relative to the serving root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DocumentPaths {
    pub index: PathBuf,
    pub alternative: PathBuf,
}

impl Default for DocumentPaths {
    fn default() -> Self {
        Self {
            index: PathBuf::from("index_xpath_test.html"),
            alternative: PathBuf::from("alternative_xpath_test.html"),
        }
    }
}

impl DocumentPaths {
    pub fn path(&self, id: DocumentId) -> &Path {
        match id {
            DocumentId::Index => &self.index,
            DocumentId::Alternative => &self.alternative,
        }
    }
}

/// Holds the currently active document.
#[derive(Debug, Default)]
pub struct DocumentSelector {
    active: Mutex<DocumentId>,
}

impl DocumentSelector {
    pub fn new(initial: DocumentId) -> Self {
        Self {
            active: Mutex::new(initial),
        }
    }

    pub fn active(&self) -> DocumentId {
        self.active.lock().map(|id| *id).unwrap_or_default()
    }

    /// Parse `identifier` and make it the active document.
    ///
    /// Unknown identifiers are rejected and the active document is left as is.
    pub fn switch(&self, identifier: &str) -> Result<DocumentId, MonitorError> {
        let id: DocumentId = identifier.parse()?;
        if let Ok(mut active) = self.active.lock() {
            *active = id;
        }
        Ok(id)
    }
}

/// Provides the full text of a monitored document.
#[async_trait]
pub trait DocumentSource: Send + Sync {
    async fn read(&self, id: DocumentId) -> Result<String, SourceError>;
}

/// Reads documents from files under a root directory.
#[derive(Debug, Clone)]
pub struct FileSource {
    root: PathBuf,
    paths: DocumentPaths,
}

impl FileSource {
    pub fn new(root: impl Into<PathBuf>, paths: DocumentPaths) -> Self {
        Self {
            root: root.into(),
            paths,
        }
    }

    pub fn path_of(&self, id: DocumentId) -> PathBuf {
        self.root.join(self.paths.path(id))
    }
}

#[async_trait]
impl DocumentSource for FileSource {
    async fn read(&self, id: DocumentId) -> Result<String, SourceError> {
        let path = self.path_of(id);
        tokio::fs::read_to_string(&path)
            .await
            .map_err(|source| SourceError::Io {
                path: path.display().to_string(),
                source,
            })
    }
}

/// In-memory documents, editable at runtime.
#[derive(Debug, Default)]
pub struct MemorySource {
    docs: Mutex<HashMap<DocumentId, String>>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&self, id: DocumentId, content: impl Into<String>) {
        if let Ok(mut docs) = self.docs.lock() {
            docs.insert(id, content.into());
        }
    }

    pub fn remove(&self, id: DocumentId) {
        if let Ok(mut docs) = self.docs.lock() {
            docs.remove(&id);
        }
    }
}

#[async_trait]
impl DocumentSource for MemorySource {
    async fn read(&self, id: DocumentId) -> Result<String, SourceError> {
        self.docs
            .lock()
            .ok()
            .and_then(|docs| docs.get(&id).cloned())
            .ok_or_else(|| SourceError::Unavailable(id.to_string()))
    }
}
