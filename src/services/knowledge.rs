//! Knowledge base — the firm's documents the assistant answers from.
//!
//! DESIGN
//! ======
//! `index.json` names the firm and lists the available sections; each section
//! has a `path` relative to the content root plus free-form descriptive
//! fields shown to the routing model. An optional overview document gives
//! the model a cheap first shot at common questions.
//!
//! Only paths listed in the index are ever read, and only if they stay
//! inside the content root, whatever the routing model asks for.

use std::path::{Component, Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{info, warn};

const DEFAULT_FIRM_NAME: &str = "our firm";

#[derive(Debug, thiserror::Error)]
pub enum KnowledgeError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// One routable document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Section {
    pub path: String,
    /// Title, description, keywords... whatever the index carries.
    #[serde(flatten)]
    pub details: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KnowledgeIndex {
    #[serde(default = "default_firm_name")]
    pub firm_name: String,
    #[serde(default)]
    pub sections: Vec<Section>,
}

fn default_firm_name() -> String {
    DEFAULT_FIRM_NAME.to_string()
}

/// Content of a section requested by the router.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SectionText {
    pub path: String,
    /// `None` when the path is unknown, unsafe, or unreadable.
    pub content: Option<String>,
}

#[derive(Debug, Clone)]
pub struct KnowledgeBase {
    root: PathBuf,
    index: KnowledgeIndex,
    overview: Option<String>,
}

impl KnowledgeBase {
    /// Load the index and overview. Both paths are relative to `root`.
    /// A missing overview is not an error.
    ///
    /// # Errors
    ///
    /// Returns an error if the index cannot be read or parsed.
    pub async fn load(root: &Path, index_file: &Path, overview_file: &Path) -> Result<Self, KnowledgeError> {
        let index_path = root.join(index_file);
        let raw = tokio::fs::read_to_string(&index_path)
            .await
            .map_err(|source| KnowledgeError::Io { path: index_path.clone(), source })?;
        let index: KnowledgeIndex =
            serde_json::from_str(&raw).map_err(|source| KnowledgeError::Parse { path: index_path.clone(), source })?;

        let overview_path = root.join(overview_file);
        let overview = match tokio::fs::read_to_string(&overview_path).await {
            Ok(text) if !text.trim().is_empty() => Some(text),
            Ok(_) => None,
            Err(e) => {
                warn!(path = %overview_path.display(), error = %e, "knowledge: overview unavailable");
                None
            }
        };

        info!(
            firm = %index.firm_name,
            sections = index.sections.len(),
            overview = overview.is_some(),
            "knowledge: loaded"
        );
        Ok(Self::from_parts(root.to_path_buf(), index, overview))
    }

    #[must_use]
    pub fn from_parts(root: PathBuf, index: KnowledgeIndex, overview: Option<String>) -> Self {
        Self { root, index, overview }
    }

    #[must_use]
    pub fn firm_name(&self) -> &str {
        &self.index.firm_name
    }

    #[must_use]
    pub fn sections(&self) -> &[Section] {
        &self.index.sections
    }

    #[must_use]
    pub fn overview(&self) -> Option<&str> {
        self.overview.as_deref()
    }

    /// Pretty JSON of the section list, as shown to the routing model.
    #[must_use]
    pub fn sections_summary(&self) -> String {
        serde_json::to_string_pretty(&self.index.sections).unwrap_or_else(|_| "[]".to_string())
    }

    /// Read the section at `path`.
    pub async fn read_section(&self, path: &str) -> SectionText {
        let Some(full_path) = self.resolve(path) else {
            warn!(path, "knowledge: refusing unlisted or unsafe path");
            return SectionText { path: path.to_string(), content: None };
        };
        let content = match tokio::fs::read_to_string(&full_path).await {
            Ok(text) => Some(text),
            Err(e) => {
                warn!(path, error = %e, "knowledge: section unreadable");
                None
            }
        };
        SectionText { path: path.to_string(), content }
    }

    /// Map an index path onto the filesystem, or `None` if it is not listed
    /// or would leave the content root.
    fn resolve(&self, path: &str) -> Option<PathBuf> {
        if !self.index.sections.iter().any(|s| s.path == path) {
            return None;
        }
        let relative = Path::new(path);
        let confined = relative
            .components()
            .all(|c| matches!(c, Component::Normal(_) | Component::CurDir));
        confined.then(|| self.root.join(relative))
    }
}

#[cfg(test)]
#[path = "knowledge_test.rs"]
mod tests;
