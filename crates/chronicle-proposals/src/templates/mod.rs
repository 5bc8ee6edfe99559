//! Prompt template providers.
//!
//! Templates are plain text with `{name}` placeholders. The four bundled
//! templates are compiled into the binary; a directory provider can override
//! any of them at runtime.

use std::collections::HashMap;
use std::io;
use std::path::PathBuf;
use std::sync::{Arc, PoisonError, RwLock};

use async_trait::async_trait;
use chronicle_core::error::DomainError;
use chronicle_core::storage::{BlobError, StorageError};
use tracing::debug;

const STORY_ROOT_CREATE: &str = include_str!("../../templates/story-root-create.txt");
const STORY_ROOT_MERGE: &str = include_str!("../../templates/story-root-merge.txt");
const WORLD_STATE_CREATE: &str = include_str!("../../templates/world-state-create.txt");
const WORLD_STATE_MERGE: &str = include_str!("../../templates/world-state-merge.txt");

/// Source of template text by id.
#[async_trait]
pub trait TemplateProvider: Send + Sync {
    /// Loads the template text for `template_id`.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidInput` for a blank id and
    /// `DomainError::TemplateNotFound` for an unknown one.
    async fn load(&self, template_id: &str) -> Result<String, DomainError>;
}

fn check_template_id(template_id: &str) -> Result<(), DomainError> {
    if template_id.trim().is_empty() {
        return Err(DomainError::InvalidInput(
            "template id must not be empty".into(),
        ));
    }
    if !template_id
        .bytes()
        .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_')
    {
        return Err(DomainError::InvalidInput(format!(
            "template id {template_id:?} contains unsupported characters"
        )));
    }
    Ok(())
}

/// Serves the templates bundled with the crate.
#[derive(Debug, Clone, Copy, Default)]
pub struct EmbeddedTemplateProvider;

impl EmbeddedTemplateProvider {
    fn lookup(template_id: &str) -> Option<&'static str> {
        match template_id {
            "story-root-create" => Some(STORY_ROOT_CREATE),
            "story-root-merge" => Some(STORY_ROOT_MERGE),
            "world-state-create" => Some(WORLD_STATE_CREATE),
            "world-state-merge" => Some(WORLD_STATE_MERGE),
            _ => None,
        }
    }
}

#[async_trait]
impl TemplateProvider for EmbeddedTemplateProvider {
    async fn load(&self, template_id: &str) -> Result<String, DomainError> {
        check_template_id(template_id)?;
        Self::lookup(template_id)
            .map(str::to_owned)
            .ok_or_else(|| DomainError::TemplateNotFound(template_id.to_owned()))
    }
}

/// Loads `<dir>/<template_id>.txt`, caching each template after its first
/// successful read. Ids with no file go to the fallback provider if one is
/// set, and are otherwise not found.
pub struct DirectoryTemplateProvider {
    dir: PathBuf,
    fallback: Option<Arc<dyn TemplateProvider>>,
    cache: RwLock<HashMap<String, String>>,
}

impl std::fmt::Debug for DirectoryTemplateProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DirectoryTemplateProvider")
            .field("dir", &self.dir)
            .field("has_fallback", &self.fallback.is_some())
            .finish_non_exhaustive()
    }
}

impl DirectoryTemplateProvider {
    /// Provider reading only from `dir`.
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            fallback: None,
            cache: RwLock::new(HashMap::new()),
        }
    }

    /// Provider reading from `dir` and deferring to `fallback` for ids
    /// without a file.
    #[must_use]
    pub fn with_fallback(dir: impl Into<PathBuf>, fallback: Arc<dyn TemplateProvider>) -> Self {
        Self {
            fallback: Some(fallback),
            ..Self::new(dir)
        }
    }

    fn cached(&self, template_id: &str) -> Option<String> {
        self.cache
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(template_id)
            .cloned()
    }
}

#[async_trait]
impl TemplateProvider for DirectoryTemplateProvider {
    async fn load(&self, template_id: &str) -> Result<String, DomainError> {
        check_template_id(template_id)?;
        if let Some(text) = self.cached(template_id) {
            return Ok(text);
        }

        let path = self.dir.join(format!("{template_id}.txt"));
        match tokio::fs::read_to_string(&path).await {
            Ok(text) => {
                debug!(template_id, path = %path.display(), "template loaded from directory");
                self.cache
                    .write()
                    .unwrap_or_else(PoisonError::into_inner)
                    .entry(template_id.to_owned())
                    .or_insert_with(|| text.clone());
                Ok(text)
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => match &self.fallback {
                Some(fallback) => fallback.load(template_id).await,
                None => Err(DomainError::TemplateNotFound(template_id.to_owned())),
            },
            Err(e) => Err(StorageError::Blob(BlobError::Io {
                path: path.display().to_string(),
                message: e.to_string(),
            })
            .into()),
        }
    }
}
