//! Document acquisition: reads a markup document from the local source tree
//! or renders it remotely, and returns it with the base context its own
//! references resolve against.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::info;
use url::Url;

use crate::core::{CrawlContext, MirrorError};
use crate::network::render::{RenderFuture, Renderer};
use crate::utils::url::{document_base_url, BaseContext};
use crate::utils::Deadline;

/// Raw markup plus everything needed to interpret it.
#[derive(Debug)]
pub struct AcquiredDocument {
    pub markup: Vec<u8>,
    pub base: BaseContext,
    /// Encoding the markup is known to be in; `None` means detect from
    /// `<meta charset>`.
    pub encoding: Option<String>,
}

/// Documents read from a directory on disk.
#[derive(Clone, Debug)]
pub struct LocalSource {
    root: PathBuf,
}

impl LocalSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        LocalSource { root: root.into() }
    }

    pub fn path_of(&self, document_id: &str) -> PathBuf {
        self.root.join(document_id)
    }

    /// Whether `document_id` names an existing file in the source tree.
    pub fn contains(&self, document_id: &str) -> bool {
        self.path_of(document_id).is_file()
    }

    pub fn acquire(&self, document_id: &str, deadline: &Deadline) -> Result<AcquiredDocument, MirrorError> {
        deadline.check()?;

        let path = self.path_of(document_id);
        let markup = fs::read(&path).map_err(|e| MirrorError::io(&path, e))?;
        let dir = path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| self.root.clone());

        Ok(AcquiredDocument {
            markup,
            base: BaseContext::Local {
                root: self.root.clone(),
                dir,
            },
            encoding: None,
        })
    }
}

/// Documents rendered by a headless browser from a remote root URL.
#[derive(Clone)]
pub struct RemoteSource {
    root: Url,
    renderer: Arc<dyn Renderer>,
}

impl RemoteSource {
    pub fn new(root: Url, renderer: Arc<dyn Renderer>) -> Self {
        RemoteSource { root, renderer }
    }

    pub fn root(&self) -> &Url {
        &self.root
    }

    pub fn document_url(&self, document_id: &str) -> Result<Url, MirrorError> {
        self.root
            .join(document_id)
            .map_err(|e| MirrorError::invalid_reference(document_id, e))
    }

    /// Renders a document synchronously (nested documents).
    pub fn acquire(&self, document_id: &str, deadline: &Deadline) -> Result<AcquiredDocument, MirrorError> {
        let url = self.document_url(document_id)?;
        info!(" 🖥️  rendering {}", url);

        let markup = self.renderer.render(&url, deadline)?;
        Ok(AcquiredDocument {
            markup,
            base: BaseContext::Remote(document_base_url(&url)),
            encoding: Some("utf-8".to_string()),
        })
    }

    /// Starts rendering a document on a background thread.
    pub fn prefetch(&self, url: Url, deadline: Deadline) -> Result<RenderFuture, MirrorError> {
        RenderFuture::spawn(Arc::clone(&self.renderer), url, deadline)
    }
}

/// Where documents come from for this run.
#[derive(Clone)]
pub enum DocumentSource {
    Local(LocalSource),
    Remote(RemoteSource),
}

impl DocumentSource {
    pub fn from_context(context: &CrawlContext, renderer: Arc<dyn Renderer>) -> Result<Self, MirrorError> {
        if context.is_remote {
            let root = Url::parse(&context.root).map_err(|e| MirrorError::invalid_input(&context.root, e))?;
            Ok(DocumentSource::Remote(RemoteSource::new(root, renderer)))
        } else {
            Ok(DocumentSource::Local(LocalSource::new(&context.root)))
        }
    }

    pub fn acquire(&self, document_id: &str, deadline: &Deadline) -> Result<AcquiredDocument, MirrorError> {
        match self {
            DocumentSource::Local(local) => local.acquire(document_id, deadline),
            DocumentSource::Remote(remote) => remote.acquire(document_id, deadline),
        }
    }
}
