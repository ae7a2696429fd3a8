use reqwest::blocking::Client;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info};
use url::Url;

use crate::core::{Bucket, MirrorError, MirrorOptions, OutputLayout, Statistics};
use crate::network::cache::ResourceCache;
use crate::parsers::css::process_stylesheet;
use crate::utils::path::to_slash;
use crate::utils::url::{is_stylesheet_file, resolve_fetch_target, BaseContext, FetchTarget, TargetLocation};
use crate::utils::Deadline;

/// The resource store: downloads or reads every non-document resource,
/// deduplicates it by fetch identity, and writes it into its output bucket.
pub struct Session {
    client: Client,
    resource_timeout: Duration,
    layout: OutputLayout,
    deadline: Deadline,
    cache: ResourceCache,
    statistics: Statistics,
}

impl Session {
    pub fn new(
        options: &MirrorOptions,
        layout: OutputLayout,
        deadline: Deadline,
    ) -> Result<Self, MirrorError> {
        let client = Client::builder()
            .user_agent(options.user_agent.as_str())
            .build()
            .map_err(|e| MirrorError::Http {
                url: String::new(),
                message: format!("failed to build HTTP client: {e}"),
            })?;

        Ok(Session {
            client,
            resource_timeout: options.resource_timeout,
            layout,
            deadline,
            cache: ResourceCache::new(),
            statistics: Statistics::default(),
        })
    }

    pub fn layout(&self) -> &OutputLayout {
        &self.layout
    }

    pub fn deadline(&self) -> Deadline {
        self.deadline
    }

    pub fn statistics(&self) -> Statistics {
        self.statistics
    }

    pub fn cache(&self) -> &ResourceCache {
        &self.cache
    }

    /// Lightweight reachability check: any response below 400 passes.
    pub fn probe(&self, url: &Url) -> Result<(), MirrorError> {
        let limit = self.deadline.bound(self.resource_timeout);
        let response = self
            .client
            .get(url.as_str())
            .timeout(limit)
            .send()
            .map_err(|e| self.transport_error(url, e, limit))?;

        let status = response.status();
        if status.as_u16() >= 400 {
            return Err(MirrorError::HttpStatus {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        Ok(())
    }

    /// Downloads a URL, failing on any non-2xx status.
    ///
    /// The per-request timeout is clamped to the time left before the run
    /// deadline; a timeout caused by that clamp reports `DeadlineExceeded`.
    pub fn fetch_remote(&self, url: &Url) -> Result<Vec<u8>, MirrorError> {
        self.deadline.check()?;

        let limit = self.deadline.bound(self.resource_timeout);
        let response = self
            .client
            .get(url.as_str())
            .timeout(limit)
            .send()
            .map_err(|e| self.transport_error(url, e, limit))?;

        let status = response.status();
        if !status.is_success() {
            return Err(MirrorError::HttpStatus {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let bytes = response
            .bytes()
            .map_err(|e| self.transport_error(url, e, limit))?;
        Ok(bytes.to_vec())
    }

    fn transport_error(&self, url: &Url, error: reqwest::Error, limit: Duration) -> MirrorError {
        if error.is_timeout() && (limit < self.resource_timeout || self.deadline.is_expired()) {
            return self.deadline.exceeded();
        }

        MirrorError::Http {
            url: url.to_string(),
            message: error.to_string(),
        }
    }

    /// Reads the bytes a fetch target points at.
    pub fn fetch(&self, target: &FetchTarget) -> Result<Vec<u8>, MirrorError> {
        match &target.location {
            TargetLocation::Remote(url) => self.fetch_remote(url),
            TargetLocation::Local { path, .. } => {
                self.deadline.check()?;
                fs::read(path).map_err(|e| MirrorError::io(path, e))
            }
        }
    }

    /// Writes a file under the output root, creating missing directories,
    /// and counts it in the run statistics.
    pub fn persist(&mut self, path: &Path, data: &[u8]) -> Result<(), MirrorError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| MirrorError::io(parent, e))?;
        }
        fs::write(path, data).map_err(|e| MirrorError::io(path, e))?;
        self.statistics.record(data.len() as u64);

        Ok(())
    }

    /// Makes the resource `reference` (found in a document or stylesheet
    /// resolved against `base`) available in its output bucket.
    ///
    /// Returns the path of the local copy (under the output root), or `None`
    /// when the reference is not something to download. Stylesheets are
    /// rewritten before being saved so their own `url()` references point at
    /// local copies too.
    pub fn acquire_resource(
        &mut self,
        reference: &str,
        base: &BaseContext,
    ) -> Result<Option<PathBuf>, MirrorError> {
        self.deadline.check()?;

        let target = match resolve_fetch_target(reference, base)? {
            Some(target) => target,
            None => return Ok(None),
        };

        if let Some(saved) = self.cache.get(&target.identity) {
            debug!("reusing {} for {}", saved, target.identity);
            return Ok(Some(self.layout.root.join(saved)));
        }

        let file_name = target.file_name();
        let bucket = Bucket::for_file_name(&file_name);
        let bucket_name = self.layout.bucket_name(bucket).to_string();
        let saved = format!("{bucket_name}/{file_name}");
        let bucket_dir = self.layout.bucket_dir(bucket);
        let output_path = bucket_dir.join(&file_name);
        let is_stylesheet = is_stylesheet_file(&file_name);

        // Same name already written (earlier run or earlier in this run).
        if output_path.is_file() {
            self.cache.insert(&target.identity, &saved);
            info!("           └── {} (cached)", self.display_path(&saved));

            if is_stylesheet {
                let existing = fs::read(&output_path).map_err(|e| MirrorError::io(&output_path, e))?;
                process_stylesheet(self, &existing, &target.stylesheet_base(), &bucket_dir)?;
            }
            return Ok(Some(output_path));
        }

        let mut data = self.fetch(&target)?;

        if is_stylesheet {
            // Claimed up front so stylesheets referencing each other terminate.
            self.cache.insert(&target.identity, &saved);
            data = match process_stylesheet(self, &data, &target.stylesheet_base(), &bucket_dir) {
                Ok(data) => data,
                Err(e) => {
                    self.cache.remove(&target.identity);
                    return Err(e);
                }
            };
        }

        if let Err(e) = self.persist(&output_path, &data) {
            self.cache.remove(&target.identity);
            return Err(e);
        }
        self.cache.insert(&target.identity, &saved);
        info!("           └── {}", self.display_path(&saved));

        Ok(Some(output_path))
    }

    fn display_path(&self, saved: &str) -> String {
        let root = self
            .layout
            .root
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| to_slash(&self.layout.root));

        format!("/{root}/{saved}")
    }
}
