use chrono::{SecondsFormat, Utc};
use std::collections::HashSet;
use std::fmt::Display;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info, warn};
use url::Url;

use crate::acquirer::{AcquiredDocument, DocumentSource};
use crate::network::render::{HeadlessRenderer, RenderFuture, Renderer};
use crate::network::session::Session;
use crate::parsers::html::{parse_document_bytes, serialize_document, walk, DocumentPass};
use crate::utils::path::{normalize_document_id, to_slash};
use crate::utils::url::{document_base_url, is_font_file, remote_document_id, BaseContext};
use crate::utils::Deadline;

/// Represents errors that can occur while mirroring a site
///
/// Every variant is `Send` so a failure produced by the background render
/// can be handed over to the traversal.
#[derive(Debug, Error)]
pub enum MirrorError {
    #[error("invalid input \"{input}\": {reason}")]
    InvalidInput { input: String, reason: String },

    #[error("input not reachable: {0}")]
    Unreachable(String),

    #[error("invalid reference \"{reference}\": {reason}")]
    InvalidReference { reference: String, reason: String },

    #[error("{}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed markup: {0}")]
    Markup(String),

    #[error("request to {url} failed: {message}")]
    Http { url: String, message: String },

    #[error("request to {url} returned HTTP {status}")]
    HttpStatus { url: String, status: u16 },

    #[error("rendering {url} failed: {message}")]
    Render { url: String, message: String },

    #[error("rendered document was not delivered within {0:?}")]
    RenderWait(Duration),

    #[error("timed out after {0:?}")]
    DeadlineExceeded(Duration),

    #[error("aborted by user")]
    Aborted,
}

impl MirrorError {
    pub fn io(path: &Path, source: std::io::Error) -> Self {
        MirrorError::Io {
            path: path.to_path_buf(),
            source,
        }
    }

    pub fn invalid_input(input: &str, reason: impl Display) -> Self {
        MirrorError::InvalidInput {
            input: input.to_string(),
            reason: reason.to_string(),
        }
    }

    pub fn invalid_reference(reference: &str, reason: impl Display) -> Self {
        MirrorError::InvalidReference {
            reference: reference.to_string(),
            reason: reason.to_string(),
        }
    }

    pub fn render(url: &Url, message: impl Display) -> Self {
        MirrorError::Render {
            url: url.to_string(),
            message: message.to_string(),
        }
    }

    /// The shared run deadline elapsed; always terminal for the run.
    pub fn is_deadline(&self) -> bool {
        matches!(self, MirrorError::DeadlineExceeded(_))
    }
}

pub const DEFAULT_START_DOCUMENT: &str = "index.html";
pub const DEFAULT_OUTPUT_DIR: &str = "front_local";
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/114.0.0.0 Safari/537.36";

/// Configuration options for a mirroring run
#[derive(Clone, Debug)]
pub struct MirrorOptions {
    pub output_dir: PathBuf,
    pub asset_dir: String,
    pub font_dir: String,
    /// Global deadline for the whole run.
    pub timeout: Duration,
    /// Per-request limit for resource fetches.
    pub resource_timeout: Duration,
    /// Limit for a single headless rendering session.
    pub render_timeout: Duration,
    /// How long the traversal waits for the pre-fetched entry document.
    pub render_wait: Duration,
    /// Pause after navigation, split in halves around auto-scrolling.
    pub render_settle: Duration,
    pub user_agent: String,
    pub silent: bool,
}

impl Default for MirrorOptions {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            asset_dir: "assets".to_string(),
            font_dir: "fonts".to_string(),
            timeout: Duration::from_secs(60),
            resource_timeout: Duration::from_secs(30),
            render_timeout: Duration::from_secs(30),
            render_wait: Duration::from_secs(15),
            render_settle: Duration::from_secs(5),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            silent: false,
        }
    }
}

impl MirrorOptions {
    /// Checks that every per-operation limit is strictly shorter than the
    /// global deadline.
    pub fn validate(&self) -> Result<(), MirrorError> {
        let limits = [
            ("resource timeout", self.resource_timeout),
            ("render timeout", self.render_timeout),
            ("render wait", self.render_wait),
        ];

        for (name, limit) in limits {
            if limit >= self.timeout {
                return Err(MirrorError::invalid_input(
                    &format!("{limit:?}"),
                    format!("{name} must be shorter than the global timeout ({:?})", self.timeout),
                ));
            }
        }

        if self.asset_dir == self.font_dir {
            return Err(MirrorError::invalid_input(
                &self.font_dir,
                "asset and font directories must differ",
            ));
        }

        Ok(())
    }
}

/// What to mirror: fixed once during setup
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CrawlContext {
    /// Local base directory or remote base URL (with trailing slash).
    pub root: String,
    /// Entry document, relative to `root`.
    pub start_document: String,
    pub is_remote: bool,
}

impl CrawlContext {
    /// Classifies a raw input locator.
    ///
    /// `http://` and `https://` inputs are remote. A remote URL naming a
    /// concrete resource (it has an extension, or its path does not end in
    /// `/`) becomes the start document and its directory the root; otherwise
    /// the start document is `index.html`. A local input naming an existing
    /// file is split the same way.
    pub fn from_input(input: &str) -> Result<Self, MirrorError> {
        let input = input.trim();
        if input.is_empty() {
            return Err(MirrorError::invalid_input(input, "empty input"));
        }

        if input.starts_with("http://") || input.starts_with("https://") {
            Self::remote(input)
        } else {
            Ok(Self::local(input))
        }
    }

    fn remote(input: &str) -> Result<Self, MirrorError> {
        let mut url = Url::parse(input).map_err(|e| MirrorError::invalid_input(input, e))?;
        url.set_fragment(None);
        url.set_query(None);

        let path = url.path().to_string();
        let has_extension = Path::new(&path).extension().is_some();
        let names_resource = has_extension || (!path.ends_with('/') && !path.is_empty());

        let start_document = match path.rsplit_once('/') {
            Some((directory, name)) if names_resource && !name.is_empty() => {
                url.set_path(&format!("{directory}/"));
                name.to_string()
            }
            _ => DEFAULT_START_DOCUMENT.to_string(),
        };

        if !url.path().ends_with('/') {
            let with_slash = format!("{}/", url.path());
            url.set_path(&with_slash);
        }

        Ok(CrawlContext {
            root: url.to_string(),
            start_document,
            is_remote: true,
        })
    }

    fn local(input: &str) -> Self {
        let path = Path::new(input);

        if path.is_file() {
            if let Some(name) = path.file_name() {
                let root = path
                    .parent()
                    .filter(|parent| !parent.as_os_str().is_empty())
                    .map(Path::to_path_buf)
                    .unwrap_or_else(|| PathBuf::from("."));

                return CrawlContext {
                    root: root.to_string_lossy().into_owned(),
                    start_document: name.to_string_lossy().into_owned(),
                    is_remote: false,
                };
            }
        }

        CrawlContext {
            root: input.to_string(),
            start_document: DEFAULT_START_DOCUMENT.to_string(),
            is_remote: false,
        }
    }

    /// Absolute URL of the start document (remote mode).
    pub fn start_url(&self) -> Result<Url, MirrorError> {
        let root = Url::parse(&self.root).map_err(|e| MirrorError::invalid_input(&self.root, e))?;
        root.join(&self.start_document)
            .map_err(|e| MirrorError::invalid_reference(&self.start_document, e))
    }

    /// Path of the start document (local mode).
    pub fn start_path(&self) -> PathBuf {
        Path::new(&self.root).join(&self.start_document)
    }
}

/// Which flat directory a resource lands in
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Bucket {
    Assets,
    Fonts,
}

impl Bucket {
    pub fn for_file_name(file_name: &str) -> Self {
        if is_font_file(file_name) {
            Bucket::Fonts
        } else {
            Bucket::Assets
        }
    }
}

/// On-disk layout of the mirrored tree
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OutputLayout {
    pub root: PathBuf,
    pub asset_dir: String,
    pub font_dir: String,
}

impl OutputLayout {
    pub fn from_options(options: &MirrorOptions) -> Self {
        Self {
            root: options.output_dir.clone(),
            asset_dir: options.asset_dir.clone(),
            font_dir: options.font_dir.clone(),
        }
    }

    pub fn bucket_name(&self, bucket: Bucket) -> &str {
        match bucket {
            Bucket::Assets => &self.asset_dir,
            Bucket::Fonts => &self.font_dir,
        }
    }

    pub fn bucket_dir(&self, bucket: Bucket) -> PathBuf {
        self.root.join(self.bucket_name(bucket))
    }

    pub fn document_path(&self, document_id: &str) -> PathBuf {
        self.root.join(document_id)
    }

    /// Creates the root and both buckets; safe to call repeatedly.
    pub fn create(&self) -> Result<(), MirrorError> {
        for bucket in [Bucket::Assets, Bucket::Fonts] {
            let dir = self.bucket_dir(bucket);
            std::fs::create_dir_all(&dir).map_err(|e| MirrorError::io(&dir, e))?;
        }
        Ok(())
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Statistics {
    pub files_written: usize,
    pub bytes_written: u64,
}

impl Statistics {
    pub fn record(&mut self, size: u64) {
        self.files_written += 1;
        self.bytes_written += size;
    }
}

/// Documents already claimed by a traversal pass.
#[derive(Debug, Default)]
pub struct VisitedSet {
    documents: HashSet<String>,
}

impl VisitedSet {
    /// Claims a document, returning `false` if it was claimed before.
    pub fn insert(&mut self, document_id: &str) -> bool {
        self.documents.insert(document_id.to_string())
    }

    pub fn contains(&self, document_id: &str) -> bool {
        self.documents.contains(document_id)
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }
}

/// Checks performed by the outer shell between pre-fetch start and traversal
pub trait Preflight {
    /// Confirms the input is usable before any output is created.
    fn validate(&self, context: &CrawlContext, session: &Session) -> Result<(), MirrorError>;

    /// Ensures the output root and both buckets exist.
    fn prepare_output(&self, layout: &OutputLayout) -> Result<(), MirrorError>;

    /// Called right before traversal starts.
    fn announce(&self, _context: &CrawlContext, _layout: &OutputLayout) {}
}

/// Final result of a run: statistics are reported even on failure
#[derive(Debug)]
pub struct MirrorOutcome {
    pub statistics: Statistics,
    pub result: Result<(), MirrorError>,
}

/// Owns every piece of per-run state and sequences one mirroring run
pub struct Mirror {
    context: CrawlContext,
    layout: OutputLayout,
    options: MirrorOptions,
    deadline: Deadline,
    source: DocumentSource,
    pub(crate) session: Session,
    visited: VisitedSet,
    prefetch: Option<RenderFuture>,
}

impl Mirror {
    /// Creates a mirror that renders remote documents with headless Chrome.
    pub fn new(
        context: CrawlContext,
        options: MirrorOptions,
        deadline: Deadline,
    ) -> Result<Self, MirrorError> {
        let renderer = Arc::new(HeadlessRenderer::new(&options));
        Self::with_renderer(context, options, deadline, renderer)
    }

    pub fn with_renderer(
        context: CrawlContext,
        options: MirrorOptions,
        deadline: Deadline,
        renderer: Arc<dyn Renderer>,
    ) -> Result<Self, MirrorError> {
        let layout = OutputLayout::from_options(&options);
        let session = Session::new(&options, layout.clone(), deadline)?;
        let source = DocumentSource::from_context(&context, renderer)?;

        Ok(Mirror {
            context,
            layout,
            options,
            deadline,
            source,
            session,
            visited: VisitedSet::default(),
            prefetch: None,
        })
    }

    pub fn context(&self) -> &CrawlContext {
        &self.context
    }

    pub fn layout(&self) -> &OutputLayout {
        &self.layout
    }

    pub fn deadline(&self) -> Deadline {
        self.deadline
    }

    pub fn statistics(&self) -> Statistics {
        self.session.statistics()
    }

    pub fn visited(&self) -> &VisitedSet {
        &self.visited
    }

    /// Starts rendering the entry document in the background (remote mode
    /// only). Idempotent.
    pub fn start_prefetch(&mut self) -> Result<(), MirrorError> {
        if self.prefetch.is_some() {
            return Ok(());
        }

        if let DocumentSource::Remote(remote) = &self.source {
            let url = remote.document_url(&self.context.start_document)?;
            info!("-> rendering {} in the background", url);
            self.prefetch = Some(remote.prefetch(url, self.deadline)?);
        }

        Ok(())
    }

    /// Runs the whole pipeline: pre-fetch, validation, output preparation,
    /// then traversal from the start document.
    pub fn execute(mut self, preflight: &dyn Preflight) -> MirrorOutcome {
        let result = self.execute_steps(preflight);

        MirrorOutcome {
            statistics: self.session.statistics(),
            result,
        }
    }

    fn execute_steps(&mut self, preflight: &dyn Preflight) -> Result<(), MirrorError> {
        self.start_prefetch()?;
        preflight.validate(&self.context, &self.session)?;
        preflight.prepare_output(&self.layout)?;
        preflight.announce(&self.context, &self.layout);
        self.run()
    }

    /// Traverses from the start document. Output buckets must already exist.
    pub fn run(&mut self) -> Result<(), MirrorError> {
        let start_document = self.context.start_document.clone();
        self.process_document(&start_document)
    }

    /// Acquires, rewrites and persists one document and everything reachable
    /// from it.
    pub(crate) fn process_document(&mut self, document: &str) -> Result<(), MirrorError> {
        self.deadline.check()?;

        let document_id = normalize_document_id(document).ok_or_else(|| {
            MirrorError::invalid_reference(document, "document lies outside the source root")
        })?;
        if !self.visited.insert(&document_id) {
            debug!("already visited {}", document_id);
            return Ok(());
        }

        let acquired = self.acquire_document(&document_id)?;
        let (dom, encoding) = parse_document_bytes(&acquired.markup, acquired.encoding.as_deref())?;

        let output_path = self.layout.document_path(&document_id);
        let output_dir = output_path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| self.layout.root.clone());
        info!(" 📄 {}", to_slash(&output_path));

        let pass = DocumentPass {
            id: document_id,
            base: acquired.base,
            output_dir,
        };
        walk(self, &pass, &dom.document)?;
        self.deadline.check()?;

        let data = serialize_document(dom, &encoding)?;
        self.session.persist(&output_path, &data)
    }

    /// Processes a document reached through an iframe or a script string.
    ///
    /// Failures other than the deadline are logged and reported as `false`,
    /// leaving the referencing attribute alone.
    pub(crate) fn process_nested_document(&mut self, document_id: &str) -> Result<bool, MirrorError> {
        match self.process_document(document_id) {
            Ok(()) => Ok(true),
            Err(e) if e.is_deadline() => Err(e),
            Err(e) => {
                warn!("skipping nested document {}: {}", document_id, e);
                Ok(false)
            }
        }
    }

    /// Whether a local source document exists (always `false` in remote mode).
    pub(crate) fn local_document_exists(&self, document_id: &str) -> bool {
        match &self.source {
            DocumentSource::Local(local) => local.contains(document_id),
            DocumentSource::Remote(_) => false,
        }
    }

    /// Document id of a nested reference inside a rendered document, relative
    /// to the remote root (always `None` in local mode).
    pub(crate) fn remote_document_id(&self, base: &Url, reference: &str) -> Option<String> {
        match &self.source {
            DocumentSource::Remote(remote) => remote_document_id(remote.root(), base, reference),
            DocumentSource::Local(_) => None,
        }
    }

    fn acquire_document(&mut self, document_id: &str) -> Result<AcquiredDocument, MirrorError> {
        let is_start = normalize_document_id(&self.context.start_document).as_deref() == Some(document_id);

        if let (true, DocumentSource::Remote(remote)) = (is_start, &self.source) {
            if let Some(future) = self.prefetch.take() {
                let url = remote.document_url(document_id)?;
                info!(" ⏳ waiting for rendered document (up to {:?})", self.options.render_wait);
                let markup = future.wait(self.options.render_wait, &self.deadline)?;
                info!(" ✨ rendered document received");

                return Ok(AcquiredDocument {
                    markup,
                    base: BaseContext::Remote(document_base_url(&url)),
                    encoding: Some("utf-8".to_string()),
                });
            }
        }

        self.source.acquire(document_id, &self.deadline)
    }
}

/// Substitutes `%timestamp%` in an output directory template
pub fn format_output_dir(template: &str) -> String {
    let datetime: &str = &Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true);

    template.replace("%timestamp%", &datetime.replace(':', "_"))
}

/// Formats a byte count with thousands separators (`1234567` → `1,234,567`)
pub fn format_thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut formatted = String::with_capacity(digits.len() + digits.len() / 3);

    for (i, digit) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            formatted.push(',');
        }
        formatted.push(digit);
    }

    formatted
}

const ANSI_COLOR_RED: &str = "\x1b[31m";
const ANSI_COLOR_RESET: &str = "\x1b[0m";

/// Prints an error message to stderr, in red on a terminal unless NO_COLOR is set
pub fn print_error_message(msg: &str) {
    use crate::env::EnvVar;

    let no_color = crate::env::core::NoColor::get_or_default(false);
    if atty::is(atty::Stream::Stderr) && !no_color {
        eprintln!("{ANSI_COLOR_RED}{msg}{ANSI_COLOR_RESET}");
    } else {
        eprintln!("{msg}");
    }
}

/// Prints an info message to stdout
pub fn print_info_message(msg: &str) {
    println!("{msg}");
}
