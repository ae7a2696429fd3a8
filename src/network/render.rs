use headless_chrome::{Browser, LaunchOptions};
use std::ffi::OsStr;
use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};
use url::Url;

use crate::core::{MirrorError, MirrorOptions};
use crate::utils::Deadline;

const VIEWPORT: (u32, u32) = (1920, 1080);

/// Scrolls one viewport at a time until the bottom is reached or the step
/// limit runs out, so lazily loaded content gets requested.
const AUTO_SCROLL_SCRIPT: &str = r#"
new Promise((resolve) => {
    let steps = 0;
    const timer = setInterval(() => {
        window.scrollBy(0, window.innerHeight);
        steps += 1;
        const bottom = window.innerHeight + window.scrollY >= document.body.scrollHeight;
        if (bottom || steps >= 20) {
            clearInterval(timer);
            window.scrollTo(0, 0);
            resolve(steps);
        }
    }, 100);
})
"#;

/// Produces the final markup of a remote document after scripts have run.
pub trait Renderer: Send + Sync {
    fn render(&self, url: &Url, deadline: &Deadline) -> Result<Vec<u8>, MirrorError>;
}

/// Renders documents in a fresh headless Chrome session per call.
#[derive(Clone, Debug)]
pub struct HeadlessRenderer {
    session_timeout: Duration,
    settle: Duration,
    user_agent: String,
}

impl HeadlessRenderer {
    pub fn new(options: &MirrorOptions) -> Self {
        HeadlessRenderer {
            session_timeout: options.render_timeout,
            settle: options.render_settle,
            user_agent: options.user_agent.clone(),
        }
    }

    fn session_error(&self, url: &Url, error: impl std::fmt::Display, budget: &SessionBudget) -> MirrorError {
        match budget.check(url) {
            Err(e) => e,
            Ok(()) => MirrorError::render(url, error),
        }
    }
}

impl Renderer for HeadlessRenderer {
    fn render(&self, url: &Url, deadline: &Deadline) -> Result<Vec<u8>, MirrorError> {
        deadline.check()?;
        let budget = SessionBudget::start(self.session_timeout, *deadline);

        let browser = Browser::new(LaunchOptions {
            headless: true,
            window_size: Some(VIEWPORT),
            idle_browser_timeout: budget.remaining(),
            args: vec![OsStr::new("--disable-gpu")],
            ..Default::default()
        })
        .map_err(|e| self.session_error(url, e, &budget))?;
        budget.check(url)?;

        let tab = browser.new_tab().map_err(|e| self.session_error(url, e, &budget))?;
        tab.set_default_timeout(budget.remaining());
        tab.set_user_agent(&self.user_agent, None, None)
            .map_err(|e| self.session_error(url, e, &budget))?;

        debug!("navigating to {}", url);
        tab.navigate_to(url.as_str())
            .and_then(|tab| tab.wait_until_navigated())
            .map_err(|e| self.session_error(url, e, &budget))?;
        budget.check(url)?;

        // Scripts keep building the DOM after the load event.
        budget.sleep(url, self.settle / 2)?;
        tab.set_default_timeout(budget.remaining());
        if let Err(e) = tab.evaluate(AUTO_SCROLL_SCRIPT, true) {
            warn!("auto-scroll on {} failed: {}", url, e);
        }
        budget.check(url)?;
        budget.sleep(url, self.settle - self.settle / 2)?;

        tab.set_default_timeout(budget.remaining());
        let content = tab
            .get_content()
            .map_err(|e| self.session_error(url, e, &budget))?;

        Ok(content.into_bytes())
    }
}

/// Time allowed for one rendering session, never outliving the run deadline.
///
/// Every browser step is bounded by what is left of it and the budget is
/// checked again after each step.
#[derive(Clone, Copy, Debug)]
struct SessionBudget {
    limit: Duration,
    expires_at: Instant,
    deadline: Deadline,
}

impl SessionBudget {
    fn start(limit: Duration, deadline: Deadline) -> Self {
        SessionBudget {
            limit,
            expires_at: Instant::now() + limit,
            deadline,
        }
    }

    fn remaining(&self) -> Duration {
        self.deadline
            .bound(self.expires_at.saturating_duration_since(Instant::now()))
    }

    /// The run deadline takes precedence over the session limit.
    fn check(&self, url: &Url) -> Result<(), MirrorError> {
        self.deadline.check()?;

        if Instant::now() >= self.expires_at {
            Err(MirrorError::render(
                url,
                format!("rendering session exceeded {:?}", self.limit),
            ))
        } else {
            Ok(())
        }
    }

    fn sleep(&self, url: &Url, duration: Duration) -> Result<(), MirrorError> {
        thread::sleep(duration.min(self.remaining()));
        self.check(url)
    }
}

/// Single-slot handoff for a document rendered on a background thread.
///
/// The result is delivered at most once; when the deadline passes before
/// rendering finishes the result is dropped instead of delivered.
pub struct RenderFuture {
    url: Url,
    receiver: Receiver<Result<Vec<u8>, MirrorError>>,
}

impl RenderFuture {
    pub fn spawn(
        renderer: Arc<dyn Renderer>,
        url: Url,
        deadline: Deadline,
    ) -> Result<Self, MirrorError> {
        let (sender, receiver) = mpsc::sync_channel(1);
        let task_url = url.clone();

        thread::Builder::new()
            .name("prefetch".to_string())
            .spawn(move || {
                let result = renderer.render(&task_url, &deadline);

                if deadline.is_expired() {
                    debug!("deadline passed while rendering {}, result discarded", task_url);
                    return;
                }
                // The receiver is gone if the traversal stopped waiting.
                let _ = sender.send(result);
            })
            .map_err(|e| MirrorError::render(&url, e))?;

        Ok(RenderFuture { url, receiver })
    }

    /// Blocks until the rendered document arrives, at most `bound` and never
    /// past the run deadline.
    pub fn wait(self, bound: Duration, deadline: &Deadline) -> Result<Vec<u8>, MirrorError> {
        let limit = deadline.bound(bound);

        match self.receiver.recv_timeout(limit) {
            Ok(result) => result,
            Err(RecvTimeoutError::Timeout) => {
                if limit < bound || deadline.is_expired() {
                    Err(deadline.exceeded())
                } else {
                    info!("gave up waiting for {} after {:?}", self.url, bound);
                    Err(MirrorError::RenderWait(bound))
                }
            }
            Err(RecvTimeoutError::Disconnected) => {
                if deadline.is_expired() {
                    Err(deadline.exceeded())
                } else {
                    Err(MirrorError::render(&self.url, "renderer stopped without a result"))
                }
            }
        }
    }
}
