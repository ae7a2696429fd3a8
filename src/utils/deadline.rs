use std::thread;
use std::time::{Duration, Instant};

use crate::core::MirrorError;

/// A fixed point in time after which the whole run is abandoned.
///
/// The token is `Copy`, so every blocking call (document render, resource
/// fetch, stylesheet scan) carries its own handle and checks it cooperatively.
#[derive(Clone, Copy, Debug)]
pub struct Deadline {
    budget: Duration,
    expires_at: Instant,
}

impl Deadline {
    /// Starts a deadline that expires `budget` from now.
    pub fn after(budget: Duration) -> Self {
        Self {
            budget,
            expires_at: Instant::now() + budget,
        }
    }

    /// The total duration this deadline was created with.
    pub fn budget(&self) -> Duration {
        self.budget
    }

    pub fn remaining(&self) -> Duration {
        self.expires_at.saturating_duration_since(Instant::now())
    }

    pub fn is_expired(&self) -> bool {
        Instant::now() >= self.expires_at
    }

    /// Clamps an operation-specific limit so it never outlives the deadline.
    pub fn bound(&self, limit: Duration) -> Duration {
        limit.min(self.remaining())
    }

    /// The error surfaced once the deadline has passed.
    pub fn exceeded(&self) -> MirrorError {
        MirrorError::DeadlineExceeded(self.budget)
    }

    /// Returns `Err(DeadlineExceeded)` when the deadline has passed.
    pub fn check(&self) -> Result<(), MirrorError> {
        if self.is_expired() {
            Err(self.exceeded())
        } else {
            Ok(())
        }
    }

    /// Sleeps for `duration`, waking early (with an error) if the deadline
    /// falls inside the pause.
    pub fn sleep(&self, duration: Duration) -> Result<(), MirrorError> {
        let pause = self.bound(duration);
        thread::sleep(pause);

        if pause < duration {
            Err(self.exceeded())
        } else {
            Ok(())
        }
    }
}
