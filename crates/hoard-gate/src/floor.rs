use std::time::Duration;

use tokio::time::Instant;

/// Measures from its creation so a failure path can be padded to a fixed
/// minimum duration.
///
/// Only [`MinimumDuration::wait`] sleeps. Dropping the scope (the success
/// path) costs nothing. The wait suspends just the calling task and holds
/// no locks.
#[derive(Debug, Clone, Copy)]
pub struct MinimumDuration {
    started: Instant,
    floor: Duration,
}

impl MinimumDuration {
    pub fn start(floor: Duration) -> Self {
        Self {
            started: Instant::now(),
            floor,
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }

    /// Time left before the floor is reached; zero once it has passed.
    pub fn remaining(&self) -> Duration {
        self.floor.saturating_sub(self.elapsed())
    }

    /// Sleep until at least `floor` has passed since [`MinimumDuration::start`].
    pub async fn wait(self) {
        tokio::time::sleep_until(self.started + self.floor).await;
    }
}
