//! Politeness pauses
//!
//! Every sleep of the crawler (retry backoff and jitter) goes through a
//! [`Pacer`], so tests can observe the schedule without waiting for it.

use async_trait::async_trait;
use rand::rngs::StdRng;
use rand::Rng;
use std::sync::Mutex;
use std::time::Duration;

/// Something that can wait for a duration
#[async_trait]
pub trait Pacer: Send + Sync {
    async fn pause(&self, duration: Duration);
}

/// Sleeps on the tokio timer
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioPacer;

#[async_trait]
impl Pacer for TokioPacer {
    async fn pause(&self, duration: Duration) {
        if !duration.is_zero() {
            tokio::time::sleep(duration).await;
        }
    }
}

/// Records requested pauses and returns immediately
///
/// A test double: it never sleeps, so crawls driven by it run at full
/// speed. Production code uses [`TokioPacer`].
#[derive(Debug, Default)]
pub struct RecordingPacer {
    pauses: Mutex<Vec<Duration>>,
}

impl RecordingPacer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pauses requested so far, in order
    pub fn pauses(&self) -> Vec<Duration> {
        self.pauses
            .lock()
            .map(|pauses| pauses.clone())
            .unwrap_or_else(|poisoned| poisoned.into_inner().clone())
    }
}

#[async_trait]
impl Pacer for RecordingPacer {
    async fn pause(&self, duration: Duration) {
        self.pauses
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(duration);
    }
}

/// Uniform jitter window
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct JitterWindow {
    min: Duration,
    max: Duration,
}

impl JitterWindow {
    pub fn new(min: Duration, max: Duration) -> Self {
        Self { min, max }
    }

    /// Builds a window from seconds; negative or non-finite values clamp to zero
    pub fn from_secs(min: f64, max: f64) -> Self {
        Self::new(secs(min), secs(max))
    }

    pub fn min(&self) -> Duration {
        self.min
    }

    pub fn max(&self) -> Duration {
        self.max
    }

    /// Draws a pause uniformly from the window
    pub fn draw(&self, rng: &mut StdRng) -> Duration {
        let (low, high) = if self.min <= self.max {
            (self.min, self.max)
        } else {
            (self.max, self.min)
        };
        if low == high {
            return low;
        }
        let nanos = rng.random_range(low.as_nanos()..=high.as_nanos());
        Duration::from_nanos(u64::try_from(nanos).unwrap_or(u64::MAX))
    }
}

fn secs(value: f64) -> Duration {
    if value.is_finite() && value > 0.0 {
        Duration::from_secs_f64(value)
    } else {
        Duration::ZERO
    }
}
