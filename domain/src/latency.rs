//! Artificial latency for item store reads.
//!
//! Reads sleep the calling thread, which is always a production worker, never
//! the thread serving requests. Tests inject `NoLatency`.
use rand::Rng;
use std::fmt::Debug;
use std::thread;
use std::time::Duration;

pub trait Latency: Send + Sync + Debug {
    fn next_delay(&self) -> Duration;

    fn pause(&self) {
        let delay = self.next_delay();
        if !delay.is_zero() {
            thread::sleep(delay);
        }
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct NoLatency;

impl Latency for NoLatency {
    fn next_delay(&self) -> Duration {
        Duration::ZERO
    }
}

#[derive(Debug, Clone, Copy)]
pub struct FixedLatency(pub Duration);

impl Latency for FixedLatency {
    fn next_delay(&self) -> Duration {
        self.0
    }
}

/// Uniformly random delay in `[0, max)`.
#[derive(Debug, Clone, Copy)]
pub struct RandomLatency {
    max: Duration,
}

impl RandomLatency {
    pub fn up_to(max: Duration) -> Self {
        Self { max }
    }
}

impl Latency for RandomLatency {
    fn next_delay(&self) -> Duration {
        if self.max.is_zero() {
            return Duration::ZERO;
        }
        rand::thread_rng().gen_range(Duration::ZERO..self.max)
    }
}
