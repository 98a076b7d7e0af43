use std::time::Duration;

use tokio::{sync::Mutex, time::Instant};

use crate::config::ThrottleConfig;

/// Pacing class of a remote mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pace {
    /// Document creates and deletes of any kind except menu items.
    Document,
    /// Image uploads and menu-item documents.
    Media,
}

/// Minimum-interval gate: each acquisition states how long the next
/// acquisition must wait after it.
#[derive(Debug, Default)]
pub struct IntervalGate {
    last: Mutex<Option<(Instant, Duration)>>,
}

impl IntervalGate {
    pub fn new() -> Self { Self::default() }

    pub async fn acquire(&self, spacing_after: Duration) {
        let mut last = self.last.lock().await;
        if let Some((at, spacing)) = *last {
            let ready_at = at + spacing;
            if ready_at > Instant::now() {
                tokio::time::sleep_until(ready_at).await;
            }
        }
        *last = Some((Instant::now(), spacing_after));
    }
}

/// The pipeline's rate limiter, consulted before every remote mutation.
#[derive(Debug)]
pub struct Throttle {
    gate: IntervalGate,
    config: ThrottleConfig,
}

impl Throttle {
    pub fn new(config: ThrottleConfig) -> Self {
        Self {
            gate: IntervalGate::new(),
            config,
        }
    }

    pub async fn before(&self, pace: Pace) {
        let spacing = match pace {
            Pace::Document => self.config.document_interval(),
            Pace::Media => self.config.media_interval(),
        };
        self.gate.acquire(spacing).await;
    }
}
