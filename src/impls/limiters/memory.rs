//! In-process rate limiting.
//!
//! Counters live in this process only: several instances each keep their own
//! table, and a restart forgets every window.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock, Weak};
use std::time::{Duration, Instant};

use crate::core::limiter::RateLimitStore;

#[derive(Debug, Clone, Copy)]
struct Window {
    count: u32,
    reset_at: Instant,
}

/// Fixed-window counter per key.
#[derive(Debug)]
pub struct MemoryLimiter {
    window: Duration,
    max_requests: u32,
    state: RwLock<HashMap<String, Window>>,
}

impl MemoryLimiter {
    pub fn new(window: Duration, max_requests: u32) -> Self {
        Self {
            window,
            max_requests,
            state: RwLock::new(HashMap::new()),
        }
    }

    pub fn check_at(&self, key: &str, now: Instant) -> bool {
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        match state.get_mut(key) {
            Some(w) if now < w.reset_at => {
                if w.count >= self.max_requests {
                    log::warn!("rate limit exceeded for {}", key);
                    return false;
                }
                w.count += 1;
                true
            }
            _ => {
                state.insert(
                    key.to_owned(),
                    Window {
                        count: 1,
                        reset_at: now + self.window,
                    },
                );
                true
            }
        }
    }

    /// Drops every window that has elapsed at `now`; returns how many were removed.
    pub fn sweep_at(&self, now: Instant) -> usize {
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        let before = state.len();
        state.retain(|_, w| now < w.reset_at);
        before - state.len()
    }

    #[cfg(test)]
    fn tracked(&self) -> usize {
        self.state.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    /// Runs `sweep_at` every `period` until the limiter is dropped.
    pub fn spawn_sweeper(limiter: &Arc<Self>, period: Duration) {
        let weak: Weak<Self> = Arc::downgrade(limiter);
        actix_web::rt::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            loop {
                ticker.tick().await;
                match weak.upgrade() {
                    Some(limiter) => {
                        let evicted = limiter.sweep_at(Instant::now());
                        if evicted > 0 {
                            log::debug!("rate limiter evicted {} expired windows", evicted);
                        }
                    }
                    None => break,
                }
            }
        });
    }
}

impl RateLimitStore for MemoryLimiter {
    async fn check_and_increment(&self, key: &str) -> bool {
        self.check_at(key, Instant::now())
    }
}
