//! The plugin instance: state ownership, lifecycle and fault isolation.
//!
//! `CaretTracker` owns the cursor model, the poller and the feedback
//! scheduler, and exposes the three callbacks a host drives: key events,
//! timer expiries, and teardown. Each callback is its own fault boundary;
//! whatever goes wrong inside is logged and swallowed so that a failure
//! here can never take down the host's input handling.

use std::panic::{self, AssertUnwindSafe};

use crate::cursor::CursorModel;
use crate::error::{CaretError, Result};
use crate::feedback::FeedbackScheduler;
use crate::gesture::{KeyGesture, KeyResult};
use crate::host::{Host, Task, TimerId};
use crate::interceptor::{NavigationInterceptor, NavigationOutcome};
use crate::poller::{ChangePoller, TickOutcome};
use crate::Config;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lifecycle {
    Created,
    Running,
    Terminated,
}

#[derive(Debug)]
pub struct CaretTracker {
    config: Config,
    model: CursorModel,
    poller: ChangePoller,
    feedback: FeedbackScheduler,
    interceptor: NavigationInterceptor,
    lifecycle: Lifecycle,
}

impl CaretTracker {
    /// Build a tracker from a validated configuration.
    pub fn new(config: Config) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            model: CursorModel::new(),
            poller: ChangePoller::new(&config),
            feedback: FeedbackScheduler::new(&config),
            interceptor: NavigationInterceptor::new(&config),
            lifecycle: Lifecycle::Created,
            config,
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn model(&self) -> &CursorModel {
        &self.model
    }

    pub fn poller(&self) -> &ChangePoller {
        &self.poller
    }

    pub fn lifecycle(&self) -> Lifecycle {
        self.lifecycle
    }

    /// Install the key hook and start accepting callbacks.
    pub fn init<H: Host + ?Sized>(&mut self, host: &mut H) -> Result<()> {
        if self.lifecycle != Lifecycle::Created {
            return Ok(());
        }
        host.install_key_hook()?;
        self.lifecycle = Lifecycle::Running;
        tracing::info!(
            class_marker = %self.config.class_marker,
            poll_interval_ms = self.config.poll_interval_ms,
            announce_delay_ms = self.config.announce_delay_ms,
            "caret tracker initialized"
        );
        Ok(())
    }

    /// Key hook. Always lets the host continue.
    pub fn on_key_event<H: Host + ?Sized>(
        &mut self,
        host: &mut H,
        gesture: &KeyGesture,
    ) -> KeyResult {
        if self.lifecycle != Lifecycle::Running {
            return KeyResult::Continue;
        }

        let outcome = isolate("key event", || {
            self.interceptor
                .on_key_event(
                    host,
                    gesture,
                    &mut self.model,
                    &mut self.poller,
                    &self.feedback,
                )
                .map_err(CaretError::from)
        });
        if let Some(NavigationOutcome::Moved { character: None, .. }) = outcome {
            tracing::warn!("cursor moved but no character could be resolved");
        }
        KeyResult::Continue
    }

    /// Timer expiry for a task this tracker scheduled.
    ///
    /// Announcements are never cancelled: one registered before teardown
    /// still speaks. Poll ticks only run while the tracker is Running.
    pub fn on_timer<H: Host + ?Sized>(&mut self, host: &mut H, id: TimerId, task: Task) {
        match task {
            Task::PollTick if self.lifecycle != Lifecycle::Running => {
                tracing::debug!(timer = id.0, "poll tick after teardown ignored");
            }
            Task::PollTick => {
                let outcome = isolate("poll tick", || {
                    self.poller.tick(host, id).map_err(CaretError::from)
                });
                match outcome {
                    // A faulted tick left nothing scheduled; go Idle so the next
                    // keystroke restarts polling.
                    None => self.poller.stop(host),
                    Some(TickOutcome::Stale) => {
                        tracing::debug!(timer = id.0, "stale poll tick ignored")
                    }
                    Some(_) => {}
                }
            }
            Task::Announce(announcement) => {
                isolate("announcement", || {
                    self.feedback.deliver(host, &announcement);
                    Ok(())
                });
            }
        }
    }

    /// Remove the key hook and cancel the pending poll tick.
    pub fn terminate<H: Host + ?Sized>(&mut self, host: &mut H) {
        if self.lifecycle == Lifecycle::Terminated {
            return;
        }
        self.poller.stop(host);
        if self.lifecycle == Lifecycle::Running {
            if let Err(err) = host.remove_key_hook() {
                tracing::warn!(error = %err, "failed to remove key hook");
            }
        }
        self.model.clear();
        self.lifecycle = Lifecycle::Terminated;
        tracing::info!("caret tracker terminated");
    }
}

/// Run one callback body, turning errors and panics into a log line.
fn isolate<T>(callback: &'static str, body: impl FnOnce() -> Result<T>) -> Option<T> {
    match panic::catch_unwind(AssertUnwindSafe(body)) {
        Ok(Ok(value)) => Some(value),
        Ok(Err(err)) => {
            tracing::warn!(callback, error = %err, "callback failed");
            None
        }
        Err(payload) => {
            let message = payload
                .downcast_ref::<&str>()
                .map(|s| s.to_string())
                .or_else(|| payload.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "unknown panic".to_string());
            tracing::error!(callback, panic = %message, "callback panicked");
            None
        }
    }
}
