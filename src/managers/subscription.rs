//! Subscription lifecycle as an explicit state machine.
//!
//! ```text
//! Idle ──attach──▶ Connecting ──Subscribed──▶ Active
//!                     │  ▲                      │
//!                 drop│  │attach            drop│
//!                     ▼  │                      │
//!                  Reconnecting ◀───────────────┘
//! any ──detach──▶ Terminated
//! ```
//!
//! The machine does no I/O. The async driver in `subscriber` feeds it status
//! reports and acts on the [`Directive`] it returns.

use std::time::Duration;

use serde::Serialize;

pub use crate::types::change::HandleSequence;

use crate::types::change::{ChannelStatus, HandleId};
use crate::types::settings::RealtimeSettings;

/// Lifecycle phase of the change-feed attachment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SubscriptionPhase {
    Idle,
    Connecting,
    Active,
    Reconnecting,
    Terminated,
}

/// Exponential reconnect delay: `min(base * 2^retry, max)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BackoffPolicy {
    pub base_delay: Duration,
    pub max_delay: Duration,
}

impl Default for BackoffPolicy {
    fn default() -> Self {
        Self::new(Duration::from_millis(1000), Duration::from_millis(10_000))
    }
}

impl BackoffPolicy {
    pub const fn new(base_delay: Duration, max_delay: Duration) -> Self {
        Self {
            base_delay,
            max_delay,
        }
    }

    pub fn from_settings(settings: &RealtimeSettings) -> Self {
        Self::new(settings.base_delay(), settings.max_delay())
    }

    /// Delay before the attempt that follows `retry_count` failures.
    pub fn delay_for(&self, retry_count: u32) -> Duration {
        let factor = 1u32.checked_shl(retry_count).unwrap_or(u32::MAX);
        match self.base_delay.checked_mul(factor) {
            Some(delay) => delay.min(self.max_delay),
            None => self.max_delay,
        }
    }
}

/// What the driver should do after a status report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Directive {
    /// The report came from a superseded handle or changed nothing.
    Ignore,
    /// The report was applied; keep listening.
    Continue,
    /// The attachment dropped; wait `delay`, then attach again.
    Reconnect { delay: Duration },
}

/// Point-in-time view of the machine, for status reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SubscriptionStatus {
    pub phase: SubscriptionPhase,
    pub retry_count: u32,
    pub handle: Option<HandleId>,
}

/// Phase, retry counter and current handle of one subscriber.
#[derive(Debug)]
pub struct SubscriptionMachine {
    phase: SubscriptionPhase,
    retry_count: u32,
    current: Option<HandleId>,
    policy: BackoffPolicy,
    handles: HandleSequence,
}

impl SubscriptionMachine {
    pub fn new(policy: BackoffPolicy, handles: HandleSequence) -> Self {
        Self {
            phase: SubscriptionPhase::Idle,
            retry_count: 0,
            current: None,
            policy,
            handles,
        }
    }

    pub fn phase(&self) -> SubscriptionPhase {
        self.phase
    }

    pub fn retry_count(&self) -> u32 {
        self.retry_count
    }

    pub fn current_handle(&self) -> Option<HandleId> {
        self.current
    }

    pub fn status(&self) -> SubscriptionStatus {
        SubscriptionStatus {
            phase: self.phase,
            retry_count: self.retry_count,
            handle: self.current,
        }
    }

    /// Starts a new attachment with a fresh handle.
    ///
    /// Only valid from `Idle` or `Reconnecting`; returns `None` otherwise.
    pub fn attach(&mut self) -> Option<HandleId> {
        match self.phase {
            SubscriptionPhase::Idle | SubscriptionPhase::Reconnecting => {
                let handle = self.handles.next();
                self.current = Some(handle);
                self.phase = SubscriptionPhase::Connecting;
                Some(handle)
            }
            _ => None,
        }
    }

    /// Applies a status report from the attachment identified by `handle`.
    pub fn on_status(&mut self, handle: HandleId, status: ChannelStatus) -> Directive {
        if self.current != Some(handle) {
            return Directive::Ignore;
        }
        match (self.phase, status) {
            (SubscriptionPhase::Connecting | SubscriptionPhase::Active, ChannelStatus::Subscribed) => {
                self.phase = SubscriptionPhase::Active;
                self.retry_count = 0;
                Directive::Continue
            }
            (SubscriptionPhase::Connecting | SubscriptionPhase::Active, s) if s.is_drop() => {
                let delay = self.policy.delay_for(self.retry_count);
                self.retry_count = self.retry_count.saturating_add(1);
                self.phase = SubscriptionPhase::Reconnecting;
                Directive::Reconnect { delay }
            }
            (SubscriptionPhase::Connecting, ChannelStatus::Connecting) => Directive::Continue,
            _ => Directive::Ignore,
        }
    }

    /// Whether payloads from `handle` may touch the store right now.
    pub fn accepts(&self, handle: HandleId) -> bool {
        self.current == Some(handle)
            && matches!(
                self.phase,
                SubscriptionPhase::Connecting | SubscriptionPhase::Active
            )
    }

    /// Whether a reconnect timer armed for `handle` is still the one wanted.
    pub fn reconnect_due(&self, handle: HandleId) -> bool {
        self.current == Some(handle) && self.phase == SubscriptionPhase::Reconnecting
    }

    /// Enters the terminal phase. Every handle becomes stale.
    ///
    /// Returns the handle that was current, if any.
    pub fn detach(&mut self) -> Option<HandleId> {
        self.phase = SubscriptionPhase::Terminated;
        self.current.take()
    }
}
