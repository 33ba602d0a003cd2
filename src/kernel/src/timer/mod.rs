//! Software timers.
//!
//! A timer is `idle` until started, then `running` until stopped. Waiting on
//! a running timer blocks the caller on the [`Clock`] for whatever is left of
//! its period, then marks it triggered. Periodic timers re-arm when they fire;
//! one-shot timers keep their stale start instant, so waiting again returns
//! immediately.
//!
//! `wait` is split into [`TimerService::arming`] and
//! [`TimerService::fire_arming`] so a front end shared between threads can
//! sleep without holding the bank. The [`Arming`] token read before the sleep
//! must still match when firing, so a timer restarted or re-created during
//! the sleep is not fired early.

use std::fmt;
use std::str::FromStr;
use std::time::{Duration, Instant};

use rtsim_common::{EntityKind, Result, SimError};
use rtsim_hal::Clock;
use serde::Deserialize;

use crate::clock::SystemClock;
use crate::registry::{CreatePolicy, Registry};

pub mod duration;

pub use duration::parse_duration;

/// Whether a timer re-arms after firing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(try_from = "String")]
pub enum TimerKind {
    /// Fires once per start.
    #[default]
    OneShot,
    /// Re-arms each time it fires.
    Periodic,
}

impl FromStr for TimerKind {
    type Err = SimError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "one_shot" | "one-shot" | "oneshot" => Ok(TimerKind::OneShot),
            "periodic" => Ok(TimerKind::Periodic),
            _ => Err(SimError::InvalidArgument(format!(
                "unknown timer type '{}', expected one_shot or periodic",
                s
            ))),
        }
    }
}

impl TryFrom<String> for TimerKind {
    type Error = SimError;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl fmt::Display for TimerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TimerKind::OneShot => write!(f, "one_shot"),
            TimerKind::Periodic => write!(f, "periodic"),
        }
    }
}

/// Where a periodic timer's next period starts after it fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RearmPolicy {
    /// From the instant the wait returned. Call overhead accumulates as drift.
    #[default]
    FromFiring,
    /// From the previous deadline, so deadlines stay at `start + k * period`.
    FromDeadline,
}

/// Identifies one start of one timer within a [`TimerService`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Arming(u64);

/// A timer record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Timer {
    period: Duration,
    kind: TimerKind,
    /// Set while running.
    start: Option<Instant>,
    /// Changes on every start; zero until the first.
    arming: u64,
    triggered: bool,
    trigger_count: u64,
}

impl Timer {
    /// Create an idle timer.
    pub fn new(period: Duration, kind: TimerKind) -> Self {
        Self {
            period,
            kind,
            start: None,
            arming: 0,
            triggered: false,
            trigger_count: 0,
        }
    }

    /// Timer period.
    pub fn period(&self) -> Duration {
        self.period
    }

    /// One-shot or periodic.
    pub fn kind(&self) -> TimerKind {
        self.kind
    }

    /// Whether the timer has a start instant.
    pub fn is_running(&self) -> bool {
        self.start.is_some()
    }

    /// Whether the timer fired since it was last started.
    pub fn triggered(&self) -> bool {
        self.triggered
    }

    /// Number of firings since it was last started.
    pub fn trigger_count(&self) -> u64 {
        self.trigger_count
    }
}

/// Bank of named timers driven by a [`Clock`].
pub struct TimerService<C: Clock = SystemClock> {
    timers: Registry<Timer>,
    clock: C,
    rearm: RearmPolicy,
    /// Last arming handed out.
    armings: u64,
}

impl Default for TimerService<SystemClock> {
    fn default() -> Self {
        Self::new(SystemClock, CreatePolicy::default(), RearmPolicy::default())
    }
}

impl<C: Clock> TimerService<C> {
    /// Create an empty service on the given clock.
    pub fn new(clock: C, policy: CreatePolicy, rearm: RearmPolicy) -> Self {
        Self {
            timers: Registry::new(EntityKind::Timer, policy),
            clock,
            rearm,
            armings: 0,
        }
    }

    /// The clock timers are measured against.
    pub fn clock(&self) -> &C {
        &self.clock
    }

    /// Create (or replace) an idle timer from duration text such as `500ms`.
    pub fn create(&mut self, name: &str, timeout: &str, kind: TimerKind) -> Result<()> {
        let period = parse_duration(timeout)?;
        self.timers.insert(name, Timer::new(period, kind))?;
        log::info!(
            "Timer '{}' created with timeout {} and type '{}'.",
            name,
            timeout,
            kind
        );
        Ok(())
    }

    /// Delete a timer.
    pub fn delete(&mut self, name: &str) -> Result<()> {
        self.timers.remove(name)?;
        log::info!("Timer '{}' deleted.", name);
        Ok(())
    }

    /// Start (or restart) a timer from now, clearing its trigger state.
    pub fn start(&mut self, name: &str) -> Result<()> {
        let now = self.clock.now();
        let timer = self.timers.get_mut(name)?;
        self.armings += 1;
        timer.start = Some(now);
        timer.arming = self.armings;
        timer.triggered = false;
        timer.trigger_count = 0;
        log::info!("Timer '{}' started.", name);
        Ok(())
    }

    /// Time left before a running timer's deadline, zero if already past.
    pub fn remaining(&self, name: &str) -> Result<Duration> {
        Ok(self.arming(name)?.1)
    }

    /// The current arming of a running timer and the time left before its
    /// deadline.
    pub fn arming(&self, name: &str) -> Result<(Arming, Duration)> {
        let timer = self.timers.get(name)?;
        let start = timer.start.ok_or_else(|| SimError::NotStarted {
            name: name.to_string(),
        })?;
        let elapsed = self.clock.now().saturating_duration_since(start);
        Ok((Arming(timer.arming), timer.period.saturating_sub(elapsed)))
    }

    /// Mark a running timer as fired and re-arm it if periodic.
    pub fn fire(&mut self, name: &str) -> Result<()> {
        let arming = self.arming(name)?.0;
        self.fire_arming(name, arming)
    }

    /// Like [`fire`](Self::fire), but fails with `NotStarted` unless the
    /// timer is still on `arming`.
    pub fn fire_arming(&mut self, name: &str, arming: Arming) -> Result<()> {
        let now = self.clock.now();
        let rearm = self.rearm;
        let timer = self.timers.get_mut(name)?;
        let start = match timer.start {
            Some(start) if timer.arming == arming.0 => start,
            _ => {
                return Err(SimError::NotStarted {
                    name: name.to_string(),
                })
            }
        };

        timer.triggered = true;
        timer.trigger_count += 1;
        if timer.kind == TimerKind::Periodic {
            timer.start = Some(match rearm {
                RearmPolicy::FromFiring => now,
                RearmPolicy::FromDeadline => start.checked_add(timer.period).unwrap_or(now),
            });
        }
        log::info!("Timer '{}' has triggered.", name);
        Ok(())
    }

    /// Block until the timer's deadline, then fire it.
    pub fn wait(&mut self, name: &str) -> Result<()> {
        let (arming, remaining) = self.arming(name)?;
        if !remaining.is_zero() {
            log::debug!("Waiting {:?} for timer '{}'.", remaining, name);
            self.clock.sleep(remaining);
        }
        self.fire_arming(name, arming)
    }

    /// Fail unless the timer fired since it was last started.
    pub fn assert_triggered(&self, name: &str) -> Result<()> {
        if !self.timers.get(name)?.triggered {
            return Err(SimError::PreconditionFailed(format!(
                "Timer '{}' has not triggered.",
                name
            )));
        }
        log::debug!("Verified that timer '{}' has triggered.", name);
        Ok(())
    }

    /// Fail unless the timer fired exactly `expected` times since its start.
    pub fn assert_trigger_count(&self, name: &str, expected: u64) -> Result<()> {
        let actual = self.timers.get(name)?.trigger_count;
        if actual != expected {
            return Err(SimError::PreconditionFailed(format!(
                "Expected timer '{}' to have triggered {} times, but it triggered {} times.",
                name, expected, actual
            )));
        }
        log::debug!("Verified that timer '{}' triggered {} times.", name, expected);
        Ok(())
    }

    /// Stop a timer. Trigger state is kept.
    pub fn stop(&mut self, name: &str) -> Result<()> {
        self.timers.get_mut(name)?.start = None;
        log::info!("Timer '{}' stopped.", name);
        Ok(())
    }

    /// Look up a timer record.
    pub fn get(&self, name: &str) -> Result<&Timer> {
        self.timers.get(name)
    }

    /// Number of firings since the timer was last started.
    pub fn trigger_count(&self, name: &str) -> Result<u64> {
        Ok(self.timers.get(name)?.trigger_count)
    }

    /// Whether the timer is running.
    pub fn is_running(&self, name: &str) -> Result<bool> {
        Ok(self.timers.get(name)?.is_running())
    }
}
