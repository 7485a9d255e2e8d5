//! Auto-checkpoint scheduling
//!
//! A repeating timer driven by the host's frame delta. When it fires the
//! coordinator asks [`CheckpointScheduler::check`] whether a checkpoint may
//! be written right now; the guard reads live player flags every time.

use super::error::{SaveError, SaveResult};
use crate::scene::{SceneHost, locate_player};

/// Fixed-interval timer
#[derive(Debug, Clone)]
pub struct RepeatingTimer {
    interval_ms: f64,
    elapsed_ms: f64,
}

impl RepeatingTimer {
    pub fn new(interval_ms: f64) -> SaveResult<Self> {
        if !interval_ms.is_finite() || interval_ms <= 0.0 {
            return Err(SaveError::InvalidTimerInterval { interval_ms });
        }
        Ok(Self {
            interval_ms,
            elapsed_ms: 0.0,
        })
    }

    pub fn interval_ms(&self) -> f64 {
        self.interval_ms
    }

    /// Advance by `dt_ms`; returns how many intervals elapsed
    pub fn advance(&mut self, dt_ms: f64) -> u32 {
        if dt_ms <= 0.0 {
            return 0;
        }
        self.elapsed_ms += dt_ms;
        let fired = (self.elapsed_ms / self.interval_ms).floor();
        self.elapsed_ms -= fired * self.interval_ms;
        fired as u32
    }
}

/// Outcome of the checkpoint guard
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckpointDecision {
    Save,
    Disabled,
    NoPlayer,
    /// Player is movement-locked or mid-attack
    Busy,
}

/// Drives periodic auto-checkpoints
#[derive(Debug)]
pub struct CheckpointScheduler {
    interval_ms: f64,
    timer: Option<RepeatingTimer>,
    auto_save: bool,
}

impl CheckpointScheduler {
    /// Create the scheduler and start its timer
    pub fn new(interval_ms: f64, auto_save: bool) -> Self {
        let mut scheduler = Self {
            interval_ms,
            timer: None,
            auto_save,
        };
        scheduler.start_checkpoint_timer();
        scheduler
    }

    /// Enable/disable auto-save without stopping the timer
    pub fn set_auto_save(&mut self, enabled: bool) {
        self.auto_save = enabled;
        log::info!("Auto-save {}", if enabled { "enabled" } else { "disabled" });
    }

    pub fn is_auto_save_enabled(&self) -> bool {
        self.auto_save
    }

    pub fn is_running(&self) -> bool {
        self.timer.is_some()
    }

    /// Start (or restart) the timer. A bad interval is logged and leaves
    /// the scheduler stopped.
    pub fn start_checkpoint_timer(&mut self) {
        if self.timer.take().is_some() {
            log::debug!("Replacing running checkpoint timer");
        }
        match RepeatingTimer::new(self.interval_ms) {
            Ok(timer) => {
                log::info!("Checkpoint timer started ({:.0} s)", self.interval_ms / 1000.0);
                self.timer = Some(timer);
            }
            Err(e) => log::error!("Failed to start checkpoint timer: {}", e),
        }
    }

    pub fn stop_checkpoint_timer(&mut self) {
        if self.timer.take().is_some() {
            log::info!("Checkpoint timer stopped");
        }
    }

    /// Change the interval; a running timer restarts with it
    pub fn set_interval_ms(&mut self, interval_ms: f64) {
        self.interval_ms = interval_ms;
        if self.is_running() {
            self.start_checkpoint_timer();
        }
    }

    /// Advance the timer. Returns true when a checkpoint is due.
    ///
    /// Several elapsed intervals in one frame (e.g. after the tab was
    /// hidden) collapse into a single checkpoint.
    pub fn update(&mut self, dt_ms: f64) -> bool {
        match self.timer.as_mut() {
            Some(timer) => timer.advance(dt_ms) > 0,
            None => false,
        }
    }

    /// Whether a checkpoint may be written now
    pub fn check(&self, scene: &dyn SceneHost) -> CheckpointDecision {
        if !self.auto_save {
            return CheckpointDecision::Disabled;
        }
        match locate_player(scene) {
            None => CheckpointDecision::NoPlayer,
            Some(player) if player.is_busy() => CheckpointDecision::Busy,
            Some(_) => CheckpointDecision::Save,
        }
    }
}
