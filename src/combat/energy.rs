//! Combat domain: energy pool and the torch vulnerability window.

use bevy::prelude::*;

use crate::combat::resources::EnergyTuning;

/// Clamped energy reservoir; every mutation keeps `current` in `[0, max]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EnergyPool {
    current: f32,
    max: f32,
}

impl EnergyPool {
    pub fn new(max: f32) -> Self {
        Self {
            current: 0.0,
            max: max.max(0.0),
        }
    }

    pub fn current(&self) -> f32 {
        self.current
    }

    pub fn max(&self) -> f32 {
        self.max
    }

    pub fn is_full(&self) -> bool {
        self.current >= self.max
    }

    pub fn is_empty(&self) -> bool {
        self.current <= 0.0
    }

    /// Add energy. Negative amounts are ignored. Returns the amount gained.
    pub fn gain(&mut self, amount: f32) -> f32 {
        let before = self.current;
        self.current = (self.current + amount.max(0.0)).clamp(0.0, self.max);
        self.current - before
    }

    /// Remove energy. Negative amounts are ignored. Returns the amount removed.
    pub fn consume(&mut self, amount: f32) -> f32 {
        let before = self.current;
        self.current = (self.current - amount.max(0.0)).clamp(0.0, self.max);
        before - self.current
    }

    pub fn set(&mut self, value: f32) {
        self.current = if value.is_nan() {
            0.0
        } else {
            value.clamp(0.0, self.max)
        };
    }
}

/// Timed window during which torches can be lit.
#[derive(Debug, Clone, PartialEq)]
pub struct TorchWindow {
    is_open: bool,
    opened_at: Option<f32>,
    remaining: f32,
    pub duration: f32,
    pub cooldown: f32,
    last_ignite_at: Option<f32>,
}

impl TorchWindow {
    pub fn new(duration: f32, cooldown: f32) -> Self {
        Self {
            is_open: false,
            opened_at: None,
            remaining: 0.0,
            duration,
            cooldown,
            last_ignite_at: None,
        }
    }

    pub fn is_open(&self) -> bool {
        self.is_open
    }

    #[cfg(test)]
    pub fn opened_at(&self) -> Option<f32> {
        self.opened_at
    }

    #[cfg(test)]
    pub fn last_ignite_at(&self) -> Option<f32> {
        self.last_ignite_at
    }

    pub fn can_open(&self, now: f32) -> bool {
        if self.is_open {
            return false;
        }
        match self.last_ignite_at {
            Some(last) => now - last >= self.cooldown,
            None => true,
        }
    }

    pub fn open(&mut self, now: f32) -> bool {
        if !self.can_open(now) {
            return false;
        }
        self.is_open = true;
        self.opened_at = Some(now);
        self.remaining = self.duration;
        true
    }

    pub fn close(&mut self) -> bool {
        if !self.is_open {
            return false;
        }
        self.is_open = false;
        self.remaining = 0.0;
        true
    }

    pub fn record_ignition(&mut self, now: f32) {
        self.last_ignite_at = Some(now);
    }

    /// Count down the open window; true when it timed out this tick.
    pub fn tick(&mut self, dt: f32) -> bool {
        if !self.is_open {
            return false;
        }
        self.remaining -= dt;
        if self.remaining <= 0.0 {
            self.close()
        } else {
            false
        }
    }
}

/// Periodic trickle that warms the pool while below max.
#[derive(Debug, Clone, PartialEq)]
pub struct AmbientHeating {
    pub enabled: bool,
    pub rate: f32,
    pub interval: f32,
    elapsed: f32,
}

impl AmbientHeating {
    pub fn new(enabled: bool, rate: f32, interval: f32) -> Self {
        Self {
            enabled,
            rate,
            interval,
            elapsed: 0.0,
        }
    }

    /// Amount due this tick, or zero.
    fn tick(&mut self, dt: f32, pool_full: bool) -> f32 {
        if !self.enabled || pool_full || self.interval <= 0.0 {
            self.elapsed = 0.0;
            return 0.0;
        }
        self.elapsed += dt;
        if self.elapsed >= self.interval {
            self.elapsed -= self.interval;
            self.rate
        } else {
            0.0
        }
    }
}

/// Outcome of a single torch ignition.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IgnitionOutcome {
    pub gained: f32,
    /// Pool crossed from below max to max on this grant
    pub became_full: bool,
    /// Pool is at max after this grant and a clone should be attempted
    pub saturated: bool,
}

/// Result of advancing the economy by one tick.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct EconomyTick {
    pub window_timed_out: bool,
    pub ambient_gained: f32,
    pub became_full: bool,
}

/// Energy pool, torch window and ambient heating owned by one boss.
#[derive(Component, Debug, Clone)]
pub struct EnergyEconomy {
    pub pool: EnergyPool,
    pub window: TorchWindow,
    pub ambient: AmbientHeating,
    pub energy_gain_per_torch: f32,
}

impl EnergyEconomy {
    pub fn new(tuning: &EnergyTuning) -> Self {
        Self {
            pool: EnergyPool::new(tuning.max_energy),
            window: TorchWindow::new(tuning.torch_window_duration, tuning.torch_cooldown),
            ambient: AmbientHeating::new(
                tuning.ambient_heating_enabled,
                tuning.ambient_heating_rate,
                tuning.ambient_heating_interval,
            ),
            energy_gain_per_torch: tuning.energy_gain_per_torch,
        }
    }

    pub fn can_open_torch_window(&self, now: f32) -> bool {
        self.window.can_open(now)
    }

    pub fn open_torch_window(&mut self, now: f32) -> bool {
        self.window.open(now)
    }

    pub fn close_torch_window(&mut self) -> bool {
        self.window.close()
    }

    /// Grant energy for a lit torch. Ignored while the window is closed,
    /// since sources are only listened to during an open window.
    pub fn handle_torch_ignited(&mut self, now: f32) -> Option<IgnitionOutcome> {
        if !self.window.is_open() {
            return None;
        }

        let was_full = self.pool.is_full();
        let gained = self.pool.gain(self.energy_gain_per_torch);
        self.window.record_ignition(now);

        Some(IgnitionOutcome {
            gained,
            became_full: !was_full && self.pool.is_full(),
            saturated: self.pool.is_full(),
        })
    }

    pub fn set_ambient_heating(&mut self, enabled: bool) {
        self.ambient.enabled = enabled;
    }

    pub fn consume_energy(&mut self, amount: f32) -> f32 {
        self.pool.consume(amount)
    }

    pub fn set_energy(&mut self, value: f32) {
        self.pool.set(value);
    }

    /// Advance the window timer and the ambient trickle.
    pub fn tick(&mut self, dt: f32) -> EconomyTick {
        let window_timed_out = self.window.tick(dt);

        let was_full = self.pool.is_full();
        let due = self.ambient.tick(dt, was_full);
        let ambient_gained = self.pool.gain(due);

        EconomyTick {
            window_timed_out,
            ambient_gained,
            became_full: !was_full && self.pool.is_full(),
        }
    }
}
