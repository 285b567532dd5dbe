//! Money and lives bookkeeping driven by world events.

use grid_defence_core::{EnemyKind, Event};

use crate::{config::EconomyConfig, BuildError};

/// Money awarded for killing an enemy of `kind` during `wave`.
///
/// The kind's base reward grows by 10% per wave up to wave 5, by 5% per wave
/// up to wave 15 and by 2% per wave afterwards. Fractions are dropped.
#[must_use]
pub fn kill_reward(kind: EnemyKind, wave: u32) -> u32 {
    let percent = match wave {
        0..=5 => 100 + 10 * wave.saturating_sub(1),
        6..=15 => 150 + 5 * (wave - 5),
        _ => 200u32.saturating_add(2u32.saturating_mul(wave - 15)),
    };
    kind.stats().reward.saturating_mul(percent) / 100
}

/// Money awarded for completing `wave`.
#[must_use]
pub fn wave_bonus(wave: u32) -> u32 {
    match wave {
        0..=5 => 40 + 10 * wave,
        6..=15 => 90 + 10 * (wave - 5),
        _ => 190u32.saturating_add(5u32.saturating_mul(wave - 15)),
    }
}

/// Player resources of a session.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Ledger {
    money: u32,
    lives: u32,
}

impl Ledger {
    /// Creates a ledger holding the configured starting resources.
    #[must_use]
    pub fn new(config: &EconomyConfig) -> Self {
        Self {
            money: config.starting_money,
            lives: config.starting_lives,
        }
    }

    /// Money currently available.
    #[must_use]
    pub fn money(&self) -> u32 {
        self.money
    }

    /// Lives left before the game is lost.
    #[must_use]
    pub fn lives(&self) -> u32 {
        self.lives
    }

    /// Reports whether every life has been lost.
    #[must_use]
    pub fn is_depleted(&self) -> bool {
        self.lives == 0
    }

    pub(crate) fn ensure_affordable(&self, cost: u32) -> Result<(), BuildError> {
        if self.money < cost {
            return Err(BuildError::InsufficientFunds {
                cost,
                available: self.money,
            });
        }
        Ok(())
    }

    pub(crate) fn spend(&mut self, cost: u32) {
        self.money = self.money.saturating_sub(cost);
    }

    /// Credits rewards and debits lives for a single event.
    ///
    /// `wave` is the wave the event belongs to. Events are ignored once the
    /// ledger is depleted.
    pub(crate) fn record(&mut self, event: &Event, wave: u32) {
        if self.is_depleted() {
            return;
        }
        match event {
            Event::EnemyKilled { kind, .. } => {
                self.money = self.money.saturating_add(kill_reward(*kind, wave));
            }
            Event::EnemyReachedEnd { .. } => self.lives = self.lives.saturating_sub(1),
            Event::WaveCompleted { wave, .. } => {
                self.money = self.money.saturating_add(wave_bonus(*wave));
            }
            _ => {}
        }
    }
}
