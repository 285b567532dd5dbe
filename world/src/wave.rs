//! Wave lifecycle state machine: `Idle -> Spawning -> Draining -> Idle`.

use grid_defence_core::{
    EnemyKind, Path, WavePhase, WavePlan, WaveScaling, WaveStartError, WaveStatus,
};

/// Counters and parameters of the current wave.
#[derive(Clone, Debug)]
pub(crate) struct WaveController {
    phase: WavePhase,
    wave: u32,
    total: u32,
    spawned: u32,
    killed: u32,
    reached_end: u32,
    kinds: Vec<EnemyKind>,
    scaling: WaveScaling,
    spawn_path: Option<Path>,
    completed: u32,
}

impl WaveController {
    pub(crate) fn new() -> Self {
        Self {
            phase: WavePhase::Idle,
            wave: 0,
            total: 0,
            spawned: 0,
            killed: 0,
            reached_end: 0,
            kinds: Vec::new(),
            scaling: WaveScaling::IDENTITY,
            spawn_path: None,
            completed: 0,
        }
    }

    pub(crate) fn is_active(&self) -> bool {
        self.phase != WavePhase::Idle
    }

    /// Begins a wave bound to the provided path. Nothing changes on failure.
    pub(crate) fn start(
        &mut self,
        plan: WavePlan,
        path: Option<Path>,
    ) -> Result<(), WaveStartError> {
        if self.is_active() {
            return Err(WaveStartError::AlreadyInProgress);
        }
        let Some(path) = path else {
            return Err(WaveStartError::NoPath);
        };

        self.phase = WavePhase::Spawning;
        self.wave = plan.wave;
        self.total = plan.enemy_count;
        self.spawned = 0;
        self.killed = 0;
        self.reached_end = 0;
        self.kinds = plan.kinds;
        self.scaling = plan.scaling;
        self.spawn_path = Some(path);
        if self.total == 0 {
            self.phase = WavePhase::Draining;
        }
        Ok(())
    }

    /// Path new enemies are bound to while the wave is spawning.
    pub(crate) fn spawn_path(&self) -> Option<&Path> {
        if self.phase == WavePhase::Spawning && self.spawned < self.total {
            self.spawn_path.as_ref()
        } else {
            None
        }
    }

    pub(crate) fn scaling(&self) -> WaveScaling {
        self.scaling
    }

    pub(crate) fn record_spawn(&mut self) {
        if self.phase != WavePhase::Spawning {
            return;
        }
        self.spawned = self.spawned.saturating_add(1);
        if self.spawned >= self.total {
            self.phase = WavePhase::Draining;
        }
    }

    pub(crate) fn record_kill(&mut self) {
        if self.is_active() {
            self.killed = self.killed.saturating_add(1);
        }
    }

    pub(crate) fn record_arrival(&mut self) {
        if self.is_active() {
            self.reached_end = self.reached_end.saturating_add(1);
        }
    }

    /// Returns `(completed, next)` the first time every enemy has been resolved.
    ///
    /// The phase flips to idle before returning, so repeated checks after the
    /// same resolution report nothing.
    pub(crate) fn take_completion(&mut self) -> Option<(u32, u32)> {
        if self.phase != WavePhase::Draining {
            return None;
        }
        if self.killed.saturating_add(self.reached_end) < self.total {
            return None;
        }

        self.phase = WavePhase::Idle;
        self.spawn_path = None;
        self.completed = self.wave;
        Some((self.wave, self.wave.saturating_add(1)))
    }

    /// Cancels the active wave and returns its number.
    pub(crate) fn stop(&mut self) -> Option<u32> {
        if !self.is_active() {
            return None;
        }
        self.phase = WavePhase::Idle;
        self.spawn_path = None;
        Some(self.wave)
    }

    /// Number of the most recently completed wave, zero before the first completion.
    pub(crate) fn completed(&self) -> u32 {
        self.completed
    }

    pub(crate) fn status(&self) -> WaveStatus {
        WaveStatus {
            wave: self.wave,
            phase: self.phase,
            total: self.total,
            spawned: self.spawned,
            killed: self.killed,
            reached_end: self.reached_end,
            kinds: self.kinds.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use grid_defence_core::CellCoord;

    fn plan(wave: u32, enemy_count: u32) -> WavePlan {
        WavePlan {
            wave,
            enemy_count,
            kinds: vec![EnemyKind::Normal],
            scaling: WaveScaling::IDENTITY,
        }
    }

    fn path() -> Option<Path> {
        Some(Path::new(vec![CellCoord::new(0, 0), CellCoord::new(1, 1)]))
    }

    #[test]
    fn start_requires_a_path_and_an_idle_controller() {
        let mut controller = WaveController::new();

        assert_eq!(
            controller.start(plan(1, 3), None),
            Err(WaveStartError::NoPath)
        );
        assert_eq!(controller.status().phase, WavePhase::Idle);

        assert_eq!(controller.start(plan(1, 3), path()), Ok(()));
        assert_eq!(
            controller.start(plan(2, 3), path()),
            Err(WaveStartError::AlreadyInProgress)
        );
        assert_eq!(controller.status().wave, 1);
    }

    #[test]
    fn spawning_drains_then_completes_once() {
        let mut controller = WaveController::new();
        controller.start(plan(4, 2), path()).expect("wave starts");

        controller.record_spawn();
        assert_eq!(controller.status().phase, WavePhase::Spawning);
        controller.record_kill();
        assert_eq!(controller.take_completion(), None);

        controller.record_spawn();
        assert_eq!(controller.status().phase, WavePhase::Draining);
        assert!(controller.spawn_path().is_none());
        assert_eq!(controller.take_completion(), None);

        controller.record_arrival();
        assert_eq!(controller.take_completion(), Some((4, 5)));
        assert_eq!(controller.take_completion(), None);
        assert_eq!(controller.completed(), 4);
        assert_eq!(controller.status().phase, WavePhase::Idle);
    }

    #[test]
    fn resolutions_that_keep_pace_complete_on_last_spawn() {
        let mut controller = WaveController::new();
        controller.start(plan(1, 1), path()).expect("wave starts");

        controller.record_spawn();
        controller.record_kill();

        assert_eq!(controller.take_completion(), Some((1, 2)));
    }

    #[test]
    fn empty_waves_complete_immediately() {
        let mut controller = WaveController::new();
        controller.start(plan(3, 0), path()).expect("wave starts");

        assert!(controller.spawn_path().is_none());
        assert_eq!(controller.take_completion(), Some((3, 4)));
    }

    #[test]
    fn stopping_cancels_without_completion() {
        let mut controller = WaveController::new();
        controller.start(plan(2, 5), path()).expect("wave starts");
        controller.record_spawn();

        assert_eq!(controller.stop(), Some(2));
        assert_eq!(controller.stop(), None);
        assert_eq!(controller.take_completion(), None);
        assert_eq!(controller.completed(), 0);
    }
}
