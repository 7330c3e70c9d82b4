//! Dual-rate frame pipeline.
//!
//! The host loop calls [`FrameScheduler::tick`] once per presented frame. The
//! scheduler runs zero or more fixed-size simulation steps (the "synced"
//! step) and then exactly one render step (the "unsynced" step).

/// The two callbacks driven by the scheduler.
///
/// Both run on the UI thread. A synced step that internally fans out to a
/// worker pool must still return only once the step is complete.
pub trait FrameSteps {
    /// Advances the simulation by one fixed step.
    fn synced_step(&mut self) -> anyhow::Result<()>;

    /// Renders one frame. `dt` is the elapsed time handed to `tick`.
    fn unsynced_step(&mut self, dt: f32) -> anyhow::Result<()>;
}

/// Which step a fault came from.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum StepPhase {
    Synced,
    Unsynced,
}

/// Receives step faults. Faults never stop the render step from running.
pub trait ErrorSink {
    fn report(&mut self, phase: StepPhase, err: anyhow::Error);
}

impl<F> ErrorSink for F
where
    F: FnMut(StepPhase, anyhow::Error),
{
    fn report(&mut self, phase: StepPhase, err: anyhow::Error) {
        self(phase, err)
    }
}

/// How many synced steps a tick runs while the scheduler is running.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum StepPolicy {
    /// Exactly one synced step per tick.
    OncePerTick,
    /// Accumulate elapsed time and run one step per whole `step_seconds`,
    /// at most `max_steps_per_tick` per tick.
    FixedRate {
        step_seconds: f32,
        max_steps_per_tick: u32,
    },
}

impl Default for StepPolicy {
    fn default() -> Self {
        StepPolicy::OncePerTick
    }
}

/// Scheduler configuration.
#[derive(Debug, Clone, Default)]
pub struct SchedulerConfig {
    pub step_policy: StepPolicy,
    /// Whether the simulation starts running. Defaults to paused.
    pub start_running: bool,
}

/// What a single `tick` did.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq)]
pub struct TickReport {
    /// Synced steps that were invoked (including a failing one).
    pub synced_steps: u32,
    pub synced_failed: bool,
    pub unsynced_failed: bool,
}

/// Drives fixed-rate simulation steps and variable-rate render steps.
///
/// Holds no simulation state: only the running flag and the step policy
/// (plus the time accumulator for [`StepPolicy::FixedRate`]).
#[derive(Debug, Clone)]
pub struct FrameScheduler {
    policy: StepPolicy,
    running: bool,
    accumulator: f32,
}

impl FrameScheduler {
    pub fn new(config: SchedulerConfig) -> Self {
        Self {
            policy: config.step_policy,
            running: config.start_running,
            accumulator: 0.0,
        }
    }

    #[inline]
    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn set_running(&mut self, running: bool) {
        if self.running != running {
            log::info!("simulation {}", if running { "running" } else { "paused" });
        }
        self.running = running;
        if !running {
            self.accumulator = 0.0;
        }
    }

    /// Flips between running and paused; returns the new state.
    pub fn toggle_running(&mut self) -> bool {
        self.set_running(!self.running);
        self.running
    }

    #[inline]
    pub fn policy(&self) -> StepPolicy {
        self.policy
    }

    /// Runs the synced steps due for this tick, then the unsynced step once.
    ///
    /// A failing synced step ends the synced phase for this tick; the fault
    /// goes to `sink` and the render step still runs.
    pub fn tick<S, E>(&mut self, elapsed: f32, steps: &mut S, sink: &mut E) -> TickReport
    where
        S: FrameSteps + ?Sized,
        E: ErrorSink + ?Sized,
    {
        let mut report = TickReport::default();
        let due = self.steps_due(elapsed);

        for _ in 0..due {
            report.synced_steps += 1;
            if let Err(err) = steps.synced_step() {
                log::error!("synced step failed: {err:#}");
                report.synced_failed = true;
                sink.report(StepPhase::Synced, err);
                break;
            }
        }

        if let Err(err) = steps.unsynced_step(elapsed) {
            log::error!("unsynced step failed: {err:#}");
            report.unsynced_failed = true;
            sink.report(StepPhase::Unsynced, err);
        }

        report
    }

    fn steps_due(&mut self, elapsed: f32) -> u32 {
        if !self.running {
            return 0;
        }

        match self.policy {
            StepPolicy::OncePerTick => 1,
            StepPolicy::FixedRate { step_seconds, max_steps_per_tick } => {
                if !(step_seconds > 0.0) {
                    return 1;
                }
                if elapsed.is_finite() && elapsed > 0.0 {
                    self.accumulator += elapsed;
                }

                let whole = (self.accumulator / step_seconds).floor();
                let due = (whole as u32).min(max_steps_per_tick);
                self.accumulator -= due as f32 * step_seconds;

                if due == max_steps_per_tick && self.accumulator >= step_seconds {
                    log::debug!(
                        "dropping {:.3}s of simulation backlog",
                        self.accumulator
                    );
                    self.accumulator %= step_seconds;
                }
                due
            }
        }
    }
}

impl Default for FrameScheduler {
    fn default() -> Self {
        Self::new(SchedulerConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Counter {
        synced: u32,
        unsynced: u32,
        fail_synced: bool,
        fail_unsynced: bool,
        last_dt: f32,
    }

    impl FrameSteps for Counter {
        fn synced_step(&mut self) -> anyhow::Result<()> {
            self.synced += 1;
            if self.fail_synced {
                anyhow::bail!("simulation fault");
            }
            Ok(())
        }

        fn unsynced_step(&mut self, dt: f32) -> anyhow::Result<()> {
            self.unsynced += 1;
            self.last_dt = dt;
            if self.fail_unsynced {
                anyhow::bail!("render fault");
            }
            Ok(())
        }
    }

    fn no_faults() -> impl FnMut(StepPhase, anyhow::Error) {
        |phase, err| panic!("unexpected fault in {phase:?}: {err}")
    }

    #[test]
    fn paused_tick_renders_only() {
        let mut sched = FrameScheduler::default();
        let mut steps = Counter::default();
        sched.tick(0.016, &mut steps, &mut no_faults());
        assert_eq!(steps.synced, 0);
        assert_eq!(steps.unsynced, 1);
    }

    #[test]
    fn running_tick_steps_exactly_once() {
        let mut sched = FrameScheduler::default();
        sched.set_running(true);
        let mut steps = Counter::default();
        let report = sched.tick(0.016, &mut steps, &mut no_faults());
        assert_eq!(steps.synced, 1);
        assert_eq!(steps.unsynced, 1);
        assert_eq!(report.synced_steps, 1);
    }

    #[test]
    fn unsynced_step_receives_elapsed() {
        let mut sched = FrameScheduler::default();
        let mut steps = Counter::default();
        sched.tick(0.25, &mut steps, &mut no_faults());
        assert_eq!(steps.last_dt, 0.25);
    }

    #[test]
    fn toggle_flips_state() {
        let mut sched = FrameScheduler::default();
        assert!(sched.toggle_running());
        assert!(!sched.toggle_running());
    }

    #[test]
    fn synced_fault_is_reported_and_render_still_runs() {
        let mut sched = FrameScheduler::new(SchedulerConfig {
            start_running: true,
            ..SchedulerConfig::default()
        });
        let mut steps = Counter { fail_synced: true, ..Counter::default() };
        let mut faults = Vec::new();
        let report = sched.tick(0.016, &mut steps, &mut |phase, err: anyhow::Error| {
            faults.push((phase, err.to_string()));
        });
        assert_eq!(steps.unsynced, 1);
        assert!(report.synced_failed);
        assert!(!report.unsynced_failed);
        assert_eq!(faults, vec![(StepPhase::Synced, "simulation fault".to_string())]);
    }

    #[test]
    fn unsynced_fault_is_reported() {
        let mut sched = FrameScheduler::default();
        let mut steps = Counter { fail_unsynced: true, ..Counter::default() };
        let mut phases = Vec::new();
        sched.tick(0.016, &mut steps, &mut |phase, _err: anyhow::Error| phases.push(phase));
        assert_eq!(phases, vec![StepPhase::Unsynced]);
    }

    #[test]
    fn fixed_rate_accumulates_partial_steps() {
        let mut sched = FrameScheduler::new(SchedulerConfig {
            step_policy: StepPolicy::FixedRate { step_seconds: 0.1, max_steps_per_tick: 5 },
            start_running: true,
        });
        let mut steps = Counter::default();
        sched.tick(0.06, &mut steps, &mut no_faults());
        assert_eq!(steps.synced, 0);
        sched.tick(0.06, &mut steps, &mut no_faults());
        assert_eq!(steps.synced, 1);
        assert_eq!(steps.unsynced, 2);
    }

    #[test]
    fn fixed_rate_caps_steps_per_tick() {
        let mut sched = FrameScheduler::new(SchedulerConfig {
            step_policy: StepPolicy::FixedRate { step_seconds: 0.01, max_steps_per_tick: 3 },
            start_running: true,
        });
        let mut steps = Counter::default();
        let report = sched.tick(1.0, &mut steps, &mut no_faults());
        assert_eq!(report.synced_steps, 3);
        // The backlog was dropped; a small tick does not replay it.
        let report = sched.tick(0.001, &mut steps, &mut no_faults());
        assert!(report.synced_steps <= 1);
    }

    #[test]
    fn pausing_discards_accumulated_time() {
        let mut sched = FrameScheduler::new(SchedulerConfig {
            step_policy: StepPolicy::FixedRate { step_seconds: 0.1, max_steps_per_tick: 5 },
            start_running: true,
        });
        let mut steps = Counter::default();
        sched.tick(0.09, &mut steps, &mut no_faults());
        sched.set_running(false);
        sched.set_running(true);
        sched.tick(0.02, &mut steps, &mut no_faults());
        assert_eq!(steps.synced, 0);
    }
}
