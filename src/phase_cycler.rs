use std::{
    mem,
    sync::{Arc, Mutex, MutexGuard, PoisonError},
    time::{Duration, Instant},
};

use tracing::{debug, info};

use crate::{
    config::CyclerConfig,
    cycle_duration::{CycleBounds, CycleDuration},
    error::{ConfigError, CyclerError},
    phase::Phase,
    system::{MessageQueue, RecvError, StopSignal, Worker},
};

#[derive(Debug)]
enum Lifecycle {
    Idle,
    Running(Worker),
    ShutDown,
}

/// A traffic light that flips between red and green on a randomized timer.
///
/// Every phase change is published on an internal [`MessageQueue`]. Each published change is
/// consumed by exactly one waiter, so when several threads wait concurrently only one of them
/// observes a given change.
#[derive(Debug)]
pub struct PhaseCycler {
    phase: Arc<Mutex<Phase>>,
    queue: Arc<MessageQueue<Phase>>,
    config: CyclerConfig,
    bounds: CycleBounds,
    lifecycle: Mutex<Lifecycle>,
}

impl Default for PhaseCycler {
    fn default() -> Self {
        Self::new()
    }
}

impl PhaseCycler {
    /// A red light cycling every 4 to 6 seconds
    pub fn new() -> Self {
        Self::from_valid_config(CyclerConfig::default(), CycleBounds::default())
    }

    pub fn with_config(config: CyclerConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let bounds = config.bounds()?;
        Ok(Self::from_valid_config(config, bounds))
    }

    fn from_valid_config(config: CyclerConfig, bounds: CycleBounds) -> Self {
        Self {
            phase: Arc::new(Mutex::new(Phase::default())),
            queue: MessageQueue::new(),
            config,
            bounds,
            lifecycle: Mutex::new(Lifecycle::Idle),
        }
    }

    /// The queue phase changes are published on
    pub fn queue(&self) -> &Arc<MessageQueue<Phase>> {
        &self.queue
    }

    pub fn current_phase(&self) -> Phase {
        *lock_phase(&self.phase)
    }

    /// Overwrites the phase without publishing a change
    pub fn set_current_phase(&self, phase: Phase) {
        *lock_phase(&self.phase) = phase;
    }

    /// Blocks until `target` is published, discarding every other phase received meanwhile.
    ///
    /// Returns [`RecvError::Closed`] once the cycler has been shut down.
    pub fn wait_for_phase(&self, target: Phase) -> Result<(), RecvError> {
        loop {
            if self.queue.recv()? == target {
                return Ok(());
            }
        }
    }

    /// Like [`wait_for_phase`](Self::wait_for_phase), but gives up with [`RecvError::Timeout`]
    /// once `timeout` has elapsed in total
    pub fn wait_for_phase_timeout(&self, target: Phase, timeout: Duration) -> Result<(), RecvError> {
        let Some(deadline) = Instant::now().checked_add(timeout) else {
            return self.wait_for_phase(target);
        };
        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if self.queue.recv_timeout(remaining)? == target {
                return Ok(());
            }
        }
    }

    /// Starts cycling on a background thread and returns immediately
    pub fn simulate(&self) -> Result<(), CyclerError> {
        let mut lifecycle = self.lock_lifecycle();
        match *lifecycle {
            Lifecycle::Running(_) => return Err(CyclerError::AlreadyRunning),
            Lifecycle::ShutDown => return Err(CyclerError::ShutDown),
            Lifecycle::Idle => {}
        }

        let bounds = self.bounds;
        let durations = CycleDuration::new(bounds, self.config.seed);
        let poll_interval = self.config.poll_interval();
        let phase = self.phase.clone();
        let queue = self.queue.clone();

        let worker = Worker::spawn("phase-cycler", move |stop| {
            cycle_through_phases(phase, queue, durations, poll_interval, stop)
        })?;
        info!(
            min_cycle_seconds = bounds.low_seconds(),
            max_cycle_seconds = bounds.high_seconds(),
            "started phase cycler"
        );
        *lifecycle = Lifecycle::Running(worker);
        Ok(())
    }

    /// `false` once the cycling thread has exited, including after a panic
    pub fn is_running(&self) -> bool {
        matches!(&*self.lock_lifecycle(), Lifecycle::Running(worker) if !worker.is_finished())
    }

    /// Stops and joins the cycling thread, then closes the queue so blocked waiters return.
    /// Calling it again does nothing.
    pub fn shutdown(&self) {
        let previous = mem::replace(&mut *self.lock_lifecycle(), Lifecycle::ShutDown);
        match previous {
            Lifecycle::Running(worker) => {
                worker.join();
                info!(phase = %self.current_phase(), "stopped phase cycler");
            }
            Lifecycle::Idle => {}
            Lifecycle::ShutDown => return,
        }
        self.queue.close();
    }

    fn lock_lifecycle(&self) -> MutexGuard<'_, Lifecycle> {
        self.lifecycle.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Drop for PhaseCycler {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn lock_phase(phase: &Mutex<Phase>) -> MutexGuard<'_, Phase> {
    phase.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Closes the queue when the cycling loop exits, unwinding included, so waiters see `Closed`
struct CloseOnExit(Arc<MessageQueue<Phase>>);

impl Drop for CloseOnExit {
    fn drop(&mut self) {
        self.0.close();
    }
}

fn cycle_through_phases(
    phase: Arc<Mutex<Phase>>,
    queue: Arc<MessageQueue<Phase>>,
    mut durations: CycleDuration,
    poll_interval: Duration,
    stop: StopSignal,
) {
    let _closer = CloseOnExit(queue.clone());
    let mut start = Instant::now();
    let mut cycle = durations.next_duration();

    while !stop.wait_timeout(poll_interval) {
        if start.elapsed() < cycle {
            continue;
        }

        let next = {
            let mut current = lock_phase(&phase);
            *current = current.toggled();
            *current
        };
        queue.send(next);

        cycle = durations.next_duration();
        start = Instant::now();
        debug!(phase = %next, next_cycle_ms = cycle.as_millis() as u64, "toggled phase");
    }
    debug!("cycling loop stopped");
}
