//! Main-thread task queue and tick timers.
//!
//! The owner of a [`Scheduler`] drives it from a single thread by calling
//! [`Scheduler::take_queued`] and [`Scheduler::advance`] once per tick. Any
//! other thread posts work through a [`SyncHandle`].

use {tokio::sync::mpsc, tracing::debug};

/// Ticks per second of wall-clock time.
pub const TICKS_PER_SECOND: u64 = 20;

/// Work to run on the owning thread.
pub type Task<W> = Box<dyn FnOnce(&mut W) + Send>;

/// Posts tasks onto the owning thread's queue. Cheap to clone.
pub struct SyncHandle<W> {
    tx: mpsc::UnboundedSender<Task<W>>,
}

impl<W> Clone for SyncHandle<W> {
    fn clone(&self) -> Self {
        Self {
            tx: self.tx.clone(),
        }
    }
}

impl<W> SyncHandle<W> {
    /// Queue `task` for the next tick. Returns `false` if the scheduler is gone.
    pub fn post(&self, task: impl FnOnce(&mut W) + Send + 'static) -> bool {
        self.tx.send(Box::new(task)).is_ok()
    }
}

struct Timer<W> {
    name: &'static str,
    period: u64,
    remaining: u64,
    run: fn(&mut W),
}

pub struct Scheduler<W> {
    tx: mpsc::UnboundedSender<Task<W>>,
    rx: mpsc::UnboundedReceiver<Task<W>>,
    timers: Vec<Timer<W>>,
    ticks: u64,
}

impl<W> Default for Scheduler<W> {
    fn default() -> Self {
        Self::new()
    }
}

impl<W> Scheduler<W> {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            tx,
            rx,
            timers: Vec::new(),
            ticks: 0,
        }
    }

    pub fn handle(&self) -> SyncHandle<W> {
        SyncHandle {
            tx: self.tx.clone(),
        }
    }

    /// Run `run` every `period` ticks, first after one full period.
    pub fn every(&mut self, name: &'static str, period: u64, run: fn(&mut W)) {
        let period = period.max(1);
        debug!(timer = name, period, "timer scheduled");
        self.timers.push(Timer {
            name,
            period,
            remaining: period,
            run,
        });
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Tasks queued so far. Tasks posted after this call wait for the next one.
    pub fn take_queued(&mut self) -> Vec<Task<W>> {
        let mut tasks = Vec::new();
        while let Ok(task) = self.rx.try_recv() {
            tasks.push(task);
        }
        tasks
    }

    /// Advance one tick and return the timers that came due.
    pub fn advance(&mut self) -> Vec<fn(&mut W)> {
        self.ticks += 1;
        let mut due = Vec::new();
        for timer in &mut self.timers {
            timer.remaining -= 1;
            if timer.remaining == 0 {
                timer.remaining = timer.period;
                debug!(timer = timer.name, tick = self.ticks, "timer fired");
                due.push(timer.run);
            }
        }
        due
    }

    /// Run one tick against `world`, which must not be the owner of `self`.
    #[cfg(test)]
    pub fn tick(&mut self, world: &mut W) {
        for task in self.take_queued() {
            task(world);
        }
        for run in self.advance() {
            run(world);
        }
    }
}
