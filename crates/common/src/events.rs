//! Staged, cancellable event dispatch.
//!
//! Listeners subscribe to one event type and declare the stage they run in.
//! Dispatch walks the stages in [`ListenerOrder`] order; within a stage,
//! listeners run in registration order. Every listener receives the same
//! mutable event, so a later stage may observe (or undo) a cancellation made
//! by an earlier one.

use std::{
    fmt,
    sync::{
        Arc,
        atomic::{AtomicU64, Ordering},
    },
    time::{Duration, Instant},
};

use {
    anyhow::Result,
    serde::{Deserialize, Serialize},
    tracing::{debug, info, warn},
};

// ── ListenerOrder ───────────────────────────────────────────────────────────

/// Dispatch stage. Stages run in declaration order.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum ListenerOrder {
    Early,
    First,
    #[default]
    Default,
    Last,
    /// Observes the final outcome. Should not change it, but may re-assert it.
    Monitor,
}

impl ListenerOrder {
    pub const ALL: [ListenerOrder; 5] = [
        Self::Early,
        Self::First,
        Self::Default,
        Self::Last,
        Self::Monitor,
    ];
}

impl fmt::Display for ListenerOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{self:?}")
    }
}

/// Whether a listener still sees events an earlier stage cancelled.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CancellationPolicy {
    #[default]
    Accept,
    Reject,
}

// ── Cancellable ─────────────────────────────────────────────────────────────

/// An event carrying a shared, mutable cancel flag.
pub trait Cancellable {
    fn is_cancelled(&self) -> bool;
    fn set_cancelled(&mut self, cancelled: bool);
}

// ── Listener trait ──────────────────────────────────────────────────────────

/// A subscriber for events of type `E`, given read access to a context `C`.
pub trait Listener<E, C: ?Sized>: Send + Sync {
    /// A human-readable name, used in logs and stats.
    fn name(&self) -> &str;

    fn order(&self) -> ListenerOrder {
        ListenerOrder::Default
    }

    fn cancelled_events(&self) -> CancellationPolicy {
        CancellationPolicy::Accept
    }

    fn handle(&self, cx: &C, event: &mut E) -> Result<()>;
}

// ── ListenerStats ───────────────────────────────────────────────────────────

/// Per-listener call accounting.
#[derive(Default)]
pub struct ListenerStats {
    pub call_count: AtomicU64,
    pub failure_count: AtomicU64,
    pub skipped_count: AtomicU64,
    pub total_latency_us: AtomicU64,
}

impl ListenerStats {
    fn record(&self, latency: Duration, failed: bool) {
        self.call_count.fetch_add(1, Ordering::Relaxed);
        if failed {
            self.failure_count.fetch_add(1, Ordering::Relaxed);
        }
        self.total_latency_us
            .fetch_add(latency.as_micros() as u64, Ordering::Relaxed);
    }

    pub fn avg_latency(&self) -> Duration {
        let calls = self.call_count.load(Ordering::Relaxed);
        if calls == 0 {
            return Duration::ZERO;
        }
        Duration::from_micros(self.total_latency_us.load(Ordering::Relaxed) / calls)
    }
}

struct ListenerEntry<E, C: ?Sized> {
    listener: Arc<dyn Listener<E, C>>,
    stats: Arc<ListenerStats>,
}

// ── ListenerRegistry ────────────────────────────────────────────────────────

/// Ordered listeners for a single event type.
pub struct ListenerRegistry<E, C: ?Sized> {
    event: &'static str,
    entries: Vec<ListenerEntry<E, C>>,
}

impl<E: Cancellable, C: ?Sized> ListenerRegistry<E, C> {
    pub fn new(event: &'static str) -> Self {
        Self {
            event,
            entries: Vec::new(),
        }
    }

    /// Register a listener. The stable sort keeps registration order within a
    /// stage.
    pub fn register(&mut self, listener: Arc<dyn Listener<E, C>>) {
        info!(
            event = self.event,
            listener = listener.name(),
            order = %listener.order(),
            "listener registered"
        );
        self.entries.push(ListenerEntry {
            listener,
            stats: Arc::new(ListenerStats::default()),
        });
        self.entries.sort_by_key(|e| e.listener.order());
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Listener names in dispatch order.
    pub fn listener_names(&self) -> Vec<&str> {
        self.entries.iter().map(|e| e.listener.name()).collect()
    }

    pub fn listener_stats(&self, name: &str) -> Option<Arc<ListenerStats>> {
        self.entries
            .iter()
            .find(|e| e.listener.name() == name)
            .map(|e| Arc::clone(&e.stats))
    }

    /// Run every listener against `event`, stage by stage.
    ///
    /// A failing listener is logged and skipped; it never aborts dispatch.
    pub fn dispatch(&self, cx: &C, event: &mut E) {
        for entry in &self.entries {
            if event.is_cancelled() && entry.listener.cancelled_events() == CancellationPolicy::Reject
            {
                entry.stats.skipped_count.fetch_add(1, Ordering::Relaxed);
                continue;
            }

            let start = Instant::now();
            let result = entry.listener.handle(cx, event);
            let failed = result.is_err();
            entry.stats.record(start.elapsed(), failed);

            if let Err(e) = result {
                warn!(
                    event = self.event,
                    listener = entry.listener.name(),
                    error = %e,
                    "listener failed"
                );
            }
        }

        debug!(
            event = self.event,
            listeners = self.entries.len(),
            cancelled = event.is_cancelled(),
            "event dispatched"
        );
    }
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;

    #[derive(Default)]
    struct Probe {
        cancelled: bool,
        seen: Vec<String>,
    }

    impl Cancellable for Probe {
        fn is_cancelled(&self) -> bool {
            self.cancelled
        }

        fn set_cancelled(&mut self, cancelled: bool) {
            self.cancelled = cancelled;
        }
    }

    enum Action {
        Record,
        Cancel,
        Uncancel,
        Fail,
    }

    struct TestListener {
        name: String,
        order: ListenerOrder,
        policy: CancellationPolicy,
        action: Action,
    }

    fn listener(name: &str, order: ListenerOrder, action: Action) -> Arc<TestListener> {
        Arc::new(TestListener {
            name: name.into(),
            order,
            policy: CancellationPolicy::Accept,
            action,
        })
    }

    impl Listener<Probe, Mutex<u32>> for TestListener {
        fn name(&self) -> &str {
            &self.name
        }

        fn order(&self) -> ListenerOrder {
            self.order
        }

        fn cancelled_events(&self) -> CancellationPolicy {
            self.policy
        }

        fn handle(&self, cx: &Mutex<u32>, event: &mut Probe) -> Result<()> {
            *cx.lock().unwrap() += 1;
            event.seen.push(self.name.clone());
            match self.action {
                Action::Record => {},
                Action::Cancel => event.set_cancelled(true),
                Action::Uncancel => event.set_cancelled(false),
                Action::Fail => anyhow::bail!("boom"),
            }
            Ok(())
        }
    }

    #[test]
    fn stages_run_in_order_regardless_of_registration() {
        let mut registry = ListenerRegistry::<Probe, Mutex<u32>>::new("probe");
        registry.register(listener("monitor", ListenerOrder::Monitor, Action::Record));
        registry.register(listener("early", ListenerOrder::Early, Action::Record));
        registry.register(listener("default-a", ListenerOrder::Default, Action::Record));
        registry.register(listener("default-b", ListenerOrder::Default, Action::Record));
        registry.register(listener("first", ListenerOrder::First, Action::Record));

        assert_eq!(registry.listener_names(), vec![
            "early",
            "first",
            "default-a",
            "default-b",
            "monitor"
        ]);

        let calls = Mutex::new(0);
        let mut event = Probe::default();
        registry.dispatch(&calls, &mut event);
        assert_eq!(event.seen.len(), 5);
        assert_eq!(*calls.lock().unwrap(), 5);
    }

    #[test]
    fn reject_policy_skips_cancelled_events() {
        let mut registry = ListenerRegistry::<Probe, Mutex<u32>>::new("probe");
        registry.register(listener("gate", ListenerOrder::Early, Action::Cancel));
        registry.register(Arc::new(TestListener {
            name: "notifier".into(),
            order: ListenerOrder::Last,
            policy: CancellationPolicy::Reject,
            action: Action::Record,
        }));
        registry.register(listener("monitor", ListenerOrder::Monitor, Action::Record));

        let mut event = Probe::default();
        registry.dispatch(&Mutex::new(0), &mut event);

        assert!(event.is_cancelled());
        assert_eq!(event.seen, vec!["gate", "monitor"]);
        let stats = registry.listener_stats("notifier").unwrap();
        assert_eq!(stats.skipped_count.load(Ordering::Relaxed), 1);
        assert_eq!(stats.call_count.load(Ordering::Relaxed), 0);
    }

    #[test]
    fn later_stage_can_uncancel() {
        let mut registry = ListenerRegistry::<Probe, Mutex<u32>>::new("probe");
        registry.register(listener("first", ListenerOrder::First, Action::Cancel));
        registry.register(listener("other-plugin", ListenerOrder::Default, Action::Uncancel));

        let mut event = Probe::default();
        registry.dispatch(&Mutex::new(0), &mut event);
        assert!(!event.is_cancelled());
    }

    #[test]
    fn failing_listener_does_not_stop_dispatch() {
        let mut registry = ListenerRegistry::<Probe, Mutex<u32>>::new("probe");
        registry.register(listener("broken", ListenerOrder::Early, Action::Fail));
        registry.register(listener("after", ListenerOrder::Last, Action::Record));

        let mut event = Probe::default();
        registry.dispatch(&Mutex::new(0), &mut event);

        assert_eq!(event.seen, vec!["broken", "after"]);
        let stats = registry.listener_stats("broken").unwrap();
        assert_eq!(stats.failure_count.load(Ordering::Relaxed), 1);
    }

    #[test]
    fn empty_registry_is_a_no_op() {
        let registry = ListenerRegistry::<Probe, Mutex<u32>>::new("probe");
        let mut event = Probe::default();
        registry.dispatch(&Mutex::new(0), &mut event);
        assert!(registry.is_empty());
        assert!(event.seen.is_empty());
    }

    #[test]
    fn stats_average_latency_zero_without_calls() {
        let stats = ListenerStats::default();
        assert_eq!(stats.avg_latency(), Duration::ZERO);
    }
}
