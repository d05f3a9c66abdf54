// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Tracker owning every in-flight delayed action.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use chrono::Utc;
use parking_lot::RwLock;
use tokio::runtime::Handle;
use tokio::sync::broadcast;
use tokio::task::AbortHandle;

use crate::config::TrackerConfig;
use crate::error::{Error, UpstreamError};
use crate::event::{CancelReason, TrackerEvent};
use crate::gateway::ActuatorGateway;
use crate::types::{Action, Delay, DeviceMac, PrinterEvent};

use super::{PendingAction, PendingId};

/// Tracker entry: the public snapshot plus bookkeeping.
#[derive(Debug)]
struct PendingEntry {
    action: PendingAction,
    /// Creation order, to break ties between equal timestamps.
    seq: u64,
    /// Handle to the timer task, aborted on cancellation.
    abort: AbortHandle,
}

/// State shared between the tracker handle and its timer tasks.
#[derive(Debug)]
struct TrackerInner<G> {
    entries: RwLock<HashMap<PendingId, PendingEntry>>,
    gateway: G,
    /// Lifecycle notifications. Sending without receivers is a no-op.
    notifications: broadcast::Sender<TrackerEvent>,
    next_seq: AtomicU64,
    max_pending: usize,
}

impl<G> TrackerInner<G> {
    fn notify(&self, event: TrackerEvent) {
        // Err only means nobody is subscribed
        let _ = self.notifications.send(event);
    }
}

/// Manages the lifetime of delayed actions and their cancellation.
///
/// Each [`schedule`](Self::schedule) call spawns one tokio task that sleeps
/// for the delay and then fires the action through the gateway. The task
/// and [`cancel`](Self::cancel) race to remove the entry from the tracker's
/// map under its write lock; whichever removes it decides the outcome. A
/// pending action therefore either fires once or is dropped once, never
/// both and never neither.
///
/// The tracker is a cheap handle: clones share the same state.
///
/// # Examples
///
/// ```
/// use printplug_lib::gateway::DryRunGateway;
/// use printplug_lib::pending::PendingActionTracker;
/// use printplug_lib::types::{Action, Delay, DeviceMac, PrinterEvent};
///
/// #[tokio::main]
/// async fn main() -> printplug_lib::Result<()> {
///     let tracker = PendingActionTracker::new(DryRunGateway);
///
///     let id = tracker.schedule(
///         DeviceMac::new("AA:BB")?,
///         PrinterEvent::PrintDone,
///         Action::TurnOff,
///         Delay::from_secs(300),
///         false,
///     )?;
///     assert_eq!(tracker.list_pending().len(), 1);
///
///     assert!(tracker.cancel(id));
///     assert!(tracker.list_pending().is_empty());
///     Ok(())
/// }
/// ```
#[derive(Debug)]
pub struct PendingActionTracker<G> {
    inner: Arc<TrackerInner<G>>,
}

impl<G: ActuatorGateway> PendingActionTracker<G> {
    /// Creates a tracker with the default configuration.
    #[must_use]
    pub fn new(gateway: G) -> Self {
        Self::with_config(gateway, &TrackerConfig::default())
    }

    /// Creates a tracker with a custom configuration.
    #[must_use]
    pub fn with_config(gateway: G, config: &TrackerConfig) -> Self {
        let (notifications, _) = broadcast::channel(config.event_capacity.max(1));
        Self {
            inner: Arc::new(TrackerInner {
                entries: RwLock::new(HashMap::new()),
                gateway,
                notifications,
                next_seq: AtomicU64::new(0),
                max_pending: config.max_pending,
            }),
        }
    }

    /// Returns the gateway pending actions fire through.
    #[must_use]
    pub fn gateway(&self) -> &G {
        &self.inner.gateway
    }

    /// Subscribes to lifecycle notifications of pending actions.
    ///
    /// The receiver sees every notification published after this call. A
    /// receiver that falls more than `event_capacity` notifications behind
    /// gets `RecvError::Lagged` and skips the oldest; the tracker itself is
    /// never slowed down by slow receivers.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<TrackerEvent> {
        self.inner.notifications.subscribe()
    }

    // =========================================================================
    // Scheduling
    // =========================================================================

    /// Schedules `action` on `device` to fire after `delay`.
    ///
    /// Every call creates an independent pending action, even for a triple
    /// that already has one pending. `cancel_on_conflict` is the policy
    /// snapshot taken from the registration at trigger time.
    ///
    /// Must be called from within a tokio runtime.
    ///
    /// # Errors
    ///
    /// Returns `Error::CapacityExhausted` if the tracker already holds its
    /// maximum number of pending actions, or `Error::UpstreamUnavailable`
    /// if no tokio runtime is running.
    pub fn schedule(
        &self,
        device: DeviceMac,
        event: PrinterEvent,
        action: Action,
        delay: Delay,
        cancel_on_conflict: bool,
    ) -> Result<PendingId, Error> {
        let runtime = Handle::try_current().map_err(|_| UpstreamError::NoRuntime)?;
        let id = PendingId::new();

        let mut entries = self.inner.entries.write();
        if entries.len() >= self.inner.max_pending {
            drop(entries);
            tracing::warn!(
                device_mac = %device,
                event = %event,
                action = %action,
                limit = self.inner.max_pending,
                "Too many pending actions, not scheduling"
            );
            return Err(Error::CapacityExhausted {
                limit: self.inner.max_pending,
            });
        }

        let pending = PendingAction::new(
            id,
            device,
            event,
            action,
            Utc::now(),
            delay,
            cancel_on_conflict,
        );

        // The entry goes in before the write lock is released, so the timer
        // task cannot look for it too early even with a zero delay.
        let task = runtime.spawn(run_pending(
            Arc::clone(&self.inner),
            id,
            delay.as_duration(),
        ));
        let seq = self.inner.next_seq.fetch_add(1, Ordering::Relaxed);
        entries.insert(
            id,
            PendingEntry {
                action: pending.clone(),
                seq,
                abort: task.abort_handle(),
            },
        );

        tracing::debug!(
            pending_id = %id,
            device_mac = %pending.device(),
            event = %event,
            action = %action,
            delay = %delay,
            "Scheduled pending action"
        );
        self.inner.notify(TrackerEvent::scheduled(pending));
        drop(entries);

        Ok(id)
    }

    // =========================================================================
    // Cancellation
    // =========================================================================

    /// Cancels a pending action.
    ///
    /// The entry is removed at once and its timer task aborted without
    /// waiting for it. Returns `true` if the action was still pending;
    /// unknown ids (already fired or already cancelled) are a no-op.
    pub fn cancel(&self, id: PendingId) -> bool {
        let removed = self.inner.entries.write().remove(&id);
        match removed {
            Some(entry) => {
                self.finish_cancelled(entry, CancelReason::Requested);
                true
            }
            None => {
                tracing::trace!(pending_id = %id, "Nothing to cancel");
                false
            }
        }
    }

    /// Cancels the pending actions that conflict with `action` being
    /// scheduled on `device` for `event`.
    ///
    /// A pending action conflicts when it targets the same device, applies
    /// the opposite action, was triggered by a different event, and was
    /// created with `cancel_on_conflict` set. Returns the cancelled ids in
    /// creation order.
    pub fn cancel_conflicting(
        &self,
        device: &DeviceMac,
        action: Action,
        event: PrinterEvent,
    ) -> Vec<PendingId> {
        let competing = action.opposite();

        let mut removed: Vec<PendingEntry> = {
            let mut entries = self.inner.entries.write();
            let ids: Vec<PendingId> = entries
                .values()
                .filter(|entry| {
                    let p = &entry.action;
                    p.cancel_on_conflict()
                        && p.action() == competing
                        && p.event() != event
                        && p.device() == device
                })
                .map(|entry| entry.action.id())
                .collect();
            ids.iter().filter_map(|id| entries.remove(id)).collect()
        };
        removed.sort_by_key(|entry| entry.seq);

        removed
            .into_iter()
            .map(|entry| {
                let id = entry.action.id();
                tracing::debug!(
                    pending_id = %id,
                    device_mac = %device,
                    cancelled_action = %competing,
                    competing_event = %event,
                    "Cancelling pending action on conflict"
                );
                self.finish_cancelled(entry, CancelReason::Conflict);
                id
            })
            .collect()
    }

    /// Cancels every pending action. Returns how many were cancelled.
    pub fn cancel_all(&self) -> usize {
        let mut drained: Vec<PendingEntry> = self
            .inner
            .entries
            .write()
            .drain()
            .map(|(_, entry)| entry)
            .collect();
        drained.sort_by_key(|entry| entry.seq);

        let count = drained.len();
        for entry in drained {
            self.finish_cancelled(entry, CancelReason::Shutdown);
        }
        if count > 0 {
            tracing::debug!(count, "Cancelled all pending actions");
        }
        count
    }

    fn finish_cancelled(&self, entry: PendingEntry, reason: CancelReason) {
        entry.abort.abort();
        if reason == CancelReason::Requested {
            tracing::debug!(
                pending_id = %entry.action.id(),
                device_mac = %entry.action.device(),
                action = %entry.action.action(),
                "Cancelled pending action"
            );
        }
        self.inner.notify(TrackerEvent::cancelled(entry.action, reason));
    }

    // =========================================================================
    // Queries
    // =========================================================================

    /// Returns a snapshot of all pending actions, oldest first.
    ///
    /// Each call copies the current state under a short read lock and
    /// returns an independent snapshot.
    #[must_use]
    pub fn list_pending(&self) -> PendingSnapshot {
        let mut ordered: Vec<(u64, PendingAction)> = self
            .inner
            .entries
            .read()
            .values()
            .map(|entry| (entry.seq, entry.action.clone()))
            .collect();

        ordered.sort_by(|(seq_a, a), (seq_b, b)| {
            a.scheduled_at()
                .cmp(&b.scheduled_at())
                .then(seq_a.cmp(seq_b))
        });

        PendingSnapshot {
            actions: ordered.into_iter().map(|(_, action)| action).collect(),
        }
    }

    /// Returns the pending actions targeting `device`, oldest first.
    #[must_use]
    pub fn pending_for(&self, device: &DeviceMac) -> Vec<PendingAction> {
        self.list_pending()
            .into_iter()
            .filter(|p| p.device() == device)
            .collect()
    }

    /// Returns the pending action with the given id, if still pending.
    #[must_use]
    pub fn get(&self, id: PendingId) -> Option<PendingAction> {
        self.inner
            .entries
            .read()
            .get(&id)
            .map(|entry| entry.action.clone())
    }

    /// Returns the number of pending actions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.entries.read().len()
    }

    /// Returns true if nothing is pending.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.entries.read().is_empty()
    }
}

impl<G> Clone for PendingActionTracker<G> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

/// Body of the timer task spawned for each pending action.
async fn run_pending<G: ActuatorGateway>(
    inner: Arc<TrackerInner<G>>,
    id: PendingId,
    delay: Duration,
) {
    tokio::time::sleep(delay).await;

    let removed = inner.entries.write().remove(&id);
    let Some(entry) = removed else {
        tracing::trace!(pending_id = %id, "Pending action already cancelled");
        return;
    };

    let pending = entry.action;
    match inner.gateway.actuate(pending.device(), pending.action()).await {
        Ok(()) => {
            tracing::info!(
                pending_id = %id,
                device_mac = %pending.device(),
                event = %pending.event(),
                action = %pending.action(),
                "Pending action fired"
            );
            inner.notify(TrackerEvent::fired(pending));
        }
        Err(e) => {
            tracing::warn!(
                pending_id = %id,
                device_mac = %pending.device(),
                action = %pending.action(),
                error = %e,
                "Pending action failed, dropping it"
            );
            inner.notify(TrackerEvent::fire_failed(pending, e.to_string()));
        }
    }
}

/// Point-in-time list of pending actions, ordered oldest first.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PendingSnapshot {
    actions: Vec<PendingAction>,
}

impl PendingSnapshot {
    /// Iterates over the pending actions.
    pub fn iter(&self) -> std::slice::Iter<'_, PendingAction> {
        self.actions.iter()
    }

    /// Returns the number of pending actions in the snapshot.
    #[must_use]
    pub fn len(&self) -> usize {
        self.actions.len()
    }

    /// Returns true if the snapshot is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    /// Returns true if the snapshot holds the given id.
    #[must_use]
    pub fn contains(&self, id: PendingId) -> bool {
        self.actions.iter().any(|p| p.id() == id)
    }
}

impl IntoIterator for PendingSnapshot {
    type Item = PendingAction;
    type IntoIter = std::vec::IntoIter<PendingAction>;

    fn into_iter(self) -> Self::IntoIter {
        self.actions.into_iter()
    }
}

impl<'a> IntoIterator for &'a PendingSnapshot {
    type Item = &'a PendingAction;
    type IntoIter = std::slice::Iter<'a, PendingAction>;

    fn into_iter(self) -> Self::IntoIter {
        self.actions.iter()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::AtomicBool;

    use parking_lot::Mutex;

    use super::*;
    use crate::error::GatewayError;

    #[derive(Default)]
    struct RecordingGateway {
        calls: Mutex<Vec<(DeviceMac, Action)>>,
        failing: AtomicBool,
    }

    impl RecordingGateway {
        fn calls(&self) -> Vec<(DeviceMac, Action)> {
            self.calls.lock().clone()
        }
    }

    impl ActuatorGateway for RecordingGateway {
        async fn actuate(&self, device: &DeviceMac, action: Action) -> Result<(), GatewayError> {
            self.calls.lock().push((device.clone(), action));
            if self.failing.load(Ordering::SeqCst) {
                Err(GatewayError::Unreachable("offline".to_string()))
            } else {
                Ok(())
            }
        }
    }

    fn mac(s: &str) -> DeviceMac {
        DeviceMac::new(s).unwrap()
    }

    fn tracker() -> (Arc<RecordingGateway>, PendingActionTracker<Arc<RecordingGateway>>) {
        let gateway = Arc::new(RecordingGateway::default());
        let tracker = PendingActionTracker::new(Arc::clone(&gateway));
        (gateway, tracker)
    }

    async fn advance(secs: u64) {
        tokio::time::sleep(Duration::from_secs(secs)).await;
    }

    #[tokio::test(start_paused = true)]
    async fn zero_delay_fires_once_and_clears() {
        let (gateway, tracker) = tracker();

        tracker
            .schedule(mac("AA:BB"), PrinterEvent::PrintFailed, Action::TurnOff, Delay::ZERO, false)
            .unwrap();
        advance(1).await;

        assert_eq!(gateway.calls(), vec![(mac("AA:BB"), Action::TurnOff)]);
        assert!(tracker.list_pending().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn fires_only_after_delay() {
        let (gateway, tracker) = tracker();

        let id = tracker
            .schedule(
                mac("AA"),
                PrinterEvent::PrintDone,
                Action::TurnOff,
                Delay::from_secs(5),
                false,
            )
            .unwrap();

        advance(4).await;
        assert!(gateway.calls().is_empty());
        assert!(tracker.list_pending().contains(id));

        advance(2).await;
        assert_eq!(gateway.calls().len(), 1);
        assert!(tracker.get(id).is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn cancel_suppresses_the_action() {
        let (gateway, tracker) = tracker();

        let id = tracker
            .schedule(
                mac("AA"),
                PrinterEvent::PrintDone,
                Action::TurnOff,
                Delay::from_secs(5),
                false,
            )
            .unwrap();

        advance(1).await;
        assert!(tracker.cancel(id));
        assert!(!tracker.list_pending().contains(id));

        advance(10).await;
        assert!(gateway.calls().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn cancel_is_idempotent() {
        let (_gateway, tracker) = tracker();

        let id = tracker
            .schedule(
                mac("AA"),
                PrinterEvent::PrintDone,
                Action::TurnOff,
                Delay::from_secs(5),
                false,
            )
            .unwrap();

        assert!(tracker.cancel(id));
        assert!(!tracker.cancel(id));
        assert!(!tracker.cancel(PendingId::new()));
    }

    #[tokio::test(start_paused = true)]
    async fn cancel_after_fire_is_a_no_op() {
        let (gateway, tracker) = tracker();

        let id = tracker
            .schedule(
                mac("AA"),
                PrinterEvent::PrintDone,
                Action::TurnOn,
                Delay::from_secs(1),
                false,
            )
            .unwrap();
        advance(2).await;

        assert!(!tracker.cancel(id));
        assert_eq!(gateway.calls().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn same_triple_is_tracked_independently() {
        let (gateway, tracker) = tracker();

        let first = tracker
            .schedule(
                mac("AA"),
                PrinterEvent::PrintPaused,
                Action::TurnOff,
                Delay::from_secs(2),
                false,
            )
            .unwrap();
        let second = tracker
            .schedule(
                mac("AA"),
                PrinterEvent::PrintPaused,
                Action::TurnOff,
                Delay::from_secs(2),
                false,
            )
            .unwrap();
        assert_ne!(first, second);
        assert_eq!(tracker.len(), 2);

        tracker.cancel(first);
        assert!(tracker.get(second).is_some());

        advance(3).await;
        assert_eq!(gateway.calls(), vec![(mac("AA"), Action::TurnOff)]);
    }

    #[tokio::test(start_paused = true)]
    async fn failed_actuation_is_dropped_not_retried() {
        let (gateway, tracker) = tracker();
        gateway.failing.store(true, Ordering::SeqCst);
        let mut events = tracker.subscribe();

        let id = tracker
            .schedule(mac("AA"), PrinterEvent::PrintStarted, Action::TurnOn, Delay::ZERO, false)
            .unwrap();
        advance(5).await;

        assert_eq!(gateway.calls().len(), 1);
        assert!(tracker.is_empty());

        assert!(matches!(events.recv().await.unwrap(), TrackerEvent::Scheduled { .. }));
        match events.recv().await.unwrap() {
            TrackerEvent::FireFailed { pending, error } => {
                assert_eq!(pending.id(), id);
                assert!(error.contains("offline"));
            }
            other => panic!("Expected FireFailed, got {other:?}"),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn list_pending_is_oldest_first() {
        let (_gateway, tracker) = tracker();

        let a = tracker
            .schedule(
                mac("AA"),
                PrinterEvent::PrintStarted,
                Action::TurnOn,
                Delay::from_secs(50),
                false,
            )
            .unwrap();
        let b = tracker
            .schedule(
                mac("BB"),
                PrinterEvent::PrintStarted,
                Action::TurnOn,
                Delay::from_secs(5),
                false,
            )
            .unwrap();
        let c = tracker
            .schedule(
                mac("AA"),
                PrinterEvent::PrintDone,
                Action::TurnOff,
                Delay::from_secs(20),
                false,
            )
            .unwrap();

        let ids: Vec<_> = tracker.list_pending().iter().map(PendingAction::id).collect();
        assert_eq!(ids, vec![a, b, c]);

        let for_aa: Vec<_> = tracker
            .pending_for(&mac("AA"))
            .iter()
            .map(PendingAction::id)
            .collect();
        assert_eq!(for_aa, vec![a, c]);
    }

    #[tokio::test(start_paused = true)]
    async fn snapshots_are_independent() {
        let (_gateway, tracker) = tracker();

        let id = tracker
            .schedule(
                mac("AA"),
                PrinterEvent::PrintStarted,
                Action::TurnOn,
                Delay::from_secs(5),
                true,
            )
            .unwrap();
        let before = tracker.list_pending();
        tracker.cancel(id);
        let after = tracker.list_pending();

        assert_eq!(before.len(), 1);
        assert!(after.is_empty());

        let snapshot = before.iter().next().unwrap();
        assert_eq!(snapshot.delay(), Delay::from_secs(5));
        assert!(snapshot.cancel_on_conflict());
        assert!(!snapshot.is_cancelled());
    }

    #[tokio::test(start_paused = true)]
    async fn capacity_is_enforced() {
        let gateway = Arc::new(RecordingGateway::default());
        let config = TrackerConfig::default().with_max_pending(2);
        let tracker = PendingActionTracker::with_config(Arc::clone(&gateway), &config);

        for _ in 0..2 {
            tracker
                .schedule(
                    mac("AA"),
                    PrinterEvent::PrintDone,
                    Action::TurnOff,
                    Delay::from_secs(1),
                    false,
                )
                .unwrap();
        }
        let err = tracker
            .schedule(
                mac("AA"),
                PrinterEvent::PrintDone,
                Action::TurnOff,
                Delay::from_secs(1),
                false,
            )
            .unwrap_err();
        assert!(matches!(err, Error::CapacityExhausted { limit: 2 }));
        assert_eq!(tracker.len(), 2);

        advance(2).await;
        assert_eq!(gateway.calls().len(), 2);
        assert!(tracker
            .schedule(
                mac("AA"),
                PrinterEvent::PrintDone,
                Action::TurnOff,
                Delay::from_secs(1),
                false,
            )
            .is_ok());
    }

    #[tokio::test(start_paused = true)]
    async fn conflicting_actions_are_cancelled() {
        let (gateway, tracker) = tracker();

        let flagged = tracker
            .schedule(
                mac("AA"),
                PrinterEvent::PrintDone,
                Action::TurnOff,
                Delay::from_secs(60),
                true,
            )
            .unwrap();
        let unflagged = tracker
            .schedule(
                mac("AA"),
                PrinterEvent::PrintFailed,
                Action::TurnOff,
                Delay::from_secs(60),
                false,
            )
            .unwrap();
        let other_device = tracker
            .schedule(
                mac("BB"),
                PrinterEvent::PrintDone,
                Action::TurnOff,
                Delay::from_secs(60),
                true,
            )
            .unwrap();
        let same_action = tracker
            .schedule(
                mac("AA"),
                PrinterEvent::CaptureDone,
                Action::TurnOn,
                Delay::from_secs(60),
                true,
            )
            .unwrap();
        let same_event = tracker
            .schedule(
                mac("AA"),
                PrinterEvent::PrintStarted,
                Action::TurnOff,
                Delay::from_secs(60),
                true,
            )
            .unwrap();

        let cancelled =
            tracker.cancel_conflicting(&mac("AA"), Action::TurnOn, PrinterEvent::PrintStarted);

        assert_eq!(cancelled, vec![flagged]);
        for id in [unflagged, other_device, same_action, same_event] {
            assert!(tracker.get(id).is_some());
        }

        advance(61).await;
        assert_eq!(gateway.calls().len(), 4);
    }

    #[tokio::test(start_paused = true)]
    async fn cancel_all_drains_everything() {
        let (gateway, tracker) = tracker();
        let mut events = tracker.subscribe();

        for secs in 1..=3 {
            tracker
                .schedule(
                    mac("AA"),
                    PrinterEvent::PrintDone,
                    Action::TurnOff,
                    Delay::from_secs(secs),
                    false,
                )
                .unwrap();
        }
        assert_eq!(tracker.cancel_all(), 3);
        assert!(tracker.is_empty());

        advance(5).await;
        assert!(gateway.calls().is_empty());

        let mut terminal = 0;
        while let Ok(event) = events.try_recv() {
            if let TrackerEvent::Cancelled { reason, .. } = event {
                assert_eq!(reason, CancelReason::Shutdown);
                terminal += 1;
            }
        }
        assert_eq!(terminal, 3);
    }

    #[tokio::test(start_paused = true)]
    async fn notifications_without_subscribers_are_dropped() {
        let (gateway, tracker) = tracker();

        tracker
            .schedule(mac("AA"), PrinterEvent::PrintDone, Action::TurnOff, Delay::ZERO, false)
            .unwrap();
        advance(1).await;

        assert_eq!(gateway.calls().len(), 1);
        assert!(tracker.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn every_subscriber_sees_the_lifecycle() {
        let (_gateway, tracker) = tracker();
        let mut first = tracker.subscribe();
        let mut second = tracker.clone().subscribe();

        let id = tracker
            .schedule(
                mac("AA"),
                PrinterEvent::PrintDone,
                Action::TurnOff,
                Delay::from_secs(9),
                false,
            )
            .unwrap();
        tracker.cancel(id);

        for rx in [&mut first, &mut second] {
            assert!(matches!(rx.recv().await.unwrap(), TrackerEvent::Scheduled { .. }));
            match rx.recv().await.unwrap() {
                TrackerEvent::Cancelled { pending, reason } => {
                    assert_eq!(pending.id(), id);
                    assert!(pending.is_cancelled());
                    assert_eq!(reason, CancelReason::Requested);
                }
                other => panic!("Expected Cancelled, got {other:?}"),
            }
        }
    }

    #[tokio::test(start_paused = true)]
    async fn slow_subscriber_lags_without_blocking() {
        let gateway = Arc::new(RecordingGateway::default());
        let config = TrackerConfig::default().with_event_capacity(2);
        let tracker = PendingActionTracker::with_config(Arc::clone(&gateway), &config);
        let mut rx = tracker.subscribe();

        for _ in 0..3 {
            tracker
                .schedule(mac("AA"), PrinterEvent::PrintDone, Action::TurnOff, Delay::ZERO, false)
                .unwrap();
        }
        advance(1).await;

        assert_eq!(gateway.calls().len(), 3);
        assert!(matches!(
            rx.recv().await,
            Err(broadcast::error::RecvError::Lagged(_))
        ));
    }

    #[test]
    fn zero_event_capacity_is_clamped() {
        let config = TrackerConfig::default().with_event_capacity(0);
        let tracker = PendingActionTracker::with_config(crate::gateway::DryRunGateway, &config);
        let _rx = tracker.subscribe();
    }

    #[test]
    fn schedule_outside_runtime_fails() {
        let (_gateway, tracker) = tracker();
        let err = tracker
            .schedule(mac("AA"), PrinterEvent::PrintDone, Action::TurnOff, Delay::ZERO, false)
            .unwrap_err();
        assert!(matches!(err, Error::UpstreamUnavailable(UpstreamError::NoRuntime)));
        assert!(tracker.is_empty());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn racing_cancel_and_elapse_resolve_exactly_once() {
        let gateway = Arc::new(RecordingGateway::default());
        let config = TrackerConfig::default().with_event_capacity(1024);
        let tracker = PendingActionTracker::with_config(Arc::clone(&gateway), &config);
        let mut events = tracker.subscribe();
        let total = 200;

        let mut ids = Vec::with_capacity(total);
        for i in 0..total {
            let delay = Delay::from_millis(u64::try_from(i % 3).unwrap());
            ids.push(
                tracker
                    .schedule(mac("AA"), PrinterEvent::PrintDone, Action::TurnOff, delay, false)
                    .unwrap(),
            );
        }

        let mut cancelled = 0;
        for id in ids {
            if tracker.cancel(id) {
                cancelled += 1;
            }
        }

        // Wait for every pending action to reach a terminal notification
        let mut terminal = 0;
        while terminal < total {
            let event = tokio::time::timeout(Duration::from_secs(5), events.recv())
                .await
                .expect("terminal notifications")
                .unwrap();
            if event.is_terminal() {
                terminal += 1;
            }
        }

        assert!(tracker.is_empty());
        assert_eq!(gateway.calls().len() + cancelled, total);
    }
}
