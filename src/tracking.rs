use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{debug, info, instrument};

use crate::domain::{DeliveryStatus, RecordId, DELIVERY_MINUTES};

/// One row of the delivery timeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Stage {
    pub status: DeliveryStatus,
    pub progress: u8,
    /// Minutes since the order was placed when this stage is reached.
    pub elapsed_minutes: u32,
}

pub const STAGES: [Stage; 4] = [
    Stage {
        status: DeliveryStatus::Preparing,
        progress: 25,
        elapsed_minutes: 5,
    },
    Stage {
        status: DeliveryStatus::OnTheWay,
        progress: 60,
        elapsed_minutes: 15,
    },
    Stage {
        status: DeliveryStatus::Arriving,
        progress: 90,
        elapsed_minutes: 25,
    },
    Stage {
        status: DeliveryStatus::Delivered,
        progress: 100,
        elapsed_minutes: 30,
    },
];

/// What the tracking page shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrackingView {
    pub status: DeliveryStatus,
    pub progress: u8,
    pub remaining_minutes: u32,
    /// One-shot "arriving soon" notice, cleared by the user.
    pub arrival_notice: bool,
}

impl Default for TrackingView {
    fn default() -> Self {
        Self {
            status: DeliveryStatus::Preparing,
            progress: 0,
            remaining_minutes: DELIVERY_MINUTES as u32,
            arrival_notice: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StageUpdate {
    pub stage: Stage,
    pub raises_arrival_notice: bool,
}

impl TrackingView {
    pub fn apply(&mut self, update: StageUpdate) {
        self.status = update.stage.status;
        self.progress = update.stage.progress;
        self.remaining_minutes = (DELIVERY_MINUTES as u32).saturating_sub(update.stage.elapsed_minutes);
        if update.raises_arrival_notice {
            self.arrival_notice = true;
        }
    }

    pub fn status_text(&self) -> &'static str {
        self.status.label()
    }

    pub fn is_delivered(&self) -> bool {
        self.status == DeliveryStatus::Delivered
    }
}

/// The timeline without a clock: each tick yields the next stage until
/// delivery, then nothing.
#[derive(Debug, Clone, Default)]
pub struct DeliverySimulation {
    next_stage: usize,
}

impl DeliverySimulation {
    pub fn tick(&mut self) -> Option<StageUpdate> {
        let stage = *STAGES.get(self.next_stage)?;
        self.next_stage += 1;
        Some(StageUpdate {
            stage,
            raises_arrival_notice: stage.status == DeliveryStatus::Arriving,
        })
    }

    pub fn is_finished(&self) -> bool {
        self.next_stage >= STAGES.len()
    }
}

/// Owns the background timer that walks an order through its delivery
/// stages. Dropping the tracker stops the timer.
pub struct DeliveryTracker {
    order_id: RecordId,
    view: Arc<watch::Sender<TrackingView>>,
    task: JoinHandle<()>,
}

impl DeliveryTracker {
    /// Starts from "preparing"; nothing is persisted, so a new tracker for
    /// the same order starts over.
    pub fn start(order_id: RecordId, period: Duration) -> Self {
        let (view, _) = watch::channel(TrackingView::default());
        let view = Arc::new(view);
        let task = tokio::spawn(run_timer(order_id.clone(), period, Arc::clone(&view)));
        Self {
            order_id,
            view,
            task,
        }
    }

    pub fn order_id(&self) -> &RecordId {
        &self.order_id
    }

    pub fn subscribe(&self) -> watch::Receiver<TrackingView> {
        self.view.subscribe()
    }

    pub fn view(&self) -> TrackingView {
        *self.view.borrow()
    }

    pub fn dismiss_arrival_notice(&self) {
        self.view.send_if_modified(|view| std::mem::take(&mut view.arrival_notice));
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    pub fn cancel(&self) {
        self.task.abort();
    }

    /// Waits until the order is delivered or the timer is cancelled.
    pub async fn wait(&mut self) -> TrackingView {
        if !self.task.is_finished() {
            let _ = (&mut self.task).await;
        }
        self.view()
    }
}

impl Drop for DeliveryTracker {
    fn drop(&mut self) {
        self.task.abort();
    }
}

#[instrument(skip(period, view))]
async fn run_timer(order_id: RecordId, period: Duration, view: Arc<watch::Sender<TrackingView>>) {
    let mut simulation = DeliverySimulation::default();
    let mut timer = interval_at(Instant::now() + period, period);
    timer.set_missed_tick_behavior(MissedTickBehavior::Delay);

    info!("Delivery simulation started");
    while !simulation.is_finished() {
        timer.tick().await;
        if let Some(update) = simulation.tick() {
            debug!(status = ?update.stage.status, progress = update.stage.progress, "Delivery stage");
            view.send_modify(|current| current.apply(update));
        }
    }
    info!("Order delivered");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn four_ticks_deliver_and_then_nothing_changes() {
        let mut simulation = DeliverySimulation::default();
        let mut view = TrackingView::default();
        for _ in 0..4 {
            view.apply(simulation.tick().unwrap());
        }
        assert!(view.is_delivered());
        assert_eq!(view.progress, 100);
        assert_eq!(view.remaining_minutes, 0);
        assert!(simulation.tick().is_none());
        assert!(simulation.is_finished());
    }

    #[test]
    fn arriving_raises_the_notice_once() {
        let mut simulation = DeliverySimulation::default();
        let raised: Vec<bool> = std::iter::from_fn(|| simulation.tick())
            .map(|update| update.raises_arrival_notice)
            .collect();
        assert_eq!(raised, [false, false, true, false]);
    }

    #[tokio::test(start_paused = true)]
    async fn tracker_walks_the_timeline() {
        let tracker = DeliveryTracker::start(RecordId::from("42"), Duration::from_secs(5));
        let mut changes = tracker.subscribe();
        assert_eq!(tracker.view(), TrackingView::default());
        assert_eq!(tracker.view().remaining_minutes, 30);

        changes.changed().await.unwrap();
        let first = *changes.borrow_and_update();
        assert_eq!(first.status, DeliveryStatus::Preparing);
        assert_eq!(first.progress, 25);
        assert_eq!(first.remaining_minutes, 25);

        changes.changed().await.unwrap();
        assert_eq!(changes.borrow_and_update().status, DeliveryStatus::OnTheWay);

        changes.changed().await.unwrap();
        let arriving = *changes.borrow_and_update();
        assert_eq!(arriving.status, DeliveryStatus::Arriving);
        assert!(arriving.arrival_notice);
        tracker.dismiss_arrival_notice();
        assert!(!tracker.view().arrival_notice);
        changes.borrow_and_update();

        changes.changed().await.unwrap();
        assert!(changes.borrow_and_update().is_delivered());
    }

    #[tokio::test(start_paused = true)]
    async fn wait_returns_the_delivered_view() {
        let mut tracker = DeliveryTracker::start(RecordId::from("7"), Duration::from_secs(5));
        let done = tracker.wait().await;
        assert!(done.is_delivered());
        assert!(tracker.is_finished());
    }

    #[tokio::test(start_paused = true)]
    async fn dropping_the_tracker_stops_the_timer() {
        let tracker = DeliveryTracker::start(RecordId::from("9"), Duration::from_secs(5));
        let mut changes = tracker.subscribe();
        drop(tracker);
        tokio::time::sleep(Duration::from_secs(60)).await;
        // sender gone without a single stage being applied
        assert!(changes.changed().await.is_err());
        assert_eq!(*changes.borrow(), TrackingView::default());
    }

    #[tokio::test(start_paused = true)]
    async fn cancel_freezes_the_timeline() {
        let mut tracker = DeliveryTracker::start(RecordId::from("11"), Duration::from_secs(5));
        let mut changes = tracker.subscribe();
        changes.changed().await.unwrap();
        assert_eq!(changes.borrow_and_update().progress, 25);

        tracker.cancel();
        let stopped = tracker.wait().await;
        assert!(tracker.is_finished());
        tokio::time::sleep(Duration::from_secs(60)).await;

        assert_eq!(stopped.status, DeliveryStatus::Preparing);
        assert_eq!(tracker.view().progress, 25);
        assert!(!changes.has_changed().unwrap());
    }
}
