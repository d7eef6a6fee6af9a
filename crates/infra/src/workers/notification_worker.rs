use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use tracing::{info, warn};

use supplyflow_events::{EventBus, Subscription};
use supplyflow_orders::OrderNotification;

use crate::notifier::OrderEnvelope;

/// Delivery channel for order notifications (mail, push, in-app rows).
///
/// Delivery is at-least-once; implementations should use the envelope's
/// `event_id` to drop repeats.
pub trait NotificationSink: Send + 'static {
    type Error: core::fmt::Debug + Send + 'static;

    fn deliver(&mut self, envelope: &OrderEnvelope) -> Result<(), Self::Error>;
}

/// Default sink: one structured log line per notification.
#[derive(Debug, Default)]
pub struct LoggingNotificationSink;

impl NotificationSink for LoggingNotificationSink {
    type Error = core::convert::Infallible;

    fn deliver(&mut self, envelope: &OrderEnvelope) -> Result<(), Self::Error> {
        let order = envelope.payload().order();
        match envelope.payload() {
            OrderNotification::OrderPlaced { .. } => info!(
                event_id = %envelope.event_id(),
                order_id = %order.order_id(),
                buyer = %order.buyer_id(),
                total = %order.total_amount(),
                "notify: order placed"
            ),
            OrderNotification::OrderStatusChanged { old_status, .. } => info!(
                event_id = %envelope.event_id(),
                order_id = %order.order_id(),
                buyer = %order.buyer_id(),
                from = %old_status,
                to = %order.status(),
                "notify: order status changed"
            ),
        }
        Ok(())
    }
}

/// Handle to control and join a background worker.
#[derive(Debug)]
pub struct WorkerHandle {
    shutdown: mpsc::Sender<()>,
    join: Option<thread::JoinHandle<()>>,
}

impl WorkerHandle {
    /// Request graceful shutdown and wait for the worker to stop.
    pub fn shutdown(mut self) {
        let _ = self.shutdown.send(());
        if let Some(j) = self.join.take() {
            let _ = j.join();
        }
    }
}

/// Fans committed order notifications out to a [`NotificationSink`].
#[derive(Debug)]
pub struct NotificationWorker;

impl NotificationWorker {
    /// Subscribe to `bus` and spawn the delivery thread.
    ///
    /// The subscription is taken before this returns, so nothing published
    /// afterwards is missed.
    pub fn spawn<B, K>(name: &'static str, bus: &B, sink: K) -> std::io::Result<WorkerHandle>
    where
        B: EventBus<OrderEnvelope>,
        K: NotificationSink,
    {
        let (shutdown_tx, shutdown_rx) = mpsc::channel::<()>();
        let sub = bus.subscribe();

        let join = thread::Builder::new()
            .name(name.to_string())
            .spawn(move || worker_loop(name, sub, shutdown_rx, sink))?;

        Ok(WorkerHandle {
            shutdown: shutdown_tx,
            join: Some(join),
        })
    }
}

fn worker_loop<K: NotificationSink>(
    name: &'static str,
    sub: Subscription<OrderEnvelope>,
    shutdown_rx: mpsc::Receiver<()>,
    mut sink: K,
) {
    let tick = Duration::from_millis(250);

    loop {
        if shutdown_rx.try_recv().is_ok() {
            // Deliver what is already queued before stopping.
            for envelope in sub.drain() {
                deliver(name, &mut sink, &envelope);
            }
            break;
        }

        match sub.recv_timeout(tick) {
            Ok(envelope) => deliver(name, &mut sink, &envelope),
            Err(mpsc::RecvTimeoutError::Timeout) => continue,
            Err(mpsc::RecvTimeoutError::Disconnected) => break,
        }
    }
}

fn deliver<K: NotificationSink>(name: &'static str, sink: &mut K, envelope: &OrderEnvelope) {
    if let Err(err) = sink.deliver(envelope) {
        warn!(
            worker = name,
            event_id = %envelope.event_id(),
            event_type = envelope.event_type(),
            error = ?err,
            "notification delivery failed"
        );
    }
}
