//! Background workers.

pub mod notification_worker;

pub use notification_worker::{
    LoggingNotificationSink, NotificationSink, NotificationWorker, WorkerHandle,
};
