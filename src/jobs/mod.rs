//! Background jobs processed by the apalis worker (`jobs work`).

mod notification_job;

pub use notification_job::{notification_job_handler, NotificationJob};
