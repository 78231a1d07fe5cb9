pub mod metrics;
pub mod notification_server;
pub mod registry;

pub use metrics::{OtelPushMetrics, PushMetrics};
pub use notification_server::{NotificationServer, PushNotificationServer};
pub use registry::NotificationServerRegistry;
