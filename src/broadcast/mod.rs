pub mod broadcaster;
pub mod notifier;
pub mod push_client;

pub use broadcaster::{BroadcastError, Broadcaster};
pub use notifier::{NotifyError, Notifier};
pub use push_client::{HttpPushClient, LoggingPushClient, PushClient, PushError};
