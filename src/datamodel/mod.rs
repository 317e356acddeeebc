pub mod connection;
pub mod notification;
pub mod transform;
pub mod upload_event;

pub use connection::ConnectionRecord;
pub use notification::{BroadcastOutcome, NotificationPayload};
pub use transform::{FailureKind, TransformOutcome, TransformResult, TransformStage};
pub use upload_event::UploadEvent;
