pub mod s3_event;

pub use s3_event::{EventParseError, parse_upload_notification};
