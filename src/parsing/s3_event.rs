//! Upload notifications as delivered by the storage service.
//!
//! Two shapes are accepted: a plain S3 event notification and an SNS
//! envelope whose `Message` is an S3 event notification serialized as a
//! string. Both flatten into one batch of [`UploadEvent`]s.

use crate::datamodel::UploadEvent;
use serde::Deserialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum EventParseError {
    #[error("Invalid notification JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),

    #[error("Record {index} is missing {field}")]
    MissingField { index: usize, field: &'static str },

    #[error("Record {index} is neither an S3 nor an SNS record")]
    UnsupportedRecord { index: usize },

    #[error("Object key is not valid URL-encoded UTF-8: {key}")]
    InvalidKey { key: String },
}

#[derive(Debug, Deserialize)]
struct Notification {
    // S3 test events carry no records at all.
    #[serde(rename = "Records", default)]
    records: Vec<Record>,
}

#[derive(Debug, Deserialize)]
struct Record {
    s3: Option<S3Entity>,
    #[serde(rename = "Sns")]
    sns: Option<SnsEntity>,
}

#[derive(Debug, Deserialize)]
struct S3Entity {
    bucket: Option<BucketEntity>,
    object: Option<ObjectEntity>,
}

#[derive(Debug, Deserialize)]
struct BucketEntity {
    name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ObjectEntity {
    key: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SnsEntity {
    #[serde(rename = "Message")]
    message: Option<String>,
}

/// Parse a notification body into the batch it describes.
///
/// A malformed record rejects the whole body.
pub fn parse_upload_notification(body: &[u8]) -> Result<Vec<UploadEvent>, EventParseError> {
    let notification: Notification = serde_json::from_slice(body)?;
    let mut events = Vec::with_capacity(notification.records.len());

    for (index, record) in notification.records.into_iter().enumerate() {
        match (record.s3, record.sns) {
            (Some(s3), _) => events.push(s3_record_to_event(index, s3)?),
            (None, Some(sns)) => {
                let message = sns.message.ok_or(EventParseError::MissingField {
                    index,
                    field: "Sns.Message",
                })?;
                let inner: Notification = serde_json::from_str(&message)?;
                for (inner_index, inner_record) in inner.records.into_iter().enumerate() {
                    let s3 = inner_record
                        .s3
                        .ok_or(EventParseError::UnsupportedRecord { index: inner_index })?;
                    events.push(s3_record_to_event(inner_index, s3)?);
                }
            }
            (None, None) => return Err(EventParseError::UnsupportedRecord { index }),
        }
    }

    Ok(events)
}

fn s3_record_to_event(index: usize, s3: S3Entity) -> Result<UploadEvent, EventParseError> {
    let bucket = s3
        .bucket
        .and_then(|bucket| bucket.name)
        .filter(|name| !name.is_empty())
        .ok_or(EventParseError::MissingField {
            index,
            field: "s3.bucket.name",
        })?;
    let raw_key = s3
        .object
        .and_then(|object| object.key)
        .filter(|key| !key.is_empty())
        .ok_or(EventParseError::MissingField {
            index,
            field: "s3.object.key",
        })?;

    Ok(UploadEvent::new(bucket, decode_object_key(&raw_key)?))
}

/// S3 form-encodes keys in notifications: spaces become `+`.
pub fn decode_object_key(raw: &str) -> Result<String, EventParseError> {
    let spaced = raw.replace('+', " ");
    urlencoding::decode(&spaced)
        .map(|key| key.into_owned())
        .map_err(|_| EventParseError::InvalidKey {
            key: raw.to_string(),
        })
}
