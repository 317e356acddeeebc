use super::{ObjectStore, ObjectStoreError};
use async_trait::async_trait;
use aws_sdk_s3::Client;
use aws_sdk_s3::error::SdkError;
use aws_sdk_s3::primitives::ByteStream;
use bytes::Bytes;

/// Amazon S3, or any S3-compatible store when an endpoint is given.
#[derive(Debug, Clone)]
pub struct S3ObjectStore {
    client: Client,
}

impl S3ObjectStore {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// `s3:` uses the default AWS endpoint resolution. `s3://host:port` or
    /// `s3+https://host` targets a custom endpoint with path-style addressing.
    pub async fn connect(connection_string: &str) -> Result<Self, ObjectStoreError> {
        let endpoint = parse_endpoint(connection_string)?;
        let shared_config = aws_config::load_from_env().await;

        let mut builder = aws_sdk_s3::config::Builder::from(&shared_config);
        if let Some(endpoint) = endpoint {
            builder = builder.endpoint_url(endpoint).force_path_style(true);
        }

        Ok(Self::new(Client::from_conf(builder.build())))
    }
}

fn parse_endpoint(connection_string: &str) -> Result<Option<String>, ObjectStoreError> {
    if let Some(host) = connection_string.strip_prefix("s3+https://") {
        return Ok(Some(format!("https://{}", host)));
    }
    if let Some(host) = connection_string.strip_prefix("s3://") {
        if host.is_empty() {
            return Ok(None);
        }
        return Ok(Some(format!("http://{}", host)));
    }
    if connection_string == "s3:" || connection_string == "s3" {
        return Ok(None);
    }
    Err(ObjectStoreError::Configuration(format!(
        "Not an S3 object store URL: {}",
        connection_string
    )))
}

#[async_trait]
impl ObjectStore for S3ObjectStore {
    async fn get(&self, bucket: &str, key: &str) -> Result<Bytes, ObjectStoreError> {
        let output = self
            .client
            .get_object()
            .bucket(bucket)
            .key(key)
            .send()
            .await
            .map_err(|err| {
                let service_error = err.into_service_error();
                if service_error.is_no_such_key() {
                    ObjectStoreError::not_found(bucket, key)
                } else {
                    ObjectStoreError::Transient(service_error.to_string())
                }
            })?;

        let body = output
            .body
            .collect()
            .await
            .map_err(|err| ObjectStoreError::Transient(format!("Failed to read body: {}", err)))?;
        Ok(body.into_bytes())
    }

    async fn put(
        &self,
        bucket: &str,
        key: &str,
        body: Bytes,
        content_type: &str,
    ) -> Result<(), ObjectStoreError> {
        self.client
            .put_object()
            .bucket(bucket)
            .key(key)
            .content_type(content_type)
            .body(ByteStream::from(body))
            .send()
            .await
            .map_err(|err| match err {
                SdkError::ServiceError(context) => {
                    ObjectStoreError::Rejected(context.into_err().to_string())
                }
                other => ObjectStoreError::Transient(other.to_string()),
            })?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_endpoint() {
        assert_eq!(parse_endpoint("s3:").unwrap(), None);
        assert_eq!(parse_endpoint("s3://").unwrap(), None);
        assert_eq!(
            parse_endpoint("s3://localhost:9000").unwrap().as_deref(),
            Some("http://localhost:9000")
        );
        assert_eq!(
            parse_endpoint("s3+https://minio.internal").unwrap().as_deref(),
            Some("https://minio.internal")
        );
        assert!(parse_endpoint("local:./data").is_err());
    }
}
