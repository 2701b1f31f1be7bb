//! R2 Client implementation using AWS S3 SDK

use crate::config::R2Config;
use crate::error::{Error, Result};
use crate::store::ObjectStore;
use crate::tree::ObjectRecord;
use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_sdk_s3::{
    config::{Credentials, Region},
    primitives::ByteStream,
    types::Object,
    Client,
};
use aws_smithy_types::date_time::Format;
use tracing::{debug, warn};

/// R2 client bound to a single bucket
pub struct R2Client {
    client: Client,
    bucket: String,
}

impl R2Client {
    /// Create a new R2 client
    pub fn new(
        endpoint: String,
        access_key_id: String,
        secret_access_key: String,
        bucket: String,
    ) -> Self {
        let credentials =
            Credentials::new(&access_key_id, &secret_access_key, None, None, "r2catalog");

        // R2 speaks S3 with a single "auto" region
        let config = aws_sdk_s3::Config::builder()
            .behavior_version(BehaviorVersion::latest())
            .endpoint_url(endpoint)
            .region(Region::new("auto"))
            .credentials_provider(credentials)
            .force_path_style(true)
            .build();

        Self::with_client(Client::from_conf(config), bucket)
    }

    /// Wrap an already configured SDK client
    pub fn with_client(client: Client, bucket: String) -> Self {
        Self { client, bucket }
    }

    /// Create a client from resolved R2 settings
    pub fn from_config(config: &R2Config) -> Self {
        Self::new(
            config.endpoint.clone(),
            config.access_key_id.clone(),
            config.secret_access_key.clone(),
            config.bucket.clone(),
        )
    }
}

#[async_trait]
impl ObjectStore for R2Client {
    fn bucket(&self) -> &str {
        &self.bucket
    }

    async fn create_bucket(&self) -> Result<Option<String>> {
        match self.client.create_bucket().bucket(&self.bucket).send().await {
            Ok(output) => Ok(output.location().map(str::to_string)),
            Err(err) => {
                let already_owned = err
                    .as_service_error()
                    .map(|e| e.is_bucket_already_owned_by_you())
                    .unwrap_or(false);
                if already_owned {
                    Err(Error::BucketAlreadyOwned(self.bucket.clone()))
                } else {
                    Err(err.into())
                }
            }
        }
    }

    async fn put_object(&self, key: &str, body: Vec<u8>, content_type: &str) -> Result<()> {
        debug!(bucket = %self.bucket, key, bytes = body.len(), "put_object");

        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .body(ByteStream::from(body))
            .content_type(content_type)
            .send()
            .await?;

        Ok(())
    }

    async fn list_objects(&self, prefix: Option<&str>) -> Result<Vec<ObjectRecord>> {
        debug!(bucket = %self.bucket, ?prefix, "list_objects");

        let response = self
            .client
            .list_objects_v2()
            .bucket(&self.bucket)
            .set_prefix(prefix.map(|s| s.to_string()))
            .send()
            .await?;

        if response.is_truncated().unwrap_or(false) {
            warn!(
                bucket = %self.bucket,
                ?prefix,
                "listing truncated by the store; only the first page is used"
            );
        }

        let objects = response.contents().iter().filter_map(to_record).collect();

        Ok(objects)
    }
}

fn to_record(obj: &Object) -> Option<ObjectRecord> {
    Some(ObjectRecord {
        key: obj.key()?.to_string(),
        size: obj.size().unwrap_or(0),
        last_modified: obj
            .last_modified()
            .and_then(|dt| dt.fmt(Format::DateTime).ok()),
        etag: obj.e_tag().unwrap_or_default().to_string(),
        storage_class: obj.storage_class().map(|c| c.as_str().to_string()),
    })
}
