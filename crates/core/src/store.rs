//! Object store abstraction used by the catalog actions

use crate::error::Result;
use crate::tree::ObjectRecord;
use async_trait::async_trait;

/// Bucket-scoped object store operations
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Bucket every operation targets
    fn bucket(&self) -> &str;

    /// Create the bucket, returning its location when the store reports one
    ///
    /// Fails with [`crate::Error::BucketAlreadyOwned`] when the caller already owns it.
    async fn create_bucket(&self) -> Result<Option<String>>;

    /// Store `body` under `key`
    async fn put_object(&self, key: &str, body: Vec<u8>, content_type: &str) -> Result<()>;

    /// List objects, optionally restricted to keys starting with `prefix`
    ///
    /// A single request is made; results beyond the store's page size are not fetched.
    async fn list_objects(&self, prefix: Option<&str>) -> Result<Vec<ObjectRecord>>;
}
