use s3cosi_common::{Result, StorageEndpointParameters};

use crate::traits::{BucketOps, IdentityOps};

pub trait ClientFactory: Send + Sync {
    fn bucket_client(&self, params: &StorageEndpointParameters) -> Result<Box<dyn BucketOps>>;
    fn identity_client(&self, params: &StorageEndpointParameters) -> Result<Box<dyn IdentityOps>>;
}
