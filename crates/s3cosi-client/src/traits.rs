use std::fmt;

use async_trait::async_trait;
use s3cosi_common::ProviderError;

pub type ProviderResult<T> = std::result::Result<T, ProviderError>;

#[derive(Clone, PartialEq, Eq)]
pub struct AccessKey {
    pub access_key_id: String,
    pub secret_access_key: String,
}

impl fmt::Debug for AccessKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccessKey")
            .field("access_key_id", &self.access_key_id)
            .field("secret_access_key", &"<redacted>")
            .finish()
    }
}

#[async_trait]
pub trait BucketOps: Send + Sync {
    /// `location` is attached as the bucket's location constraint when set.
    async fn create_bucket(&self, bucket: &str, location: Option<&str>) -> ProviderResult<()>;
    async fn delete_bucket(&self, bucket: &str) -> ProviderResult<()>;
}

#[async_trait]
pub trait IdentityOps: Send + Sync {
    async fn create_user(&self, user: &str) -> ProviderResult<()>;
    async fn get_user(&self, user: &str) -> ProviderResult<()>;
    async fn delete_user(&self, user: &str) -> ProviderResult<()>;
    async fn put_user_policy(
        &self,
        user: &str,
        policy_name: &str,
        document: &str,
    ) -> ProviderResult<()>;
    async fn delete_user_policy(&self, user: &str, policy_name: &str) -> ProviderResult<()>;
    async fn list_user_policies(&self, user: &str) -> ProviderResult<Vec<String>>;
    async fn create_access_key(&self, user: &str) -> ProviderResult<AccessKey>;
    async fn list_access_keys(&self, user: &str) -> ProviderResult<Vec<String>>;
    async fn delete_access_key(&self, user: &str, access_key_id: &str) -> ProviderResult<()>;
}
