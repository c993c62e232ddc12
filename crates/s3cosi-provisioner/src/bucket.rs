use s3cosi_client::BucketOps;
use s3cosi_common::{Action, Failure, S3_ERRORS, StorageEndpointParameters, settle};
use tracing::info;

pub struct BucketManager {
    client: Box<dyn BucketOps>,
}

impl BucketManager {
    pub fn new(client: Box<dyn BucketOps>) -> Self {
        Self { client }
    }

    pub async fn create_bucket(
        &self,
        name: &str,
        params: &StorageEndpointParameters,
    ) -> Result<String, Failure> {
        let location = (!params.is_default_region()).then(|| params.region());
        let result = self.client.create_bucket(name, location).await;

        match settle(result, Action::CreateBucket, name, &S3_ERRORS)? {
            Some(()) => info!(bucket = %name, region = %params.region(), "bucket created"),
            None => info!(bucket = %name, "bucket already present"),
        }
        Ok(name.to_string())
    }

    pub async fn delete_bucket(&self, bucket_id: &str) -> Result<(), Failure> {
        let result = self.client.delete_bucket(bucket_id).await;

        match settle(result, Action::DeleteBucket, bucket_id, &S3_ERRORS)? {
            Some(()) => info!(bucket = %bucket_id, "bucket deleted"),
            None => info!(bucket = %bucket_id, "bucket already absent"),
        }
        Ok(())
    }
}
