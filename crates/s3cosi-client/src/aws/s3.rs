use async_trait::async_trait;
use aws_sdk_s3::{
    Client,
    config::{BehaviorVersion, Credentials, Region},
    types::{BucketLocationConstraint, CreateBucketConfiguration},
};
use s3cosi_common::{Result, ServiceType, StorageEndpointParameters};
use tracing::{debug, info};

use super::{AwsClientOptions, CREDENTIALS_PROVIDER_NAME, provider_error, tls::https_client};
use crate::traits::{BucketOps, ProviderResult};

#[derive(Debug, Clone)]
pub struct ObjectStoreClient {
    client: Client,
    endpoint: String,
    debug: bool,
}

impl ObjectStoreClient {
    pub fn new(params: &StorageEndpointParameters, options: &AwsClientOptions) -> Result<Self> {
        let endpoint = ServiceType::ObjectStore.endpoint(params).to_string();
        let credentials = Credentials::new(
            params.access_key_id(),
            params.secret_access_key(),
            None,
            None,
            CREDENTIALS_PROVIDER_NAME,
        );

        let mut builder = aws_sdk_s3::config::Builder::new()
            .behavior_version(BehaviorVersion::latest())
            .region(Region::new(params.region().to_string()))
            .credentials_provider(credentials)
            .endpoint_url(&endpoint)
            .force_path_style(true)
            .retry_config(options.retry_config());
        if let Some(timeout_config) = options.timeout_config() {
            builder = builder.timeout_config(timeout_config);
        }
        if let Some(pem) = params.tls_trust() {
            builder = builder.http_client(https_client(pem)?);
        }

        Ok(Self {
            client: Client::from_conf(builder.build()),
            endpoint,
            debug: params.debug(),
        })
    }

    fn log_call(&self, operation: &'static str, bucket: &str) {
        if self.debug {
            info!(operation, bucket, endpoint = %self.endpoint, "object store request");
        } else {
            debug!(operation, bucket, endpoint = %self.endpoint, "object store request");
        }
    }
}

#[async_trait]
impl BucketOps for ObjectStoreClient {
    async fn create_bucket(&self, bucket: &str, location: Option<&str>) -> ProviderResult<()> {
        self.log_call("CreateBucket", bucket);
        let mut request = self.client.create_bucket().bucket(bucket);
        if let Some(region) = location {
            request = request.create_bucket_configuration(
                CreateBucketConfiguration::builder()
                    .location_constraint(BucketLocationConstraint::from(region))
                    .build(),
            );
        }
        request.send().await.map_err(provider_error)?;
        Ok(())
    }

    async fn delete_bucket(&self, bucket: &str) -> ProviderResult<()> {
        self.log_call("DeleteBucket", bucket);
        self.client
            .delete_bucket()
            .bucket(bucket)
            .send()
            .await
            .map_err(provider_error)?;
        Ok(())
    }
}
