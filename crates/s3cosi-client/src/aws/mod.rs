mod iam;
mod s3;
mod tls;

use std::{fmt::Debug, time::Duration};

use aws_smithy_runtime_api::client::result::SdkError;
use aws_smithy_types::{
    error::{display::DisplayErrorContext, metadata::ProvideErrorMetadata},
    retry::RetryConfig,
    timeout::TimeoutConfig,
};
use s3cosi_common::{ProviderError, Result, StorageEndpointParameters};

use crate::{
    factory::ClientFactory,
    traits::{BucketOps, IdentityOps},
};

pub use iam::IdentityClient;
pub use s3::ObjectStoreClient;

const CREDENTIALS_PROVIDER_NAME: &str = "s3cosi-static";

#[derive(Debug, Clone, Default)]
pub struct AwsClientOptions {
    pub operation_timeout: Option<Duration>,
}

impl AwsClientOptions {
    // The caller owns retries, so the SDK must never retry on its own.
    fn retry_config(&self) -> RetryConfig {
        RetryConfig::disabled()
    }

    fn timeout_config(&self) -> Option<TimeoutConfig> {
        self.operation_timeout
            .map(|timeout| TimeoutConfig::builder().operation_timeout(timeout).build())
    }
}

#[derive(Debug, Clone, Default)]
pub struct AwsClientFactory {
    options: AwsClientOptions,
}

impl AwsClientFactory {
    pub fn new(options: AwsClientOptions) -> Self {
        Self { options }
    }
}

impl ClientFactory for AwsClientFactory {
    fn bucket_client(&self, params: &StorageEndpointParameters) -> Result<Box<dyn BucketOps>> {
        Ok(Box::new(ObjectStoreClient::new(params, &self.options)?))
    }

    fn identity_client(&self, params: &StorageEndpointParameters) -> Result<Box<dyn IdentityOps>> {
        Ok(Box::new(IdentityClient::new(params, &self.options)?))
    }
}

fn provider_error<E, R>(err: SdkError<E, R>) -> ProviderError
where
    E: ProvideErrorMetadata + std::error::Error + 'static,
    R: Debug,
{
    let code = err.code().map(str::to_owned);
    ProviderError::new(code, DisplayErrorContext(&err).to_string())
}
