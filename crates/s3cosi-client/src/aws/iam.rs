use async_trait::async_trait;
use aws_sdk_iam::{
    Client,
    config::{BehaviorVersion, Credentials, Region},
};
use s3cosi_common::{ProviderError, Result, ServiceType, StorageEndpointParameters};
use tracing::{debug, info};

use super::{AwsClientOptions, CREDENTIALS_PROVIDER_NAME, provider_error, tls::https_client};
use crate::traits::{AccessKey, IdentityOps, ProviderResult};

#[derive(Debug, Clone)]
pub struct IdentityClient {
    client: Client,
    endpoint: String,
    debug: bool,
}

impl IdentityClient {
    pub fn new(params: &StorageEndpointParameters, options: &AwsClientOptions) -> Result<Self> {
        let endpoint = ServiceType::Identity.endpoint(params).to_string();
        let credentials = Credentials::new(
            params.access_key_id(),
            params.secret_access_key(),
            None,
            None,
            CREDENTIALS_PROVIDER_NAME,
        );

        let mut builder = aws_sdk_iam::config::Builder::new()
            .behavior_version(BehaviorVersion::latest())
            .region(Region::new(params.region().to_string()))
            .credentials_provider(credentials)
            .endpoint_url(&endpoint)
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

    fn log_call(&self, operation: &'static str, user: &str) {
        if self.debug {
            info!(operation, user, endpoint = %self.endpoint, "identity service request");
        } else {
            debug!(operation, user, endpoint = %self.endpoint, "identity service request");
        }
    }
}

#[async_trait]
impl IdentityOps for IdentityClient {
    async fn create_user(&self, user: &str) -> ProviderResult<()> {
        self.log_call("CreateUser", user);
        self.client
            .create_user()
            .user_name(user)
            .send()
            .await
            .map_err(provider_error)?;
        Ok(())
    }

    async fn get_user(&self, user: &str) -> ProviderResult<()> {
        self.log_call("GetUser", user);
        self.client
            .get_user()
            .user_name(user)
            .send()
            .await
            .map_err(provider_error)?;
        Ok(())
    }

    async fn delete_user(&self, user: &str) -> ProviderResult<()> {
        self.log_call("DeleteUser", user);
        self.client
            .delete_user()
            .user_name(user)
            .send()
            .await
            .map_err(provider_error)?;
        Ok(())
    }

    async fn put_user_policy(
        &self,
        user: &str,
        policy_name: &str,
        document: &str,
    ) -> ProviderResult<()> {
        self.log_call("PutUserPolicy", user);
        self.client
            .put_user_policy()
            .user_name(user)
            .policy_name(policy_name)
            .policy_document(document)
            .send()
            .await
            .map_err(provider_error)?;
        Ok(())
    }

    async fn delete_user_policy(&self, user: &str, policy_name: &str) -> ProviderResult<()> {
        self.log_call("DeleteUserPolicy", user);
        self.client
            .delete_user_policy()
            .user_name(user)
            .policy_name(policy_name)
            .send()
            .await
            .map_err(provider_error)?;
        Ok(())
    }

    async fn list_user_policies(&self, user: &str) -> ProviderResult<Vec<String>> {
        self.log_call("ListUserPolicies", user);
        let mut items = self
            .client
            .list_user_policies()
            .user_name(user)
            .into_paginator()
            .items()
            .send();

        let mut policies = Vec::new();
        while let Some(item) = items.next().await {
            policies.push(item.map_err(provider_error)?);
        }
        Ok(policies)
    }

    async fn create_access_key(&self, user: &str) -> ProviderResult<AccessKey> {
        self.log_call("CreateAccessKey", user);
        let output = self
            .client
            .create_access_key()
            .user_name(user)
            .send()
            .await
            .map_err(provider_error)?;
        let key = output.access_key().ok_or_else(|| {
            ProviderError::without_code("CreateAccessKey response did not include a key")
        })?;

        Ok(AccessKey {
            access_key_id: key.access_key_id().to_string(),
            secret_access_key: key.secret_access_key().to_string(),
        })
    }

    async fn list_access_keys(&self, user: &str) -> ProviderResult<Vec<String>> {
        self.log_call("ListAccessKeys", user);
        let mut items = self
            .client
            .list_access_keys()
            .user_name(user)
            .into_paginator()
            .items()
            .send();

        let mut keys = Vec::new();
        while let Some(item) = items.next().await {
            let metadata = item.map_err(provider_error)?;
            if let Some(access_key_id) = metadata.access_key_id() {
                keys.push(access_key_id.to_string());
            }
        }
        Ok(keys)
    }

    async fn delete_access_key(&self, user: &str, access_key_id: &str) -> ProviderResult<()> {
        self.log_call("DeleteAccessKey", user);
        self.client
            .delete_access_key()
            .user_name(user)
            .access_key_id(access_key_id)
            .send()
            .await
            .map_err(provider_error)?;
        Ok(())
    }
}
