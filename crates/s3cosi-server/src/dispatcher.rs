use std::{collections::HashMap, sync::Arc};

use s3cosi_client::ClientFactory;
use s3cosi_common::{CosiError, Failure, Result, StorageEndpointParameters};
use s3cosi_provisioner::{AccessManager, BucketManager};
use tracing::{error, info};

use crate::{
    resolver::ParameterResolver,
    types::{
        CreateBucketRequest, CreateBucketResponse, DeleteBucketRequest, DriverInfo,
        GrantBucketAccessRequest, GrantBucketAccessResponse, RevokeBucketAccessRequest,
    },
};

pub const RESOLVE_FAILURE_MESSAGE: &str = "failed to resolve storage parameters";
pub const CLIENT_FAILURE_MESSAGE: &str = "failed to initialize storage client";

pub struct Dispatcher {
    driver_name: String,
    resolver: Arc<dyn ParameterResolver>,
    clients: Arc<dyn ClientFactory>,
}

impl Dispatcher {
    pub fn new(
        driver_name: impl Into<String>,
        resolver: Arc<dyn ParameterResolver>,
        clients: Arc<dyn ClientFactory>,
    ) -> Result<Self> {
        let driver_name = driver_name.into();
        if driver_name.trim().is_empty() {
            return Err(CosiError::InvalidParameters(
                "driver name must not be empty".to_string(),
            ));
        }
        Ok(Self {
            driver_name,
            resolver,
            clients,
        })
    }

    pub fn driver_info(&self) -> DriverInfo {
        DriverInfo {
            name: self.driver_name.clone(),
        }
    }

    pub async fn create_bucket(
        &self,
        request: CreateBucketRequest,
    ) -> std::result::Result<CreateBucketResponse, Failure> {
        require("bucket name", &request.name)?;
        let params = self.resolve("CreateBucket", &request.parameters).await?;
        let client = self
            .clients
            .bucket_client(&params)
            .map_err(|err| client_failure("CreateBucket", &err))?;

        let bucket_id = BucketManager::new(client)
            .create_bucket(&request.name, &params)
            .await?;
        Ok(CreateBucketResponse { bucket_id })
    }

    pub async fn delete_bucket(
        &self,
        request: DeleteBucketRequest,
    ) -> std::result::Result<(), Failure> {
        require("bucket id", &request.bucket_id)?;
        let params = self.resolve("DeleteBucket", &request.delete_context).await?;
        let client = self
            .clients
            .bucket_client(&params)
            .map_err(|err| client_failure("DeleteBucket", &err))?;

        BucketManager::new(client)
            .delete_bucket(&request.bucket_id)
            .await
    }

    pub async fn grant_bucket_access(
        &self,
        request: GrantBucketAccessRequest,
    ) -> std::result::Result<GrantBucketAccessResponse, Failure> {
        require("bucket id", &request.bucket_id)?;
        require("account name", &request.account_name)?;
        let params = self
            .resolve("GrantBucketAccess", &request.parameters)
            .await?;
        let client = self
            .clients
            .identity_client(&params)
            .map_err(|err| client_failure("GrantBucketAccess", &err))?;

        let credentials = AccessManager::new(client)
            .grant(&request.bucket_id, &request.account_name, &params)
            .await?;
        Ok(GrantBucketAccessResponse {
            account_id: request.account_name,
            credentials,
        })
    }

    pub async fn revoke_bucket_access(
        &self,
        request: RevokeBucketAccessRequest,
    ) -> std::result::Result<(), Failure> {
        require("bucket id", &request.bucket_id)?;
        require("account id", &request.account_id)?;
        let params = self
            .resolve("RevokeBucketAccess", &request.revoke_access_context)
            .await?;
        let client = self
            .clients
            .identity_client(&params)
            .map_err(|err| client_failure("RevokeBucketAccess", &err))?;

        AccessManager::new(client)
            .revoke(&request.bucket_id, &request.account_id)
            .await
    }

    async fn resolve(
        &self,
        operation: &'static str,
        parameters: &HashMap<String, String>,
    ) -> std::result::Result<StorageEndpointParameters, Failure> {
        let params = self.resolver.resolve(parameters).await.map_err(|err| {
            error!(
                operation,
                code = %err.code(),
                error = %err,
                "failed to resolve storage parameters"
            );
            Failure::internal(RESOLVE_FAILURE_MESSAGE)
        })?;
        info!(
            operation,
            endpoint = %params.endpoint(),
            region = %params.region(),
            "storage parameters resolved"
        );
        Ok(params)
    }
}

fn require(what: &str, value: &str) -> std::result::Result<(), Failure> {
    if value.trim().is_empty() {
        return Err(Failure::invalid_argument(format!("{what} is required")));
    }
    Ok(())
}

fn client_failure(operation: &'static str, err: &CosiError) -> Failure {
    error!(
        operation,
        code = %err.code(),
        error = %err,
        "failed to initialize storage client"
    );
    Failure::internal(CLIENT_FAILURE_MESSAGE)
}
