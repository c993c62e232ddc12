use std::collections::HashMap;

use s3cosi_common::CredentialBundle;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize)]
pub struct DriverInfo {
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateBucketRequest {
    pub name: String,
    #[serde(default)]
    pub parameters: HashMap<String, String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateBucketResponse {
    pub bucket_id: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteBucketRequest {
    #[serde(default)]
    pub bucket_id: String,
    #[serde(default)]
    pub delete_context: HashMap<String, String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GrantBucketAccessRequest {
    #[serde(default)]
    pub bucket_id: String,
    pub account_name: String,
    #[serde(default)]
    pub parameters: HashMap<String, String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GrantBucketAccessResponse {
    pub account_id: String,
    pub credentials: CredentialBundle,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RevokeBucketAccessRequest {
    #[serde(default)]
    pub bucket_id: String,
    #[serde(default)]
    pub account_id: String,
    #[serde(default)]
    pub revoke_access_context: HashMap<String, String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct EmptyResponse {}
