use std::fmt;

use serde::Serialize;

use crate::params::StorageEndpointParameters;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServiceType {
    ObjectStore,
    Identity,
}

impl ServiceType {
    pub fn endpoint<'a>(&self, params: &'a StorageEndpointParameters) -> &'a str {
        match self {
            Self::ObjectStore => params.endpoint(),
            Self::Identity => params.identity_endpoint(),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ObjectStore => "object-store",
            Self::Identity => "identity",
        }
    }
}

impl fmt::Display for ServiceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CredentialBundle {
    pub access_key_id: String,
    pub secret_access_key: String,
    pub endpoint: String,
    pub region: String,
}

impl fmt::Debug for CredentialBundle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CredentialBundle")
            .field("access_key_id", &self.access_key_id)
            .field("secret_access_key", &"<redacted>")
            .field("endpoint", &self.endpoint)
            .field("region", &self.region)
            .finish()
    }
}
