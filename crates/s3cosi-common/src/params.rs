use std::{collections::HashMap, fmt};

use url::Url;

use crate::error::{CosiError, Result};

pub const DEFAULT_REGION: &str = "us-east-1";

pub const KEY_ACCESS_KEY_ID: &str = "accessKeyId";
pub const KEY_SECRET_ACCESS_KEY: &str = "secretAccessKey";
pub const KEY_ENDPOINT: &str = "endpoint";
pub const KEY_REGION: &str = "region";
pub const KEY_IAM_ENDPOINT: &str = "iamEndpoint";
pub const KEY_TLS_CERT: &str = "tlsCert";
pub const KEY_DEBUG: &str = "debug";

#[derive(Clone)]
pub struct StorageEndpointParameters {
    access_key_id: String,
    secret_access_key: String,
    endpoint: String,
    region: String,
    identity_endpoint: Option<String>,
    tls_trust: Option<Vec<u8>>,
    debug: bool,
}

impl StorageEndpointParameters {
    pub fn new(
        access_key_id: impl Into<String>,
        secret_access_key: impl Into<String>,
        endpoint: impl Into<String>,
    ) -> Result<Self> {
        let access_key_id = access_key_id.into();
        let secret_access_key = secret_access_key.into();
        let endpoint = endpoint.into();

        if access_key_id.trim().is_empty() {
            return Err(CosiError::MissingParameter(KEY_ACCESS_KEY_ID.to_string()));
        }
        if secret_access_key.trim().is_empty() {
            return Err(CosiError::MissingParameter(KEY_SECRET_ACCESS_KEY.to_string()));
        }
        validate_endpoint(KEY_ENDPOINT, &endpoint)?;

        Ok(Self {
            access_key_id,
            secret_access_key,
            endpoint,
            region: DEFAULT_REGION.to_string(),
            identity_endpoint: None,
            tls_trust: None,
            debug: false,
        })
    }

    pub fn from_secret_data(data: &HashMap<String, String>) -> Result<Self> {
        let get = |key: &str| data.get(key).map(String::as_str).unwrap_or_default();

        let params = Self::new(
            get(KEY_ACCESS_KEY_ID),
            get(KEY_SECRET_ACCESS_KEY),
            get(KEY_ENDPOINT),
        )?
        .with_region(data.get(KEY_REGION).cloned())
        .with_identity_endpoint(data.get(KEY_IAM_ENDPOINT).cloned())?
        .with_tls_trust(data.get(KEY_TLS_CERT).map(|pem| pem.as_bytes().to_vec()));

        let debug = match data.get(KEY_DEBUG).map(|value| value.trim()) {
            None | Some("") => false,
            Some(value) => value.parse::<bool>().map_err(|_| {
                CosiError::InvalidParameters(format!("{KEY_DEBUG} must be true or false"))
            })?,
        };

        Ok(params.with_debug(debug))
    }

    pub fn with_region(mut self, region: Option<String>) -> Self {
        self.region = region
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
            .unwrap_or_else(|| DEFAULT_REGION.to_string());
        self
    }

    pub fn with_identity_endpoint(mut self, endpoint: Option<String>) -> Result<Self> {
        self.identity_endpoint = match endpoint.filter(|value| !value.trim().is_empty()) {
            Some(value) => {
                validate_endpoint(KEY_IAM_ENDPOINT, &value)?;
                Some(value)
            }
            None => None,
        };
        Ok(self)
    }

    pub fn with_tls_trust(mut self, pem: Option<Vec<u8>>) -> Self {
        self.tls_trust = pem.filter(|bytes| !bytes.is_empty());
        self
    }

    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    pub fn access_key_id(&self) -> &str {
        &self.access_key_id
    }

    pub fn secret_access_key(&self) -> &str {
        &self.secret_access_key
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn region(&self) -> &str {
        &self.region
    }

    /// Falls back to the object-store endpoint when no separate one is set.
    pub fn identity_endpoint(&self) -> &str {
        self.identity_endpoint.as_deref().unwrap_or(&self.endpoint)
    }

    pub fn tls_trust(&self) -> Option<&[u8]> {
        self.tls_trust.as_deref()
    }

    pub fn debug(&self) -> bool {
        self.debug
    }

    pub fn is_default_region(&self) -> bool {
        self.region == DEFAULT_REGION
    }
}

impl fmt::Debug for StorageEndpointParameters {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StorageEndpointParameters")
            .field("access_key_id", &self.access_key_id)
            .field("secret_access_key", &"<redacted>")
            .field("endpoint", &self.endpoint)
            .field("region", &self.region)
            .field("identity_endpoint", &self.identity_endpoint)
            .field("tls_trust", &self.tls_trust.as_ref().map(Vec::len))
            .field("debug", &self.debug)
            .finish()
    }
}

fn validate_endpoint(key: &str, endpoint: &str) -> Result<()> {
    if endpoint.trim().is_empty() {
        return Err(CosiError::MissingParameter(key.to_string()));
    }
    let url = Url::parse(endpoint)
        .map_err(|err| CosiError::InvalidParameters(format!("{key} is not a valid URL: {err}")))?;
    match url.scheme() {
        "http" | "https" => Ok(()),
        scheme => Err(CosiError::InvalidParameters(format!(
            "{key} must use http or https, got {scheme}"
        ))),
    }
}
