use std::{collections::HashMap, sync::Arc};

use async_trait::async_trait;
use s3cosi_common::{CosiError, Result, StorageEndpointParameters};
use tracing::{debug, warn};

use crate::secrets::SecretStore;

pub const PARAM_SECRET_NAME: &str = "objectStorageSecretName";
pub const PARAM_SECRET_NAMESPACE: &str = "objectStorageSecretNamespace";

#[async_trait]
pub trait ParameterResolver: Send + Sync {
    async fn resolve(
        &self,
        parameters: &HashMap<String, String>,
    ) -> Result<StorageEndpointParameters>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SecretRef {
    pub name: String,
    pub namespace: String,
}

impl SecretRef {
    pub fn new(name: impl Into<String>, namespace: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            namespace: namespace.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum SecretSource {
    Request(SecretRef),
    Default(SecretRef),
}

/// Resolves parameters from the secret named in the request, or from the
/// configured default secret when the request names none (delete and revoke
/// requests carry no parameters of their own).
pub struct SecretParameterResolver {
    store: Arc<dyn SecretStore>,
    default_secret: Option<SecretRef>,
}

impl SecretParameterResolver {
    pub fn new(store: Arc<dyn SecretStore>, default_secret: Option<SecretRef>) -> Self {
        Self {
            store,
            default_secret,
        }
    }

    fn secret_ref(&self, parameters: &HashMap<String, String>) -> Result<SecretSource> {
        let get = |key: &str| {
            parameters
                .get(key)
                .map(|value| value.trim())
                .filter(|value| !value.is_empty())
        };

        match (get(PARAM_SECRET_NAME), get(PARAM_SECRET_NAMESPACE)) {
            (Some(name), Some(namespace)) => {
                Ok(SecretSource::Request(SecretRef::new(name, namespace)))
            }
            (None, None) => self
                .default_secret
                .clone()
                .map(SecretSource::Default)
                .ok_or_else(|| CosiError::MissingParameter(PARAM_SECRET_NAME.to_string())),
            (Some(_), None) => Err(CosiError::MissingParameter(
                PARAM_SECRET_NAMESPACE.to_string(),
            )),
            (None, Some(_)) => Err(CosiError::MissingParameter(PARAM_SECRET_NAME.to_string())),
        }
    }
}

#[async_trait]
impl ParameterResolver for SecretParameterResolver {
    async fn resolve(
        &self,
        parameters: &HashMap<String, String>,
    ) -> Result<StorageEndpointParameters> {
        let secret = match self.secret_ref(parameters)? {
            SecretSource::Request(secret) => secret,
            // A bucket created through another secret is invisible here, so a
            // delete resolved this way reports an absent bucket as done.
            SecretSource::Default(secret) => {
                warn!(
                    secret = %secret.name,
                    namespace = %secret.namespace,
                    "request names no storage secret, using the default"
                );
                secret
            }
        };
        debug!(secret = %secret.name, namespace = %secret.namespace, "resolving storage parameters");

        let data = self.store.get_secret(&secret.name, &secret.namespace).await?;
        StorageEndpointParameters::from_secret_data(&data)
    }
}
