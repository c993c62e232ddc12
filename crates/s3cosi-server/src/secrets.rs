use std::{
    collections::HashMap,
    path::{Path, PathBuf},
};

use async_trait::async_trait;
use s3cosi_common::{CosiError, Result};
use serde_json::Value;
use tokio::fs;

#[async_trait]
pub trait SecretStore: Send + Sync {
    async fn get_secret(&self, name: &str, namespace: &str) -> Result<HashMap<String, String>>;
}

/// Secrets stored as `<root>/<namespace>/<name>.json`, each a flat JSON object.
#[derive(Debug, Clone)]
pub struct FileSecretStore {
    root: PathBuf,
}

impl FileSecretStore {
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    fn secret_path(&self, name: &str, namespace: &str) -> Result<PathBuf> {
        validate_component("secret namespace", namespace)?;
        validate_component("secret name", name)?;
        Ok(self.root.join(namespace).join(format!("{name}.json")))
    }
}

#[async_trait]
impl SecretStore for FileSecretStore {
    async fn get_secret(&self, name: &str, namespace: &str) -> Result<HashMap<String, String>> {
        let path = self.secret_path(name, namespace)?;
        let bytes = match fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                return Err(CosiError::SecretNotFound {
                    name: name.to_string(),
                    namespace: namespace.to_string(),
                });
            }
            Err(err) => return Err(err.into()),
        };

        let entries: HashMap<String, Value> = serde_json::from_slice(&bytes).map_err(|err| {
            CosiError::SecretStore(format!("failed to parse secret {namespace}/{name}: {err}"))
        })?;

        entries
            .into_iter()
            .map(|(key, value)| {
                let value = match value {
                    Value::String(value) => value,
                    Value::Bool(value) => value.to_string(),
                    Value::Number(value) => value.to_string(),
                    _ => {
                        return Err(CosiError::SecretStore(format!(
                            "secret {namespace}/{name} key {key} must be a scalar"
                        )));
                    }
                };
                Ok((key, value))
            })
            .collect()
    }
}

fn validate_component(what: &str, value: &str) -> Result<()> {
    let valid = !value.is_empty()
        && value != "."
        && value != ".."
        && !value.contains(['/', '\\']);
    if valid {
        Ok(())
    } else {
        Err(CosiError::InvalidParameters(format!("invalid {what}: {value:?}")))
    }
}

#[cfg(test)]
mod tests {
    use s3cosi_common::CosiError;

    use super::{FileSecretStore, SecretStore};

    #[tokio::test]
    async fn reads_flat_json_secret() {
        let dir = tempfile::tempdir().expect("tempdir");
        std::fs::create_dir_all(dir.path().join("storage")).expect("mkdir");
        std::fs::write(
            dir.path().join("storage/s3-admin.json"),
            r#"{"accessKeyId":"AK","secretAccessKey":"SK","endpoint":"http://localhost:9000","debug":true}"#,
        )
        .expect("write");

        let store = FileSecretStore::new(dir.path());
        let data = store.get_secret("s3-admin", "storage").await.expect("secret");
        assert_eq!(data.get("accessKeyId").map(String::as_str), Some("AK"));
        assert_eq!(data.get("debug").map(String::as_str), Some("true"));
    }

    #[tokio::test]
    async fn missing_secret_is_reported_by_name() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = FileSecretStore::new(dir.path());

        let err = store.get_secret("absent", "storage").await.expect_err("missing");
        assert!(matches!(
            err,
            CosiError::SecretNotFound { ref name, ref namespace } if name == "absent" && namespace == "storage"
        ));
    }

    #[tokio::test]
    async fn rejects_path_traversal() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = FileSecretStore::new(dir.path());

        for (name, namespace) in [("../etc", "storage"), ("s3", ".."), ("s3", "")] {
            let err = store.get_secret(name, namespace).await.expect_err("invalid");
            assert!(matches!(err, CosiError::InvalidParameters(_)));
        }
    }

    #[tokio::test]
    async fn rejects_nested_values() {
        let dir = tempfile::tempdir().expect("tempdir");
        std::fs::create_dir_all(dir.path().join("storage")).expect("mkdir");
        std::fs::write(dir.path().join("storage/bad.json"), r#"{"endpoint":{"url":"x"}}"#)
            .expect("write");

        let store = FileSecretStore::new(dir.path());
        let err = store.get_secret("bad", "storage").await.expect_err("nested");
        assert!(matches!(err, CosiError::SecretStore(_)));
    }
}
