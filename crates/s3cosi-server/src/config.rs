use std::{path::PathBuf, time::Duration};

use clap::{Parser, ValueEnum};
use s3cosi_client::AwsClientOptions;

use crate::resolver::SecretRef;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Backend {
    Aws,
    Memory,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    Text,
    Json,
}

#[derive(Debug, Parser)]
#[command(name = "s3cosi", about = "S3/IAM bucket provisioning driver")]
pub struct Cli {
    #[arg(long, env = "S3COSI_HOST", default_value = "0.0.0.0")]
    pub host: String,

    #[arg(long, env = "S3COSI_PORT", default_value = "9100")]
    pub port: u16,

    #[arg(long, env = "S3COSI_DRIVER_NAME", default_value = "s3.cosi.maxio.io")]
    pub driver_name: String,

    #[arg(long, env = "S3COSI_SECRETS_DIR", default_value = "./secrets")]
    pub secrets_dir: PathBuf,

    #[arg(long, env = "S3COSI_DEFAULT_SECRET_NAME")]
    pub default_secret_name: Option<String>,

    #[arg(long, env = "S3COSI_DEFAULT_SECRET_NAMESPACE", default_value = "default")]
    pub default_secret_namespace: String,

    #[arg(long, env = "S3COSI_BACKEND", value_enum, default_value_t = Backend::Aws)]
    pub backend: Backend,

    #[arg(long, env = "S3COSI_OPERATION_TIMEOUT_SECS")]
    pub operation_timeout_secs: Option<u64>,

    #[arg(long, env = "S3COSI_LOG_FORMAT", value_enum, default_value_t = LogFormat::Text)]
    pub log_format: LogFormat,
}

impl Cli {
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn default_secret(&self) -> Option<SecretRef> {
        let name = self.default_secret_name.as_deref().map(str::trim)?;
        if name.is_empty() {
            return None;
        }
        Some(SecretRef::new(name, self.default_secret_namespace.trim()))
    }

    pub fn client_options(&self) -> AwsClientOptions {
        AwsClientOptions {
            operation_timeout: self
                .operation_timeout_secs
                .filter(|secs| *secs > 0)
                .map(Duration::from_secs),
        }
    }
}
