use std::sync::Arc;

use clap::Parser;
use s3cosi_client::{AwsClientFactory, ClientFactory, MemoryBackend, MemoryClientFactory};
use s3cosi_server::{
    Dispatcher, FileSecretStore, SecretParameterResolver,
    config::{Backend, Cli, LogFormat},
    router::cosi_router,
};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let env_filter = EnvFilter::from_default_env().add_directive("s3cosi=info".parse()?);
    match cli.log_format {
        LogFormat::Text => tracing_subscriber::fmt().with_env_filter(env_filter).init(),
        LogFormat::Json => tracing_subscriber::fmt()
            .json()
            .with_env_filter(env_filter)
            .init(),
    }

    let clients: Arc<dyn ClientFactory> = match cli.backend {
        Backend::Aws => Arc::new(AwsClientFactory::new(cli.client_options())),
        Backend::Memory => {
            warn!("using in-memory storage backend, provisioned state is not persisted");
            Arc::new(MemoryClientFactory::new(MemoryBackend::new()))
        }
    };

    let default_secret = cli.default_secret();
    match &default_secret {
        Some(secret) => info!(
            secret = %secret.name,
            namespace = %secret.namespace,
            "default storage secret configured"
        ),
        None => warn!("no default storage secret, delete and revoke requests must name one"),
    }
    let store = Arc::new(FileSecretStore::new(&cli.secrets_dir));
    let resolver = Arc::new(SecretParameterResolver::new(store, default_secret));
    let dispatcher = Arc::new(Dispatcher::new(cli.driver_name.clone(), resolver, clients)?);

    let app = cosi_router(dispatcher);
    let addr = cli.addr();
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!(driver = %cli.driver_name, "s3cosi driver listening on {addr}");
    axum::serve(listener, app).await?;

    Ok(())
}
