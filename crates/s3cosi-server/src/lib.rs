pub mod config;
pub mod dispatcher;
pub mod error;
pub mod resolver;
pub mod router;
pub mod secrets;
pub mod types;

pub use dispatcher::Dispatcher;
pub use resolver::{ParameterResolver, SecretParameterResolver, SecretRef};
pub use secrets::{FileSecretStore, SecretStore};
