pub mod aws;
pub mod factory;
pub mod memory;
pub mod traits;

pub use aws::{AwsClientFactory, AwsClientOptions, IdentityClient, ObjectStoreClient};
pub use factory::ClientFactory;
pub use memory::{MemoryBackend, MemoryClientFactory, MemoryOp};
pub use traits::{AccessKey, BucketOps, IdentityOps, ProviderResult};
