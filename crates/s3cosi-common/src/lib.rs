pub mod action;
pub mod error;
pub mod normalize;
pub mod params;
pub mod policy;
pub mod status;
pub mod tables;
pub mod types;

pub use action::{Action, GrantStep, RevokeStep};
pub use error::{CosiError, Result};
pub use normalize::{ProviderError, normalize, settle};
pub use params::{DEFAULT_REGION, StorageEndpointParameters};
pub use policy::{BucketPolicy, policy_name};
pub use status::{Code, Failure};
pub use tables::{ErrorMapping, ErrorTable, IAM_ERRORS, S3_ERRORS};
pub use types::{CredentialBundle, ServiceType};
