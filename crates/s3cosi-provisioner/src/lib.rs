pub mod access;
pub mod bucket;

pub use access::AccessManager;
pub use bucket::BucketManager;
