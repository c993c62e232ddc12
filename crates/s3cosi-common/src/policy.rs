use serde::Serialize;

use crate::error::{CosiError, Result};

pub const POLICY_VERSION: &str = "2012-10-17";
pub const POLICY_NAME_SUFFIX: &str = "-cosi-ba";

pub fn policy_name(bucket: &str) -> String {
    format!("{bucket}{POLICY_NAME_SUFFIX}")
}

#[derive(Debug, Clone, Serialize)]
pub struct BucketPolicy {
    #[serde(rename = "Version")]
    version: &'static str,
    #[serde(rename = "Statement")]
    statements: Vec<PolicyStatement>,
}

#[derive(Debug, Clone, Serialize)]
struct PolicyStatement {
    #[serde(rename = "Effect")]
    effect: Effect,
    #[serde(rename = "Action")]
    action: &'static str,
    #[serde(rename = "Resource")]
    resources: Vec<String>,
}

#[derive(Debug, Clone, Copy, Serialize)]
enum Effect {
    Allow,
}

impl BucketPolicy {
    /// Full object-storage privileges on the bucket and every key in it.
    pub fn full_access(bucket: &str) -> Self {
        Self {
            version: POLICY_VERSION,
            statements: vec![PolicyStatement {
                effect: Effect::Allow,
                action: "s3:*",
                resources: vec![
                    format!("arn:aws:s3:::{bucket}"),
                    format!("arn:aws:s3:::{bucket}/*"),
                ],
            }],
        }
    }

    pub fn to_document(&self) -> Result<String> {
        serde_json::to_string(self).map_err(|err| {
            CosiError::InternalError(format!("failed to serialize bucket policy: {err}"))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::{BucketPolicy, policy_name};

    #[test]
    fn document_matches_wire_format() {
        let document = BucketPolicy::full_access("b1").to_document().expect("document");
        assert_eq!(
            document,
            r#"{"Version":"2012-10-17","Statement":[{"Effect":"Allow","Action":"s3:*","Resource":["arn:aws:s3:::b1","arn:aws:s3:::b1/*"]}]}"#
        );
    }

    #[test]
    fn policy_name_is_derived_from_bucket() {
        assert_eq!(policy_name("photos"), "photos-cosi-ba");
    }
}
