use std::{collections::HashMap, sync::LazyLock};

use crate::status::Code;

pub const RESOURCE_SLOT: &str = "{resource}";

#[derive(Debug, Clone, Copy)]
pub struct ErrorMapping {
    pub code: Code,
    pub log_message: &'static str,
    pub client_message: Option<&'static str>,
}

impl ErrorMapping {
    const fn new(code: Code, log_message: &'static str, client_message: &'static str) -> Self {
        Self {
            code,
            log_message,
            client_message: Some(client_message),
        }
    }

    const fn log_only(code: Code, log_message: &'static str) -> Self {
        Self {
            code,
            log_message,
            client_message: None,
        }
    }

    pub fn client_message(&self, resource: &str) -> String {
        match self.client_message {
            Some(template) => template.replace(RESOURCE_SLOT, resource),
            None => self.log_message.to_string(),
        }
    }
}

#[derive(Debug)]
pub struct ErrorTable {
    service: &'static str,
    entries: HashMap<&'static str, ErrorMapping>,
}

impl ErrorTable {
    fn new(service: &'static str, entries: &[(&'static str, ErrorMapping)]) -> Self {
        Self {
            service,
            entries: entries.iter().copied().collect(),
        }
    }

    pub fn service(&self) -> &'static str {
        self.service
    }

    pub fn get(&self, provider_code: &str) -> Option<&ErrorMapping> {
        self.entries.get(provider_code)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &ErrorMapping)> {
        self.entries.iter().map(|(code, mapping)| (*code, mapping))
    }
}

pub static S3_ERRORS: LazyLock<ErrorTable> = LazyLock::new(|| {
    use Code::*;
    ErrorTable::new(
        "s3",
        &[
            (
                "BucketAlreadyOwnedByYou",
                ErrorMapping::log_only(Ok, "bucket already exists and is owned by the caller"),
            ),
            (
                "BucketAlreadyExists",
                ErrorMapping::new(
                    AlreadyExists,
                    "bucket already exists with a different owner or parameters",
                    "bucket {resource} already exists with different parameters",
                ),
            ),
            (
                "NoSuchBucket",
                ErrorMapping::new(NotFound, "bucket does not exist", "bucket {resource} not found"),
            ),
            (
                "NotFound",
                ErrorMapping::new(NotFound, "resource does not exist", "bucket {resource} not found"),
            ),
            (
                "BucketNotEmpty",
                ErrorMapping::new(
                    FailedPrecondition,
                    "bucket still contains objects",
                    "bucket {resource} is not empty",
                ),
            ),
            (
                "InvalidBucketName",
                ErrorMapping::new(
                    InvalidArgument,
                    "bucket name rejected by the object store",
                    "bucket name {resource} is not valid",
                ),
            ),
            (
                "InvalidLocationConstraint",
                ErrorMapping::new(
                    InvalidArgument,
                    "location constraint rejected by the object store",
                    "invalid region for bucket {resource}",
                ),
            ),
            (
                "IllegalLocationConstraintException",
                ErrorMapping::new(
                    InvalidArgument,
                    "location constraint does not match the endpoint region",
                    "invalid region for bucket {resource}",
                ),
            ),
            (
                "InvalidArgument",
                ErrorMapping::new(
                    InvalidArgument,
                    "object store rejected a request argument",
                    "invalid argument for bucket {resource}",
                ),
            ),
            (
                "TooManyBuckets",
                ErrorMapping::new(
                    ResourceExhausted,
                    "bucket quota exceeded",
                    "cannot create bucket {resource}: bucket limit reached",
                ),
            ),
            (
                "AccessDenied",
                ErrorMapping::new(
                    PermissionDenied,
                    "object store denied access",
                    "access denied for bucket {resource}",
                ),
            ),
            (
                "AllAccessDisabled",
                ErrorMapping::new(
                    PermissionDenied,
                    "all access to the resource has been disabled",
                    "access denied for bucket {resource}",
                ),
            ),
            (
                "InvalidAccessKeyId",
                ErrorMapping::log_only(
                    Unauthenticated,
                    "object store does not recognize the configured access key",
                ),
            ),
            (
                "SignatureDoesNotMatch",
                ErrorMapping::log_only(
                    Unauthenticated,
                    "object store rejected the request signature",
                ),
            ),
            (
                "ExpiredToken",
                ErrorMapping::log_only(Unauthenticated, "object store credentials have expired"),
            ),
            (
                "OperationAborted",
                ErrorMapping::new(
                    Unavailable,
                    "a conflicting operation is in progress",
                    "a conflicting operation is in progress on bucket {resource}",
                ),
            ),
            (
                "SlowDown",
                ErrorMapping::new(
                    ResourceExhausted,
                    "object store is throttling requests",
                    "request rate exceeded for bucket {resource}",
                ),
            ),
            (
                "ServiceUnavailable",
                ErrorMapping::log_only(Unavailable, "object store is unavailable"),
            ),
            (
                "RequestTimeout",
                ErrorMapping::new(
                    DeadlineExceeded,
                    "object store request timed out",
                    "request for bucket {resource} timed out",
                ),
            ),
            (
                "InternalError",
                ErrorMapping::log_only(Internal, "object store reported an internal error"),
            ),
            (
                "NotImplemented",
                ErrorMapping::log_only(
                    Unimplemented,
                    "object store does not implement the requested operation",
                ),
            ),
        ],
    )
});

pub static IAM_ERRORS: LazyLock<ErrorTable> = LazyLock::new(|| {
    use Code::*;
    ErrorTable::new(
        "iam",
        &[
            (
                "EntityAlreadyExists",
                ErrorMapping::new(
                    AlreadyExists,
                    "identity entity already exists",
                    "user {resource} already exists",
                ),
            ),
            (
                "NoSuchEntity",
                ErrorMapping::new(
                    NotFound,
                    "identity entity does not exist",
                    "user {resource} not found",
                ),
            ),
            (
                "LimitExceeded",
                ErrorMapping::new(
                    ResourceExhausted,
                    "identity service quota exceeded",
                    "limit exceeded for user {resource}",
                ),
            ),
            (
                "InvalidInput",
                ErrorMapping::new(
                    InvalidArgument,
                    "identity service rejected a request argument",
                    "invalid input for user {resource}",
                ),
            ),
            (
                "MalformedPolicyDocument",
                ErrorMapping::new(
                    InvalidArgument,
                    "identity service rejected the policy document",
                    "invalid policy document for user {resource}",
                ),
            ),
            (
                "DeleteConflict",
                ErrorMapping::new(
                    FailedPrecondition,
                    "entity still has attached resources",
                    "user {resource} still has attached resources",
                ),
            ),
            (
                "UnmodifiableEntity",
                ErrorMapping::new(
                    FailedPrecondition,
                    "entity cannot be modified",
                    "user {resource} cannot be modified",
                ),
            ),
            (
                "ConcurrentModification",
                ErrorMapping::new(
                    Unavailable,
                    "entity is being modified concurrently",
                    "user {resource} is being modified concurrently",
                ),
            ),
            (
                "AccessDenied",
                ErrorMapping::new(
                    PermissionDenied,
                    "identity service denied access",
                    "access denied for user {resource}",
                ),
            ),
            (
                "InvalidClientTokenId",
                ErrorMapping::log_only(
                    Unauthenticated,
                    "identity service does not recognize the configured access key",
                ),
            ),
            (
                "SignatureDoesNotMatch",
                ErrorMapping::log_only(
                    Unauthenticated,
                    "identity service rejected the request signature",
                ),
            ),
            (
                "ExpiredToken",
                ErrorMapping::log_only(
                    Unauthenticated,
                    "identity service credentials have expired",
                ),
            ),
            (
                "Throttling",
                ErrorMapping::new(
                    ResourceExhausted,
                    "identity service is throttling requests",
                    "request rate exceeded for user {resource}",
                ),
            ),
            (
                "RequestExpired",
                ErrorMapping::new(
                    DeadlineExceeded,
                    "identity service request expired",
                    "request for user {resource} timed out",
                ),
            ),
            (
                "ServiceUnavailable",
                ErrorMapping::log_only(Unavailable, "identity service is unavailable"),
            ),
            (
                "ServiceFailure",
                ErrorMapping::log_only(Internal, "identity service reported an internal error"),
            ),
            (
                "NotImplemented",
                ErrorMapping::log_only(
                    Unimplemented,
                    "identity service does not implement the requested operation",
                ),
            ),
        ],
    )
});

#[cfg(test)]
mod tests {
    use super::{IAM_ERRORS, S3_ERRORS};
    use crate::status::Code;

    #[test]
    fn client_messages_name_the_resource() {
        let mapping = S3_ERRORS.get("BucketAlreadyExists").expect("mapping");
        assert_eq!(
            mapping.client_message("photos"),
            "bucket photos already exists with different parameters"
        );

        let mapping = IAM_ERRORS.get("ServiceFailure").expect("mapping");
        assert_eq!(
            mapping.client_message("alice"),
            "identity service reported an internal error"
        );
    }

    #[test]
    fn only_owned_bucket_is_a_noop() {
        let noops = S3_ERRORS
            .iter()
            .chain(IAM_ERRORS.iter())
            .filter(|(_, mapping)| mapping.code == Code::Ok)
            .map(|(code, _)| code)
            .collect::<Vec<_>>();
        assert_eq!(noops, vec!["BucketAlreadyOwnedByYou"]);
    }

    #[test]
    fn templates_have_a_single_slot() {
        for (code, mapping) in S3_ERRORS.iter().chain(IAM_ERRORS.iter()) {
            if let Some(template) = mapping.client_message {
                assert_eq!(
                    template.matches(super::RESOURCE_SLOT).count(),
                    1,
                    "template for {code}"
                );
            }
        }
    }
}
