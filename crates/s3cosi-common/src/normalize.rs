use thiserror::Error;
use tracing::{debug, error, info, warn};

use crate::{
    action::Action,
    status::{Code, Failure},
    tables::ErrorTable,
};

/// Message returned when a provider error cannot be classified. Provider
/// detail only ever goes to the log.
pub const GENERIC_INTERNAL_MESSAGE: &str =
    "an internal error occurred while contacting the storage provider";

pub const RESOURCE_ABSENT_CODES: [&str; 3] = ["NoSuchBucket", "NoSuchEntity", "NotFound"];

#[derive(Debug, Clone, Error)]
#[error("{detail}")]
pub struct ProviderError {
    code: Option<String>,
    detail: String,
}

impl ProviderError {
    pub fn new(code: Option<String>, detail: impl Into<String>) -> Self {
        Self {
            code,
            detail: detail.into(),
        }
    }

    pub fn with_code(code: impl Into<String>, detail: impl Into<String>) -> Self {
        Self::new(Some(code.into()), detail)
    }

    pub fn without_code(detail: impl Into<String>) -> Self {
        Self::new(None, detail)
    }

    pub fn code(&self) -> Option<&str> {
        self.code
            .as_deref()
            .map(str::trim)
            .filter(|code| !code.is_empty())
    }

    pub fn detail(&self) -> &str {
        &self.detail
    }
}

pub fn is_resource_absent(provider_code: &str) -> bool {
    RESOURCE_ABSENT_CODES.contains(&provider_code)
}

/// Maps a provider error onto the canonical outcome space.
///
/// `Ok(())` means the error denotes a state the caller already wanted (an
/// idempotent no-op). Total over its inputs.
pub fn normalize(
    action: Action,
    resource: &str,
    err: &ProviderError,
    table: &ErrorTable,
) -> Result<(), Failure> {
    let Some(provider_code) = err.code() else {
        error!(
            action = %action,
            resource,
            service = table.service(),
            error = %err,
            "provider error without an error code"
        );
        return Err(Failure::internal(GENERIC_INTERNAL_MESSAGE));
    };

    if is_resource_absent(provider_code) {
        if action.tolerates_absence() {
            debug!(
                action = %action,
                resource,
                provider_code,
                "resource already absent"
            );
            return Ok(());
        }
        warn!(
            action = %action,
            resource,
            provider_code,
            error = %err,
            "resource not found"
        );
        return Err(Failure::new(
            Code::NotFound,
            format!("{} {resource} not found", action.resource_kind()),
        ));
    }

    let Some(mapping) = table.get(provider_code) else {
        error!(
            action = %action,
            resource,
            service = table.service(),
            provider_code,
            error = %err,
            "unmapped provider error code"
        );
        return Err(Failure::internal(format!("failed to {action}")));
    };

    if mapping.code == Code::Ok {
        info!(action = %action, resource, provider_code, "{}", mapping.log_message);
        return Ok(());
    }

    warn!(
        action = %action,
        resource,
        provider_code,
        code = %mapping.code,
        error = %err,
        "{}",
        mapping.log_message
    );
    Err(Failure::new(mapping.code, mapping.client_message(resource)))
}

/// Resolves a provider call result. `Ok(None)` is an error normalized to
/// success, `Err` is a normalized failure.
pub fn settle<T>(
    result: Result<T, ProviderError>,
    action: Action,
    resource: &str,
    table: &ErrorTable,
) -> Result<Option<T>, Failure> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(err) => normalize(action, resource, &err, table).map(|()| None),
    }
}

#[cfg(test)]
mod tests {
    use super::{GENERIC_INTERNAL_MESSAGE, ProviderError, normalize, settle};
    use crate::{
        action::{Action, GrantStep, RevokeStep},
        status::{Code, Failure},
        tables::{IAM_ERRORS, S3_ERRORS},
    };

    const ALL_ACTIONS: [Action; 13] = [
        Action::CreateBucket,
        Action::DeleteBucket,
        Action::GrantAccess(GrantStep::CreateUser),
        Action::GrantAccess(GrantStep::ListUserPolicies),
        Action::GrantAccess(GrantStep::ListAccessKeys),
        Action::GrantAccess(GrantStep::DeleteStaleAccessKey),
        Action::GrantAccess(GrantStep::PutUserPolicy),
        Action::GrantAccess(GrantStep::CreateAccessKey),
        Action::RevokeAccess(RevokeStep::GetUser),
        Action::RevokeAccess(RevokeStep::DeleteUserPolicy),
        Action::RevokeAccess(RevokeStep::ListAccessKeys),
        Action::RevokeAccess(RevokeStep::DeleteAccessKey),
        Action::RevokeAccess(RevokeStep::DeleteUser),
    ];

    #[test]
    fn every_table_entry_yields_its_code() {
        for table in [&*S3_ERRORS, &*IAM_ERRORS] {
            for (provider_code, mapping) in table.iter() {
                let err = ProviderError::with_code(provider_code, "raw");
                let outcome = normalize(Action::CreateBucket, "b1", &err, table);
                match mapping.code {
                    Code::Ok => assert_eq!(outcome, Ok(()), "{provider_code}"),
                    expected => {
                        let failure = outcome.expect_err(provider_code);
                        assert_eq!(failure.code, expected, "{provider_code}");
                    }
                }
            }
        }
    }

    #[test]
    fn unknown_code_is_internal() {
        for action in ALL_ACTIONS {
            let err = ProviderError::with_code("SomethingNobodyHeardOf", "raw");
            let failure = normalize(action, "b1", &err, &S3_ERRORS).expect_err("failure");
            assert_eq!(failure.code, Code::Internal);
            assert_eq!(failure.message, format!("failed to {action}"));
        }
    }

    #[test]
    fn missing_code_never_leaks_detail() {
        let err = ProviderError::without_code("dispatch failure: connection refused to 10.0.0.7");
        let failure = normalize(Action::DeleteBucket, "b1", &err, &S3_ERRORS).expect_err("failure");
        assert_eq!(failure, Failure::internal(GENERIC_INTERNAL_MESSAGE));

        let blank = ProviderError::with_code("  ", "raw");
        let failure = normalize(Action::CreateBucket, "b1", &blank, &S3_ERRORS).expect_err("failure");
        assert_eq!(failure.message, GENERIC_INTERNAL_MESSAGE);
    }

    #[test]
    fn absence_is_success_only_for_deletes() {
        for provider_code in super::RESOURCE_ABSENT_CODES {
            let err = ProviderError::with_code(provider_code, "raw");
            for action in ALL_ACTIONS {
                let outcome = normalize(action, "b1", &err, &IAM_ERRORS);
                if matches!(
                    action,
                    Action::DeleteBucket
                        | Action::RevokeAccess(_)
                        | Action::GrantAccess(GrantStep::DeleteStaleAccessKey)
                ) {
                    assert_eq!(outcome, Ok(()), "{provider_code} / {action}");
                } else {
                    let failure = outcome.expect_err("failure");
                    assert_eq!(failure.code, Code::NotFound, "{provider_code} / {action}");
                }
            }
        }
    }

    #[test]
    fn not_found_override_names_the_resource() {
        // "NotFound" is absent from the IAM table; the override still applies.
        let err = ProviderError::with_code("NotFound", "raw");
        let failure = normalize(
            Action::GrantAccess(GrantStep::PutUserPolicy),
            "alice",
            &err,
            &IAM_ERRORS,
        )
        .expect_err("failure");
        assert_eq!(failure, Failure::new(Code::NotFound, "user alice not found"));
    }

    #[test]
    fn owned_bucket_is_success() {
        let err = ProviderError::with_code("BucketAlreadyOwnedByYou", "raw");
        assert_eq!(normalize(Action::CreateBucket, "b1", &err, &S3_ERRORS), Ok(()));

        let err = ProviderError::with_code("BucketAlreadyExists", "raw");
        let failure = normalize(Action::CreateBucket, "b1", &err, &S3_ERRORS).expect_err("failure");
        assert_eq!(failure.code, Code::AlreadyExists);
        assert!(failure.message.contains("b1"));
    }

    #[test]
    fn settle_distinguishes_value_noop_and_failure() {
        let ok: Result<u8, ProviderError> = Ok(7);
        assert_eq!(settle(ok, Action::DeleteBucket, "b1", &S3_ERRORS), Ok(Some(7)));

        let absent: Result<u8, ProviderError> = Err(ProviderError::with_code("NoSuchBucket", "raw"));
        assert_eq!(settle(absent, Action::DeleteBucket, "b1", &S3_ERRORS), Ok(None));

        let denied: Result<u8, ProviderError> = Err(ProviderError::with_code("AccessDenied", "raw"));
        let failure = settle(denied, Action::DeleteBucket, "b1", &S3_ERRORS).expect_err("failure");
        assert_eq!(failure.code, Code::PermissionDenied);
    }
}
