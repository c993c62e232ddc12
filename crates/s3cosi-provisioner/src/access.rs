use s3cosi_client::IdentityOps;
use s3cosi_common::{
    Action, BucketPolicy, Code, CredentialBundle, Failure, GrantStep, IAM_ERRORS, RevokeStep,
    StorageEndpointParameters, policy_name, settle,
};
use tracing::{debug, info, warn};

/// Grants and revokes per-bucket credentials.
///
/// A grant is a user, an inline policy scoped to the bucket, and an access
/// key, created in that order with no rollback. An existing user is adopted
/// only when its sole inline policy is this bucket's; its old keys are then
/// replaced, so a repeated grant leaves exactly one live key.
pub struct AccessManager {
    client: Box<dyn IdentityOps>,
}

impl AccessManager {
    pub fn new(client: Box<dyn IdentityOps>) -> Self {
        Self { client }
    }

    pub async fn grant(
        &self,
        bucket: &str,
        account: &str,
        params: &StorageEndpointParameters,
    ) -> Result<CredentialBundle, Failure> {
        let create_user = self.client.create_user(account).await;
        match settle(
            create_user,
            Action::GrantAccess(GrantStep::CreateUser),
            account,
            &IAM_ERRORS,
        ) {
            Ok(_) => debug!(bucket, account, "user created"),
            Err(failure) if failure.code == Code::AlreadyExists => {
                self.adopt_existing_user(bucket, account, failure).await?;
            }
            Err(failure) => return Err(failure),
        }

        let attach = Action::GrantAccess(GrantStep::PutUserPolicy);
        let document = BucketPolicy::full_access(bucket)
            .to_document()
            .map_err(|err| {
                warn!(bucket, account, error = %err, "failed to render bucket policy");
                Failure::internal(format!("failed to {attach}"))
            })?;
        let put_policy = self
            .client
            .put_user_policy(account, &policy_name(bucket), &document)
            .await;
        settle(put_policy, attach, account, &IAM_ERRORS)?;
        debug!(bucket, account, policy = %policy_name(bucket), "bucket policy attached");

        let create_key = self.client.create_access_key(account).await;
        let action = Action::GrantAccess(GrantStep::CreateAccessKey);
        let Some(key) = settle(create_key, action, account, &IAM_ERRORS)? else {
            warn!(bucket, account, "access key request resolved without a key");
            return Err(Failure::internal(format!("failed to {action}")));
        };

        info!(bucket, account, access_key_id = %key.access_key_id, "bucket access granted");
        Ok(CredentialBundle {
            access_key_id: key.access_key_id,
            secret_access_key: key.secret_access_key,
            endpoint: params.endpoint().to_string(),
            region: params.region().to_string(),
        })
    }

    async fn adopt_existing_user(
        &self,
        bucket: &str,
        account: &str,
        exists: Failure,
    ) -> Result<(), Failure> {
        let own_policy = policy_name(bucket);
        let list_policies = self.client.list_user_policies(account).await;
        let policies = settle(
            list_policies,
            Action::GrantAccess(GrantStep::ListUserPolicies),
            account,
            &IAM_ERRORS,
        )?
        .unwrap_or_default();
        if let Some(foreign) = policies.iter().find(|name| **name != own_policy) {
            warn!(
                bucket,
                account,
                policy = %foreign,
                "user is bound to another grant, refusing to adopt"
            );
            return Err(exists);
        }

        let list_keys = self.client.list_access_keys(account).await;
        let stale_keys = settle(
            list_keys,
            Action::GrantAccess(GrantStep::ListAccessKeys),
            account,
            &IAM_ERRORS,
        )?
        .unwrap_or_default();
        for access_key_id in &stale_keys {
            let delete_key = self.client.delete_access_key(account, access_key_id).await;
            settle(
                delete_key,
                Action::GrantAccess(GrantStep::DeleteStaleAccessKey),
                account,
                &IAM_ERRORS,
            )?;
        }

        info!(
            bucket,
            account,
            replaced_keys = stale_keys.len(),
            "resuming grant for existing user"
        );
        Ok(())
    }

    /// Removes the user, its bucket policy and all of its access keys. Every
    /// step accepts an already-removed sub-resource.
    pub async fn revoke(&self, bucket: &str, account: &str) -> Result<(), Failure> {
        let get_user = self.client.get_user(account).await;
        if settle(
            get_user,
            Action::RevokeAccess(RevokeStep::GetUser),
            account,
            &IAM_ERRORS,
        )?
        .is_none()
        {
            info!(bucket, account, "user already absent, nothing to revoke");
            return Ok(());
        }

        let policy = policy_name(bucket);
        let delete_policy = self.client.delete_user_policy(account, &policy).await;
        if settle(
            delete_policy,
            Action::RevokeAccess(RevokeStep::DeleteUserPolicy),
            account,
            &IAM_ERRORS,
        )?
        .is_none()
        {
            debug!(bucket, account, policy = %policy, "bucket policy already absent");
        }

        let list_keys = self.client.list_access_keys(account).await;
        let access_keys = settle(
            list_keys,
            Action::RevokeAccess(RevokeStep::ListAccessKeys),
            account,
            &IAM_ERRORS,
        )?
        .unwrap_or_default();
        for access_key_id in &access_keys {
            let delete_key = self.client.delete_access_key(account, access_key_id).await;
            settle(
                delete_key,
                Action::RevokeAccess(RevokeStep::DeleteAccessKey),
                account,
                &IAM_ERRORS,
            )?;
            debug!(bucket, account, access_key_id = %access_key_id, "access key deleted");
        }

        let delete_user = self.client.delete_user(account).await;
        settle(
            delete_user,
            Action::RevokeAccess(RevokeStep::DeleteUser),
            account,
            &IAM_ERRORS,
        )?;

        info!(bucket, account, keys = access_keys.len(), "bucket access revoked");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use s3cosi_client::{ClientFactory, MemoryBackend, MemoryClientFactory, MemoryOp};
    use s3cosi_common::{BucketPolicy, Code, StorageEndpointParameters, policy_name};

    use super::AccessManager;

    fn params() -> StorageEndpointParameters {
        StorageEndpointParameters::new("admin", "secret", "https://s3.example.com")
            .expect("params")
            .with_region(Some("eu-central-1".to_string()))
    }

    fn manager(factory: &MemoryClientFactory) -> AccessManager {
        AccessManager::new(factory.identity_client(&params()).expect("client"))
    }

    fn assert_nothing_left(backend: &MemoryBackend, bucket: &str, account: &str) {
        assert!(!backend.user_exists(account));
        assert!(backend.user_policy(account, &policy_name(bucket)).is_none());
        assert!(backend.access_key_ids(account).is_empty());
    }

    #[tokio::test]
    async fn grant_then_revoke_round_trip() {
        let factory = MemoryClientFactory::new(MemoryBackend::new());
        let access = manager(&factory);

        let credentials = access.grant("b1", "alice", &params()).await.expect("grant");
        assert!(!credentials.access_key_id.is_empty());
        assert!(!credentials.secret_access_key.is_empty());
        assert_eq!(credentials.endpoint, "https://s3.example.com");
        assert_eq!(credentials.region, "eu-central-1");

        let backend = factory.backend();
        assert!(backend.user_exists("alice"));
        assert_eq!(
            backend.user_policy("alice", "b1-cosi-ba"),
            Some(BucketPolicy::full_access("b1").to_document().expect("doc"))
        );
        assert_eq!(backend.access_key_ids("alice"), vec![credentials.access_key_id]);

        assert_eq!(access.revoke("b1", "alice").await, Ok(()));
        assert_nothing_left(backend, "b1", "alice");
    }

    #[tokio::test]
    async fn revoke_without_user_succeeds() {
        let factory = MemoryClientFactory::new(MemoryBackend::new());
        assert_eq!(manager(&factory).revoke("b1", "ghost").await, Ok(()));
        assert_nothing_left(factory.backend(), "b1", "ghost");
    }

    #[tokio::test]
    async fn revoke_with_user_but_no_policy_succeeds() {
        let factory = MemoryClientFactory::new(MemoryBackend::new());
        let iam = factory.identity_client(&params()).expect("client");
        iam.create_user("bob").await.expect("user");

        assert_eq!(manager(&factory).revoke("b1", "bob").await, Ok(()));
        assert_nothing_left(factory.backend(), "b1", "bob");
    }

    #[tokio::test]
    async fn revoke_with_policy_but_no_keys_succeeds() {
        let factory = MemoryClientFactory::new(MemoryBackend::new());
        let iam = factory.identity_client(&params()).expect("client");
        iam.create_user("carol").await.expect("user");
        iam.put_user_policy("carol", &policy_name("b1"), "{}")
            .await
            .expect("policy");

        assert_eq!(manager(&factory).revoke("b1", "carol").await, Ok(()));
        assert_nothing_left(factory.backend(), "b1", "carol");
    }

    #[tokio::test]
    async fn revoke_removes_every_key() {
        let factory = MemoryClientFactory::new(MemoryBackend::new());
        let access = manager(&factory);
        access.grant("b1", "dave", &params()).await.expect("grant");
        let iam = factory.identity_client(&params()).expect("client");
        iam.create_access_key("dave").await.expect("second key");
        assert_eq!(factory.backend().access_key_ids("dave").len(), 2);

        assert_eq!(access.revoke("b1", "dave").await, Ok(()));
        assert_nothing_left(factory.backend(), "b1", "dave");
    }

    #[tokio::test]
    async fn policy_denied_leaves_user_behind() {
        let backend = MemoryBackend::new();
        backend
            .fail_next(MemoryOp::PutUserPolicy, "AccessDenied")
            .expect("inject");
        let factory = MemoryClientFactory::new(backend);

        let failure = manager(&factory)
            .grant("b1", "erin", &params())
            .await
            .expect_err("denied");
        assert_eq!(failure.code, Code::PermissionDenied);
        assert_eq!(failure.message, "access denied for user erin");
        assert!(factory.backend().user_exists("erin"));
        assert!(factory.backend().access_key_ids("erin").is_empty());
    }

    #[tokio::test]
    async fn retried_grant_resumes_after_partial_failure() {
        let backend = MemoryBackend::new();
        backend
            .fail_next(MemoryOp::CreateAccessKey, "ServiceUnavailable")
            .expect("inject");
        let factory = MemoryClientFactory::new(backend);
        let access = manager(&factory);

        let failure = access
            .grant("b1", "frank", &params())
            .await
            .expect_err("unavailable");
        assert_eq!(failure.code, Code::Unavailable);

        let credentials = access.grant("b1", "frank", &params()).await.expect("retry");
        assert_eq!(
            factory.backend().access_key_ids("frank"),
            vec![credentials.access_key_id]
        );
    }

    #[tokio::test]
    async fn repeated_grant_keeps_a_single_key() {
        let factory = MemoryClientFactory::new(MemoryBackend::new());
        let access = manager(&factory);

        for _ in 0..3 {
            let credentials = access.grant("b1", "zed", &params()).await.expect("grant");
            assert_eq!(
                factory.backend().access_key_ids("zed"),
                vec![credentials.access_key_id]
            );
        }

        assert_eq!(access.revoke("b1", "zed").await, Ok(()));
        assert_nothing_left(factory.backend(), "b1", "zed");
    }

    #[tokio::test]
    async fn account_granted_on_another_bucket_is_not_taken_over() {
        let factory = MemoryClientFactory::new(MemoryBackend::new());
        let access = manager(&factory);
        let first = access.grant("b1", "alice", &params()).await.expect("grant b1");

        let failure = access
            .grant("b2", "alice", &params())
            .await
            .expect_err("already bound to b1");
        assert_eq!(failure.code, Code::AlreadyExists);
        assert!(factory.backend().user_policy("alice", &policy_name("b2")).is_none());
        assert_eq!(
            factory.backend().access_key_ids("alice"),
            vec![first.access_key_id]
        );

        assert_eq!(access.revoke("b1", "alice").await, Ok(()));
        assert_eq!(access.revoke("b1", "alice").await, Ok(()));
        assert_nothing_left(factory.backend(), "b1", "alice");
    }

    #[tokio::test]
    async fn failed_user_creation_stops_the_grant() {
        let backend = MemoryBackend::new();
        backend
            .fail_next(MemoryOp::CreateUser, "LimitExceeded")
            .expect("inject");
        let factory = MemoryClientFactory::new(backend);

        let failure = manager(&factory)
            .grant("b1", "gina", &params())
            .await
            .expect_err("limit");
        assert_eq!(failure.code, Code::ResourceExhausted);
        assert!(!factory.backend().user_exists("gina"));
    }

    #[tokio::test]
    async fn key_delete_failure_aborts_revoke() {
        let factory = MemoryClientFactory::new(MemoryBackend::new());
        let access = manager(&factory);
        access.grant("b1", "hank", &params()).await.expect("grant");
        factory
            .backend()
            .fail_next(MemoryOp::DeleteAccessKey, "Throttling")
            .expect("inject");

        let failure = access.revoke("b1", "hank").await.expect_err("throttled");
        assert_eq!(failure.code, Code::ResourceExhausted);
        assert!(factory.backend().user_exists("hank"));
        assert_eq!(factory.backend().access_key_ids("hank").len(), 1);

        assert_eq!(access.revoke("b1", "hank").await, Ok(()));
        assert_nothing_left(factory.backend(), "b1", "hank");
    }

    #[tokio::test]
    async fn user_vanishing_mid_revoke_is_still_success() {
        let backend = MemoryBackend::new();
        backend
            .fail_next(MemoryOp::DeleteUser, "NoSuchEntity")
            .expect("inject");
        let factory = MemoryClientFactory::new(backend);
        let access = manager(&factory);
        access.grant("b1", "ivy", &params()).await.expect("grant");

        assert_eq!(access.revoke("b1", "ivy").await, Ok(()));
    }
}
