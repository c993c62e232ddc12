use std::{
    collections::{BTreeMap, HashMap, VecDeque},
    sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard},
};

use async_trait::async_trait;
use s3cosi_common::{ProviderError, Result, StorageEndpointParameters};
use uuid::Uuid;

use crate::{
    factory::ClientFactory,
    traits::{AccessKey, BucketOps, IdentityOps, ProviderResult},
};

const MAX_ACCESS_KEYS_PER_USER: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MemoryOp {
    CreateBucket,
    DeleteBucket,
    CreateUser,
    GetUser,
    DeleteUser,
    PutUserPolicy,
    DeleteUserPolicy,
    ListUserPolicies,
    CreateAccessKey,
    ListAccessKeys,
    DeleteAccessKey,
}

#[derive(Debug, Clone)]
struct BucketRecord {
    owner: String,
    location: Option<String>,
}

#[derive(Debug, Clone, Default)]
struct UserRecord {
    policies: BTreeMap<String, String>,
    access_keys: BTreeMap<String, String>,
}

#[derive(Debug, Default)]
struct MemoryState {
    buckets: HashMap<String, BucketRecord>,
    users: HashMap<String, UserRecord>,
    faults: HashMap<MemoryOp, VecDeque<String>>,
}

#[derive(Debug, Clone, Default)]
pub struct MemoryBackend {
    state: Arc<RwLock<MemoryState>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_next(&self, op: MemoryOp, provider_code: impl Into<String>) -> ProviderResult<()> {
        self.state_write()?
            .faults
            .entry(op)
            .or_default()
            .push_back(provider_code.into());
        Ok(())
    }

    pub fn bucket_exists(&self, bucket: &str) -> bool {
        self.state_read()
            .is_ok_and(|state| state.buckets.contains_key(bucket))
    }

    pub fn bucket_location(&self, bucket: &str) -> Option<String> {
        self.state_read()
            .ok()
            .and_then(|state| state.buckets.get(bucket).and_then(|b| b.location.clone()))
    }

    pub fn user_exists(&self, user: &str) -> bool {
        self.state_read()
            .is_ok_and(|state| state.users.contains_key(user))
    }

    pub fn user_policy(&self, user: &str, policy_name: &str) -> Option<String> {
        self.state_read().ok().and_then(|state| {
            state
                .users
                .get(user)
                .and_then(|record| record.policies.get(policy_name).cloned())
        })
    }

    pub fn access_key_ids(&self, user: &str) -> Vec<String> {
        self.state_read()
            .ok()
            .and_then(|state| {
                state
                    .users
                    .get(user)
                    .map(|record| record.access_keys.keys().cloned().collect())
            })
            .unwrap_or_default()
    }

    fn take_fault(state: &mut MemoryState, op: MemoryOp) -> ProviderResult<()> {
        match state.faults.get_mut(&op).and_then(VecDeque::pop_front) {
            Some(code) => Err(ProviderError::with_code(
                code.clone(),
                format!("injected {code} for {op:?}"),
            )),
            None => Ok(()),
        }
    }

    fn state_read(&self) -> ProviderResult<RwLockReadGuard<'_, MemoryState>> {
        self.state
            .read()
            .map_err(|_| ProviderError::with_code("InternalError", "memory backend lock poisoned"))
    }

    fn state_write(&self) -> ProviderResult<RwLockWriteGuard<'_, MemoryState>> {
        self.state
            .write()
            .map_err(|_| ProviderError::with_code("InternalError", "memory backend lock poisoned"))
    }
}

fn no_such_entity(user: &str) -> ProviderError {
    ProviderError::with_code("NoSuchEntity", format!("the user with name {user} cannot be found"))
}

fn generate_access_key() -> AccessKey {
    let id = Uuid::new_v4().simple().to_string().to_uppercase();
    let secret = format!(
        "{}{}",
        Uuid::new_v4().simple(),
        Uuid::new_v4().simple()
    );
    AccessKey {
        access_key_id: format!("AKIA{}", &id[..16]),
        secret_access_key: secret[..40].to_string(),
    }
}

#[derive(Debug, Clone)]
pub struct MemoryBucketClient {
    backend: MemoryBackend,
    owner: String,
}

#[async_trait]
impl BucketOps for MemoryBucketClient {
    async fn create_bucket(&self, bucket: &str, location: Option<&str>) -> ProviderResult<()> {
        let mut state = self.backend.state_write()?;
        MemoryBackend::take_fault(&mut state, MemoryOp::CreateBucket)?;

        if let Some(existing) = state.buckets.get(bucket) {
            let code = if existing.owner == self.owner {
                "BucketAlreadyOwnedByYou"
            } else {
                "BucketAlreadyExists"
            };
            return Err(ProviderError::with_code(
                code,
                format!("bucket {bucket} already exists"),
            ));
        }

        state.buckets.insert(
            bucket.to_string(),
            BucketRecord {
                owner: self.owner.clone(),
                location: location.map(str::to_string),
            },
        );
        Ok(())
    }

    async fn delete_bucket(&self, bucket: &str) -> ProviderResult<()> {
        let mut state = self.backend.state_write()?;
        MemoryBackend::take_fault(&mut state, MemoryOp::DeleteBucket)?;

        match state.buckets.remove(bucket) {
            Some(_) => Ok(()),
            None => Err(ProviderError::with_code(
                "NoSuchBucket",
                format!("the specified bucket {bucket} does not exist"),
            )),
        }
    }
}

#[derive(Debug, Clone)]
pub struct MemoryIdentityClient {
    backend: MemoryBackend,
}

#[async_trait]
impl IdentityOps for MemoryIdentityClient {
    async fn create_user(&self, user: &str) -> ProviderResult<()> {
        let mut state = self.backend.state_write()?;
        MemoryBackend::take_fault(&mut state, MemoryOp::CreateUser)?;

        if state.users.contains_key(user) {
            return Err(ProviderError::with_code(
                "EntityAlreadyExists",
                format!("user with name {user} already exists"),
            ));
        }
        state.users.insert(user.to_string(), UserRecord::default());
        Ok(())
    }

    async fn get_user(&self, user: &str) -> ProviderResult<()> {
        let mut state = self.backend.state_write()?;
        MemoryBackend::take_fault(&mut state, MemoryOp::GetUser)?;

        if state.users.contains_key(user) {
            Ok(())
        } else {
            Err(no_such_entity(user))
        }
    }

    async fn delete_user(&self, user: &str) -> ProviderResult<()> {
        let mut state = self.backend.state_write()?;
        MemoryBackend::take_fault(&mut state, MemoryOp::DeleteUser)?;

        let record = state.users.get(user).ok_or_else(|| no_such_entity(user))?;
        if !record.policies.is_empty() || !record.access_keys.is_empty() {
            return Err(ProviderError::with_code(
                "DeleteConflict",
                format!("user {user} still has attached policies or access keys"),
            ));
        }
        state.users.remove(user);
        Ok(())
    }

    async fn put_user_policy(
        &self,
        user: &str,
        policy_name: &str,
        document: &str,
    ) -> ProviderResult<()> {
        let mut state = self.backend.state_write()?;
        MemoryBackend::take_fault(&mut state, MemoryOp::PutUserPolicy)?;

        let record = state
            .users
            .get_mut(user)
            .ok_or_else(|| no_such_entity(user))?;
        record
            .policies
            .insert(policy_name.to_string(), document.to_string());
        Ok(())
    }

    async fn delete_user_policy(&self, user: &str, policy_name: &str) -> ProviderResult<()> {
        let mut state = self.backend.state_write()?;
        MemoryBackend::take_fault(&mut state, MemoryOp::DeleteUserPolicy)?;

        let record = state
            .users
            .get_mut(user)
            .ok_or_else(|| no_such_entity(user))?;
        match record.policies.remove(policy_name) {
            Some(_) => Ok(()),
            None => Err(ProviderError::with_code(
                "NoSuchEntity",
                format!("policy {policy_name} is not attached to user {user}"),
            )),
        }
    }

    async fn list_user_policies(&self, user: &str) -> ProviderResult<Vec<String>> {
        let mut state = self.backend.state_write()?;
        MemoryBackend::take_fault(&mut state, MemoryOp::ListUserPolicies)?;

        let record = state.users.get(user).ok_or_else(|| no_such_entity(user))?;
        Ok(record.policies.keys().cloned().collect())
    }

    async fn create_access_key(&self, user: &str) -> ProviderResult<AccessKey> {
        let mut state = self.backend.state_write()?;
        MemoryBackend::take_fault(&mut state, MemoryOp::CreateAccessKey)?;

        let record = state
            .users
            .get_mut(user)
            .ok_or_else(|| no_such_entity(user))?;
        if record.access_keys.len() >= MAX_ACCESS_KEYS_PER_USER {
            return Err(ProviderError::with_code(
                "LimitExceeded",
                format!("cannot exceed quota for AccessKeysPerUser: {MAX_ACCESS_KEYS_PER_USER}"),
            ));
        }

        let key = generate_access_key();
        record
            .access_keys
            .insert(key.access_key_id.clone(), key.secret_access_key.clone());
        Ok(key)
    }

    async fn list_access_keys(&self, user: &str) -> ProviderResult<Vec<String>> {
        let mut state = self.backend.state_write()?;
        MemoryBackend::take_fault(&mut state, MemoryOp::ListAccessKeys)?;

        let record = state.users.get(user).ok_or_else(|| no_such_entity(user))?;
        Ok(record.access_keys.keys().cloned().collect())
    }

    async fn delete_access_key(&self, user: &str, access_key_id: &str) -> ProviderResult<()> {
        let mut state = self.backend.state_write()?;
        MemoryBackend::take_fault(&mut state, MemoryOp::DeleteAccessKey)?;

        let record = state
            .users
            .get_mut(user)
            .ok_or_else(|| no_such_entity(user))?;
        match record.access_keys.remove(access_key_id) {
            Some(_) => Ok(()),
            None => Err(ProviderError::with_code(
                "NoSuchEntity",
                format!("access key {access_key_id} does not exist"),
            )),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct MemoryClientFactory {
    backend: MemoryBackend,
}

impl MemoryClientFactory {
    pub fn new(backend: MemoryBackend) -> Self {
        Self { backend }
    }

    pub fn backend(&self) -> &MemoryBackend {
        &self.backend
    }
}

impl ClientFactory for MemoryClientFactory {
    fn bucket_client(&self, params: &StorageEndpointParameters) -> Result<Box<dyn BucketOps>> {
        Ok(Box::new(MemoryBucketClient {
            backend: self.backend.clone(),
            owner: params.access_key_id().to_string(),
        }))
    }

    fn identity_client(&self, _params: &StorageEndpointParameters) -> Result<Box<dyn IdentityOps>> {
        Ok(Box::new(MemoryIdentityClient {
            backend: self.backend.clone(),
        }))
    }
}

#[cfg(test)]
mod tests {
    use s3cosi_common::StorageEndpointParameters;

    use super::{MemoryBackend, MemoryClientFactory, MemoryOp};
    use crate::factory::ClientFactory;

    fn params(access_key_id: &str) -> StorageEndpointParameters {
        StorageEndpointParameters::new(access_key_id, "secret", "http://localhost:9000")
            .expect("params")
    }

    #[tokio::test]
    async fn bucket_ownership_decides_conflict_code() {
        let factory = MemoryClientFactory::new(MemoryBackend::new());
        let owner = factory.bucket_client(&params("owner")).expect("client");
        let other = factory.bucket_client(&params("other")).expect("client");

        owner.create_bucket("b1", None).await.expect("create");
        let err = owner.create_bucket("b1", None).await.expect_err("exists");
        assert_eq!(err.code(), Some("BucketAlreadyOwnedByYou"));
        let err = other.create_bucket("b1", None).await.expect_err("exists");
        assert_eq!(err.code(), Some("BucketAlreadyExists"));
    }

    #[tokio::test]
    async fn user_with_keys_cannot_be_deleted() {
        let factory = MemoryClientFactory::new(MemoryBackend::new());
        let iam = factory.identity_client(&params("admin")).expect("client");

        iam.create_user("alice").await.expect("create user");
        let key = iam.create_access_key("alice").await.expect("key");
        assert!(key.access_key_id.starts_with("AKIA"));
        assert_eq!(key.secret_access_key.len(), 40);

        let err = iam.delete_user("alice").await.expect_err("conflict");
        assert_eq!(err.code(), Some("DeleteConflict"));

        iam.delete_access_key("alice", &key.access_key_id)
            .await
            .expect("delete key");
        iam.delete_user("alice").await.expect("delete user");
        assert!(!factory.backend().user_exists("alice"));
    }

    #[tokio::test]
    async fn injected_faults_fire_once() {
        let backend = MemoryBackend::new();
        backend
            .fail_next(MemoryOp::CreateUser, "ServiceUnavailable")
            .expect("inject");
        let factory = MemoryClientFactory::new(backend);
        let iam = factory.identity_client(&params("admin")).expect("client");

        let err = iam.create_user("bob").await.expect_err("fault");
        assert_eq!(err.code(), Some("ServiceUnavailable"));
        iam.create_user("bob").await.expect("second attempt");
    }

    #[tokio::test]
    async fn lists_inline_policies_by_name() {
        let factory = MemoryClientFactory::new(MemoryBackend::new());
        let iam = factory.identity_client(&params("admin")).expect("client");

        let err = iam.list_user_policies("dora").await.expect_err("no user");
        assert_eq!(err.code(), Some("NoSuchEntity"));

        iam.create_user("dora").await.expect("create user");
        iam.put_user_policy("dora", "b2-cosi-ba", "{}").await.expect("policy");
        iam.put_user_policy("dora", "b1-cosi-ba", "{}").await.expect("policy");
        assert_eq!(
            iam.list_user_policies("dora").await.expect("list"),
            vec!["b1-cosi-ba".to_string(), "b2-cosi-ba".to_string()]
        );
    }

    #[tokio::test]
    async fn access_key_quota_is_enforced() {
        let factory = MemoryClientFactory::new(MemoryBackend::new());
        let iam = factory.identity_client(&params("admin")).expect("client");

        iam.create_user("carol").await.expect("create user");
        iam.create_access_key("carol").await.expect("first");
        iam.create_access_key("carol").await.expect("second");
        let err = iam.create_access_key("carol").await.expect_err("quota");
        assert_eq!(err.code(), Some("LimitExceeded"));
    }
}
