use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GrantStep {
    CreateUser,
    ListUserPolicies,
    ListAccessKeys,
    DeleteStaleAccessKey,
    PutUserPolicy,
    CreateAccessKey,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RevokeStep {
    GetUser,
    DeleteUserPolicy,
    ListAccessKeys,
    DeleteAccessKey,
    DeleteUser,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    CreateBucket,
    DeleteBucket,
    GrantAccess(GrantStep),
    RevokeAccess(RevokeStep),
}

impl Action {
    /// Deleting something that is already gone counts as done for these.
    pub fn tolerates_absence(self) -> bool {
        match self {
            Self::DeleteBucket
            | Self::RevokeAccess(_)
            | Self::GrantAccess(GrantStep::DeleteStaleAccessKey) => true,
            Self::CreateBucket | Self::GrantAccess(_) => false,
        }
    }

    pub fn resource_kind(self) -> &'static str {
        match self {
            Self::CreateBucket | Self::DeleteBucket => "bucket",
            Self::GrantAccess(_) | Self::RevokeAccess(_) => "user",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::CreateBucket => "create bucket",
            Self::DeleteBucket => "delete bucket",
            Self::GrantAccess(GrantStep::CreateUser) => "grant bucket access (create user)",
            Self::GrantAccess(GrantStep::ListUserPolicies) => {
                "grant bucket access (inspect existing user)"
            }
            Self::GrantAccess(GrantStep::ListAccessKeys) => {
                "grant bucket access (list access keys)"
            }
            Self::GrantAccess(GrantStep::DeleteStaleAccessKey) => {
                "grant bucket access (delete stale access key)"
            }
            Self::GrantAccess(GrantStep::PutUserPolicy) => "grant bucket access (attach policy)",
            Self::GrantAccess(GrantStep::CreateAccessKey) => {
                "grant bucket access (create access key)"
            }
            Self::RevokeAccess(RevokeStep::GetUser) => "revoke bucket access (get user)",
            Self::RevokeAccess(RevokeStep::DeleteUserPolicy) => {
                "revoke bucket access (delete policy)"
            }
            Self::RevokeAccess(RevokeStep::ListAccessKeys) => {
                "revoke bucket access (list access keys)"
            }
            Self::RevokeAccess(RevokeStep::DeleteAccessKey) => {
                "revoke bucket access (delete access key)"
            }
            Self::RevokeAccess(RevokeStep::DeleteUser) => "revoke bucket access (delete user)",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
