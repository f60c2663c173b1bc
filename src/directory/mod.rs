//! User directory capability and symbolic receiver groups.
//!
//! The notifier accepts either an explicit receiver list or a symbolic
//! token naming a computed user set. Expansion happens once, before any
//! per-channel dispatch.

use std::str::FromStr;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};
use crate::models::Recipient;

/// A symbolic receiver token.
///
/// `AllStaff` and `AllAdmins` are complements: every user that is not
/// staff / not an admin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SymbolicGroup {
    All,
    Staff,
    Admins,
    AllStaff,
    AllAdmins,
}

impl SymbolicGroup {
    pub fn as_str(&self) -> &'static str {
        match self {
            SymbolicGroup::All => "all",
            SymbolicGroup::Staff => "staff",
            SymbolicGroup::Admins => "admins",
            SymbolicGroup::AllStaff => "all-staff",
            SymbolicGroup::AllAdmins => "all-admins",
        }
    }

    fn matches(&self, recipient: &Recipient) -> bool {
        match self {
            SymbolicGroup::All => true,
            SymbolicGroup::Staff => recipient.is_staff,
            SymbolicGroup::Admins => recipient.is_superuser,
            SymbolicGroup::AllStaff => !recipient.is_staff,
            SymbolicGroup::AllAdmins => !recipient.is_superuser,
        }
    }
}

impl FromStr for SymbolicGroup {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "all" => Ok(SymbolicGroup::All),
            "staff" => Ok(SymbolicGroup::Staff),
            "admins" => Ok(SymbolicGroup::Admins),
            "all-staff" => Ok(SymbolicGroup::AllStaff),
            "all-admins" => Ok(SymbolicGroup::AllAdmins),
            other => Err(AppError::validation(
                "receivers",
                format!(
                    "Unknown receivers token '{}'. Valid tokens are: all, staff, admins, all-staff, all-admins",
                    other
                ),
            )),
        }
    }
}

impl std::fmt::Display for SymbolicGroup {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Query capability over the user base.
#[async_trait]
pub trait UserDirectory: Send + Sync {
    /// Every known user.
    async fn all_users(&self) -> AppResult<Vec<Recipient>>;

    /// Expands a symbolic group to a concrete receiver list.
    async fn expand(&self, group: SymbolicGroup) -> AppResult<Vec<Recipient>> {
        let users = self.all_users().await?;
        Ok(users
            .into_iter()
            .filter(|user| group.matches(user))
            .collect())
    }
}

/// In-memory directory over a fixed user list.
#[derive(Debug, Clone, Default)]
pub struct MemoryDirectory {
    users: Vec<Recipient>,
}

impl MemoryDirectory {
    pub fn new(users: Vec<Recipient>) -> Self {
        Self { users }
    }
}

#[async_trait]
impl UserDirectory for MemoryDirectory {
    async fn all_users(&self) -> AppResult<Vec<Recipient>> {
        Ok(self.users.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn directory() -> MemoryDirectory {
        MemoryDirectory::new(vec![
            Recipient::new("plain"),
            Recipient::new("staffer").staff(),
            Recipient::new("root").staff().superuser(),
        ])
    }

    #[tokio::test]
    async fn test_group_sizes() {
        let dir = directory();
        assert_eq!(dir.expand(SymbolicGroup::All).await.unwrap().len(), 3);
        assert_eq!(dir.expand(SymbolicGroup::Staff).await.unwrap().len(), 2);
        assert_eq!(dir.expand(SymbolicGroup::Admins).await.unwrap().len(), 1);
        assert_eq!(dir.expand(SymbolicGroup::AllStaff).await.unwrap().len(), 1);
        assert_eq!(dir.expand(SymbolicGroup::AllAdmins).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_complement_groups_partition_all() {
        let dir = directory();
        let all = dir.expand(SymbolicGroup::All).await.unwrap().len();
        let staff = dir.expand(SymbolicGroup::Staff).await.unwrap().len();
        let non_staff = dir.expand(SymbolicGroup::AllStaff).await.unwrap().len();
        assert_eq!(staff + non_staff, all);
    }

    #[test]
    fn test_unknown_token_is_validation_error() {
        let err = "everyone".parse::<SymbolicGroup>().unwrap_err();
        assert!(matches!(err, AppError::Validation { .. }));
    }

    #[test]
    fn test_token_round_trip() {
        for token in ["all", "staff", "admins", "all-staff", "all-admins"] {
            let group: SymbolicGroup = token.parse().unwrap();
            assert_eq!(group.as_str(), token);
        }
    }
}
