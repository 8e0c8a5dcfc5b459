//! Application (agent) models.

use serde::Deserialize;

/// A member listed in an application's visibility scope.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AllowedUser {
    /// Member user ID. Empty if the entry carried none.
    #[serde(default, rename = "userid")]
    pub user_id: String,
}

/// Members in the visibility scope.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AllowUsers {
    /// Listed members.
    #[serde(default)]
    pub user: Vec<AllowedUser>,
}

/// Departments in the visibility scope.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AllowParties {
    /// Listed department IDs.
    #[serde(default, rename = "partyid")]
    pub party_ids: Vec<i64>,
}

/// Application details returned by `agent/get`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Agent {
    /// Application ID.
    #[serde(default, rename = "agentid")]
    pub agent_id: Option<i64>,

    /// Application name.
    #[serde(default)]
    pub name: Option<String>,

    /// Members the application is visible to.
    #[serde(default, rename = "allow_userinfos")]
    pub allow_users: AllowUsers,

    /// Departments the application is visible to.
    #[serde(default, rename = "allow_partys")]
    pub allow_parties: AllowParties,
}

impl Agent {
    /// Returns the user IDs of every member in the visibility scope.
    pub fn user_ids(&self) -> impl Iterator<Item = &str> {
        self.allow_users.user.iter().map(|u| u.user_id.as_str())
    }
}
