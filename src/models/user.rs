//! User models for the WeCom directory API.

use std::fmt;

use serde::Deserialize;

/// Identity resolved from an OAuth `code` by `user/getuserinfo`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UserInfo {
    /// Member user ID. Empty for non-members.
    #[serde(default, rename = "UserId")]
    pub user_id: String,

    /// Device ID of the client that performed the login.
    #[serde(default, rename = "DeviceId")]
    pub device_id: String,

    /// Open ID, present instead of `UserId` for non-members.
    #[serde(default, rename = "OpenId")]
    pub open_id: Option<String>,
}

/// A directory member as returned in `user/simplelist`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct UserSummary {
    /// Member user ID.
    #[serde(rename = "userid")]
    pub user_id: String,

    /// Display name.
    #[serde(default)]
    pub name: String,

    /// IDs of the departments the member belongs to.
    #[serde(default)]
    pub department: Vec<i64>,
}

impl fmt::Display for UserSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "User Id: {}, Name: {}", self.user_id, self.name)
    }
}

/// Response payload for `user/simplelist`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UserList {
    /// Members of the requested department.
    #[serde(default, rename = "userlist")]
    pub users: Vec<UserSummary>,
}

/// A directory member as returned by `user/get`.
///
/// Only the identity fields are guaranteed; the rest depend on the
/// application's field permissions.
#[derive(Debug, Clone, Deserialize)]
pub struct User {
    /// Member user ID.
    #[serde(rename = "userid")]
    pub user_id: String,

    /// Display name.
    #[serde(default)]
    pub name: String,

    /// IDs of the departments the member belongs to.
    #[serde(default)]
    pub department: Vec<i64>,

    /// Job title.
    #[serde(default)]
    pub position: Option<String>,

    /// Mobile number.
    #[serde(default)]
    pub mobile: Option<String>,

    /// Email address.
    #[serde(default)]
    pub email: Option<String>,

    /// Activation status: 1 active, 2 disabled, 4 not activated, 5 left.
    #[serde(default)]
    pub status: Option<i64>,
}

impl fmt::Display for User {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "User Id: {}, Name: {}", self.user_id, self.name)
    }
}
