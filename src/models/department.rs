//! Department models for the WeCom directory API.

use std::fmt;

use serde::Deserialize;

/// A department visible to the application.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Department {
    /// Unique department ID.
    pub id: i64,

    /// Department name. Empty when the application may not read names.
    #[serde(default)]
    pub name: String,

    /// ID of the parent department; the root department has parent `0`.
    #[serde(default, rename = "parentid")]
    pub parent_id: i64,

    /// Sort order within the parent; larger values come first.
    #[serde(default)]
    pub order: i64,
}

impl fmt::Display for Department {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Department Id: {}, Name: {}, ParentId: {}, Order: {}",
            self.id, self.name, self.parent_id, self.order
        )
    }
}

/// Response payload for `department/list`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DepartmentList {
    /// Departments within the application's visibility scope.
    #[serde(default, rename = "department")]
    pub departments: Vec<Department>,
}
