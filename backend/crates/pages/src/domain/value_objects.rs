//! Domain Value Objects

use kernel::id::PageId;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Publication status of a page
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(into = "i16", try_from = "i16")]
#[repr(i16)]
pub enum PageStatus {
    #[default]
    Draft = 1,
    Preview = 10,
    Published = 100,
    Hidden = 101,
    Archived = 200,
}

impl PageStatus {
    pub const ALL: [PageStatus; 5] = [
        PageStatus::Draft,
        PageStatus::Preview,
        PageStatus::Published,
        PageStatus::Hidden,
        PageStatus::Archived,
    ];

    #[inline]
    pub const fn id(&self) -> i16 {
        *self as i16
    }

    #[inline]
    pub const fn label(&self) -> &'static str {
        match self {
            PageStatus::Draft => "Draft",
            PageStatus::Preview => "Preview",
            PageStatus::Published => "Published",
            PageStatus::Hidden => "Hidden",
            PageStatus::Archived => "Archived",
        }
    }

    pub fn from_id(id: i16) -> Option<Self> {
        Self::ALL.into_iter().find(|status| status.id() == id)
    }
}

impl From<PageStatus> for i16 {
    fn from(status: PageStatus) -> Self {
        status.id()
    }
}

impl TryFrom<i16> for PageStatus {
    type Error = String;

    fn try_from(id: i16) -> Result<Self, Self::Error> {
        Self::from_id(id).ok_or_else(|| format!("unknown page status id {id}"))
    }
}

impl fmt::Display for PageStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Whether visitors must log in to see a page
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(into = "i16", try_from = "i16")]
#[repr(i16)]
pub enum LoginRequirement {
    NotRequired = 0,
    Required = 1,
    #[default]
    Inherit = 2,
}

impl LoginRequirement {
    pub const ALL: [LoginRequirement; 3] = [
        LoginRequirement::Inherit,
        LoginRequirement::NotRequired,
        LoginRequirement::Required,
    ];

    #[inline]
    pub const fn id(&self) -> i16 {
        *self as i16
    }

    #[inline]
    pub const fn label(&self) -> &'static str {
        match self {
            LoginRequirement::NotRequired => "not required",
            LoginRequirement::Required => "required",
            LoginRequirement::Inherit => "inherit",
        }
    }

    pub fn from_id(id: i16) -> Option<Self> {
        Self::ALL.into_iter().find(|login| login.id() == id)
    }
}

impl From<LoginRequirement> for i16 {
    fn from(login: LoginRequirement) -> Self {
        login.id()
    }
}

impl TryFrom<i16> for LoginRequirement {
    type Error = String;

    fn try_from(id: i16) -> Result<Self, Self::Error> {
        Self::from_id(id).ok_or_else(|| format!("unknown login requirement id {id}"))
    }
}

/// Back-office role of an editor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Administrator,
    Developer,
    Editor,
}

impl Role {
    #[inline]
    pub const fn code(&self) -> &'static str {
        match self {
            Role::Administrator => "administrator",
            Role::Developer => "developer",
            Role::Editor => "editor",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "administrator" => Some(Role::Administrator),
            "developer" => Some(Role::Developer),
            "editor" => Some(Role::Editor),
            _ => None,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Target order of a sibling list after a drag-and-drop
///
/// `entries` are `(position, page_id)` pairs in the order they were
/// submitted. `dragged_id` is only present for copy requests.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PositionMap {
    pub entries: Vec<(i32, PageId)>,
    pub dragged_id: Option<PageId>,
}

impl PositionMap {
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn page_ids(&self) -> impl Iterator<Item = PageId> + '_ {
        self.entries.iter().map(|(_, id)| *id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_ids_roundtrip() {
        for status in PageStatus::ALL {
            assert_eq!(PageStatus::from_id(status.id()), Some(status));
        }
        assert_eq!(PageStatus::from_id(3), None);
        assert_eq!(PageStatus::Published.id(), 100);
    }

    #[test]
    fn test_status_serializes_as_id() {
        assert_eq!(serde_json::to_string(&PageStatus::Hidden).unwrap(), "101");
        let status: PageStatus = serde_json::from_str("10").unwrap();
        assert_eq!(status, PageStatus::Preview);
        assert!(serde_json::from_str::<PageStatus>("11").is_err());
    }

    #[test]
    fn test_login_requirement_default_is_inherit() {
        assert_eq!(LoginRequirement::default(), LoginRequirement::Inherit);
        assert_eq!(LoginRequirement::from_id(1), Some(LoginRequirement::Required));
    }

    #[test]
    fn test_role_codes() {
        assert_eq!(Role::from_code("developer"), Some(Role::Developer));
        assert_eq!(Role::from_code("root"), None);
        assert_eq!(Role::Administrator.to_string(), "administrator");
    }
}
