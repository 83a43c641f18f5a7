//! Domain Entities
//!
//! Core records of the page tree, plus the shapes editors submit for them.

use chrono::{DateTime, Utc};
use kernel::id::{LayoutId, PageId, PagePartId, TagId, UserId};
use serde::{Deserialize, Serialize};

use crate::domain::value_objects::{LoginRequirement, PageStatus, Role};

/// Id of the site root; it always exists and is never deleted.
pub const ROOT_PAGE_ID: PageId = PageId::new(1);

/// Name given to a part when nothing else is known
pub const DEFAULT_PART_NAME: &str = "body";

/// Page entity - a content node in the site hierarchy
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Page {
    /// `None` until the page is first saved
    pub id: Option<PageId>,
    pub parent_id: Option<PageId>,
    pub position: i32,
    pub title: String,
    pub slug: String,
    pub breadcrumb: String,
    pub keywords: String,
    pub description: String,
    pub layout_id: Option<LayoutId>,
    pub behavior_id: String,
    pub status: PageStatus,
    pub needs_login: LoginRequirement,
    pub is_protected: bool,
    pub created_on: Option<DateTime<Utc>>,
    pub published_on: Option<DateTime<Utc>>,
    pub updated_on: Option<DateTime<Utc>>,
    pub created_by_id: Option<UserId>,
    pub updated_by_id: Option<UserId>,
}

impl Page {
    /// Blank, unsaved page under `parent_id`
    pub fn new(parent_id: PageId, status: PageStatus) -> Self {
        Self {
            id: None,
            parent_id: Some(parent_id),
            position: 0,
            title: String::new(),
            slug: String::new(),
            breadcrumb: String::new(),
            keywords: String::new(),
            description: String::new(),
            layout_id: None,
            behavior_id: String::new(),
            status,
            needs_login: LoginRequirement::Inherit,
            is_protected: false,
            created_on: None,
            published_on: None,
            updated_on: None,
            created_by_id: None,
            updated_by_id: None,
        }
    }

    /// Copy submitted fields onto the page
    ///
    /// The parent is only taken from the submission for pages that have
    /// not been saved yet; moving happens through reorder.
    pub fn apply(&mut self, input: &PageInput) {
        if self.id.is_none() {
            if let Some(parent_id) = input.parent_id {
                self.parent_id = Some(parent_id);
            }
        }
        self.title = input.title.clone();
        self.slug = input.slug.trim().to_string();
        self.breadcrumb = input.breadcrumb.clone();
        self.keywords = input.keywords.clone();
        self.description = input.description.clone();
        self.layout_id = input.layout_id;
        self.behavior_id = input.behavior_id.clone();
        self.status = input.status;
        self.needs_login = input.needs_login;
        self.is_protected = input.is_protected;
    }

    /// Bookkeeping done right before every save
    pub fn stamp(&mut self, editor_id: UserId, now: DateTime<Utc>) {
        if self.id.is_none() {
            self.created_on = Some(now);
            self.created_by_id = Some(editor_id);
        }
        if self.status == PageStatus::Published && self.published_on.is_none() {
            self.published_on = Some(now);
        }
        self.updated_on = Some(now);
        self.updated_by_id = Some(editor_id);
    }

    pub fn is_root(&self) -> bool {
        self.id == Some(ROOT_PAGE_ID)
    }
}

/// PagePart entity - a named content block owned by one page
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PagePart {
    pub id: Option<PagePartId>,
    pub page_id: PageId,
    pub name: String,
    pub filter_id: String,
    pub content: String,
}

impl PagePart {
    /// Unsaved part built from submitted data
    pub fn new(page_id: PageId, input: &PartInput) -> Self {
        Self {
            id: None,
            page_id,
            name: input.name.trim().to_string(),
            filter_id: input.filter_id.clone(),
            content: input.content.clone(),
        }
    }
}

/// Tag entity - `count` is the number of pages carrying the tag
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Tag {
    pub id: Option<TagId>,
    pub name: String,
    pub count: i32,
}

impl Tag {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: None,
            name: name.into(),
            count: 0,
        }
    }
}

/// Layout entity (read-only here)
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Layout {
    pub id: LayoutId,
    pub name: String,
    pub position: i32,
}

/// The logged-in back-office user
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Editor {
    pub id: UserId,
    pub name: String,
    pub roles: Vec<Role>,
}

impl Editor {
    pub fn has_role(&self, role: Role) -> bool {
        self.roles.contains(&role)
    }

    /// Administrators and developers may touch protected pages.
    pub fn can_manage_protected(&self) -> bool {
        self.has_role(Role::Administrator) || self.has_role(Role::Developer)
    }

    /// Whether this editor may view, edit or delete `page`
    pub fn can_access(&self, page: &Page) -> bool {
        !page.is_protected || self.can_manage_protected()
    }
}

// ============================================================================
// Submitted data
// ============================================================================

/// Page fields as submitted by the edit form
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PageInput {
    pub parent_id: Option<PageId>,
    pub title: String,
    pub slug: String,
    pub breadcrumb: String,
    pub keywords: String,
    pub description: String,
    pub layout_id: Option<LayoutId>,
    pub behavior_id: String,
    pub status: PageStatus,
    pub needs_login: LoginRequirement,
    pub is_protected: bool,
}

impl From<&Page> for PageInput {
    fn from(page: &Page) -> Self {
        Self {
            parent_id: page.parent_id,
            title: page.title.clone(),
            slug: page.slug.clone(),
            breadcrumb: page.breadcrumb.clone(),
            keywords: page.keywords.clone(),
            description: page.description.clone(),
            layout_id: page.layout_id,
            behavior_id: page.behavior_id.clone(),
            status: page.status,
            needs_login: page.needs_login,
            is_protected: page.is_protected,
        }
    }
}

/// One part as submitted by the edit form
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PartInput {
    pub id: Option<PagePartId>,
    pub name: String,
    pub filter_id: String,
    pub content: String,
}

impl PartInput {
    /// Empty part editor with the given name and filter
    pub fn blank(name: impl Into<String>, filter_id: impl Into<String>) -> Self {
        Self {
            id: None,
            name: name.into(),
            filter_id: filter_id.into(),
            content: String::new(),
        }
    }
}

impl From<&PagePart> for PartInput {
    fn from(part: &PagePart) -> Self {
        Self {
            id: part.id,
            name: part.name.clone(),
            filter_id: part.filter_id.clone(),
            content: part.content.clone(),
        }
    }
}

/// One-request message storage carried across a redirect
///
/// Besides the user-facing messages it can hold the last submitted page so
/// a failed save can be shown again with the editor's input.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct FlashData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub success: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub post_data: Option<PageInput>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub post_parts_data: Option<Vec<PartInput>>,
}

impl FlashData {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            success: Some(message.into()),
            ..Default::default()
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            error: Some(message.into()),
            ..Default::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.success.is_none()
            && self.error.is_none()
            && self.post_data.is_none()
            && self.post_parts_data.is_none()
    }
}
