//! Repository Traits
//!
//! Interfaces for data persistence. Implementations live in the infra layer.
//! Method names are distinct across traits so one store can implement all
//! of them without call-site ambiguity.

use kernel::id::{PageId, PagePartId, TagId};
use uuid::Uuid;

use crate::domain::entities::{Editor, FlashData, Layout, Page, PagePart, Tag};
use crate::error::PageResult;

/// Page repository trait
#[trait_variant::make(PageRepository: Send)]
pub trait LocalPageRepository {
    async fn find_page(&self, id: PageId) -> PageResult<Option<Page>>;

    /// Direct children, by position then newest first
    async fn children_of(&self, parent_id: PageId) -> PageResult<Vec<Page>>;

    async fn has_children(&self, id: PageId) -> PageResult<bool>;

    /// The most recently created child of `parent_id`
    async fn latest_child_of(&self, parent_id: PageId) -> PageResult<Option<Page>>;

    /// Insert when `page.id` is `None`, update otherwise; returns the id
    async fn save_page(&self, page: &Page) -> PageResult<PageId>;

    /// Returns whether a row was removed
    async fn delete_page(&self, id: PageId) -> PageResult<bool>;
}

/// Page part repository trait
#[trait_variant::make(PagePartRepository: Send)]
pub trait LocalPagePartRepository {
    /// Parts of a page in creation order
    async fn parts_of(&self, page_id: PageId) -> PageResult<Vec<PagePart>>;

    /// Insert when `part.id` is `None`, update otherwise; returns the id
    async fn save_part(&self, part: &PagePart) -> PageResult<PagePartId>;

    async fn delete_part(&self, id: PagePartId) -> PageResult<()>;

    async fn delete_parts_of(&self, page_id: PageId) -> PageResult<u64>;
}

/// Tag repository trait
///
/// Only storage primitives; keeping `count` in step is done by the caller.
#[trait_variant::make(TagRepository: Send)]
pub trait LocalTagRepository {
    async fn tags_of(&self, page_id: PageId) -> PageResult<Vec<Tag>>;

    async fn find_tag(&self, name: &str) -> PageResult<Option<Tag>>;

    /// Insert when `tag.id` is `None`, update otherwise; returns the id
    async fn save_tag(&self, tag: &Tag) -> PageResult<TagId>;

    async fn delete_tag(&self, id: TagId) -> PageResult<()>;

    async fn link_tag(&self, page_id: PageId, tag_id: TagId) -> PageResult<()>;

    async fn unlink_tag(&self, page_id: PageId, tag_id: TagId) -> PageResult<()>;
}

/// Layout repository trait
#[trait_variant::make(LayoutRepository: Send)]
pub trait LocalLayoutRepository {
    /// All layouts ordered by position
    async fn all_layouts(&self) -> PageResult<Vec<Layout>>;
}

/// Editor lookup for the back-office session
#[trait_variant::make(EditorRepository: Send)]
pub trait LocalEditorRepository {
    /// Editor owning a live session, with roles loaded
    async fn find_editor_by_session(&self, session_id: Uuid) -> PageResult<Option<Editor>>;
}

/// Server-side flash storage
#[trait_variant::make(FlashRepository: Send)]
pub trait LocalFlashRepository {
    async fn put_flash(&self, id: Uuid, flash: &FlashData, expires_at_ms: i64)
    -> PageResult<()>;

    /// Remove and return an unexpired flash
    async fn take_flash(&self, id: Uuid) -> PageResult<Option<FlashData>>;

    /// Drop expired flash rows
    async fn cleanup_expired_flash(&self) -> PageResult<u64>;
}

/// Everything the page controller needs from storage
pub trait PagesStore:
    PageRepository
    + PagePartRepository
    + TagRepository
    + LayoutRepository
    + EditorRepository
    + FlashRepository
    + Clone
    + Send
    + Sync
    + 'static
{
}

impl<T> PagesStore for T where
    T: PageRepository
        + PagePartRepository
        + TagRepository
        + LayoutRepository
        + EditorRepository
        + FlashRepository
        + Clone
        + Send
        + Sync
        + 'static
{
}
