//! In-Memory Repository Implementation
//!
//! Same behavior as the PostgreSQL store, kept in process. Used by tests
//! and for running the back office without a database.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use chrono::Utc;
use kernel::id::{LayoutId, PageId, PagePartId, TagId};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::domain::entities::{Editor, FlashData, Layout, Page, PagePart, ROOT_PAGE_ID, Tag};
use crate::domain::repository::{
    EditorRepository, FlashRepository, LayoutRepository, PagePartRepository, PageRepository,
    TagRepository,
};
use crate::domain::value_objects::{LoginRequirement, PageStatus};
use crate::error::{PageError, PageResult};

#[derive(Default)]
struct MemoryState {
    next_id: i64,
    pages: BTreeMap<PageId, Page>,
    parts: BTreeMap<PagePartId, PagePart>,
    tags: BTreeMap<TagId, Tag>,
    page_tags: BTreeSet<(PageId, TagId)>,
    layouts: Vec<Layout>,
    sessions: HashMap<Uuid, Editor>,
    flashes: HashMap<Uuid, (FlashData, i64)>,
}

impl MemoryState {
    fn next_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }
}

/// Process-local page store
#[derive(Clone)]
pub struct MemoryPageStore {
    state: Arc<RwLock<MemoryState>>,
    fail_page_saves: Arc<AtomicBool>,
    fail_page_deletes: Arc<AtomicBool>,
    fail_part_saves: Arc<AtomicBool>,
}

impl Default for MemoryPageStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryPageStore {
    /// Empty store holding only the root page
    pub fn new() -> Self {
        let now = Utc::now();
        let mut root = Page::new(ROOT_PAGE_ID, PageStatus::Published);
        root.id = Some(ROOT_PAGE_ID);
        root.parent_id = None;
        root.title = "Home Page".to_string();
        root.breadcrumb = "Home Page".to_string();
        root.needs_login = LoginRequirement::NotRequired;
        root.is_protected = true;
        root.created_on = Some(now);
        root.published_on = Some(now);
        root.updated_on = Some(now);

        let mut state = MemoryState {
            next_id: ROOT_PAGE_ID.value(),
            ..Default::default()
        };
        state.pages.insert(ROOT_PAGE_ID, root);

        Self {
            state: Arc::new(RwLock::new(state)),
            fail_page_saves: Arc::new(AtomicBool::new(false)),
            fail_page_deletes: Arc::new(AtomicBool::new(false)),
            fail_part_saves: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Register an editor and return a live session id for them
    pub async fn open_session(&self, editor: Editor) -> Uuid {
        let session_id = Uuid::new_v4();
        self.state.write().await.sessions.insert(session_id, editor);
        session_id
    }

    pub async fn add_layout(&self, name: &str, position: i32) -> LayoutId {
        let mut state = self.state.write().await;
        let id = LayoutId::new(state.next_id());
        state.layouts.push(Layout {
            id,
            name: name.to_string(),
            position,
        });
        id
    }

    /// Make every page write fail until switched back
    pub fn fail_page_saves(&self, fail: bool) {
        self.fail_page_saves.store(fail, Ordering::SeqCst);
    }

    pub fn fail_page_deletes(&self, fail: bool) {
        self.fail_page_deletes.store(fail, Ordering::SeqCst);
    }

    pub fn fail_part_saves(&self, fail: bool) {
        self.fail_part_saves.store(fail, Ordering::SeqCst);
    }

    pub async fn page_count(&self) -> usize {
        self.state.read().await.pages.len()
    }

    pub async fn tag_count(&self, name: &str) -> Option<i32> {
        let state = self.state.read().await;
        state
            .tags
            .values()
            .find(|tag| tag.name == name)
            .map(|tag| tag.count)
    }
}

impl PageRepository for MemoryPageStore {
    async fn find_page(&self, id: PageId) -> PageResult<Option<Page>> {
        Ok(self.state.read().await.pages.get(&id).cloned())
    }

    async fn children_of(&self, parent_id: PageId) -> PageResult<Vec<Page>> {
        let state = self.state.read().await;
        let mut children: Vec<Page> = state
            .pages
            .values()
            .filter(|page| page.parent_id == Some(parent_id))
            .cloned()
            .collect();
        children.sort_by(|a, b| {
            a.position
                .cmp(&b.position)
                .then_with(|| b.created_on.cmp(&a.created_on))
                .then_with(|| b.id.cmp(&a.id))
        });
        Ok(children)
    }

    async fn has_children(&self, id: PageId) -> PageResult<bool> {
        let state = self.state.read().await;
        Ok(state.pages.values().any(|page| page.parent_id == Some(id)))
    }

    async fn latest_child_of(&self, parent_id: PageId) -> PageResult<Option<Page>> {
        let state = self.state.read().await;
        Ok(state
            .pages
            .values()
            .filter(|page| page.parent_id == Some(parent_id))
            .max_by_key(|page| page.id)
            .cloned())
    }

    async fn save_page(&self, page: &Page) -> PageResult<PageId> {
        if self.fail_page_saves.load(Ordering::SeqCst) {
            return Err(PageError::Internal("page writes are disabled".to_string()));
        }

        let mut state = self.state.write().await;
        if let Some(parent_id) = page.parent_id {
            if !state.pages.contains_key(&parent_id) {
                return Err(PageError::Internal(format!("parent page {parent_id} missing")));
            }
        }

        let id = match page.id {
            Some(id) => {
                let stored = state.pages.get(&id).ok_or(PageError::PageNotFound)?;
                let mut updated = page.clone();
                updated.created_on = stored.created_on;
                updated.created_by_id = stored.created_by_id;
                state.pages.insert(id, updated);
                id
            }
            None => {
                let id = PageId::new(state.next_id());
                let mut inserted = page.clone();
                inserted.id = Some(id);
                state.pages.insert(id, inserted);
                id
            }
        };
        Ok(id)
    }

    async fn delete_page(&self, id: PageId) -> PageResult<bool> {
        if self.fail_page_deletes.load(Ordering::SeqCst) {
            return Err(PageError::Internal("page deletes are disabled".to_string()));
        }

        let mut state = self.state.write().await;
        if state.pages.values().any(|page| page.parent_id == Some(id)) {
            return Err(PageError::Internal(format!("page {id} still has children")));
        }
        let removed = state.pages.remove(&id).is_some();
        if removed {
            state.parts.retain(|_, part| part.page_id != id);
            state.page_tags.retain(|(page_id, _)| *page_id != id);
        }
        Ok(removed)
    }
}

impl PagePartRepository for MemoryPageStore {
    async fn parts_of(&self, page_id: PageId) -> PageResult<Vec<PagePart>> {
        let state = self.state.read().await;
        Ok(state
            .parts
            .values()
            .filter(|part| part.page_id == page_id)
            .cloned()
            .collect())
    }

    async fn save_part(&self, part: &PagePart) -> PageResult<PagePartId> {
        if self.fail_part_saves.load(Ordering::SeqCst) {
            return Err(PageError::Internal("part writes are disabled".to_string()));
        }

        let mut state = self.state.write().await;
        if !state.pages.contains_key(&part.page_id) {
            return Err(PageError::PageNotFound);
        }
        let id = match part.id {
            Some(id) => id,
            None => PagePartId::new(state.next_id()),
        };
        let mut stored = part.clone();
        stored.id = Some(id);
        state.parts.insert(id, stored);
        Ok(id)
    }

    async fn delete_part(&self, id: PagePartId) -> PageResult<()> {
        self.state.write().await.parts.remove(&id);
        Ok(())
    }

    async fn delete_parts_of(&self, page_id: PageId) -> PageResult<u64> {
        let mut state = self.state.write().await;
        let before = state.parts.len();
        state.parts.retain(|_, part| part.page_id != page_id);
        Ok((before - state.parts.len()) as u64)
    }
}

impl TagRepository for MemoryPageStore {
    async fn tags_of(&self, page_id: PageId) -> PageResult<Vec<Tag>> {
        let state = self.state.read().await;
        let mut tags: Vec<Tag> = state
            .page_tags
            .iter()
            .filter(|(linked, _)| *linked == page_id)
            .filter_map(|(_, tag_id)| state.tags.get(tag_id).cloned())
            .collect();
        tags.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(tags)
    }

    async fn find_tag(&self, name: &str) -> PageResult<Option<Tag>> {
        let state = self.state.read().await;
        Ok(state.tags.values().find(|tag| tag.name == name).cloned())
    }

    async fn save_tag(&self, tag: &Tag) -> PageResult<TagId> {
        let mut state = self.state.write().await;
        let id = match tag.id {
            Some(id) => id,
            None => TagId::new(state.next_id()),
        };
        let mut stored = tag.clone();
        stored.id = Some(id);
        state.tags.insert(id, stored);
        Ok(id)
    }

    async fn delete_tag(&self, id: TagId) -> PageResult<()> {
        let mut state = self.state.write().await;
        state.tags.remove(&id);
        state.page_tags.retain(|(_, tag_id)| *tag_id != id);
        Ok(())
    }

    async fn link_tag(&self, page_id: PageId, tag_id: TagId) -> PageResult<()> {
        self.state.write().await.page_tags.insert((page_id, tag_id));
        Ok(())
    }

    async fn unlink_tag(&self, page_id: PageId, tag_id: TagId) -> PageResult<()> {
        self.state.write().await.page_tags.remove(&(page_id, tag_id));
        Ok(())
    }
}

impl LayoutRepository for MemoryPageStore {
    async fn all_layouts(&self) -> PageResult<Vec<Layout>> {
        let mut layouts = self.state.read().await.layouts.clone();
        layouts.sort_by_key(|layout| (layout.position, layout.id));
        Ok(layouts)
    }
}

impl EditorRepository for MemoryPageStore {
    async fn find_editor_by_session(&self, session_id: Uuid) -> PageResult<Option<Editor>> {
        Ok(self.state.read().await.sessions.get(&session_id).cloned())
    }
}

impl FlashRepository for MemoryPageStore {
    async fn put_flash(&self, id: Uuid, flash: &FlashData, expires_at_ms: i64) -> PageResult<()> {
        self.state
            .write()
            .await
            .flashes
            .insert(id, (flash.clone(), expires_at_ms));
        Ok(())
    }

    async fn take_flash(&self, id: Uuid) -> PageResult<Option<FlashData>> {
        let now_ms = Utc::now().timestamp_millis();
        let taken = self.state.write().await.flashes.remove(&id);
        Ok(taken
            .filter(|(_, expires_at_ms)| *expires_at_ms > now_ms)
            .map(|(flash, _)| flash))
    }

    async fn cleanup_expired_flash(&self) -> PageResult<u64> {
        let now_ms = Utc::now().timestamp_millis();
        let mut state = self.state.write().await;
        let before = state.flashes.len();
        state.flashes.retain(|_, (_, expires_at_ms)| *expires_at_ms >= now_ms);
        Ok((before - state.flashes.len()) as u64)
    }
}
