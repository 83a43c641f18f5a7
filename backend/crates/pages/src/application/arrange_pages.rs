//! Arrange Pages Use Case
//!
//! Drag-and-drop from the tree view: moving pages between parents and
//! copying whole branches.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use kernel::id::PageId;

use crate::application::tags::{replace_page_tags, tag_names_of};
use crate::domain::entities::{Editor, Page, PagePart, ROOT_PAGE_ID};
use crate::domain::repository::{PagePartRepository, PageRepository, TagRepository};
use crate::domain::value_objects::PositionMap;
use crate::error::{PageError, PageResult};

/// Longest ancestor chain followed before giving up
const MAX_ANCESTRY: usize = 1_000;

/// Arrange pages use case
pub struct ArrangePagesUseCase<R>
where
    R: PageRepository + PagePartRepository + TagRepository + Send + Sync,
{
    repo: Arc<R>,
}

impl<R> ArrangePagesUseCase<R>
where
    R: PageRepository + PagePartRepository + TagRepository + Send + Sync,
{
    pub fn new(repo: Arc<R>) -> Self {
        Self { repo }
    }

    /// Put every page of `map` under `parent_id` at its position
    ///
    /// All entries are checked before the first write.
    pub async fn reorder(
        &self,
        parent_id: PageId,
        map: &PositionMap,
        editor: &Editor,
    ) -> PageResult<()> {
        let ancestry = self.ancestry_of(parent_id).await?;
        let pages = self.load_movable(map.page_ids(), parent_id, &ancestry).await?;

        self.apply_positions(parent_id, map, pages, editor).await?;

        tracing::info!(parent_id = %parent_id, pages = map.entries.len(), "Pages reordered");
        Ok(())
    }

    /// Clone the dragged branch under `parent_id`, then order the siblings
    ///
    /// The clone takes the dragged page's slot in `map`. Returns the id of
    /// the cloned branch root.
    pub async fn copy(
        &self,
        parent_id: PageId,
        map: &PositionMap,
        editor: &Editor,
    ) -> PageResult<PageId> {
        let dragged_id = map
            .dragged_id
            .ok_or_else(|| PageError::InvalidPositionMap("dragged_id missing".to_string()))?;
        if dragged_id == ROOT_PAGE_ID {
            return Err(PageError::RootPageProtected);
        }
        let dragged = self
            .repo
            .find_page(dragged_id)
            .await?
            .ok_or(PageError::PageNotFound)?;

        let ancestry = self.ancestry_of(parent_id).await?;
        let others = map.page_ids().filter(|id| *id != dragged_id);
        let mut pages = self.load_movable(others, parent_id, &ancestry).await?;

        let clone_id = self.clone_tree(dragged, parent_id, editor).await?;
        let clone = self
            .repo
            .find_page(clone_id)
            .await?
            .ok_or(PageError::PageNotFound)?;
        pages.insert(dragged_id, clone);

        self.apply_positions(parent_id, map, pages, editor).await?;

        tracing::info!(
            source_id = %dragged_id,
            clone_id = %clone_id,
            parent_id = %parent_id,
            "Page branch copied"
        );
        Ok(clone_id)
    }

    /// Ids from `parent_id` up to the root, `parent_id` first
    async fn ancestry_of(&self, parent_id: PageId) -> PageResult<Vec<PageId>> {
        let mut chain = Vec::new();
        let mut current = Some(parent_id);

        while let Some(id) = current {
            if chain.contains(&id) || chain.len() >= MAX_ANCESTRY {
                return Err(PageError::InvalidMove(format!(
                    "page {parent_id} has a broken ancestry"
                )));
            }
            let page = self.repo.find_page(id).await?.ok_or_else(|| {
                PageError::InvalidMove(format!("parent page {id} does not exist"))
            })?;
            chain.push(id);
            current = page.parent_id;
        }

        Ok(chain)
    }

    /// Load and check every page about to move under `parent_id`
    async fn load_movable(
        &self,
        ids: impl Iterator<Item = PageId>,
        parent_id: PageId,
        ancestry: &[PageId],
    ) -> PageResult<HashMap<PageId, Page>> {
        let mut pages = HashMap::new();

        for id in ids {
            if id == ROOT_PAGE_ID {
                return Err(PageError::InvalidMove("the root page cannot move".to_string()));
            }
            if id == parent_id {
                return Err(PageError::InvalidMove(format!(
                    "page {id} cannot be its own parent"
                )));
            }
            if ancestry.contains(&id) {
                return Err(PageError::InvalidMove(format!(
                    "page {id} cannot move below its own descendant {parent_id}"
                )));
            }
            let page = self
                .repo
                .find_page(id)
                .await?
                .ok_or_else(|| PageError::InvalidMove(format!("page {id} does not exist")))?;
            pages.insert(id, page);
        }

        Ok(pages)
    }

    /// Write positions; `pages` is keyed by the id used in `map`
    async fn apply_positions(
        &self,
        parent_id: PageId,
        map: &PositionMap,
        mut pages: HashMap<PageId, Page>,
        editor: &Editor,
    ) -> PageResult<()> {
        let now = Utc::now();
        for (position, id) in &map.entries {
            let Some(page) = pages.get_mut(id) else {
                continue;
            };
            page.position = *position;
            page.parent_id = Some(parent_id);
            page.stamp(editor.id, now);
            self.repo.save_page(page).await?;
        }
        Ok(())
    }

    /// Copy `source` and its descendants under `parent_id`
    ///
    /// The new branch root is never visited as a source, so copying a page
    /// into its own subtree terminates.
    async fn clone_tree(
        &self,
        source: Page,
        parent_id: PageId,
        editor: &Editor,
    ) -> PageResult<PageId> {
        let now = Utc::now();
        let mut new_root: Option<PageId> = None;
        let mut stack = vec![(source, parent_id)];

        while let Some((source, new_parent)) = stack.pop() {
            let Some(source_id) = source.id else {
                continue;
            };

            let mut copy = source.clone();
            copy.id = None;
            copy.parent_id = Some(new_parent);
            copy.created_on = None;
            copy.created_by_id = None;
            if new_root.is_none() {
                copy.title.push_str(" (copy)");
                copy.slug.push_str("-copy");
            }
            copy.stamp(editor.id, now);
            let copy_id = self.repo.save_page(&copy).await?;
            let root_id = *new_root.get_or_insert(copy_id);

            for part in self.repo.parts_of(source_id).await? {
                let cloned = PagePart {
                    id: None,
                    page_id: copy_id,
                    ..part
                };
                self.repo.save_part(&cloned).await?;
            }

            let tags = tag_names_of(self.repo.as_ref(), source_id).await?;
            replace_page_tags(self.repo.as_ref(), copy_id, &tags).await?;

            for child in self.repo.children_of(source_id).await?.into_iter().rev() {
                if child.id != Some(root_id) {
                    stack.push((child, copy_id));
                }
            }
        }

        new_root.ok_or_else(|| PageError::Internal("copied page has no id".to_string()))
    }
}
