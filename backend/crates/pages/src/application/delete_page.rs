//! Delete Page Use Case
//!
//! Removes a page together with its whole subtree.

use std::sync::Arc;

use kernel::id::PageId;

use crate::application::tags::replace_page_tags;
use crate::domain::entities::{Editor, Page};
use crate::domain::events::{Observers, PageEvent};
use crate::domain::repository::{PagePartRepository, PageRepository, TagRepository};
use crate::error::{PageError, PageResult};

/// Guard against cycles in corrupt data
const MAX_SUBTREE_SIZE: usize = 100_000;

/// Output DTO for delete page
#[derive(Debug, Clone)]
pub struct DeletePageOutput {
    pub title: String,
    /// Pages removed, the target included
    pub removed: usize,
}

/// Delete page use case
pub struct DeletePageUseCase<R>
where
    R: PageRepository + PagePartRepository + TagRepository + Send + Sync,
{
    repo: Arc<R>,
    observers: Arc<Observers>,
}

impl<R> DeletePageUseCase<R>
where
    R: PageRepository + PagePartRepository + TagRepository + Send + Sync,
{
    pub fn new(repo: Arc<R>, observers: Arc<Observers>) -> Self {
        Self { repo, observers }
    }

    pub async fn execute(&self, id: PageId, editor: &Editor) -> PageResult<DeletePageOutput> {
        // The root and anything below it in numbering are off limits.
        if id.value() <= 1 {
            return Err(PageError::RootPageProtected);
        }

        let page = self
            .repo
            .find_page(id)
            .await?
            .ok_or(PageError::PageNotFound)?;
        let title = page.title.clone();

        let subtree = match self.collect_subtree(page).await {
            Ok(subtree) => subtree,
            Err(e) => {
                tracing::warn!(error = %e, page_id = %id, "Page subtree lookup failed");
                return Err(PageError::NotDeleted(title));
            }
        };
        if subtree.iter().any(|page| !editor.can_access(page)) {
            return Err(PageError::PermissionDenied);
        }

        let removed = subtree.len();
        for page in subtree.into_iter().rev() {
            if let Err(e) = self.remove(&page).await {
                tracing::warn!(error = %e, page_id = ?page.id, "Page delete failed");
                return Err(PageError::NotDeleted(title));
            }
        }

        tracing::info!(page_id = %id, removed, editor_id = %editor.id, "Page deleted");
        Ok(DeletePageOutput { title, removed })
    }

    /// The page followed by its descendants, parents before children
    async fn collect_subtree(&self, page: Page) -> PageResult<Vec<Page>> {
        let mut pages = vec![page];
        let mut next = 0;

        while next < pages.len() {
            if let Some(id) = pages[next].id {
                let children = self.repo.children_of(id).await?;
                pages.extend(children);
            }
            next += 1;

            if pages.len() > MAX_SUBTREE_SIZE {
                return Err(PageError::Internal(format!(
                    "subtree of page {} exceeds {MAX_SUBTREE_SIZE} pages",
                    pages[0].id.map_or(0, |id| id.value())
                )));
            }
        }

        Ok(pages)
    }

    async fn remove(&self, page: &Page) -> PageResult<()> {
        let Some(id) = page.id else {
            return Ok(());
        };

        self.repo.delete_parts_of(id).await?;
        replace_page_tags(self.repo.as_ref(), id, &[]).await?;
        if !self.repo.delete_page(id).await? {
            return Err(PageError::PageNotFound);
        }

        self.observers.notify(&PageEvent::PageDelete(page.clone()));
        Ok(())
    }
}
