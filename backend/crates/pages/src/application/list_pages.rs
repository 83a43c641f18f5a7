//! List Pages Use Case
//!
//! Builds the page tree shown on the index and the rows loaded when a
//! branch is expanded.

use std::collections::HashSet;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use kernel::id::PageId;
use serde::Serialize;

use crate::domain::entities::{Page, ROOT_PAGE_ID};
use crate::domain::repository::PageRepository;
use crate::error::{PageError, PageResult};

/// Deepest level expanded in one request
const MAX_TREE_DEPTH: u32 = 64;

/// One row of the tree view
#[derive(Debug, Clone, Serialize)]
pub struct PageRow {
    pub page: Page,
    pub level: u32,
    pub has_children: bool,
    pub is_expanded: bool,
    /// Filled only for expanded rows
    pub children: Vec<PageRow>,
}

/// The whole index: root plus its visible descendants
#[derive(Debug, Clone, Serialize)]
pub struct PageTree {
    pub root: Page,
    pub rows: Vec<PageRow>,
}

/// Parse the `expanded_rows` cookie (`"2,5,9"`), skipping junk entries
pub fn parse_expanded_rows(raw: Option<&str>) -> HashSet<PageId> {
    raw.map(|raw| {
        raw.split(',')
            .filter_map(|id| id.trim().parse::<PageId>().ok())
            .collect()
    })
    .unwrap_or_default()
}

type RowsFuture<'a> = Pin<Box<dyn Future<Output = PageResult<Vec<PageRow>>> + Send + 'a>>;

/// List pages use case
pub struct ListPagesUseCase<R>
where
    R: PageRepository + Send + Sync,
{
    page_repo: Arc<R>,
}

impl<R> ListPagesUseCase<R>
where
    R: PageRepository + Send + Sync,
{
    pub fn new(page_repo: Arc<R>) -> Self {
        Self { page_repo }
    }

    /// Root page and the first level of the tree
    pub async fn index(&self, expanded: &HashSet<PageId>) -> PageResult<PageTree> {
        let root = self
            .page_repo
            .find_page(ROOT_PAGE_ID)
            .await?
            .ok_or(PageError::PageNotFound)?;

        let rows = self.rows(ROOT_PAGE_ID, 1, expanded).await?;

        tracing::debug!(rows = rows.len(), "Page index listed");
        Ok(PageTree { root, rows })
    }

    /// Children of `parent_id`, shown one level below `level`
    pub async fn children(
        &self,
        parent_id: PageId,
        level: u32,
        expanded: &HashSet<PageId>,
    ) -> PageResult<Vec<PageRow>> {
        self.rows(parent_id, level.saturating_add(1), expanded).await
    }

    fn rows<'a>(
        &'a self,
        parent_id: PageId,
        level: u32,
        expanded: &'a HashSet<PageId>,
    ) -> RowsFuture<'a> {
        Box::pin(async move {
            let children = self.page_repo.children_of(parent_id).await?;
            let mut rows = Vec::with_capacity(children.len());

            for page in children {
                let Some(id) = page.id else {
                    continue;
                };
                let has_children = self.page_repo.has_children(id).await?;
                let is_expanded = expanded.contains(&id);

                let children = if is_expanded && has_children && level < MAX_TREE_DEPTH {
                    self.rows(id, level + 1, expanded).await?
                } else {
                    Vec::new()
                };

                rows.push(PageRow {
                    page,
                    level,
                    has_children,
                    is_expanded,
                    children,
                });
            }

            Ok(rows)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_expanded_rows() {
        let ids = parse_expanded_rows(Some("2, 5,x,,9"));
        assert_eq!(ids.len(), 3);
        assert!(ids.contains(&PageId::new(5)));
        assert!(parse_expanded_rows(None).is_empty());
    }
}
