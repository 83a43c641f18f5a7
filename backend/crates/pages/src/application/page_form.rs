//! Page Form Use Case
//!
//! Gathers everything the page editor shows, for a new page or an existing
//! one.

use std::fmt;
use std::sync::Arc;

use kernel::id::PageId;
use serde::Serialize;

use crate::application::config::PagesConfig;
use crate::application::tags::tag_names_of;
use crate::domain::entities::{
    DEFAULT_PART_NAME, Editor, FlashData, Layout, Page, PartInput, ROOT_PAGE_ID,
};
use crate::domain::repository::{
    LayoutRepository, PagePartRepository, PageRepository, TagRepository,
};
use crate::error::{PageError, PageResult};

/// Which form is being shown
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FormAction {
    Add,
    Edit,
}

impl fmt::Display for FormAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FormAction::Add => f.write_str("add"),
            FormAction::Edit => f.write_str("edit"),
        }
    }
}

/// Everything the edit view renders
#[derive(Debug, Clone, Serialize)]
pub struct PageFormData {
    pub action: FormAction,
    pub page: Page,
    /// Comma separated, as typed into the tag field
    pub tags: String,
    pub parts: Vec<PartInput>,
    pub layouts: Vec<Layout>,
    pub filters: Vec<String>,
    pub behaviors: Vec<String>,
    /// Validation messages joined by `<br/>`
    pub errors: Option<String>,
}

/// Page form use case
pub struct PageFormUseCase<R>
where
    R: PageRepository + PagePartRepository + TagRepository + LayoutRepository + Send + Sync,
{
    repo: Arc<R>,
    config: Arc<PagesConfig>,
}

impl<R> PageFormUseCase<R>
where
    R: PageRepository + PagePartRepository + TagRepository + LayoutRepository + Send + Sync,
{
    pub fn new(repo: Arc<R>, config: Arc<PagesConfig>) -> Self {
        Self { repo, config }
    }

    /// Blank form for a new child of `parent_id` (root when absent)
    ///
    /// Data flashed by a failed save is shown again. Otherwise the parts
    /// mirror the newest sibling, so pages in one section share a shape.
    pub async fn prepare_add(
        &self,
        parent_id: Option<PageId>,
        flash: &FlashData,
    ) -> PageResult<PageFormData> {
        let parent_id = parent_id.unwrap_or(ROOT_PAGE_ID);

        let mut page = Page::new(parent_id, self.config.default_status);
        if let Some(post_data) = &flash.post_data {
            page.apply(post_data);
        }

        let parts = match &flash.post_parts_data {
            Some(parts) if !parts.is_empty() => parts.clone(),
            _ => self.sibling_parts(parent_id).await?,
        };

        self.form(FormAction::Add, page, String::new(), parts, None)
            .await
    }

    /// Form for an existing page
    pub async fn prepare_edit(&self, id: PageId, editor: &Editor) -> PageResult<PageFormData> {
        let page = self
            .repo
            .find_page(id)
            .await?
            .ok_or(PageError::PageNotFound)?;

        if !editor.can_access(&page) {
            return Err(PageError::PermissionDenied);
        }

        let mut parts: Vec<PartInput> = self
            .repo
            .parts_of(id)
            .await?
            .iter()
            .map(PartInput::from)
            .collect();
        if parts.is_empty() {
            parts.push(self.blank_part(DEFAULT_PART_NAME));
        }

        let tags = tag_names_of(self.repo.as_ref(), id).await?.join(", ");

        self.form(FormAction::Edit, page, tags, parts, None).await
    }

    /// Submitted data shown again together with validation errors
    pub async fn resubmit(
        &self,
        action: FormAction,
        page: Page,
        tags: String,
        parts: Vec<PartInput>,
        errors: &[String],
    ) -> PageResult<PageFormData> {
        self.form(action, page, tags, parts, Some(errors.join("<br/>")))
            .await
    }

    async fn form(
        &self,
        action: FormAction,
        page: Page,
        tags: String,
        parts: Vec<PartInput>,
        errors: Option<String>,
    ) -> PageResult<PageFormData> {
        let layouts = self.repo.all_layouts().await?;

        Ok(PageFormData {
            action,
            page,
            tags,
            parts,
            layouts,
            filters: self.config.filters.clone(),
            behaviors: self.config.behaviors.clone(),
            errors,
        })
    }

    async fn sibling_parts(&self, parent_id: PageId) -> PageResult<Vec<PartInput>> {
        let sister = self.repo.latest_child_of(parent_id).await?;

        let mut parts = Vec::new();
        if let Some(sister_id) = sister.and_then(|page| page.id) {
            parts = self
                .repo
                .parts_of(sister_id)
                .await?
                .into_iter()
                .map(|part| self.blank_part(part.name))
                .collect();
        }

        if parts.is_empty() {
            parts.push(self.blank_part(DEFAULT_PART_NAME));
        }
        Ok(parts)
    }

    fn blank_part(&self, name: impl Into<String>) -> PartInput {
        PartInput::blank(name, self.config.default_filter_id.as_str())
    }
}
