//! Store Page Use Case
//!
//! Handles add and edit submissions: validation, the page row, its parts
//! and its tags.

use std::sync::Arc;

use chrono::Utc;
use kernel::id::PageId;

use crate::application::config::PagesConfig;
use crate::application::page_form::{FormAction, PageFormData, PageFormUseCase};
use crate::application::tags::replace_page_tags;
use crate::domain::entities::{
    Editor, FlashData, Page, PageInput, PagePart, PartInput, ROOT_PAGE_ID,
};
use crate::domain::events::{Observers, PageEvent};
use crate::domain::repository::{
    LayoutRepository, PagePartRepository, PageRepository, TagRepository,
};
use crate::domain::services::{parse_tag_list, plan_part_changes, validate_page};
use crate::error::{PageError, PageResult};

/// Which record the submission targets
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreTarget {
    Add,
    Edit(PageId),
}

impl StoreTarget {
    pub fn action(&self) -> FormAction {
        match self {
            StoreTarget::Add => FormAction::Add,
            StoreTarget::Edit(_) => FormAction::Edit,
        }
    }
}

/// Input DTO for store page
#[derive(Debug, Clone, Default)]
pub struct StorePageInput {
    pub page: PageInput,
    pub parts: Vec<PartInput>,
    /// Raw comma separated tag field
    pub tags: String,
    /// "Save and close" was pressed
    pub commit: bool,
}

/// Result of a submission
#[derive(Debug)]
pub enum StoreOutcome {
    /// Everything was written
    Saved { page_id: PageId, commit: bool },
    /// Validation failed; nothing was written
    Invalid(Box<PageFormData>),
    /// A write failed; the flash carries the input back
    NotSaved { target: StoreTarget, parent_id: PageId, flash: FlashData },
}

/// Store page use case
pub struct StorePageUseCase<R>
where
    R: PageRepository + PagePartRepository + TagRepository + LayoutRepository + Send + Sync,
{
    repo: Arc<R>,
    config: Arc<PagesConfig>,
    observers: Arc<Observers>,
}

impl<R> StorePageUseCase<R>
where
    R: PageRepository + PagePartRepository + TagRepository + LayoutRepository + Send + Sync,
{
    pub fn new(repo: Arc<R>, config: Arc<PagesConfig>, observers: Arc<Observers>) -> Self {
        Self {
            repo,
            config,
            observers,
        }
    }

    pub async fn execute(
        &self,
        target: StoreTarget,
        mut input: StorePageInput,
        editor: &Editor,
    ) -> PageResult<StoreOutcome> {
        let existing = match target {
            StoreTarget::Add => None,
            StoreTarget::Edit(id) => {
                let page = self
                    .repo
                    .find_page(id)
                    .await?
                    .ok_or(PageError::PageNotFound)?;
                if !editor.can_access(&page) {
                    return Err(PageError::PermissionDenied);
                }
                Some(page)
            }
        };

        input.page.title = self.clean_title(&input.page.title);
        if !editor.can_manage_protected() {
            input.page.is_protected = existing.as_ref().is_some_and(|page| page.is_protected);
        }

        let mut page = match existing {
            Some(page) => page,
            None => Page::new(
                input.page.parent_id.unwrap_or(ROOT_PAGE_ID),
                self.config.default_status,
            ),
        };
        page.apply(&input.page);

        let errors = validate_page(&input.page, &self.config.admin_dir);
        if !errors.is_empty() {
            tracing::debug!(errors = errors.len(), action = %target.action(), "Page form rejected");
            let form = PageFormUseCase::new(self.repo.clone(), self.config.clone())
                .resubmit(target.action(), page, input.tags, input.parts, &errors)
                .await?;
            return Ok(StoreOutcome::Invalid(Box::new(form)));
        }

        page.stamp(editor.id, Utc::now());
        self.observers.notify(&match target {
            StoreTarget::Add => PageEvent::PageAddBeforeSave(page.clone()),
            StoreTarget::Edit(_) => PageEvent::PageEditBeforeSave(page.clone()),
        });

        let page_id = match self.repo.save_page(&page).await {
            Ok(id) => id,
            Err(e) => {
                tracing::warn!(error = %e, action = %target.action(), "Page has not been saved");
                let parent_id = page.parent_id.unwrap_or(ROOT_PAGE_ID);
                return Ok(not_saved(target, parent_id, input));
            }
        };
        page.id = Some(page_id);

        // The page row exists from here on, so a retry goes to its edit screen.
        if let Err(e) = self.store_children(target, page_id, &input).await {
            tracing::warn!(error = %e, page_id = %page_id, "Page parts or tags not saved");
            let parent_id = page.parent_id.unwrap_or(ROOT_PAGE_ID);
            return Ok(not_saved(StoreTarget::Edit(page_id), parent_id, input));
        }

        self.observers.notify(&match target {
            StoreTarget::Add => PageEvent::PageAddAfterSave(page),
            StoreTarget::Edit(_) => PageEvent::PageEditAfterSave(page),
        });

        tracing::info!(
            page_id = %page_id,
            action = %target.action(),
            editor_id = %editor.id,
            "Page saved"
        );

        Ok(StoreOutcome::Saved {
            page_id,
            commit: input.commit,
        })
    }

    fn clean_title(&self, title: &str) -> String {
        let title = title.trim();
        if self.config.allow_html_title {
            title.to_string()
        } else {
            platform::html::strip_tags(title).trim().to_string()
        }
    }

    async fn store_children(
        &self,
        target: StoreTarget,
        page_id: PageId,
        input: &StorePageInput,
    ) -> PageResult<()> {
        self.store_parts(target, page_id, &input.parts).await?;
        replace_page_tags(self.repo.as_ref(), page_id, &parse_tag_list(&input.tags)).await
    }

    async fn store_parts(
        &self,
        target: StoreTarget,
        page_id: PageId,
        submitted: &[PartInput],
    ) -> PageResult<()> {
        let stored = match target {
            StoreTarget::Add => Vec::new(),
            StoreTarget::Edit(_) => self.repo.parts_of(page_id).await?,
        };
        let plan = plan_part_changes(&stored, submitted);

        for part in plan.updates {
            self.observers
                .notify(&PageEvent::PartEditBeforeSave(part.clone()));
            self.repo.save_part(&part).await?;
            self.observers.notify(&PageEvent::PartEditAfterSave(part));
        }

        for part in &plan.deletes {
            if let Some(id) = part.id {
                self.repo.delete_part(id).await?;
            }
        }

        for input in &plan.inserts {
            let mut part = PagePart::new(page_id, input);
            self.observers
                .notify(&PageEvent::PartAddBeforeSave(part.clone()));
            part.id = Some(self.repo.save_part(&part).await?);
            self.observers.notify(&PageEvent::PartAddAfterSave(part));
        }

        Ok(())
    }
}

fn not_saved(target: StoreTarget, parent_id: PageId, input: StorePageInput) -> StoreOutcome {
    let flash = FlashData {
        error: Some("Page has not been saved!".to_string()),
        post_data: Some(input.page),
        post_parts_data: Some(input.parts),
        ..Default::default()
    };
    StoreOutcome::NotSaved {
        target,
        parent_id,
        flash,
    }
}
