//! Page Lifecycle Events
//!
//! Observers are told about saves and deletes as they happen. They receive
//! snapshots and cannot change what gets stored.

use std::fmt;
use std::sync::Arc;

use crate::domain::entities::{Page, PagePart};

/// Something that happened to a page or one of its parts
#[derive(Debug, Clone, PartialEq)]
pub enum PageEvent {
    PageAddBeforeSave(Page),
    PageAddAfterSave(Page),
    PageEditBeforeSave(Page),
    PageEditAfterSave(Page),
    PartAddBeforeSave(PagePart),
    PartAddAfterSave(PagePart),
    PartEditBeforeSave(PagePart),
    PartEditAfterSave(PagePart),
    PageDelete(Page),
}

impl PageEvent {
    /// Hook name the event is published under
    pub const fn name(&self) -> &'static str {
        match self {
            PageEvent::PageAddBeforeSave(_) => "page_add_before_save",
            PageEvent::PageAddAfterSave(_) => "page_add_after_save",
            PageEvent::PageEditBeforeSave(_) => "page_edit_before_save",
            PageEvent::PageEditAfterSave(_) => "page_edit_after_save",
            PageEvent::PartAddBeforeSave(_) => "part_add_before_save",
            PageEvent::PartAddAfterSave(_) => "part_add_after_save",
            PageEvent::PartEditBeforeSave(_) => "part_edit_before_save",
            PageEvent::PartEditAfterSave(_) => "part_edit_after_save",
            PageEvent::PageDelete(_) => "page_delete",
        }
    }

    /// Page the event is about, when it is a page event
    pub fn page(&self) -> Option<&Page> {
        match self {
            PageEvent::PageAddBeforeSave(page)
            | PageEvent::PageAddAfterSave(page)
            | PageEvent::PageEditBeforeSave(page)
            | PageEvent::PageEditAfterSave(page)
            | PageEvent::PageDelete(page) => Some(page),
            _ => None,
        }
    }

    /// Part the event is about, when it is a part event
    pub fn part(&self) -> Option<&PagePart> {
        match self {
            PageEvent::PartAddBeforeSave(part)
            | PageEvent::PartAddAfterSave(part)
            | PageEvent::PartEditBeforeSave(part)
            | PageEvent::PartEditAfterSave(part) => Some(part),
            _ => None,
        }
    }
}

impl fmt::Display for PageEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Receiver of page lifecycle events
pub trait PageObserver: Send + Sync {
    fn notify(&self, event: &PageEvent);
}

/// Registered observers, notified in registration order
#[derive(Clone, Default)]
pub struct Observers {
    observers: Vec<Arc<dyn PageObserver>>,
}

impl Observers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, observer: Arc<dyn PageObserver>) {
        self.observers.push(observer);
    }

    pub fn with(mut self, observer: Arc<dyn PageObserver>) -> Self {
        self.register(observer);
        self
    }

    pub fn notify(&self, event: &PageEvent) {
        for observer in &self.observers {
            observer.notify(event);
        }
    }

    pub fn len(&self) -> usize {
        self.observers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observers.is_empty()
    }
}

impl fmt::Debug for Observers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Observers")
            .field("count", &self.observers.len())
            .finish()
    }
}

/// Logs every event at debug level
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingObserver;

impl PageObserver for TracingObserver {
    fn notify(&self, event: &PageEvent) {
        if let Some(page) = event.page() {
            tracing::debug!(
                event = event.name(),
                page_id = ?page.id,
                title = %page.title,
                "Page event"
            );
        } else if let Some(part) = event.part() {
            tracing::debug!(
                event = event.name(),
                page_id = %part.page_id,
                part = %part.name,
                "Page part event"
            );
        }
    }
}
