//! Form DTOs
//!
//! Turn decoded bracket forms into use-case input.

use kernel::id::{LayoutId, PageId, PagePartId};
use platform::form::FormValue;

use crate::application::store_page::StorePageInput;
use crate::domain::entities::{PageInput, PartInput};
use crate::domain::value_objects::{LoginRequirement, PageStatus};

/// Body of `POST /add-part`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddPartRequest {
    pub name: String,
    pub index: u32,
}

impl AddPartRequest {
    pub fn from_form(form: &FormValue) -> Self {
        let part = form.get("part");
        let name = part
            .and_then(|part| part.text("name"))
            .map(|name| name.trim().to_string())
            .unwrap_or_default();
        let index = part
            .and_then(|part| part.text("index"))
            .and_then(|index| index.trim().parse().ok())
            .unwrap_or(1);
        Self { name, index }
    }
}

/// Body of an add or edit submission
pub fn store_input_from_form(form: &FormValue, default_status: PageStatus) -> StorePageInput {
    let empty = FormValue::default();
    let page = form.get("page").unwrap_or(&empty);

    StorePageInput {
        page: page_input_from_form(page, default_status),
        parts: parts_from_form(form.get("part").unwrap_or(&empty)),
        tags: form
            .get("page_tag")
            .and_then(|tags| tags.text("tags"))
            .unwrap_or_default()
            .to_string(),
        commit: form.contains("commit"),
    }
}

fn page_input_from_form(page: &FormValue, default_status: PageStatus) -> PageInput {
    let text = |key: &str| page.text(key).unwrap_or_default().to_string();

    PageInput {
        parent_id: parse_id(page.text("parent_id")).map(PageId::new),
        title: text("title"),
        slug: text("slug"),
        breadcrumb: text("breadcrumb"),
        keywords: text("keywords"),
        description: text("description"),
        layout_id: parse_id(page.text("layout_id")).map(LayoutId::new),
        behavior_id: text("behavior_id"),
        status: page
            .text("status_id")
            .and_then(|id| id.trim().parse::<i16>().ok())
            .and_then(PageStatus::from_id)
            .unwrap_or(default_status),
        needs_login: page
            .text("needs_login")
            .and_then(|id| id.trim().parse::<i16>().ok())
            .and_then(LoginRequirement::from_id)
            .unwrap_or_default(),
        // Checkbox: any non-empty value means checked.
        is_protected: page
            .text("is_protected")
            .is_some_and(|value| !value.is_empty() && value != "0"),
    }
}

/// Parts in submission order
fn parts_from_form(parts: &FormValue) -> Vec<PartInput> {
    parts
        .entries()
        .iter()
        .map(|(_, part)| PartInput {
            id: parse_id(part.text("id")).map(PagePartId::new),
            name: part.text("name").unwrap_or_default().trim().to_string(),
            filter_id: part.text("filter_id").unwrap_or_default().to_string(),
            content: part.text("content").unwrap_or_default().to_string(),
        })
        .collect()
}

/// Positive integer id; empty or junk values mean "none"
fn parse_id(raw: Option<&str>) -> Option<i64> {
    raw.and_then(|raw| raw.trim().parse::<i64>().ok())
        .filter(|id| *id > 0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_input_from_form() {
        let form = FormValue::parse(
            "page[parent_id]=1&page[title]=About&page[slug]=about&page[status_id]=100\
             &page[needs_login]=1&page[layout_id]=&page[is_protected]=1\
             &part[1][name]=+body+&part[1][filter_id]=markdown&part[1][content]=Hi\
             &part[2][id]=7&part[2][name]=sidebar\
             &page_tag[tags]=news,+rust&commit=Save+and+Close",
        )
        .unwrap();

        let input = store_input_from_form(&form, PageStatus::Draft);

        assert_eq!(input.page.parent_id, Some(PageId::new(1)));
        assert_eq!(input.page.title, "About");
        assert_eq!(input.page.status, PageStatus::Published);
        assert_eq!(input.page.needs_login, LoginRequirement::Required);
        assert_eq!(input.page.layout_id, None);
        assert!(input.page.is_protected);

        assert_eq!(input.parts.len(), 2);
        assert_eq!(input.parts[0].name, "body");
        assert_eq!(input.parts[0].content, "Hi");
        assert_eq!(input.parts[1].id, Some(PagePartId::new(7)));

        assert_eq!(input.tags, "news, rust");
        assert!(input.commit);
    }

    #[test]
    fn test_missing_fields_fall_back() {
        let form = FormValue::parse("page[title]=x&page[status_id]=3").unwrap();
        let input = store_input_from_form(&form, PageStatus::Hidden);

        assert_eq!(input.page.status, PageStatus::Hidden);
        assert_eq!(input.page.needs_login, LoginRequirement::Inherit);
        assert!(!input.page.is_protected);
        assert!(input.parts.is_empty());
        assert!(!input.commit);
    }

    #[test]
    fn test_add_part_request() {
        let form = FormValue::parse("part[name]=+sidebar+&part[index]=4").unwrap();
        assert_eq!(
            AddPartRequest::from_form(&form),
            AddPartRequest {
                name: "sidebar".to_string(),
                index: 4
            }
        );

        let empty = AddPartRequest::from_form(&FormValue::default());
        assert_eq!(empty.name, "");
        assert_eq!(empty.index, 1);
    }
}
