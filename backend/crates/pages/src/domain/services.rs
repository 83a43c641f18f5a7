//! Domain Services
//!
//! Pure rules of the page controller. Nothing in here touches storage.

use kernel::id::PageId;
use platform::form::FormValue;

use crate::domain::entities::{PageInput, PagePart, PartInput};
use crate::domain::value_objects::PositionMap;
use crate::error::{PageError, PageResult};

/// Check submitted page fields, returning every failure message
pub fn validate_page(input: &PageInput, admin_dir: &str) -> Vec<String> {
    let mut errors = Vec::new();

    if input.title.trim().is_empty() {
        errors.push("You have to specify a title!".to_string());
    }

    let slug = input.slug.trim();
    if slug.is_empty() {
        errors.push("You have to specify a slug!".to_string());
    } else if slug == admin_dir {
        errors.push(format!("You cannot have a slug named {admin_dir}!"));
    }

    errors
}

/// What to do with the stored parts of a page after an edit
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PartPlan {
    /// Stored parts carrying the submitted filter and content
    pub updates: Vec<PagePart>,
    /// Stored parts no longer submitted
    pub deletes: Vec<PagePart>,
    /// Submitted parts without a stored counterpart
    pub inserts: Vec<PartInput>,
}

/// Match submitted parts against stored ones by trimmed name
///
/// Each stored part claims the first unclaimed submission with its name and
/// keeps its own id; the stored id wins over any id in the submission.
pub fn plan_part_changes(stored: &[PagePart], submitted: &[PartInput]) -> PartPlan {
    let mut remaining: Vec<Option<&PartInput>> = submitted.iter().map(Some).collect();
    let mut plan = PartPlan::default();

    for old in stored {
        let claimed = remaining
            .iter_mut()
            .find(|slot| matches!(slot, Some(input) if input.name.trim() == old.name))
            .and_then(Option::take);

        match claimed {
            Some(input) => plan.updates.push(PagePart {
                id: old.id,
                page_id: old.page_id,
                name: old.name.clone(),
                filter_id: input.filter_id.clone(),
                content: input.content.clone(),
            }),
            None => plan.deletes.push(old.clone()),
        }
    }

    plan.inserts = remaining
        .into_iter()
        .flatten()
        .map(|input| PartInput {
            id: None,
            name: input.name.trim().to_string(),
            ..input.clone()
        })
        .collect();

    plan
}

/// Split a comma separated tag field into distinct names
pub fn parse_tag_list(raw: &str) -> Vec<String> {
    let mut names: Vec<String> = Vec::new();
    for name in raw.split(',').map(str::trim).filter(|name| !name.is_empty()) {
        if !names.iter().any(|seen| seen == name) {
            names.push(name.to_string());
        }
    }
    names
}

/// Tag names to add and to drop when moving from `current` to `wanted`
pub fn diff_tags(current: &[String], wanted: &[String]) -> (Vec<String>, Vec<String>) {
    let added = wanted
        .iter()
        .filter(|name| !current.contains(name))
        .cloned()
        .collect();
    let removed = current
        .iter()
        .filter(|name| !wanted.contains(name))
        .cloned()
        .collect();
    (added, removed)
}

/// Decode the serialized sortable list posted by the tree view
///
/// Accepts `pages[]=3&pages[]=7`, explicit `pages[0]=3` keys, and an
/// optional `dragged_id=N`. Entries keep their submission order.
pub fn parse_position_map(data: &str) -> PageResult<PositionMap> {
    let form =
        FormValue::parse(data).map_err(|e| PageError::InvalidPositionMap(e.to_string()))?;
    let mut map = PositionMap::default();

    if let Some(pages) = form.get("pages") {
        for (key, value) in pages.entries() {
            let position = key
                .parse::<i32>()
                .map_err(|_| PageError::InvalidPositionMap(format!("position {key:?}")))?;
            let page_id = parse_page_id(value.as_text().unwrap_or_default())?;
            map.entries.push((position, page_id));
        }
    }

    if let Some(raw) = form.text("dragged_id") {
        map.dragged_id = Some(parse_page_id(raw)?);
    }

    Ok(map)
}

fn parse_page_id(raw: &str) -> PageResult<PageId> {
    raw.trim()
        .parse::<PageId>()
        .map_err(|_| PageError::InvalidPositionMap(format!("page id {raw:?}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use kernel::id::PagePartId;

    fn input(title: &str, slug: &str) -> PageInput {
        PageInput {
            title: title.to_string(),
            slug: slug.to_string(),
            ..Default::default()
        }
    }

    fn stored(id: i64, name: &str) -> PagePart {
        PagePart {
            id: Some(PagePartId::new(id)),
            page_id: PageId::new(7),
            name: name.to_string(),
            filter_id: String::new(),
            content: format!("old {name}"),
        }
    }

    fn submitted(name: &str, content: &str) -> PartInput {
        PartInput {
            id: None,
            name: name.to_string(),
            filter_id: "markdown".to_string(),
            content: content.to_string(),
        }
    }

    #[test]
    fn test_validate_accepts_complete_page() {
        assert!(validate_page(&input("About", "about"), "admin").is_empty());
    }

    #[test]
    fn test_validate_reports_every_failure() {
        let errors = validate_page(&input("  ", ""), "admin");
        assert_eq!(
            errors,
            vec!["You have to specify a title!", "You have to specify a slug!"]
        );
    }

    #[test]
    fn test_validate_rejects_admin_slug() {
        let errors = validate_page(&input("Admin", " admin "), "admin");
        assert_eq!(errors, vec!["You cannot have a slug named admin!"]);
    }

    #[test]
    fn test_plan_updates_deletes_and_inserts() {
        let old = vec![stored(1, "body"), stored(2, "sidebar")];
        let new = vec![submitted(" body ", "new body"), submitted("extended", "more")];

        let plan = plan_part_changes(&old, &new);

        assert_eq!(plan.updates.len(), 1);
        assert_eq!(plan.updates[0].id, Some(PagePartId::new(1)));
        assert_eq!(plan.updates[0].content, "new body");
        assert_eq!(plan.updates[0].filter_id, "markdown");

        assert_eq!(plan.deletes, vec![stored(2, "sidebar")]);

        assert_eq!(plan.inserts.len(), 1);
        assert_eq!(plan.inserts[0].name, "extended");
    }

    #[test]
    fn test_plan_duplicate_names_claim_once() {
        let old = vec![stored(1, "body")];
        let new = vec![submitted("body", "first"), submitted("body", "second")];

        let plan = plan_part_changes(&old, &new);

        assert_eq!(plan.updates[0].content, "first");
        assert_eq!(plan.inserts.len(), 1);
        assert_eq!(plan.inserts[0].content, "second");
    }

    #[test]
    fn test_plan_ignores_submitted_ids_for_inserts() {
        let mut part = submitted("teaser", "x");
        part.id = Some(PagePartId::new(99));
        let plan = plan_part_changes(&[], &[part]);
        assert_eq!(plan.inserts[0].id, None);
    }

    #[test]
    fn test_parse_tag_list() {
        assert_eq!(parse_tag_list("news, rust ,news,, "), vec!["news", "rust"]);
        assert!(parse_tag_list("").is_empty());
    }

    #[test]
    fn test_diff_tags() {
        let current = vec!["a".to_string(), "b".to_string()];
        let wanted = vec!["b".to_string(), "c".to_string()];
        let (added, removed) = diff_tags(&current, &wanted);
        assert_eq!(added, vec!["c"]);
        assert_eq!(removed, vec!["a"]);
    }

    #[test]
    fn test_parse_position_map_appended() {
        let map = parse_position_map("pages[]=3&pages[]=7&pages[]=2").unwrap();
        assert_eq!(
            map.entries,
            vec![
                (0, PageId::new(3)),
                (1, PageId::new(7)),
                (2, PageId::new(2))
            ]
        );
        assert_eq!(map.dragged_id, None);
    }

    #[test]
    fn test_parse_position_map_with_dragged_id() {
        let map = parse_position_map("pages%5B0%5D=5&pages%5B1%5D=9&dragged_id=9").unwrap();
        assert_eq!(map.entries, vec![(0, PageId::new(5)), (1, PageId::new(9))]);
        assert_eq!(map.dragged_id, Some(PageId::new(9)));
    }

    #[test]
    fn test_parse_position_map_rejects_garbage() {
        assert!(matches!(
            parse_position_map("pages[]=abc"),
            Err(PageError::InvalidPositionMap(_))
        ));
        assert!(matches!(
            parse_position_map("pages[x]=3"),
            Err(PageError::InvalidPositionMap(_))
        ));
        assert!(parse_position_map("").unwrap().is_empty());
    }
}
