//! Page Views
//!
//! Templates are compiled into the binary and rendered with auto-escaping,
//! so page titles and other editor input are always HTML-escaped.

use minijinja::{Environment, context, default_auto_escape_callback};
use serde::Serialize;

use crate::application::config::PagesConfig;
use crate::application::list_pages::{PageRow, PageTree};
use crate::application::page_form::{FormAction, PageFormData};
use crate::domain::entities::{FlashData, PartInput};
use crate::domain::value_objects::{LoginRequirement, PageStatus};
use crate::error::PageResult;

#[derive(Serialize)]
struct Choice {
    id: i16,
    label: &'static str,
}

/// Template renderer for the page screens
pub struct PageViews {
    env: Environment<'static>,
}

impl Default for PageViews {
    fn default() -> Self {
        Self::new()
    }
}

impl PageViews {
    pub fn new() -> Self {
        let mut env = Environment::new();
        env.set_auto_escape_callback(default_auto_escape_callback);
        env.set_loader(embedded_template_loader);
        Self { env }
    }

    /// Full tree screen
    pub fn index(
        &self,
        tree: &PageTree,
        flash: &FlashData,
        config: &PagesConfig,
    ) -> PageResult<String> {
        let tmpl = self.env.get_template("page/index.html")?;
        Ok(tmpl.render(context! {
            title => "Pages",
            base => config.base_path,
            flash => flash,
            root => tree.root,
            rows => tree.rows,
        })?)
    }

    /// Tree rows loaded into an expanded branch
    pub fn children(&self, rows: &[PageRow], config: &PagesConfig) -> PageResult<String> {
        let tmpl = self.env.get_template("page/children.html")?;
        Ok(tmpl.render(context! {
            base => config.base_path,
            rows => rows,
        })?)
    }

    /// Add or edit form
    pub fn edit(
        &self,
        form: &PageFormData,
        flash: &FlashData,
        config: &PagesConfig,
    ) -> PageResult<String> {
        let statuses: Vec<Choice> = PageStatus::ALL
            .iter()
            .map(|status| Choice {
                id: status.id(),
                label: status.label(),
            })
            .collect();
        let logins: Vec<Choice> = LoginRequirement::ALL
            .iter()
            .map(|login| Choice {
                id: login.id(),
                label: login.label(),
            })
            .collect();

        let tmpl = self.env.get_template("page/edit.html")?;
        Ok(tmpl.render(context! {
            title => match form.action {
                FormAction::Add => "Add page",
                FormAction::Edit => "Edit page",
            },
            base => config.base_path,
            flash => flash,
            errors => form.errors,
            action => form.action.to_string(),
            page => form.page,
            tags => form.tags,
            parts => form.parts,
            layouts => form.layouts,
            filters => form.filters,
            behaviors => form.behaviors,
            statuses => statuses,
            logins => logins,
        })?)
    }

    /// A single part editor, as inserted by "add part"
    pub fn part_edit(
        &self,
        index: u32,
        part: &PartInput,
        config: &PagesConfig,
    ) -> PageResult<String> {
        let tmpl = self.env.get_template("page/part_edit.html")?;
        Ok(tmpl.render(context! {
            index => index,
            part => part,
            filters => config.filters,
        })?)
    }
}

/// Template loader for minijinja that loads from embedded sources
fn embedded_template_loader(name: &str) -> Result<Option<String>, minijinja::Error> {
    let template_content = match name {
        "layout/backend.html" => Some(include_str!("templates/layout/backend.html")),
        "page/index.html" => Some(include_str!("templates/page/index.html")),
        "page/children.html" => Some(include_str!("templates/page/children.html")),
        "page/edit.html" => Some(include_str!("templates/page/edit.html")),
        "page/part_edit.html" => Some(include_str!("templates/page/part_edit.html")),
        _ => None,
    };

    Ok(template_content.map(|s| s.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::{Page, ROOT_PAGE_ID};
    use kernel::id::PageId;

    fn row(id: i64, title: &str) -> PageRow {
        let mut page = Page::new(ROOT_PAGE_ID, PageStatus::Published);
        page.id = Some(PageId::new(id));
        page.title = title.to_string();
        PageRow {
            page,
            level: 1,
            has_children: false,
            is_expanded: false,
            children: Vec::new(),
        }
    }

    #[test]
    fn test_children_escape_titles() {
        let views = PageViews::new();
        let html = views
            .children(&[row(4, "<b>News</b>")], &PagesConfig::default())
            .unwrap();

        assert!(html.contains("&lt;b&gt;News"));
        assert!(!html.contains("<b>"));
        assert!(html.contains("/edit/4"));
    }

    #[test]
    fn test_part_edit_fragment() {
        let views = PageViews::new();
        let part = PartInput::blank("sidebar", "");
        let html = views.part_edit(3, &part, &PagesConfig::default()).unwrap();

        assert!(html.contains("part[3][name]"));
        assert!(html.contains("sidebar"));
    }
}
