//! HTTP Handlers
//!
//! Screens answer with full HTML pages; every POST answers with a redirect
//! carrying a flash cookie. The AJAX endpoints (children, add-part,
//! reorder, copy) answer with fragments or status codes, and with problem
//! details when they fail.

use axum::Extension;
use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::{AppendHeaders, Html, IntoResponse, Redirect, Response};
use kernel::id::PageId;
use platform::cookie::extract_cookie;
use platform::form::FormValue;
use std::sync::Arc;

use crate::application::config::PagesConfig;
use crate::application::{
    ArrangePagesUseCase, DeletePageUseCase, ListPagesUseCase, PageFormUseCase, StoreOutcome,
    StorePageUseCase, StoreTarget, parse_expanded_rows,
};
use crate::domain::PagesStore;
use crate::domain::entities::{Editor, FlashData, PartInput};
use crate::domain::events::Observers;
use crate::domain::services::parse_position_map;
use crate::error::{PageError, PageResult};
use crate::presentation::dto::{AddPartRequest, store_input_from_form};
use crate::presentation::flash::{put_flash, take_flash};
use crate::presentation::views::PageViews;

/// Shared state for page handlers
#[derive(Clone)]
pub struct PagesAppState<R>
where
    R: PagesStore,
{
    pub repo: Arc<R>,
    pub config: Arc<PagesConfig>,
    pub views: Arc<PageViews>,
    pub observers: Arc<Observers>,
}

// ============================================================================
// Tree
// ============================================================================

/// GET /
pub async fn index<R>(
    State(state): State<PagesAppState<R>>,
    headers: HeaderMap,
) -> PageResult<Response>
where
    R: PagesStore,
{
    let flash = take_flash(state.repo.as_ref(), &state.config, &headers).await;
    let expanded = parse_expanded_rows(
        extract_cookie(&headers, &state.config.expanded_rows_cookie).as_deref(),
    );

    let tree = ListPagesUseCase::new(state.repo.clone())
        .index(&expanded)
        .await?;
    let html = state.views.index(&tree, &flash.data, &state.config)?;

    Ok(html_page(html, flash.clear_cookie))
}

/// GET /children/{parent_id}/{level}
pub async fn children<R>(
    State(state): State<PagesAppState<R>>,
    headers: HeaderMap,
    Path((parent_id, level)): Path<(i64, u32)>,
) -> PageResult<Html<String>>
where
    R: PagesStore,
{
    let expanded = parse_expanded_rows(
        extract_cookie(&headers, &state.config.expanded_rows_cookie).as_deref(),
    );

    let rows = ListPagesUseCase::new(state.repo.clone())
        .children(PageId::new(parent_id), level, &expanded)
        .await?;

    Ok(Html(state.views.children(&rows, &state.config)?))
}

// ============================================================================
// Add
// ============================================================================

/// GET /add
pub async fn add_form<R>(
    State(state): State<PagesAppState<R>>,
    headers: HeaderMap,
) -> PageResult<Response>
where
    R: PagesStore,
{
    render_add(&state, None, &headers).await
}

/// GET /add/{parent_id}
pub async fn add_child_form<R>(
    State(state): State<PagesAppState<R>>,
    headers: HeaderMap,
    Path(parent_id): Path<String>,
) -> PageResult<Response>
where
    R: PagesStore,
{
    render_add(&state, parent_id.parse().ok(), &headers).await
}

async fn render_add<R>(
    state: &PagesAppState<R>,
    parent_id: Option<PageId>,
    headers: &HeaderMap,
) -> PageResult<Response>
where
    R: PagesStore,
{
    let flash = take_flash(state.repo.as_ref(), &state.config, headers).await;

    let form = PageFormUseCase::new(state.repo.clone(), state.config.clone())
        .prepare_add(parent_id, &flash.data)
        .await?;
    let html = state.views.edit(&form, &flash.data, &state.config)?;

    Ok(html_page(html, flash.clear_cookie))
}

/// POST /add
pub async fn add_store<R>(
    State(state): State<PagesAppState<R>>,
    Extension(editor): Extension<Editor>,
    body: String,
) -> PageResult<Response>
where
    R: PagesStore,
{
    store(&state, StoreTarget::Add, None, &body, &editor).await
}

/// POST /add/{parent_id}
pub async fn add_child_store<R>(
    State(state): State<PagesAppState<R>>,
    Extension(editor): Extension<Editor>,
    Path(parent_id): Path<String>,
    body: String,
) -> PageResult<Response>
where
    R: PagesStore,
{
    store(&state, StoreTarget::Add, parent_id.parse().ok(), &body, &editor).await
}

/// POST /add-part
///
/// Renders one empty part editor for the page form.
pub async fn add_part<R>(
    State(state): State<PagesAppState<R>>,
    body: String,
) -> PageResult<Html<String>>
where
    R: PagesStore,
{
    let form = FormValue::parse(&body)?;
    let req = AddPartRequest::from_form(&form);

    let part = PartInput::blank(req.name, state.config.default_filter_id.clone());

    Ok(Html(state.views.part_edit(req.index, &part, &state.config)?))
}

// ============================================================================
// Edit
// ============================================================================

/// GET /edit/{id}
pub async fn edit_form<R>(
    State(state): State<PagesAppState<R>>,
    Extension(editor): Extension<Editor>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> PageResult<Response>
where
    R: PagesStore,
{
    let Ok(id) = id.parse::<PageId>() else {
        return Ok(Redirect::to(&state.config.url("")).into_response());
    };
    let flash = take_flash(state.repo.as_ref(), &state.config, &headers).await;

    let use_case = PageFormUseCase::new(state.repo.clone(), state.config.clone());
    let form = match use_case.prepare_edit(id, &editor).await {
        Ok(form) => form,
        Err(e @ (PageError::PageNotFound | PageError::PermissionDenied)) => {
            return Ok(flash_redirect(&state, "", FlashData::error(e.to_string())).await);
        }
        Err(e) => return Err(e),
    };
    let html = state.views.edit(&form, &flash.data, &state.config)?;

    Ok(html_page(html, flash.clear_cookie))
}

/// POST /edit/{id}
pub async fn edit_store<R>(
    State(state): State<PagesAppState<R>>,
    Extension(editor): Extension<Editor>,
    Path(id): Path<String>,
    body: String,
) -> PageResult<Response>
where
    R: PagesStore,
{
    let Ok(id) = id.parse::<PageId>() else {
        return Ok(Redirect::to(&state.config.url("")).into_response());
    };

    store(&state, StoreTarget::Edit(id), None, &body, &editor).await
}

async fn store<R>(
    state: &PagesAppState<R>,
    target: StoreTarget,
    path_parent: Option<PageId>,
    body: &str,
    editor: &Editor,
) -> PageResult<Response>
where
    R: PagesStore,
{
    let form = FormValue::parse(body)?;
    let mut input = store_input_from_form(&form, state.config.default_status);
    if input.page.parent_id.is_none() {
        input.page.parent_id = path_parent;
    }

    let use_case =
        StorePageUseCase::new(state.repo.clone(), state.config.clone(), state.observers.clone());

    let outcome = match use_case.execute(target, input, editor).await {
        Ok(outcome) => outcome,
        Err(e @ (PageError::PageNotFound | PageError::PermissionDenied)) => {
            return Ok(flash_redirect(state, "", FlashData::error(e.to_string())).await);
        }
        Err(e) => {
            e.log();
            let flash = FlashData::error("Page has not been saved!");
            return Ok(flash_redirect(state, "", flash).await);
        }
    };

    match outcome {
        StoreOutcome::Saved { page_id, commit } => {
            let action = if commit {
                String::new()
            } else {
                format!("edit/{page_id}")
            };
            Ok(flash_redirect(state, &action, FlashData::success("Page has been saved!")).await)
        }
        StoreOutcome::Invalid(form) => {
            let html = state.views.edit(&form, &FlashData::default(), &state.config)?;
            Ok((StatusCode::UNPROCESSABLE_ENTITY, Html(html)).into_response())
        }
        StoreOutcome::NotSaved {
            target,
            parent_id,
            flash,
        } => {
            let action = match target {
                StoreTarget::Add => format!("add/{parent_id}"),
                StoreTarget::Edit(id) => format!("edit/{id}"),
            };
            Ok(flash_redirect(state, &action, flash).await)
        }
    }
}

// ============================================================================
// Delete
// ============================================================================

/// GET|POST /delete/{id}
pub async fn delete<R>(
    State(state): State<PagesAppState<R>>,
    Extension(editor): Extension<Editor>,
    Path(id): Path<String>,
) -> PageResult<Response>
where
    R: PagesStore,
{
    let Ok(id) = id.parse::<PageId>() else {
        let flash = FlashData::error(PageError::PageNotFound.to_string());
        return Ok(flash_redirect(&state, "", flash).await);
    };

    let use_case = DeletePageUseCase::new(state.repo.clone(), state.observers.clone());
    let flash = match use_case.execute(id, &editor).await {
        Ok(output) => FlashData::success(format!("Page {} has been deleted!", output.title)),
        Err(
            e @ (PageError::RootPageProtected
            | PageError::PageNotFound
            | PageError::PermissionDenied
            | PageError::NotDeleted(_)),
        ) => FlashData::error(e.to_string()),
        // The page could not even be read, so there is no title to report.
        Err(e) => {
            e.log();
            FlashData::error(PageError::PageNotFound.to_string())
        }
    };

    Ok(flash_redirect(&state, "", flash).await)
}

// ============================================================================
// Reorder / Copy
// ============================================================================

/// POST /reorder/{parent_id}
pub async fn reorder<R>(
    State(state): State<PagesAppState<R>>,
    Extension(editor): Extension<Editor>,
    Path(parent_id): Path<i64>,
    body: String,
) -> PageResult<StatusCode>
where
    R: PagesStore,
{
    let map = parse_position_map(&position_data(&body)?)?;

    ArrangePagesUseCase::new(state.repo.clone())
        .reorder(PageId::new(parent_id), &map, &editor)
        .await?;

    Ok(StatusCode::OK)
}

/// POST /copy/{parent_id}
///
/// Answers with the id of the new branch root.
pub async fn copy<R>(
    State(state): State<PagesAppState<R>>,
    Extension(editor): Extension<Editor>,
    Path(parent_id): Path<i64>,
    body: String,
) -> PageResult<String>
where
    R: PagesStore,
{
    let map = parse_position_map(&position_data(&body)?)?;

    let clone_id = ArrangePagesUseCase::new(state.repo.clone())
        .copy(PageId::new(parent_id), &map, &editor)
        .await?;

    Ok(clone_id.to_string())
}

/// The serialized position map travels in the `data` field
fn position_data(body: &str) -> PageResult<String> {
    let form = FormValue::parse(body)?;
    form.text("data")
        .map(str::to_string)
        .ok_or_else(|| PageError::InvalidPositionMap("data field missing".to_string()))
}

// ============================================================================
// Response helpers
// ============================================================================

fn html_page(html: String, set_cookie: Option<String>) -> Response {
    (
        AppendHeaders(set_cookie.map(|cookie| (header::SET_COOKIE, cookie))),
        Html(html),
    )
        .into_response()
}

/// Redirect to `action` under the base path, leaving `flash` for the next screen
///
/// A flash that cannot be stored is dropped; the redirect still happens.
async fn flash_redirect<R>(state: &PagesAppState<R>, action: &str, flash: FlashData) -> Response
where
    R: PagesStore,
{
    let location = state.config.url(action);

    match put_flash(state.repo.as_ref(), &state.config, &flash).await {
        Ok(cookie) => (
            AppendHeaders([(header::SET_COOKIE, cookie)]),
            Redirect::to(&location),
        )
            .into_response(),
        Err(e) => {
            tracing::warn!(error = %e, "Failed to store flash");
            Redirect::to(&location).into_response()
        }
    }
}
