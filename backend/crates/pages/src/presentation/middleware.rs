//! Editor Middleware
//!
//! Every page screen requires a signed-in editor. Requests without a valid
//! session are sent to the login page.

use axum::body::Body;
use axum::extract::State;
use axum::http::Request;
use axum::middleware::Next;
use axum::response::{IntoResponse, Redirect, Response};
use platform::cookie::extract_cookie;
use platform::crypto::verify_token;

use crate::domain::PagesStore;
use crate::domain::entities::Editor;
use crate::presentation::handlers::PagesAppState;

/// Resolve the editor session and store the [`Editor`] in request extensions
pub async fn require_editor<R>(
    State(state): State<PagesAppState<R>>,
    mut req: Request<Body>,
    next: Next,
) -> Response
where
    R: PagesStore,
{
    let session_id = extract_cookie(req.headers(), &state.config.session_cookie_name)
        .and_then(|token| verify_token(&token, &state.config.session_secret));

    let editor: Option<Editor> = match session_id {
        Some(session_id) => match state.repo.find_editor_by_session(session_id).await {
            Ok(editor) => editor,
            Err(e) => return e.into_response(),
        },
        None => None,
    };

    match editor {
        Some(editor) => {
            req.extensions_mut().insert(editor);
            next.run(req).await
        }
        None => {
            tracing::debug!(path = %req.uri().path(), "No editor session, redirecting to login");
            Redirect::to(&state.config.login_url).into_response()
        }
    }
}
