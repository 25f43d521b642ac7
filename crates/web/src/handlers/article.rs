//! Article page: GET renders the view, POST submits a comment
//!
//! GET /article?id={int}  renders the article, related articles, and the
//! comment thread. POST /article?id={int} submits a comment, then redirects
//! to the GET view so a refresh never resubmits.

use axum::{
    extract::{Query, State},
    response::{IntoResponse, Redirect, Response},
    Form,
};
use serde::Deserialize;
use tower_sessions::Session;

use crate::render::{self, base_context, ArticlePageView, CommentView};
use crate::service::article::{load_article_view, parse_article_id};
use crate::service::comment::{submit_comment, CommentOutcome};
use crate::AppState;
use newshub_common::{
    auth::{MaybeUser, SessionUser},
    errors::{AppError, Result},
    metrics,
    session::set_flash,
    Repository,
};

#[derive(Debug, Deserialize)]
pub struct ArticleQuery {
    /// Kept as a raw string so validation happens in one place
    pub id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CommentForm {
    #[serde(default)]
    pub comment: String,
}

/// GET /article
pub async fn show(
    State(state): State<AppState>,
    session: Session,
    MaybeUser(user): MaybeUser,
    Query(query): Query<ArticleQuery>,
) -> Result<Response> {
    let article_id = match parse_article_id(query.id.as_deref()) {
        Ok(id) => id,
        Err(e) => return home_with_flash(&session, &e).await,
    };

    let repo = Repository::new(state.db.clone());
    render_article_page(&state, &session, &repo, article_id, user.as_ref(), None, true).await
}

/// POST /article
pub async fn submit(
    State(state): State<AppState>,
    session: Session,
    MaybeUser(user): MaybeUser,
    Query(query): Query<ArticleQuery>,
    Form(form): Form<CommentForm>,
) -> Result<Response> {
    let article_id = match parse_article_id(query.id.as_deref()) {
        Ok(id) => id,
        Err(e) => return home_with_flash(&session, &e).await,
    };

    let repo = Repository::new(state.db.clone());

    match submit_comment(&repo, user.as_ref(), article_id, &form.comment).await {
        CommentOutcome::Posted { article_id } => {
            metrics::record_comment_outcome(true, "posted");
            Ok(article_redirect(article_id).into_response())
        }
        CommentOutcome::Rejected(reason) => {
            metrics::record_comment_outcome(false, reason.metric_label());
            render_article_page(
                &state,
                &session,
                &repo,
                article_id,
                user.as_ref(),
                Some(reason.message()),
                false,
            )
            .await
        }
    }
}

/// 303 back to the article's GET view (POST/redirect/GET)
fn article_redirect(article_id: i32) -> Redirect {
    Redirect::to(&format!("/article?id={article_id}"))
}

/// Flash the error's user message and send the visitor to the home page
async fn home_with_flash(session: &Session, error: &AppError) -> Result<Response> {
    tracing::info!(error = %error, "redirecting to home with notice");
    set_flash(session, error.user_message()).await?;
    Ok(Redirect::to("/").into_response())
}

/// `record_view` is true only for GET renders; the re-render after a
/// rejected comment POST is the same page but not another view.
async fn render_article_page(
    state: &AppState,
    session: &Session,
    repo: &Repository,
    article_id: i32,
    user: Option<&SessionUser>,
    comment_error: Option<&str>,
    record_view: bool,
) -> Result<Response> {
    match load_article_view(repo, article_id).await {
        Ok(view) => {
            if record_view {
                metrics::record_article_view();
            }

            let mut ctx = base_context(user);
            ctx.insert("error_message", &Option::<&str>::None);
            ctx.insert("article", &ArticlePageView::from(&view.article));
            ctx.insert("related", &view.related);
            ctx.insert(
                "comments",
                &view.comments.iter().map(CommentView::from).collect::<Vec<_>>(),
            );
            ctx.insert("comment_error", &comment_error);

            Ok(render::page(&state.templates, "article.html", &ctx)?.into_response())
        }
        Err(e @ AppError::ArticleNotFound { .. }) => home_with_flash(session, &e).await,
        Err(e) => {
            // Primary fetch failed: the page shows its inline error region
            // on a 200, matching the site's UX for technical failures.
            tracing::error!(error = %e, article_id, "article view failed");

            let mut ctx = base_context(user);
            ctx.insert("error_message", &Some(e.user_message()));
            ctx.insert("comment_error", &Option::<&str>::None);

            Ok(render::page(&state.templates, "article.html", &ctx)?.into_response())
        }
    }
}
