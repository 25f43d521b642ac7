//! Search results page

use axum::{
    extract::{Query, State},
    response::Html,
};
use serde::Deserialize;

use crate::render::{self, base_context, TeaserView};
use crate::AppState;
use newshub_common::{auth::MaybeUser, errors::Result, metrics, Repository};

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    pub q: Option<String>,
}

/// GET /search?q={text}
pub async fn show(
    State(state): State<AppState>,
    MaybeUser(user): MaybeUser,
    Query(query): Query<SearchQuery>,
) -> Result<Html<String>> {
    let needle = query.q.unwrap_or_default().trim().to_string();
    let repo = Repository::new(state.db.clone());

    let mut ctx = base_context(user.as_ref());
    ctx.insert("query", &needle);

    match repo.search_articles(&needle).await {
        Ok(articles) => {
            metrics::record_search(articles.len());
            ctx.insert("error_message", &Option::<&str>::None);
            ctx.insert(
                "results",
                &articles.iter().map(TeaserView::from).collect::<Vec<_>>(),
            );
        }
        Err(e) => {
            tracing::error!(error = %e, query = %needle, "search failed");
            ctx.insert("error_message", &Some(e.user_message()));
        }
    }

    render::page(&state.templates, "search.html", &ctx)
}
