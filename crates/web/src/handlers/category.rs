//! Category listing page

use axum::{
    extract::{Query, State},
    response::Html,
};
use serde::Deserialize;

use crate::render::{self, base_context, TeaserView};
use crate::AppState;
use newshub_common::{auth::MaybeUser, errors::Result, Repository};

#[derive(Debug, Deserialize)]
pub struct CategoryQuery {
    pub cat: Option<String>,
}

/// GET /category?cat={name}
pub async fn show(
    State(state): State<AppState>,
    MaybeUser(user): MaybeUser,
    Query(query): Query<CategoryQuery>,
) -> Result<Html<String>> {
    let category = query.cat.unwrap_or_default();
    let repo = Repository::new(state.db.clone());

    let mut ctx = base_context(user.as_ref());
    ctx.insert("category", &category);

    match repo.articles_in_category(&category).await {
        Ok(articles) => {
            ctx.insert("error_message", &Option::<&str>::None);
            ctx.insert(
                "articles",
                &articles.iter().map(TeaserView::from).collect::<Vec<_>>(),
            );
        }
        Err(e) => {
            tracing::error!(error = %e, category = %category, "category listing failed");
            ctx.insert("error_message", &Some(e.user_message()));
        }
    }

    render::page(&state.templates, "category.html", &ctx)
}
