//! Home page: featured articles plus a preview section per category

use axum::{extract::State, response::Html};
use tower_sessions::Session;

use crate::render::{self, base_context, CategorySection, TeaserView};
use crate::AppState;
use newshub_common::{
    auth::MaybeUser,
    errors::Result,
    session::take_flash,
    Repository, CATEGORIES,
};

/// GET /
pub async fn index(
    State(state): State<AppState>,
    session: Session,
    MaybeUser(user): MaybeUser,
) -> Result<Html<String>> {
    // One-shot notice left by a redirect (invalid id, missing article)
    let notice = take_flash(&session).await?;

    let repo = Repository::new(state.db.clone());

    let mut ctx = base_context(user.as_ref());
    ctx.insert("notice", &notice);

    match load_home(&repo).await {
        Ok((featured, sections)) => {
            ctx.insert("error_message", &Option::<&str>::None);
            ctx.insert("featured", &featured);
            ctx.insert("sections", &sections);
        }
        Err(e) => {
            tracing::error!(error = %e, "home page fetch failed");
            ctx.insert("error_message", &Some(e.user_message()));
        }
    }

    render::page(&state.templates, "index.html", &ctx)
}

/// The home page fails as a unit: any query error blanks the whole page
/// into the error region, as the original site did.
async fn load_home(repo: &Repository) -> Result<(Vec<TeaserView>, Vec<CategorySection>)> {
    let featured = repo
        .featured_articles()
        .await?
        .iter()
        .map(TeaserView::from)
        .collect();

    let mut sections = Vec::with_capacity(CATEGORIES.len());
    for name in CATEGORIES {
        let cards = repo.category_preview(name).await?;
        sections.push(CategorySection {
            name: name.to_string(),
            cards,
        });
    }

    Ok((featured, sections))
}

#[cfg(test)]
mod tests {
    use super::*;
    use newshub_common::db::models::Article;
    use newshub_common::db::DbPool;
    use sea_orm::{DatabaseBackend, DbErr, MockDatabase};

    fn featured_article() -> Article {
        Article {
            id: 1,
            title: "Front page".into(),
            content: "Body".into(),
            category: "World".into(),
            author: "Desk".into(),
            image_url: "/img/f.jpg".into(),
            created_at: chrono::Utc::now().into(),
            featured: true,
        }
    }

    #[tokio::test]
    async fn builds_one_section_per_category() {
        let mut mock = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![featured_article()]]);
        for _ in CATEGORIES {
            mock = mock.append_query_results([Vec::<Article>::new()]);
        }
        let repo = Repository::new(DbPool {
            primary: mock.into_connection(),
            replica: None,
        });

        let (featured, sections) = load_home(&repo).await.unwrap();
        assert_eq!(featured.len(), 1);
        assert_eq!(sections.len(), CATEGORIES.len());
        assert_eq!(sections[0].name, "World");
    }

    #[tokio::test]
    async fn any_query_failure_fails_the_page() {
        let mock = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_errors([DbErr::Custom("down".into())]);
        let repo = Repository::new(DbPool {
            primary: mock.into_connection(),
            replica: None,
        });

        assert!(load_home(&repo).await.is_err());
    }
}
