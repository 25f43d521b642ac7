//! Article view assembly
//!
//! Loads everything the article page needs: the article itself, up to
//! three related articles, and the comment thread. The primary fetch is
//! strict; the two secondary fetches degrade to empty lists so a partial
//! outage never blanks the whole page.

use newshub_common::{
    db::{models::{Article, Comment}, ArticleCard},
    errors::{AppError, Result},
    Repository,
};

/// Everything rendered on one article page
#[derive(Debug, Clone)]
pub struct ArticleView {
    pub article: Article,
    pub related: Vec<ArticleCard>,
    pub comments: Vec<Comment>,
}

/// Parse and validate the `id` query parameter.
///
/// Anything missing, non-numeric, or not strictly positive is rejected
/// here, before any datastore access.
pub fn parse_article_id(raw: Option<&str>) -> Result<i32> {
    let raw = raw.unwrap_or("").trim();
    match raw.parse::<i32>() {
        Ok(id) if id > 0 => Ok(id),
        _ => Err(AppError::InvalidIdentifier {
            raw: raw.to_string(),
        }),
    }
}

/// Load the article view for a validated id.
///
/// Fails with `ArticleNotFound` if no row matches, and propagates a
/// database error only for the primary fetch. Related-article and
/// comment failures are logged and replaced with empty lists.
pub async fn load_article_view(repo: &Repository, article_id: i32) -> Result<ArticleView> {
    let article = repo
        .find_article_by_id(article_id)
        .await?
        .ok_or(AppError::ArticleNotFound { id: article_id })?;

    let related = match repo.related_articles(&article.category, article_id).await {
        Ok(related) => related,
        Err(e) => {
            tracing::warn!(error = %e, article_id, "related articles fetch failed");
            Vec::new()
        }
    };

    let comments = match repo.comments_for_article(article_id).await {
        Ok(comments) => comments,
        Err(e) => {
            tracing::warn!(error = %e, article_id, "comments fetch failed");
            Vec::new()
        }
    };

    Ok(ArticleView {
        article,
        related,
        comments,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use newshub_common::db::DbPool;
    use sea_orm::{DatabaseBackend, DbErr, MockDatabase};

    fn repo_for(db: sea_orm::DatabaseConnection) -> Repository {
        Repository::new(DbPool {
            primary: db,
            replica: None,
        })
    }

    fn sample_article(id: i32) -> Article {
        Article {
            id,
            title: "Quantum Leap".into(),
            content: "First paragraph.\nSecond paragraph.".into(),
            category: "Technology".into(),
            author: "Jane Reporter".into(),
            image_url: "/img/quantum.jpg".into(),
            created_at: chrono::Utc::now().into(),
            featured: false,
        }
    }

    #[test]
    fn rejects_bad_ids_without_touching_the_database() {
        for raw in [None, Some(""), Some("abc"), Some("0"), Some("-3"), Some("1.5")] {
            let err = parse_article_id(raw).unwrap_err();
            assert!(
                matches!(err, AppError::InvalidIdentifier { .. }),
                "{raw:?} should be invalid"
            );
        }
    }

    #[test]
    fn accepts_positive_integers() {
        assert_eq!(parse_article_id(Some("42")).unwrap(), 42);
        assert_eq!(parse_article_id(Some(" 7 ")).unwrap(), 7);
    }

    #[tokio::test]
    async fn missing_article_is_not_found() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<Article>::new()])
            .into_connection();

        let err = load_article_view(&repo_for(db), 99).await.unwrap_err();
        assert!(matches!(err, AppError::ArticleNotFound { id: 99 }));
    }

    #[tokio::test]
    async fn primary_fetch_failure_fails_the_view() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_errors([DbErr::Custom("connection lost".into())])
            .into_connection();

        let err = load_article_view(&repo_for(db), 42).await.unwrap_err();
        assert!(matches!(err, AppError::Database(_)));
    }

    #[tokio::test]
    async fn secondary_failures_degrade_to_empty_lists() {
        // Article loads, then both the related and comments queries error.
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![sample_article(42)]])
            .append_query_errors([
                DbErr::Custom("related query failed".into()),
                DbErr::Custom("comments query failed".into()),
            ])
            .into_connection();

        let view = load_article_view(&repo_for(db), 42).await.unwrap();
        assert_eq!(view.article.id, 42);
        assert!(view.related.is_empty());
        assert!(view.comments.is_empty());
    }

    #[tokio::test]
    async fn full_view_loads_related_and_comments() {
        let related_rows = vec![sample_article(1), sample_article(2), sample_article(3)];
        let comments = vec![Comment {
            id: 1,
            article_id: 42,
            user_id: 5,
            author: "alice".into(),
            comment: "Great read".into(),
            created_at: chrono::Utc::now().into(),
        }];

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![sample_article(42)]])
            .append_query_results([related_rows])
            .append_query_results([comments])
            .into_connection();

        let view = load_article_view(&repo_for(db), 42).await.unwrap();
        assert_eq!(view.related.len(), 3);
        assert_eq!(view.comments.len(), 1);
        assert_eq!(view.comments[0].author, "alice");
    }
}
