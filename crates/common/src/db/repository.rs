//! Repository pattern for database operations
//!
//! Every query goes through the SeaORM query builder, so user input only
//! ever reaches SQL as a bound parameter.

use crate::db::models::*;
use crate::db::DbPool;
use crate::errors::Result;
use crate::{CATEGORY_PREVIEW_LIMIT, FEATURED_LIMIT, RELATED_ARTICLES_LIMIT, SEARCH_RESULTS_LIMIT};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, EntityTrait, FromQueryResult,
    QueryFilter, QueryOrder, QuerySelect, Select, Set,
};
use serde::Serialize;

/// Slim article projection for card grids (home sections, related list)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, FromQueryResult)]
pub struct ArticleCard {
    pub id: i32,
    pub title: String,
    pub image_url: String,
}

/// Repository for data access operations
#[derive(Clone)]
pub struct Repository {
    pool: DbPool,
}

impl Repository {
    /// Create a new repository with the given connection pool
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Get the read connection
    fn read_conn(&self) -> &DatabaseConnection {
        self.pool.read()
    }

    /// Get the write connection
    fn write_conn(&self) -> &DatabaseConnection {
        self.pool.write()
    }

    /// Ping the database
    pub async fn ping(&self) -> Result<()> {
        self.pool.ping().await
    }

    // ========================================================================
    // Article Operations (read-only; articles are authored out of band)
    // ========================================================================

    /// Find an article by exact id match
    pub async fn find_article_by_id(&self, id: i32) -> Result<Option<Article>> {
        ArticleEntity::find_by_id(id)
            .one(self.read_conn())
            .await
            .map_err(Into::into)
    }

    fn card_query() -> Select<ArticleEntity> {
        ArticleEntity::find()
            .select_only()
            .column(ArticleColumn::Id)
            .column(ArticleColumn::Title)
            .column(ArticleColumn::ImageUrl)
    }

    /// Up to three other articles in the same category, newest first.
    /// The article being viewed is always excluded.
    pub async fn related_articles(&self, category: &str, exclude_id: i32) -> Result<Vec<ArticleCard>> {
        Self::card_query()
            .filter(ArticleColumn::Category.eq(category))
            .filter(ArticleColumn::Id.ne(exclude_id))
            .order_by_desc(ArticleColumn::CreatedAt)
            .limit(RELATED_ARTICLES_LIMIT)
            .into_model::<ArticleCard>()
            .all(self.read_conn())
            .await
            .map_err(Into::into)
    }

    /// Featured articles for the home page, newest first
    pub async fn featured_articles(&self) -> Result<Vec<Article>> {
        ArticleEntity::find()
            .filter(ArticleColumn::Featured.eq(true))
            .order_by_desc(ArticleColumn::CreatedAt)
            .limit(FEATURED_LIMIT)
            .all(self.read_conn())
            .await
            .map_err(Into::into)
    }

    /// The newest cards in one category, for a home page section
    pub async fn category_preview(&self, category: &str) -> Result<Vec<ArticleCard>> {
        Self::card_query()
            .filter(ArticleColumn::Category.eq(category))
            .order_by_desc(ArticleColumn::CreatedAt)
            .limit(CATEGORY_PREVIEW_LIMIT)
            .into_model::<ArticleCard>()
            .all(self.read_conn())
            .await
            .map_err(Into::into)
    }

    /// Every article in a category, newest first
    pub async fn articles_in_category(&self, category: &str) -> Result<Vec<Article>> {
        ArticleEntity::find()
            .filter(ArticleColumn::Category.eq(category))
            .order_by_desc(ArticleColumn::CreatedAt)
            .all(self.read_conn())
            .await
            .map_err(Into::into)
    }

    /// Substring search over title and content, newest first, capped
    pub async fn search_articles(&self, query: &str) -> Result<Vec<Article>> {
        ArticleEntity::find()
            .filter(
                Condition::any()
                    .add(ArticleColumn::Title.contains(query))
                    .add(ArticleColumn::Content.contains(query)),
            )
            .order_by_desc(ArticleColumn::CreatedAt)
            .limit(SEARCH_RESULTS_LIMIT)
            .all(self.read_conn())
            .await
            .map_err(Into::into)
    }

    // ========================================================================
    // Comment Operations (insert-only)
    // ========================================================================

    /// All comments for an article, newest first
    pub async fn comments_for_article(&self, article_id: i32) -> Result<Vec<Comment>> {
        CommentEntity::find()
            .filter(CommentColumn::ArticleId.eq(article_id))
            .order_by_desc(CommentColumn::CreatedAt)
            .all(self.read_conn())
            .await
            .map_err(Into::into)
    }

    /// Insert a comment. `author` is the display-name snapshot taken from
    /// the session by the caller.
    pub async fn insert_comment(
        &self,
        article_id: i32,
        user_id: i32,
        author: String,
        body: String,
    ) -> Result<Comment> {
        let now = chrono::Utc::now();

        let comment = CommentActiveModel {
            article_id: Set(article_id),
            user_id: Set(user_id),
            author: Set(author),
            comment: Set(body),
            created_at: Set(now.into()),
            ..Default::default()
        };

        comment.insert(self.write_conn()).await.map_err(Into::into)
    }

    // ========================================================================
    // User Operations
    // ========================================================================

    /// Stored form of an email address: trimmed and lowercased, so a
    /// lookup matches however the user capitalizes it at the keyboard.
    fn normalize_email(email: &str) -> String {
        email.trim().to_lowercase()
    }

    /// Find a user by email (emails are unique, stored lowercased)
    pub async fn find_user_by_email(&self, email: &str) -> Result<Option<User>> {
        UserEntity::find()
            .filter(UserColumn::Email.eq(Self::normalize_email(email)))
            .one(self.read_conn())
            .await
            .map_err(Into::into)
    }

    /// Insert a new user with an already-hashed password
    pub async fn create_user(
        &self,
        name: String,
        email: String,
        password_hash: String,
    ) -> Result<User> {
        let now = chrono::Utc::now();

        let user = UserActiveModel {
            name: Set(name),
            email: Set(Self::normalize_email(&email)),
            password_hash: Set(password_hash),
            created_at: Set(now.into()),
            ..Default::default()
        };

        user.insert(self.write_conn()).await.map_err(Into::into)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};

    fn pool_of(conn: DatabaseConnection) -> DbPool {
        DbPool {
            primary: conn,
            replica: None,
        }
    }

    fn sample_article(id: i32) -> Article {
        Article {
            id,
            title: format!("Article {id}"),
            content: "Body text".into(),
            category: "Technology".into(),
            author: "Jane Reporter".into(),
            image_url: "/img/a.jpg".into(),
            created_at: chrono::Utc::now().into(),
            featured: false,
        }
    }

    #[tokio::test]
    async fn comments_query_orders_newest_first() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<Comment>::new()])
            .into_connection();
        let repo = Repository::new(pool_of(db.clone()));

        let comments = repo.comments_for_article(42).await.unwrap();
        assert!(comments.is_empty());

        let log = db.into_transaction_log();
        let sql = format!("{:?}", log[0]);
        assert!(sql.contains("ORDER BY"), "no ordering in: {sql}");
        assert!(sql.contains("DESC"), "not descending in: {sql}");
        assert!(sql.contains("article_id"), "missing filter in: {sql}");
    }

    #[tokio::test]
    async fn related_query_excludes_self_and_caps_at_three() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![
                sample_article(1),
                sample_article(2),
                sample_article(3),
            ]])
            .into_connection();
        let repo = Repository::new(pool_of(db.clone()));

        let related = repo.related_articles("Technology", 42).await.unwrap();
        assert_eq!(related.len(), 3);

        let log = db.into_transaction_log();
        let sql = format!("{:?}", log[0]);
        assert!(sql.contains("<>"), "missing self-exclusion in: {sql}");
        assert!(sql.contains("LIMIT"), "missing limit in: {sql}");
        // category and exclusion id travel as bound values, limit is 3
        assert!(sql.contains("Technology"));
        assert!(sql.contains("42"));
        assert!(sql.contains('3'));
    }

    #[tokio::test]
    async fn search_binds_pattern_instead_of_interpolating() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<Article>::new()])
            .into_connection();
        let repo = Repository::new(pool_of(db.clone()));

        repo.search_articles("Tech").await.unwrap();

        let log = db.into_transaction_log();
        let sql = format!("{:?}", log[0]);
        assert!(sql.contains("LIKE"), "missing LIKE in: {sql}");
        assert!(sql.contains("%Tech%"), "pattern not bound in: {sql}");
        assert!(sql.contains("$1"), "placeholder missing in: {sql}");
    }

    #[tokio::test]
    async fn email_lookup_matches_regardless_of_case() {
        let stored = User {
            id: 3,
            name: "Alice".into(),
            email: "alice@example.com".into(),
            password_hash: "$argon2id$stub".into(),
            created_at: chrono::Utc::now().into(),
        };

        // Registered lowercase, looked up as typed: the bound parameter
        // must be the normalized form, never the raw input.
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![stored]])
            .into_connection();
        let repo = Repository::new(pool_of(db.clone()));

        let found = repo
            .find_user_by_email("  Alice@Example.COM ")
            .await
            .unwrap();
        assert_eq!(found.unwrap().id, 3);

        let log = db.into_transaction_log();
        let sql = format!("{:?}", log[0]);
        assert!(sql.contains("alice@example.com"), "not normalized: {sql}");
        assert!(!sql.contains("Alice@Example.COM"), "raw input bound: {sql}");
    }

    #[tokio::test]
    async fn create_user_stores_normalized_email() {
        let created = User {
            id: 4,
            name: "Bob".into(),
            email: "bob@example.com".into(),
            password_hash: "$argon2id$stub".into(),
            created_at: chrono::Utc::now().into(),
        };

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![created]])
            .append_exec_results([MockExecResult {
                last_insert_id: 4,
                rows_affected: 1,
            }])
            .into_connection();
        let repo = Repository::new(pool_of(db.clone()));

        let user = repo
            .create_user("Bob".into(), "Bob@Example.com".into(), "$argon2id$stub".into())
            .await
            .unwrap();
        assert_eq!(user.email, "bob@example.com");

        let log = db.into_transaction_log();
        let sql = format!("{:?}", log[0]);
        assert!(sql.contains("bob@example.com"), "not normalized: {sql}");
    }

    #[tokio::test]
    async fn insert_comment_writes_one_row() {
        let inserted = Comment {
            id: 7,
            article_id: 42,
            user_id: 3,
            author: "alice".into(),
            comment: "Nice piece".into(),
            created_at: chrono::Utc::now().into(),
        };

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![inserted.clone()]])
            .append_exec_results([MockExecResult {
                last_insert_id: 7,
                rows_affected: 1,
            }])
            .into_connection();
        let repo = Repository::new(pool_of(db.clone()));

        let comment = repo
            .insert_comment(42, 3, "alice".into(), "Nice piece".into())
            .await
            .unwrap();
        assert_eq!(comment.id, 7);
        assert_eq!(comment.article_id, 42);

        let log = db.into_transaction_log();
        let sql = format!("{:?}", log[0]);
        assert!(sql.contains("INSERT"), "expected an insert, got: {sql}");
    }
}
