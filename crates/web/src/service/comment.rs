//! Comment submission
//!
//! A small state machine per request: AuthCheck, Validate, Persist.
//! Terminal states are `Posted` (the handler answers with a redirect so a
//! reload never resubmits) and `Rejected` with a user-facing reason.

use newshub_common::{auth::SessionUser, Repository};

/// Terminal state of one submission attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommentOutcome {
    /// Stored; redirect back to the article's GET view
    Posted { article_id: i32 },
    /// Not stored; re-render the page with the reason inline
    Rejected(RejectReason),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    NotAuthenticated,
    EmptyComment,
    PersistenceFailure,
}

impl RejectReason {
    /// Message shown in the comment form's error region
    pub fn message(self) -> &'static str {
        match self {
            RejectReason::NotAuthenticated => "Please login to post a comment.",
            RejectReason::EmptyComment => "Comment cannot be empty.",
            RejectReason::PersistenceFailure => "Failed to post comment. Please try again.",
        }
    }

    /// Label for the rejection counter
    pub fn metric_label(self) -> &'static str {
        match self {
            RejectReason::NotAuthenticated => "not_authenticated",
            RejectReason::EmptyComment => "empty",
            RejectReason::PersistenceFailure => "persistence",
        }
    }
}

/// Run one submission through the state machine.
///
/// The author name is snapshotted from the session at this moment; later
/// renames do not rewrite stored comments. No retries; the user resubmits.
pub async fn submit_comment(
    repo: &Repository,
    user: Option<&SessionUser>,
    article_id: i32,
    raw_text: &str,
) -> CommentOutcome {
    // AuthCheck: nothing touches the datastore without a logged-in user
    let Some(user) = user else {
        tracing::info!(article_id, "comment rejected: not logged in");
        return CommentOutcome::Rejected(RejectReason::NotAuthenticated);
    };

    // Validate
    let text = raw_text.trim();
    if text.is_empty() {
        tracing::info!(article_id, user_id = user.id, "comment rejected: empty");
        return CommentOutcome::Rejected(RejectReason::EmptyComment);
    }

    // Persist: a single insert, nothing to roll back on failure
    match repo
        .insert_comment(article_id, user.id, user.name.clone(), text.to_string())
        .await
    {
        Ok(comment) => {
            tracing::info!(
                article_id,
                user_id = user.id,
                comment_id = comment.id,
                "comment posted"
            );
            CommentOutcome::Posted { article_id }
        }
        Err(e) => {
            tracing::error!(error = %e, article_id, user_id = user.id, "comment insert failed");
            CommentOutcome::Rejected(RejectReason::PersistenceFailure)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use newshub_common::db::models::Comment;
    use newshub_common::db::DbPool;
    use sea_orm::{DatabaseBackend, DbErr, MockDatabase, MockExecResult};

    fn user() -> SessionUser {
        SessionUser {
            id: 3,
            name: "alice".into(),
        }
    }

    #[test]
    fn rejection_messages_match_the_page_copy() {
        assert_eq!(
            RejectReason::NotAuthenticated.message(),
            "Please login to post a comment."
        );
        assert_eq!(RejectReason::EmptyComment.message(), "Comment cannot be empty.");
        assert_eq!(
            RejectReason::PersistenceFailure.message(),
            "Failed to post comment. Please try again."
        );
    }

    #[tokio::test]
    async fn anonymous_submission_writes_nothing() {
        let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();
        let repo = Repository::new(DbPool {
            primary: db.clone(),
            replica: None,
        });

        let outcome = submit_comment(&repo, None, 42, "hello").await;
        assert_eq!(
            outcome,
            CommentOutcome::Rejected(RejectReason::NotAuthenticated)
        );

        // The spy: no statement of any kind reached the database
        assert!(db.into_transaction_log().is_empty());
    }

    #[tokio::test]
    async fn whitespace_only_submission_writes_nothing() {
        let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();
        let repo = Repository::new(DbPool {
            primary: db.clone(),
            replica: None,
        });

        let outcome = submit_comment(&repo, Some(&user()), 42, "   \n\t ").await;
        assert_eq!(outcome, CommentOutcome::Rejected(RejectReason::EmptyComment));
        assert!(db.into_transaction_log().is_empty());
    }

    #[tokio::test]
    async fn successful_submission_ends_in_redirect_state() {
        let stored = Comment {
            id: 11,
            article_id: 42,
            user_id: 3,
            author: "alice".into(),
            comment: "worth a read".into(),
            created_at: chrono::Utc::now().into(),
        };
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![stored]])
            .append_exec_results([MockExecResult {
                last_insert_id: 11,
                rows_affected: 1,
            }])
            .into_connection();
        let repo = Repository::new(DbPool {
            primary: db,
            replica: None,
        });

        let outcome = submit_comment(&repo, Some(&user()), 42, "  worth a read  ").await;
        assert_eq!(outcome, CommentOutcome::Posted { article_id: 42 });
    }

    #[tokio::test]
    async fn insert_failure_is_a_retryable_rejection() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_errors([DbErr::Custom("constraint violation".into())])
            .into_connection();
        let repo = Repository::new(DbPool {
            primary: db,
            replica: None,
        });

        let outcome = submit_comment(&repo, Some(&user()), 42, "hello").await;
        assert_eq!(
            outcome,
            CommentOutcome::Rejected(RejectReason::PersistenceFailure)
        );
    }
}
