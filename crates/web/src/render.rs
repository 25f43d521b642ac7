//! Tera rendering and view models
//!
//! Handlers map entities into these serializable view structs so the
//! templates only ever see formatted strings. Autoescaping stays on for
//! all `.html` templates.

use axum::response::Html;
use newshub_common::auth::SessionUser;
use newshub_common::db::models::{Article, Comment};
use newshub_common::db::ArticleCard;
use newshub_common::errors::{AppError, Result};
use serde::Serialize;
use tera::{Context, Tera};

/// Build the template engine from the configured directory
pub fn engine(dir: &str) -> Result<Tera> {
    let glob = format!("{}/**/*.html", dir.trim_end_matches('/'));
    Tera::new(&glob).map_err(|e| AppError::Template {
        message: format!("failed to load templates from {dir}: {e}"),
    })
}

/// Context shared by every page: the logged-in user's name, if any
pub fn base_context(user: Option<&SessionUser>) -> Context {
    let mut ctx = Context::new();
    ctx.insert("user_name", &user.map(|u| u.name.as_str()));
    ctx
}

/// Render one template to an HTML response
pub fn page(templates: &Tera, name: &str, context: &Context) -> Result<Html<String>> {
    templates
        .render(name, context)
        .map(Html)
        .map_err(|e| AppError::Template {
            message: format!("render of {name} failed: {e}"),
        })
}

/// Full article, ready for the article page
#[derive(Debug, Clone, Serialize)]
pub struct ArticlePageView {
    pub id: i32,
    pub title: String,
    pub author: String,
    pub category: String,
    pub image_url: String,
    pub published: String,
    pub paragraphs: Vec<String>,
}

impl From<&Article> for ArticlePageView {
    fn from(article: &Article) -> Self {
        Self {
            id: article.id,
            title: article.title.clone(),
            author: article.author.clone(),
            category: article.category.clone(),
            image_url: article.image_url.clone(),
            published: format_date(&article.created_at),
            paragraphs: paragraphs(&article.content),
        }
    }
}

/// Article teaser for listing pages (category, search, featured)
#[derive(Debug, Clone, Serialize)]
pub struct TeaserView {
    pub id: i32,
    pub title: String,
    pub category: String,
    pub author: String,
    pub image_url: String,
    pub published: String,
    pub snippet: String,
}

impl From<&Article> for TeaserView {
    fn from(article: &Article) -> Self {
        Self {
            id: article.id,
            title: article.title.clone(),
            category: article.category.clone(),
            author: article.author.clone(),
            image_url: article.image_url.clone(),
            published: format_date(&article.created_at),
            snippet: snippet(&article.content, 160),
        }
    }
}

/// One comment in the thread
#[derive(Debug, Clone, Serialize)]
pub struct CommentView {
    pub author: String,
    pub posted_at: String,
    pub body: String,
}

impl From<&Comment> for CommentView {
    fn from(comment: &Comment) -> Self {
        Self {
            author: comment.author.clone(),
            posted_at: format_datetime(&comment.created_at),
            body: comment.comment.clone(),
        }
    }
}

/// One home page category section
#[derive(Debug, Clone, Serialize)]
pub struct CategorySection {
    pub name: String,
    pub cards: Vec<ArticleCard>,
}

/// "February 3, 2026"
fn format_date(dt: &chrono::DateTime<chrono::FixedOffset>) -> String {
    dt.format("%B %-d, %Y").to_string()
}

/// "February 3, 2026, 14:05"
fn format_datetime(dt: &chrono::DateTime<chrono::FixedOffset>) -> String {
    dt.format("%B %-d, %Y, %H:%M").to_string()
}

/// Split body text on newlines into displayable paragraphs
fn paragraphs(content: &str) -> Vec<String> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(String::from)
        .collect()
}

/// First `max` characters of the body, on a char boundary
fn snippet(content: &str, max: usize) -> String {
    let flat = content.split_whitespace().collect::<Vec<_>>().join(" ");
    if flat.chars().count() <= max {
        flat
    } else {
        let cut: String = flat.chars().take(max).collect();
        format!("{}…", cut.trim_end())
    }
}
