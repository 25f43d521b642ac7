//! Registration, login, and logout

use axum::{
    extract::State,
    response::{Html, IntoResponse, Redirect, Response},
    Form,
};
use serde::Deserialize;
use tower_sessions::Session;
use validator::{Validate, ValidationErrors};

use crate::render::{self, base_context};
use crate::AppState;
use newshub_common::{
    auth::{self, MaybeUser, SessionUser},
    errors::Result,
    Repository,
};

#[derive(Debug, Deserialize, Validate)]
pub struct RegisterForm {
    #[validate(length(min = 1, max = 100, message = "Please enter your name."))]
    pub name: String,

    #[validate(email(message = "Please enter a valid email address."))]
    pub email: String,

    #[validate(length(min = 8, max = 128, message = "Password must be at least 8 characters."))]
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

/// GET /register
pub async fn register_form(
    State(state): State<AppState>,
    MaybeUser(user): MaybeUser,
) -> Result<Html<String>> {
    render_register(&state, user.as_ref(), None)
}

/// POST /register
pub async fn register(
    State(state): State<AppState>,
    session: Session,
    MaybeUser(user): MaybeUser,
    Form(form): Form<RegisterForm>,
) -> Result<Response> {
    if let Err(errors) = form.validate() {
        let message = first_validation_message(&errors);
        return Ok(render_register(&state, user.as_ref(), Some(&message))?.into_response());
    }

    let repo = Repository::new(state.db.clone());

    // The repository normalizes the email on both lookup and insert, so
    // registration and login agree on the stored form.
    if repo.find_user_by_email(&form.email).await?.is_some() {
        return Ok(render_register(&state, user.as_ref(), Some("Email already exists"))?
            .into_response());
    }

    let password_hash = auth::hash_password(&form.password)?;

    match repo
        .create_user(form.name.trim().to_string(), form.email.clone(), password_hash)
        .await
    {
        Ok(created) => {
            tracing::info!(user_id = created.id, "user registered");
            auth::login(&session, created.id, &created.name).await?;
            Ok(Redirect::to("/").into_response())
        }
        Err(e) => {
            tracing::error!(error = %e, "user insert failed");
            Ok(render_register(&state, user.as_ref(), Some("Registration failed. Try again."))?
                .into_response())
        }
    }
}

/// GET /login
pub async fn login_form(
    State(state): State<AppState>,
    MaybeUser(user): MaybeUser,
) -> Result<Html<String>> {
    render_login(&state, user.as_ref(), None)
}

/// POST /login
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    MaybeUser(user): MaybeUser,
    Form(form): Form<LoginForm>,
) -> Result<Response> {
    let repo = Repository::new(state.db.clone());

    let found = repo.find_user_by_email(&form.email).await?;
    let verified = found
        .as_ref()
        .map(|u| auth::verify_password(&form.password, &u.password_hash))
        .unwrap_or(false);

    match found {
        Some(account) if verified => {
            tracing::info!(user_id = account.id, "user logged in");
            auth::login(&session, account.id, &account.name).await?;
            Ok(Redirect::to("/").into_response())
        }
        _ => {
            tracing::info!("failed login attempt");
            Ok(render_login(&state, user.as_ref(), Some("Invalid email or password."))?
                .into_response())
        }
    }
}

/// GET /logout
pub async fn logout(session: Session) -> Result<Redirect> {
    auth::logout(&session).await?;
    Ok(Redirect::to("/"))
}

fn render_register(
    state: &AppState,
    user: Option<&SessionUser>,
    error: Option<&str>,
) -> Result<Html<String>> {
    let mut ctx = base_context(user);
    ctx.insert("error", &error);
    render::page(&state.templates, "register.html", &ctx)
}

fn render_login(
    state: &AppState,
    user: Option<&SessionUser>,
    error: Option<&str>,
) -> Result<Html<String>> {
    let mut ctx = base_context(user);
    ctx.insert("error", &error);
    render::page(&state.templates, "login.html", &ctx)
}

fn first_validation_message(errors: &ValidationErrors) -> String {
    errors
        .field_errors()
        .values()
        .flat_map(|field| field.iter())
        .filter_map(|e| e.message.as_ref().map(|m| m.to_string()))
        .next()
        .unwrap_or_else(|| "Invalid input.".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn register_form_rejects_short_password() {
        let form = RegisterForm {
            name: "Alice".into(),
            email: "alice@example.com".into(),
            password: "short".into(),
        };
        let errors = form.validate().unwrap_err();
        assert!(first_validation_message(&errors).contains("at least 8"));
    }

    #[test]
    fn register_form_rejects_bad_email() {
        let form = RegisterForm {
            name: "Alice".into(),
            email: "not-an-email".into(),
            password: "long enough password".into(),
        };
        assert!(form.validate().is_err());
    }

    #[test]
    fn register_form_accepts_valid_input() {
        let form = RegisterForm {
            name: "Alice".into(),
            email: "alice@example.com".into(),
            password: "long enough password".into(),
        };
        assert!(form.validate().is_ok());
    }
}
