//! Customer registration, login and logout.
//!
//! Form failures are reported through flash messages and a redirect back to
//! the form (post/redirect/get).

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::State,
    response::Redirect,
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use crate::error::{AppError, Result, clear_sentry_user, set_sentry_user};
use crate::filters;
use crate::middleware::{PageContext, clear_current_user, flash, set_current_user};
use crate::models::CurrentUser;
use crate::services::auth::{AuthError, AuthService};
use crate::state::AppState;

// =============================================================================
// Form Types
// =============================================================================

/// Login and registration form data.
#[derive(Debug, Deserialize)]
pub struct CredentialsForm {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

// =============================================================================
// Templates
// =============================================================================

/// Login page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/login.html")]
pub struct LoginTemplate {
    pub page: PageContext,
}

/// Register page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/register.html")]
pub struct RegisterTemplate {
    pub page: PageContext,
}

// =============================================================================
// Handlers
// =============================================================================

/// Display the registration form.
pub async fn register_page(page: PageContext) -> RegisterTemplate {
    RegisterTemplate { page }
}

/// Create a customer account.
#[instrument(skip(state, session, form), fields(username = %form.username))]
pub async fn register(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<CredentialsForm>,
) -> Result<Redirect> {
    match AuthService::new(state.pool())
        .register(&form.username, &form.password)
        .await
    {
        Ok(_) => {
            flash(&session, "Registered. Please login.").await?;
            Ok(Redirect::to("/login"))
        }
        Err(
            e @ (AuthError::DuplicateUsername
            | AuthError::WeakPassword(_)
            | AuthError::InvalidUsername(_)),
        ) => {
            let message = match e {
                AuthError::DuplicateUsername => "Username already taken".to_owned(),
                other => other.to_string(),
            };
            flash(&session, message).await?;
            Ok(Redirect::to("/register"))
        }
        Err(e) => Err(AppError::Auth(e)),
    }
}

/// Display the login form.
pub async fn login_page(page: PageContext) -> LoginTemplate {
    LoginTemplate { page }
}

/// Log a customer in.
#[instrument(skip(state, session, form), fields(username = %form.username))]
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<CredentialsForm>,
) -> Result<Redirect> {
    match AuthService::new(state.pool())
        .login(&form.username, &form.password)
        .await
    {
        Ok(user) => {
            let current = CurrentUser {
                id: user.id,
                username: user.username,
            };
            set_current_user(&session, &current).await?;
            set_sentry_user(&current.id, current.username.as_str());
            flash(&session, "Logged in").await?;
            Ok(Redirect::to("/"))
        }
        Err(AuthError::InvalidCredentials) => {
            flash(&session, "Invalid credentials").await?;
            Ok(Redirect::to("/login"))
        }
        Err(e) => Err(AppError::Auth(e)),
    }
}

/// Log the customer out. The cart and any admin session are kept.
#[instrument(skip(session))]
pub async fn logout(session: Session) -> Result<Redirect> {
    clear_current_user(&session).await?;
    clear_sentry_user();
    flash(&session, "Logged out").await?;
    Ok(Redirect::to("/"))
}
