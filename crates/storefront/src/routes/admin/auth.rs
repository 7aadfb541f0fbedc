//! Admin login and logout.

use askama::Template;
use askama_web::WebTemplate;
use axum::{Form, extract::State, response::Redirect};
use tower_sessions::Session;
use tracing::instrument;

use crate::error::{AppError, Result, add_breadcrumb};
use crate::filters;
use crate::middleware::{PageContext, clear_current_admin, flash, set_current_admin};
use crate::models::CurrentAdmin;
use crate::routes::auth::CredentialsForm;
use crate::services::auth::{AuthError, AuthService};
use crate::state::AppState;

/// Admin login page template.
#[derive(Template, WebTemplate)]
#[template(path = "admin/login.html")]
pub struct AdminLoginTemplate {
    pub page: PageContext,
}

/// Display the admin login form.
pub async fn login_page(page: PageContext) -> AdminLoginTemplate {
    AdminLoginTemplate { page }
}

/// Mark this session as an admin session.
#[instrument(skip(state, session, form), fields(username = %form.username))]
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<CredentialsForm>,
) -> Result<Redirect> {
    match AuthService::new(state.pool())
        .admin_login(&form.username, &form.password)
        .await
    {
        Ok(user) => {
            let admin = CurrentAdmin {
                user_id: user.id,
                username: user.username,
            };
            set_current_admin(&session, &admin).await?;
            add_breadcrumb("admin", "Admin logged in", None);
            flash(&session, "Admin logged in").await?;
            Ok(Redirect::to("/admin"))
        }
        Err(AuthError::InvalidCredentials) => {
            flash(&session, "Invalid admin credentials").await?;
            Ok(Redirect::to("/admin-login"))
        }
        Err(e) => Err(AppError::Auth(e)),
    }
}

/// Drop admin rights. A customer login and the cart are kept.
#[instrument(skip(session))]
pub async fn logout(session: Session) -> Result<Redirect> {
    clear_current_admin(&session).await?;
    flash(&session, "Admin logged out").await?;
    Ok(Redirect::to("/"))
}
