//! Profile page for the signed-in user.

use askama::Template;
use axum::{
    Form, Router,
    extract::{Query, State},
    response::{IntoResponse, Redirect, Response},
    routing::get,
};
use eventhub_core::UserProfile;
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use crate::{
    auth::{AuthSession, SessionUser, keys},
    error::{AppError, page_message},
    filters,
    forms::ProfileForm,
    middleware::RequireSession,
    state::AppState,
};

use super::{UserView, render};

/// Profile page template.
#[derive(Template)]
#[template(path = "profile.html")]
pub struct ProfileTemplate {
    pub admin_user: UserView,
    pub current_path: String,
    pub error: Option<String>,
    pub saved: bool,
    pub email: String,
    pub role: String,
    pub form: ProfileForm,
}

/// Query for the profile page.
#[derive(Debug, Default, Deserialize)]
pub struct ProfileQuery {
    pub saved: Option<String>,
}

/// Build the profile router.
pub fn router() -> Router<AppState> {
    Router::new().route("/profile", get(show).post(update))
}

fn template(auth: &AuthSession, profile: Option<&UserProfile>, form: ProfileForm) -> ProfileTemplate {
    ProfileTemplate {
        admin_user: UserView::from(auth),
        current_path: "/profile".to_string(),
        error: None,
        saved: false,
        email: profile.map_or_else(|| auth.user.email.clone(), |p| p.email.clone()),
        role: profile.and_then(|p| p.role.clone()).unwrap_or_default(),
        form,
    }
}

/// Profile page.
///
/// GET /profile
#[instrument(skip(auth, state))]
async fn show(
    RequireSession(auth): RequireSession,
    State(state): State<AppState>,
    Query(query): Query<ProfileQuery>,
) -> Result<Response, AppError> {
    let page = match state.api_for(&auth).profile().me().await {
        Ok(profile) => ProfileTemplate {
            saved: query.saved.is_some(),
            ..template(&auth, Some(&profile), ProfileForm::from(&profile))
        },
        Err(e) => ProfileTemplate {
            error: Some(page_message(e)?),
            ..template(&auth, None, ProfileForm::default())
        },
    };
    Ok(render(&page).into_response())
}

/// Save the profile and refresh the name shown in the sidebar.
///
/// POST /profile
#[instrument(skip(auth, state, session, form))]
async fn update(
    RequireSession(auth): RequireSession,
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<ProfileForm>,
) -> Result<Response, AppError> {
    let update = match form.validate() {
        Ok(update) => update,
        Err(e) => {
            let page = ProfileTemplate {
                error: Some(e.to_string()),
                ..template(&auth, None, form)
            };
            return Ok(render(&page).into_response());
        }
    };

    match state.api_for(&auth).profile().update(&update).await {
        Ok(profile) => {
            let mut auth = auth;
            auth.user = SessionUser::from(&profile);
            session.insert(keys::AUTH_SESSION, &auth).await?;
            Ok(Redirect::to("/profile?saved=1").into_response())
        }
        Err(e) => {
            let page = ProfileTemplate {
                error: Some(page_message(e)?),
                ..template(&auth, None, form)
            };
            Ok(render(&page).into_response())
        }
    }
}
