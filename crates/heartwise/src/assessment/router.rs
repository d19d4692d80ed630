use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::{header::AUTHORIZATION, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{delete, get, post},
    Json, Router,
};
use serde_json::json;
use tracing::error;

use super::domain::{EntryId, ProfileAttributes, ProfileUpdate, Session};
use super::intake::QuestionnaireSubmission;
use super::service::{AssessmentError, AssessmentService};
use super::store::{DocumentStore, IdentityError, IdentityProvider};

type SharedService<S, I> = Arc<AssessmentService<S, I>>;

/// Router exposing assessment, history, profile and account endpoints.
pub fn assessment_router<S, I>(service: SharedService<S, I>) -> Router
where
    S: DocumentStore + 'static,
    I: IdentityProvider + 'static,
{
    Router::new()
        .route("/api/v1/assessments", post(assess_handler::<S, I>))
        .route(
            "/api/v1/history",
            post(save_handler::<S, I>)
                .get(list_handler::<S, I>)
                .delete(clear_handler::<S, I>),
        )
        .route(
            "/api/v1/history/:entry_id",
            delete(delete_entry_handler::<S, I>),
        )
        .route(
            "/api/v1/profile",
            get(profile_handler::<S, I>)
                .put(register_profile_handler::<S, I>)
                .patch(update_profile_handler::<S, I>),
        )
        .route("/api/v1/account", delete(delete_account_handler::<S, I>))
        .with_state(service)
}

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

async fn session_from_headers<S, I>(
    service: &AssessmentService<S, I>,
    headers: &HeaderMap,
) -> Result<Session, AssessmentError>
where
    S: DocumentStore + 'static,
    I: IdentityProvider + 'static,
{
    let token = bearer_token(headers).ok_or(AssessmentError::NotAuthenticated)?;
    service.authenticate(token).await
}

fn error_body(message: impl Into<String>) -> Json<serde_json::Value> {
    Json(json!({ "error": message.into() }))
}

fn unavailable() -> Response {
    (
        StatusCode::SERVICE_UNAVAILABLE,
        error_body("the service is temporarily unavailable, please try again"),
    )
        .into_response()
}

pub(crate) fn error_response(error: AssessmentError) -> Response {
    match error {
        AssessmentError::Validation(err) => {
            let payload = json!({
                "error": err.to_string(),
                "field": err.field(),
            });
            (StatusCode::UNPROCESSABLE_ENTITY, Json(payload)).into_response()
        }
        AssessmentError::NotAuthenticated
        | AssessmentError::Identity(IdentityError::UnknownUser(_)) => (
            StatusCode::UNAUTHORIZED,
            error_body("sign in to continue"),
        )
            .into_response(),
        AssessmentError::Identity(IdentityError::RequiresRecentLogin) => (
            StatusCode::FORBIDDEN,
            error_body(IdentityError::RequiresRecentLogin.to_string()),
        )
            .into_response(),
        err @ AssessmentError::NotFound { .. } => {
            (StatusCode::NOT_FOUND, error_body(err.to_string())).into_response()
        }
        AssessmentError::Store(err) => {
            error!(error = %err, "document store request failed");
            unavailable()
        }
        AssessmentError::Identity(err @ IdentityError::Unavailable(_)) => {
            error!(error = %err, "identity provider request failed");
            unavailable()
        }
        AssessmentError::PartialDeletion {
            completed, failed, ..
        } => {
            let payload = json!({
                "error": "account deletion did not finish; retry to resume",
                "completedSteps": completed,
                "failedStep": failed,
            });
            (StatusCode::INTERNAL_SERVER_ERROR, Json(payload)).into_response()
        }
    }
}

pub(crate) async fn assess_handler<S, I>(
    State(service): State<SharedService<S, I>>,
    headers: HeaderMap,
    Json(submission): Json<QuestionnaireSubmission>,
) -> Response
where
    S: DocumentStore + 'static,
    I: IdentityProvider + 'static,
{
    let session = match session_from_headers(&service, &headers).await {
        Ok(session) => session,
        Err(err) => return error_response(err),
    };

    match service.assess_with_profile(&session, submission).await {
        Ok(assessment) => (StatusCode::OK, Json(assessment)).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn save_handler<S, I>(
    State(service): State<SharedService<S, I>>,
    headers: HeaderMap,
    Json(submission): Json<QuestionnaireSubmission>,
) -> Response
where
    S: DocumentStore + 'static,
    I: IdentityProvider + 'static,
{
    let session = match session_from_headers(&service, &headers).await {
        Ok(session) => session,
        Err(err) => return error_response(err),
    };

    match service.save_results(&session, submission).await {
        Ok(view) => (StatusCode::CREATED, Json(view)).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn list_handler<S, I>(
    State(service): State<SharedService<S, I>>,
    headers: HeaderMap,
) -> Response
where
    S: DocumentStore + 'static,
    I: IdentityProvider + 'static,
{
    let session = match session_from_headers(&service, &headers).await {
        Ok(session) => session,
        Err(err) => return error_response(err),
    };

    match service.list_history(&session).await {
        Ok(timeline) => {
            let trend = timeline.trend();
            let payload = json!({
                "entries": timeline.entries(),
                "trend": trend,
            });
            (StatusCode::OK, Json(payload)).into_response()
        }
        Err(err) => error_response(err),
    }
}

pub(crate) async fn clear_handler<S, I>(
    State(service): State<SharedService<S, I>>,
    headers: HeaderMap,
) -> Response
where
    S: DocumentStore + 'static,
    I: IdentityProvider + 'static,
{
    let session = match session_from_headers(&service, &headers).await {
        Ok(session) => session,
        Err(err) => return error_response(err),
    };

    match service.clear_all_history(&session).await {
        Ok(deleted) => (StatusCode::OK, Json(json!({ "deleted": deleted }))).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn delete_entry_handler<S, I>(
    State(service): State<SharedService<S, I>>,
    headers: HeaderMap,
    Path(entry_id): Path<String>,
) -> Response
where
    S: DocumentStore + 'static,
    I: IdentityProvider + 'static,
{
    let session = match session_from_headers(&service, &headers).await {
        Ok(session) => session,
        Err(err) => return error_response(err),
    };

    match service.delete_entry(&session, &EntryId(entry_id)).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn profile_handler<S, I>(
    State(service): State<SharedService<S, I>>,
    headers: HeaderMap,
) -> Response
where
    S: DocumentStore + 'static,
    I: IdentityProvider + 'static,
{
    let session = match session_from_headers(&service, &headers).await {
        Ok(session) => session,
        Err(err) => return error_response(err),
    };

    match service.profile(&session).await {
        Ok(Some(profile)) => (StatusCode::OK, Json(profile)).into_response(),
        Ok(None) => error_response(AssessmentError::NotFound {
            resource: "profile",
            id: session.user_id().0.clone(),
        }),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn register_profile_handler<S, I>(
    State(service): State<SharedService<S, I>>,
    headers: HeaderMap,
    Json(profile): Json<ProfileAttributes>,
) -> Response
where
    S: DocumentStore + 'static,
    I: IdentityProvider + 'static,
{
    let session = match session_from_headers(&service, &headers).await {
        Ok(session) => session,
        Err(err) => return error_response(err),
    };

    match service.register_profile(&session, profile).await {
        Ok(profile) => (StatusCode::OK, Json(profile)).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn update_profile_handler<S, I>(
    State(service): State<SharedService<S, I>>,
    headers: HeaderMap,
    Json(update): Json<ProfileUpdate>,
) -> Response
where
    S: DocumentStore + 'static,
    I: IdentityProvider + 'static,
{
    let session = match session_from_headers(&service, &headers).await {
        Ok(session) => session,
        Err(err) => return error_response(err),
    };

    match service.update_profile(&session, update).await {
        Ok(profile) => (StatusCode::OK, Json(profile)).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn delete_account_handler<S, I>(
    State(service): State<SharedService<S, I>>,
    headers: HeaderMap,
) -> Response
where
    S: DocumentStore + 'static,
    I: IdentityProvider + 'static,
{
    let session = match session_from_headers(&service, &headers).await {
        Ok(session) => session,
        Err(err) => return error_response(err),
    };

    match service.delete_account(&session).await {
        Ok(_) => StatusCode::NO_CONTENT.into_response(),
        Err(err) => error_response(err),
    }
}
