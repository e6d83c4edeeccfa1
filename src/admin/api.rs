use std::sync::Arc;

use axum::{
    Router,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
};
use backoffice_kit::KitError;

use super::auth::{Authorizer, PermissionAuthorizer};
use super::db::DbHandle;
use super::listings::Listings;
use super::templates::Renderer;
use super::views::{accounts, dashboard, items, organization, users};
use crate::config::AuthSection;
use crate::errors::AppError;

// ── Shared application state ──────────────────────────────────────────

pub struct AppState {
    pub db: DbHandle,
    pub listings: Listings,
    pub renderer: Renderer,
    pub authorizer: Arc<dyn Authorizer>,
    pub auth: AuthSection,
}

impl AppState {
    /// State with the codename-based authorizer.
    pub fn new(db: DbHandle, listings: Listings, renderer: Renderer, auth: AuthSection) -> Self {
        Self {
            db,
            listings,
            renderer,
            authorizer: Arc::new(PermissionAuthorizer),
            auth,
        }
    }
}

pub type SharedState = Arc<AppState>;

// ── Error handling ────────────────────────────────────────────────────

/// Plain-text error responses. Internal details are logged, never sent.
#[derive(Debug)]
pub enum ApiError {
    Forbidden(&'static str),
    NotFound(String),
    BadRequest(String),
    Internal(String),
}

pub const FORBIDDEN: &str = "Forbidden";
pub const EXPORT_DISABLED: &str = "Export disabled";
pub const FORMAT_NOT_ALLOWED: &str = "Format not allowed";

impl ApiError {
    pub fn forbidden() -> Self {
        ApiError::Forbidden(FORBIDDEN)
    }

    pub fn internal(err: impl std::fmt::Display) -> Self {
        tracing::error!(error = %err, "request failed");
        ApiError::Internal(err.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::Forbidden(msg) => (StatusCode::FORBIDDEN, msg).into_response(),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg).into_response(),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg).into_response(),
            ApiError::Internal(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error").into_response()
            }
        }
    }
}

impl From<AppError> for ApiError {
    fn from(err: AppError) -> Self {
        if err.is_not_found() {
            return ApiError::NotFound(err.to_string());
        }
        match err {
            AppError::Listing(KitError::Forbidden) => ApiError::Forbidden(FORBIDDEN),
            AppError::Listing(KitError::ExportDisabled) => ApiError::Forbidden(EXPORT_DISABLED),
            AppError::Listing(KitError::FormatNotSupported { .. }) | AppError::UnknownFormat { .. } => {
                ApiError::Forbidden(FORMAT_NOT_ALLOWED)
            }
            AppError::BadRequest(msg) => ApiError::BadRequest(msg),
            other => ApiError::internal(other),
        }
    }
}

impl From<KitError> for ApiError {
    fn from(err: KitError) -> Self {
        AppError::from(err).into()
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        ApiError::internal(format!("{:#}", err))
    }
}

// ── Router ────────────────────────────────────────────────────────────

pub fn app_router() -> Router<SharedState> {
    Router::new()
        .route("/", get(dashboard::index))
        .route("/dashboard/", get(dashboard::index))
        .route("/dashboard/kpis/", get(dashboard::kpis))
        .route("/dashboard/charts/", get(dashboard::charts))
        .route("/dashboard/table/", get(dashboard::table))
        .route(
            "/dashboard/quick-action/",
            get(dashboard::quick_action_form).post(dashboard::quick_action_submit),
        )
        .route("/dashboard/modal/", get(dashboard::modal))
        .route("/users/", get(users::list))
        .route("/users/table/", get(users::table))
        .route("/users/create/", get(users::create_form).post(users::create))
        .route("/users/{id}/edit/", get(users::edit_form).post(users::edit))
        .route("/users/{id}/toggle/", get(users::toggle_confirm).post(users::toggle))
        .route("/users/export/{format}/", get(users::export))
        .route("/items/", get(items::list))
        .route("/items/table/", get(items::table))
        .route("/items/create/", get(items::create_form).post(items::create))
        .route("/items/{id}/edit/", get(items::edit_form).post(items::edit))
        .route("/items/{id}/delete/", get(items::delete_confirm).post(items::delete))
        .route("/items/export/{format}/", get(items::export))
        .route("/organization/", get(organization::detail))
        .route(
            "/organization/edit/",
            get(organization::edit_form).post(organization::edit),
        )
        .route("/accounts/profile/", get(accounts::profile))
        .route(
            "/accounts/profile/edit/",
            get(accounts::profile_edit_form).post(accounts::profile_edit),
        )
        .route(
            "/accounts/password-change/",
            get(accounts::password_change_form).post(accounts::password_change),
        )
        .route("/health", get(health_check))
}

// ── Handlers ──────────────────────────────────────────────────────────

async fn health_check() -> &'static str {
    "ok"
}


#[cfg(test)]
mod tests {
    use super::testing::*;
    use super::*;
    use axum::body::Body;
    use axum::http::Request;
    use tower::ServiceExt;

    #[tokio::test]
    async fn test_health_check() {
        let (app, _) = test_app();
        let request = Request::builder()
            .uri("/health")
            .body(Body::empty())
            .unwrap();
        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_string(response.into_body()).await, "ok");
    }

    #[tokio::test]
    async fn test_anonymous_is_forbidden() {
        let (app, _) = test_app();
        let request = Request::builder()
            .uri("/users/")
            .body(Body::empty())
            .unwrap();
        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
        assert_eq!(body_string(response.into_body()).await, "Forbidden");
    }

    #[tokio::test]
    async fn test_unknown_header_user_is_anonymous() {
        let (app, _) = test_app();
        let response = app.oneshot(get_as("ghost", "/items/")).await.unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[test]
    fn test_export_refusals_map_to_403_messages() {
        let cases = [
            (KitError::Forbidden, FORBIDDEN),
            (KitError::ExportDisabled, EXPORT_DISABLED),
            (
                KitError::FormatNotSupported {
                    format: "pdf".into(),
                },
                FORMAT_NOT_ALLOWED,
            ),
        ];
        for (err, expected) in cases {
            match ApiError::from(err) {
                ApiError::Forbidden(msg) => assert_eq!(msg, expected),
                other => panic!("expected Forbidden, got {:?}", other),
            }
        }
    }

    #[test]
    fn test_not_found_mapping() {
        assert!(matches!(
            ApiError::from(AppError::ItemNotFound { id: 9 }),
            ApiError::NotFound(_)
        ));
    }

    #[tokio::test]
    async fn test_internal_error_body_is_generic() {
        let response = ApiError::internal("disk on fire").into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            body_string(response.into_body()).await,
            "Internal Server Error"
        );
    }
}
