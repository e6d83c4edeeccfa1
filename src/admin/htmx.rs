//! HTMX request headers and response helpers.

use std::convert::Infallible;

use axum::{
    extract::FromRequestParts,
    http::{HeaderName, HeaderValue, request::Parts},
    response::{Html, IntoResponse, Response},
};

pub const HX_REQUEST: &str = "hx-request";
pub const HX_CURRENT_URL: &str = "hx-current-url";
pub const HX_TRIGGER: &str = "hx-trigger";

/// Client event that closes the open modal.
pub const MODAL_CLOSE_TRIGGER: &str = r#"{"modalClose": true}"#;

/// What the client told us about a request.
#[derive(Debug, Clone, Default)]
pub struct Htmx {
    /// `HX-Request: true`: answer with a fragment instead of a full page.
    pub is_partial: bool,
    /// `HX-Current-URL`: the page the request was issued from.
    pub current_url: Option<String>,
}

impl<S: Send + Sync> FromRequestParts<S> for Htmx {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let header = |name: &str| {
            parts
                .headers
                .get(name)
                .and_then(|v| v.to_str().ok())
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(str::to_string)
        };
        Ok(Htmx {
            is_partial: header(HX_REQUEST).is_some_and(|v| v.eq_ignore_ascii_case("true")),
            current_url: header(HX_CURRENT_URL),
        })
    }
}

/// HTML that also fires `HX-Trigger: {"modalClose": true}` on the client.
pub fn close_modal(html: String) -> Response {
    (
        [(
            HeaderName::from_static(HX_TRIGGER),
            HeaderValue::from_static(MODAL_CLOSE_TRIGGER),
        )],
        Html(html),
    )
        .into_response()
}
