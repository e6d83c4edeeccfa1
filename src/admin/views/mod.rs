//! Request handlers, one module per section of the site.
//!
//! Every handler that renders a page answers with the bare fragment when the
//! request comes from HTMX and with the full page otherwise.

pub mod accounts;
pub mod crud;
pub mod dashboard;
pub mod items;
pub mod organization;
pub mod users;

use serde::Serialize;
use tera::Context;

use super::api::{ApiError, SharedState};
use super::auth::Principal;

/// Query flag set after a successful settings or profile update.
#[derive(Debug, Default, serde::Deserialize)]
pub struct SavedFlag {
    pub saved: Option<String>,
}

#[derive(Debug, Serialize)]
struct Alert<'a> {
    level: &'a str,
    message: &'a str,
}

/// Context shared by every page: site settings, the signed-in user and the
/// active section of the sidebar.
pub async fn base_context(
    state: &SharedState,
    principal: &Principal,
    section: &str,
) -> Result<Context, ApiError> {
    let site = state.db.call(|db| db.load_global_config()).await?;
    let mut context = Context::new();
    context.insert("site", &site);
    context.insert("current_user", &principal.user);
    context.insert(
        "current_user_name",
        &principal.user.as_ref().map(|u| u.display_name()),
    );
    context.insert("section", section);
    Ok(context)
}

/// Insert a success alert into `context`.
pub fn insert_success(context: &mut Context, message: &str) {
    context.insert(
        "alert",
        &Alert {
            level: "success",
            message,
        },
    );
}

/// `path?query`, or `path` when the query is empty.
pub fn with_query(path: &str, query: Option<&str>) -> String {
    match query.map(str::trim).filter(|q| !q.is_empty()) {
        Some(q) => format!("{}?{}", path, q),
        None => path.to_string(),
    }
}
