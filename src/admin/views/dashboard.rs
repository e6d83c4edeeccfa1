//! Demo dashboard: KPI cards, charts, an in-memory table and a quick-action
//! form. Nothing here writes to the database.

use axum::{
    Form,
    extract::{RawQuery, State},
    response::Html,
};
use backoffice_kit::ParamSet;
use serde::Serialize;
use tera::Context;

use super::base_context;
use super::crud::{Capabilities, TableRoutes, table_view};
use crate::admin::api::{ApiError, SharedState};
use crate::admin::auth::Principal;
use crate::admin::forms::{FormErrors, QUICK_ACTION_PRIORITIES, QuickActionForm};
use crate::admin::htmx::Htmx;
use crate::admin::listings::demo_services;
use crate::admin::models::ItemStatus;

const SERVICE_ROUTES: TableRoutes = TableRoutes {
    list: "/dashboard/",
    edit_action: "",
    delete_action: "",
    delete_needs_edit: false,
};

#[derive(Debug, Serialize)]
struct Kpi {
    label: &'static str,
    value: i64,
    hint: String,
}

#[derive(Debug, Serialize)]
struct ChartSeries {
    label: &'static str,
    points: Vec<ChartPoint>,
}

#[derive(Debug, Serialize)]
struct ChartPoint {
    label: &'static str,
    value: i64,
    /// Bar height relative to the largest value across every series.
    percent: i64,
}

const WEEKDAYS: [&str; 7] = ["Lun", "Mar", "Mié", "Jue", "Vie", "Sáb", "Dom"];

fn chart_series(raw: &[(&'static str, [i64; 7])]) -> Vec<ChartSeries> {
    let max = raw
        .iter()
        .flat_map(|(_, values)| values.iter().copied())
        .max()
        .unwrap_or(0)
        .max(1);
    raw.iter()
        .map(|(label, values)| ChartSeries {
            label: *label,
            points: WEEKDAYS
                .iter()
                .zip(values)
                .map(|(day, value)| ChartPoint {
                    label: *day,
                    value: *value,
                    percent: value * 100 / max,
                })
                .collect(),
        })
        .collect()
}

// ── Page ──────────────────────────────────────────────────────────────

pub async fn index(
    State(state): State<SharedState>,
    principal: Principal,
    htmx: Htmx,
) -> Result<Html<String>, ApiError> {
    principal.require_user()?;
    let context = base_context(&state, &principal, "dashboard").await?;
    Ok(Html(state.renderer.render_page(
        "dashboard/index.html",
        htmx.is_partial,
        &context,
    )?))
}

// ── Fragments ─────────────────────────────────────────────────────────

pub async fn kpis(
    State(state): State<SharedState>,
    principal: Principal,
) -> Result<Html<String>, ApiError> {
    principal.require_user()?;
    let kpis = state
        .db
        .call(|db| {
            let users = db.list_users()?;
            let items = db.list_items()?;
            let active_users = users.iter().filter(|u| u.is_active).count() as i64;
            let active_items = items
                .iter()
                .filter(|i| i.status == ItemStatus::Active)
                .count() as i64;
            Ok(vec![
                Kpi {
                    label: "Usuarios",
                    value: users.len() as i64,
                    hint: format!("{} activos", active_users),
                },
                Kpi {
                    label: "Items",
                    value: items.len() as i64,
                    hint: format!("{} activos", active_items),
                },
            ])
        })
        .await?;

    let services = demo_services();
    let degraded = services.iter().filter(|s| s.status != "ok").count() as i64;
    let mut context = Context::new();
    context.insert("kpis", &kpis);
    context.insert("services_total", &(services.len() as i64));
    context.insert("services_degraded", &degraded);
    Ok(Html(state.renderer.render("dashboard/_kpis.html", &context)?))
}

pub async fn charts(
    State(state): State<SharedState>,
    principal: Principal,
) -> Result<Html<String>, ApiError> {
    principal.require_user()?;
    let series = chart_series(&[
        ("Pedidos", [12, 19, 8, 15, 22, 9, 4]),
        ("Incidencias", [2, 1, 4, 0, 3, 1, 0]),
    ]);
    let mut context = Context::new();
    context.insert("series", &series);
    Ok(Html(state.renderer.render("dashboard/_charts.html", &context)?))
}

/// The demo services table: search, status filter and pages of five.
pub async fn table(
    State(state): State<SharedState>,
    principal: Principal,
    RawQuery(query): RawQuery,
) -> Result<Html<String>, ApiError> {
    principal.require_user()?;
    let params = ParamSet::from_query_str(query.as_deref().unwrap_or_default());
    let services = demo_services();
    let table = table_view(
        &state.listings.services,
        &services,
        &params,
        &principal,
        Capabilities::default(),
        SERVICE_ROUTES,
    );
    let mut context = Context::new();
    context.insert("table", &table);
    Ok(Html(state.renderer.render("dashboard/_table.html", &context)?))
}

// ── Quick action ──────────────────────────────────────────────────────

fn quick_action_context(form: &QuickActionForm, errors: &FormErrors) -> Context {
    let mut context = Context::new();
    context.insert("form", form);
    context.insert("errors", errors);
    context.insert("priorities", &QUICK_ACTION_PRIORITIES);
    context
}

pub async fn quick_action_form(
    State(state): State<SharedState>,
    principal: Principal,
) -> Result<Html<String>, ApiError> {
    principal.require_user()?;
    let form = QuickActionForm {
        priority: "medium".to_string(),
        ..Default::default()
    };
    let context = quick_action_context(&form, &FormErrors::default());
    Ok(Html(
        state
            .renderer
            .render("dashboard/_quick_action_form.html", &context)?,
    ))
}

pub async fn quick_action_submit(
    State(state): State<SharedState>,
    principal: Principal,
    Form(form): Form<QuickActionForm>,
) -> Result<Html<String>, ApiError> {
    principal.require_user()?;
    match form.clean() {
        Ok(action) => {
            tracing::debug!(title = %action.title, priority = %action.priority, "quick action");
            let mut context = Context::new();
            context.insert("data", &action);
            Ok(Html(
                state
                    .renderer
                    .render("dashboard/_quick_action_success.html", &context)?,
            ))
        }
        Err(errors) => {
            let context = quick_action_context(&form, &errors);
            Ok(Html(
                state
                    .renderer
                    .render("dashboard/_quick_action_form.html", &context)?,
            ))
        }
    }
}

pub async fn modal(
    State(state): State<SharedState>,
    principal: Principal,
) -> Result<Html<String>, ApiError> {
    principal.require_user()?;
    let mut context = Context::new();
    context.insert("modal_title", "Modal de ejemplo");
    context.insert("modal_size", "md");
    Ok(Html(state.renderer.render("dashboard/_modal.html", &context)?))
}

#[cfg(test)]
mod tests {
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    use crate::admin::api::testing::*;

    #[tokio::test]
    async fn test_index_full_and_partial() {
        let (app, _) = test_app();
        let html = body_string(
            app.clone()
                .oneshot(get_as(VIEWER, "/"))
                .await
                .unwrap()
                .into_body(),
        )
        .await;
        assert!(html.contains("<html"));
        assert!(html.contains("Dashboard"));

        let mut req = get_as(VIEWER, "/dashboard/");
        req.headers_mut().insert("HX-Request", "true".parse().unwrap());
        let html = body_string(app.oneshot(req).await.unwrap().into_body()).await;
        assert!(!html.contains("<html"));
        assert!(html.contains("dashboard-kpis"));
    }

    #[tokio::test]
    async fn test_anonymous_dashboard_forbidden() {
        let (app, _) = test_app();
        let req = Request::builder()
            .uri("/dashboard/kpis/")
            .body(Body::empty())
            .unwrap();
        let response = app.oneshot(req).await.unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_kpis_count_users() {
        let (app, _) = test_app();
        let html = body_string(
            app.oneshot(get_as(ADMIN, "/dashboard/kpis/"))
                .await
                .unwrap()
                .into_body(),
        )
        .await;
        assert!(html.contains("Usuarios"));
        assert!(html.contains("2 activos"));
    }

    #[tokio::test]
    async fn test_services_table_filters_and_pages() {
        let (app, _) = test_app();
        let html = body_string(
            app.clone()
                .oneshot(get_as(ADMIN, "/dashboard/table/?status=down"))
                .await
                .unwrap()
                .into_body(),
        )
        .await;
        assert!(html.contains("Email Delivery"));
        assert!(!html.contains("API Billing"));

        let html = body_string(
            app.oneshot(get_as(ADMIN, "/dashboard/table/?page=3"))
                .await
                .unwrap()
                .into_body(),
        )
        .await;
        // Twelve services sorted by name, five per page: the last page holds two.
        assert!(html.contains("Search"));
        assert!(html.contains("Webhooks"));
        assert!(!html.contains("API Billing"));
    }

    #[tokio::test]
    async fn test_quick_action_validation_and_success() {
        let (app, _) = test_app();
        let response = app
            .clone()
            .oneshot(post_form_as(ADMIN, "/dashboard/quick-action/", "title=ab&priority=high"))
            .await
            .unwrap();
        let html = body_string(response.into_body()).await;
        assert!(html.contains("El título debe tener al menos 3 caracteres."));

        let response = app
            .oneshot(post_form_as(
                ADMIN,
                "/dashboard/quick-action/",
                "title=Revisar+backups&priority=high&notify=on",
            ))
            .await
            .unwrap();
        let html = body_string(response.into_body()).await;
        assert!(html.contains("Revisar backups"));
        assert!(html.contains("Alta"));
    }

    #[test]
    fn test_chart_series_scales_to_largest_value() {
        let series = super::chart_series(&[
            ("A", [10, 5, 0, 0, 0, 0, 0]),
            ("B", [20, 0, 0, 0, 0, 0, 0]),
        ]);
        assert_eq!(series[0].points[0].percent, 50);
        assert_eq!(series[1].points[0].percent, 100);
        assert_eq!(series[0].points[6].label, "Dom");
    }

    #[tokio::test]
    async fn test_modal_fragment() {
        let (app, _) = test_app();
        let html = body_string(
            app.oneshot(get_as(VIEWER, "/dashboard/modal/"))
                .await
                .unwrap()
                .into_body(),
        )
        .await;
        assert!(html.contains("Modal de ejemplo"));
        assert!(!html.contains("<html"));
    }
}
