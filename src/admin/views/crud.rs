//! Listing plumbing shared by every CRUD section: table view models, the
//! out-of-band refresh sent after a modal succeeds, modal rendering and
//! exports.

use std::sync::Arc;

use axum::{
    body::Body,
    http::header,
    response::{Html, IntoResponse, Response},
};
use backoffice_kit::{
    ColumnHeader, ExportFormat, ExportPlan, FilterContext, KitError, ListingConfig, Page,
    PageLink, ParamSet, Permissions, ProjectedRow, Record, build_view, column_headers, paginate,
    project_rows, view_positions,
};
use serde::Serialize;
use tera::Context;

use crate::admin::api::{ApiError, AppState};
use crate::admin::auth::Principal;
use crate::admin::forms::FormErrors;
use crate::admin::htmx::close_modal;
use crate::errors::AppError;

/// Pages shown on each side of the current one in the pagination bar.
const PAGES_ON_EACH_SIDE: u32 = 2;
const PAGES_ON_ENDS: u32 = 1;

// ── Permissions ───────────────────────────────────────────────────────

/// What the principal may do on one listing, resolved once per request.
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct Capabilities {
    pub can_list: bool,
    pub can_create: bool,
    pub can_edit: bool,
    pub can_delete: bool,
    pub can_export: bool,
}

impl Capabilities {
    pub fn resolve(state: &AppState, principal: &Principal, perms: &Permissions) -> Self {
        let auth = state.authorizer.as_ref();
        Self {
            can_list: auth.can_list(principal, perms),
            can_create: auth.can_create(principal, perms),
            can_edit: auth.can_edit(principal, perms),
            can_delete: auth.can_delete(principal, perms),
            can_export: auth.can_export(principal, perms),
        }
    }

    pub fn require_list(&self) -> Result<(), ApiError> {
        check(self.can_list)
    }

    pub fn require_create(&self) -> Result<(), ApiError> {
        check(self.can_create)
    }

    pub fn require_edit(&self) -> Result<(), ApiError> {
        check(self.can_edit)
    }

    pub fn require_delete(&self) -> Result<(), ApiError> {
        check(self.can_delete)
    }
}

fn check(allowed: bool) -> Result<(), ApiError> {
    if allowed {
        Ok(())
    } else {
        Err(ApiError::forbidden())
    }
}

// ── Table view model ──────────────────────────────────────────────────

/// Where a listing lives and how its row actions are labelled.
#[derive(Debug, Clone, Copy)]
pub struct TableRoutes {
    /// Full page URL, e.g. `/users/`. The table fragment, create and export
    /// endpoints hang below it.
    pub list: &'static str,
    pub edit_action: &'static str,
    pub delete_action: &'static str,
    /// The row's delete link is a state toggle guarded by the edit permission.
    pub delete_needs_edit: bool,
}

#[derive(Debug, Serialize)]
pub struct ExportLink {
    pub format: &'static str,
    pub label: String,
    pub url: String,
}

#[derive(Debug, Serialize)]
pub struct TableView {
    pub slug: String,
    pub page_title: String,
    pub entity_label: String,
    pub entity_label_plural: String,
    pub list_url: String,
    pub table_url: String,
    pub create_url: Option<String>,
    pub create_label: String,
    pub headers: Vec<ColumnHeader>,
    pub page: Page<ProjectedRow>,
    pub page_links: Vec<PageLink>,
    pub params: ParamSet,
    /// Current parameters without the page, for pagination links.
    pub qs: String,
    pub status_options: Vec<(String, String)>,
    pub exports: Vec<ExportLink>,
    pub caps: Capabilities,
    pub edit_action: String,
    pub delete_action: String,
    pub show_edit: bool,
    pub show_delete: bool,
}

/// Run the listing pipeline over `records` and build the table view model.
pub fn table_view<R: Record>(
    listing: &ListingConfig<R>,
    records: &[R],
    params: &ParamSet,
    principal: &Principal,
    caps: Capabilities,
    routes: TableRoutes,
) -> TableView {
    let ctx = FilterContext::new(params).with_principal(principal.id());
    let view = build_view(records, listing, &ctx);
    let page = paginate(view, listing.page_size, params.page);
    // Links must point at the page actually shown, not at an out-of-range request.
    let params = params.with_page(page.number);
    let page_links = page.page_window(PAGES_ON_EACH_SIDE, PAGES_ON_ENDS);
    let headers = column_headers(listing, &params);
    let page = project_rows(page, &params, listing);
    let qs = params.to_query_string_without_page();

    let exports = if caps.can_export && listing.export.enabled {
        listing
            .export
            .formats
            .iter()
            .map(|format| ExportLink {
                format: format.extension(),
                label: format.extension().to_uppercase(),
                url: super::with_query(
                    &format!("{}export/{}/", routes.list, format.extension()),
                    Some(&qs),
                ),
            })
            .collect()
    } else {
        Vec::new()
    };

    TableView {
        slug: listing.slug.clone(),
        page_title: listing.page_title.clone(),
        entity_label: listing.entity_label.clone(),
        entity_label_plural: listing.entity_label_plural.clone(),
        list_url: routes.list.to_string(),
        table_url: format!("{}table/", routes.list),
        create_url: caps.can_create.then(|| format!("{}create/", routes.list)),
        create_label: listing.labels.create_title.clone(),
        headers,
        page,
        page_links,
        params,
        qs,
        status_options: listing.status_options.clone(),
        exports,
        caps,
        edit_action: routes.edit_action.to_string(),
        delete_action: routes.delete_action.to_string(),
        show_edit: caps.can_edit,
        show_delete: if routes.delete_needs_edit {
            caps.can_edit
        } else {
            caps.can_delete
        },
    }
}

fn table_context(mut context: Context, table: &TableView) -> Context {
    context.insert("table", table);
    context
}

/// `crud/list.html`, or its fragment for HTMX navigation.
pub fn render_list(
    state: &AppState,
    context: Context,
    table: &TableView,
    partial: bool,
) -> Result<Html<String>, ApiError> {
    let context = table_context(context, table);
    Ok(Html(state.renderer.render_page("crud/list.html", partial, &context)?))
}

/// Only the table, for search, sort and pagination requests.
pub fn render_table(state: &AppState, table: &TableView) -> Result<Html<String>, ApiError> {
    let context = table_context(Context::new(), table);
    Ok(Html(state.renderer.render("crud/_table.html", &context)?))
}

/// Answer to a successful modal submission: the refreshed table swapped in
/// out of band, plus the trigger that closes the modal.
pub fn modal_success(state: &AppState, table: &TableView) -> Result<Response, ApiError> {
    let context = table_context(Context::new(), table);
    let html = state
        .renderer
        .render("crud/_oob_table_refresh.html", &context)?;
    Ok(close_modal(html))
}

// ── Modals ────────────────────────────────────────────────────────────

/// A form rendered inside the modal shell. `template` extends
/// `crud/_modal_form.html` and fills in the fields.
pub struct ModalForm<'a, F: Serialize> {
    pub template: &'a str,
    pub title: &'a str,
    pub action: &'a str,
    pub submit_label: &'a str,
    pub form: &'a F,
    pub errors: &'a FormErrors,
}

pub fn render_modal_form<F: Serialize>(
    state: &AppState,
    modal: ModalForm<'_, F>,
) -> Result<Html<String>, ApiError> {
    let mut context = Context::new();
    context.insert("modal_title", modal.title);
    context.insert("modal_size", "md");
    context.insert("form_action", modal.action);
    context.insert("submit_label", modal.submit_label);
    context.insert("form", modal.form);
    context.insert("errors", modal.errors);
    Ok(Html(state.renderer.render(modal.template, &context)?))
}

#[derive(Debug, Clone, Serialize)]
pub struct ConfirmModal {
    pub modal_title: String,
    pub modal_size: &'static str,
    /// POST target; `None` renders an informational modal with a close button.
    pub confirm_action: Option<String>,
    pub confirm_label: String,
    pub confirm_variant: &'static str,
    pub confirm_message: String,
    pub confirm_detail: String,
}

pub fn render_confirm(state: &AppState, modal: &ConfirmModal) -> Result<Html<String>, ApiError> {
    Ok(Html(
        state
            .renderer
            .render_serialize("crud/_modal_confirm.html", modal)?,
    ))
}

// ── Export ────────────────────────────────────────────────────────────

/// Authorize an export request. Runs before any record is loaded, checking
/// permission, then whether the listing exports at all, then the format.
pub fn authorize_export<R>(
    listing: &ListingConfig<R>,
    raw_format: &str,
    can_export: bool,
) -> Result<ExportPlan, AppError> {
    if !can_export {
        return Err(KitError::Forbidden.into());
    }
    if !listing.export.enabled {
        return Err(KitError::ExportDisabled.into());
    }
    let format = ExportFormat::parse(raw_format).ok_or_else(|| AppError::UnknownFormat {
        format: raw_format.to_string(),
    })?;
    Ok(ExportPlan::authorize(listing, format, can_export)?)
}

/// Filter and order `records` like the on-screen listing (unpaginated) and
/// answer with the export document. CSV is streamed row by row straight
/// from the loaded records; only the view order is kept alongside them.
pub fn export_response<R>(
    listing: Arc<ListingConfig<R>>,
    plan: ExportPlan,
    records: Vec<R>,
    params: &ParamSet,
    principal: &Principal,
) -> Result<Response, ApiError>
where
    R: Record + Send + Sync + 'static,
{
    let ctx = FilterContext::new(params).with_principal(principal.id());

    if plan.format == ExportFormat::Csv {
        let positions = view_positions(&records, &listing, &ctx);
        tracing::info!(
            listing = %listing.slug,
            format = %plan.format,
            rows = positions.len(),
            "export"
        );
        let headers = [
            (header::CONTENT_TYPE, plan.format.content_type().to_string()),
            (header::CONTENT_DISPOSITION, plan.content_disposition()),
        ];
        let rows = plan.csv_stream(listing, Arc::new(records), positions);
        let stream = futures::stream::iter(rows);
        return Ok((headers, Body::from_stream(stream)).into_response());
    }

    let view = build_view(&records, &listing, &ctx);
    tracing::info!(
        listing = %listing.slug,
        format = %plan.format,
        rows = view.len(),
        "export"
    );
    let file = plan.render(&listing, &view)?;
    let headers = [
        (header::CONTENT_TYPE, file.content_type.to_string()),
        (header::CONTENT_DISPOSITION, file.content_disposition()),
    ];
    Ok((headers, file.bytes).into_response())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::admin::listings::{demo_services, services_listing, users_listing};

    fn all_caps() -> Capabilities {
        Capabilities {
            can_list: true,
            can_create: true,
            can_edit: true,
            can_delete: true,
            can_export: true,
        }
    }

    const ROUTES: TableRoutes = TableRoutes {
        list: "/dashboard/",
        edit_action: "Editar",
        delete_action: "Eliminar",
        delete_needs_edit: false,
    };

    #[test]
    fn test_table_view_clamps_page_in_links() {
        let listing = services_listing().build().unwrap();
        let services = demo_services();
        let params = ParamSet::from_query_str("q=s&page=99");
        let table = table_view(
            &listing,
            &services,
            &params,
            &Principal::anonymous(),
            Capabilities::default(),
            ROUTES,
        );
        assert_eq!(table.page.number, table.page.total_pages.max(1));
        assert_eq!(table.params.page, table.page.number);
        assert_eq!(table.qs, "q=s");
        assert_eq!(table.table_url, "/dashboard/table/");
        assert!(table.create_url.is_none());
    }

    #[test]
    fn test_table_view_export_links_need_permission() {
        let listing = users_listing().build().unwrap();
        let params = ParamSet::from_query_str("q=ana");
        let routes = TableRoutes {
            list: "/users/",
            ..ROUTES
        };
        let with = table_view(&listing, &[], &params, &Principal::anonymous(), all_caps(), routes);
        let urls: Vec<&str> = with.exports.iter().map(|e| e.url.as_str()).collect();
        assert_eq!(
            urls,
            vec![
                "/users/export/csv/?q=ana",
                "/users/export/xlsx/?q=ana",
                "/users/export/pdf/?q=ana"
            ]
        );
        assert_eq!(with.create_url.as_deref(), Some("/users/create/"));

        let without = table_view(
            &listing,
            &[],
            &params,
            &Principal::anonymous(),
            Capabilities {
                can_export: false,
                ..all_caps()
            },
            routes,
        );
        assert!(without.exports.is_empty());
    }

    #[test]
    fn test_authorize_export_order() {
        let listing = users_listing().build().unwrap();
        assert!(matches!(
            authorize_export(&listing, "pdf", false),
            Err(AppError::Listing(KitError::Forbidden))
        ));
        assert!(matches!(
            authorize_export(&listing, "docx", true),
            Err(AppError::UnknownFormat { .. })
        ));
        let plan = authorize_export(&listing, "CSV", true).unwrap();
        assert_eq!(plan.filename(), "users.csv");

        let services = services_listing().build().unwrap();
        assert!(matches!(
            authorize_export(&services, "csv", true),
            Err(AppError::Listing(KitError::ExportDisabled))
        ));
    }
}
