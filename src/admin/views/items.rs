use axum::{
    Form,
    extract::{Path, RawQuery, State},
    response::{Html, IntoResponse, Response},
};
use backoffice_kit::ParamSet;

use super::base_context;
use super::crud::{
    Capabilities, ConfirmModal, ModalForm, TableRoutes, TableView, authorize_export,
    export_response, modal_success, render_confirm, render_list, render_modal_form,
    render_table, table_view,
};
use crate::admin::api::{ApiError, SharedState};
use crate::admin::auth::Principal;
use crate::admin::forms::{FormErrors, ItemForm};
use crate::admin::htmx::Htmx;
use crate::admin::models::{Item, ItemStatus};
use crate::errors::AppError;

const ROUTES: TableRoutes = TableRoutes {
    list: "/items/",
    edit_action: "Editar",
    delete_action: "Eliminar",
    delete_needs_edit: false,
};

const FORM_TEMPLATE: &str = "items/_form_modal.html";

fn capabilities(state: &SharedState, principal: &Principal) -> Capabilities {
    Capabilities::resolve(state, principal, &state.listings.items.permissions)
}

async fn load_table(
    state: &SharedState,
    principal: &Principal,
    params: &ParamSet,
    caps: Capabilities,
) -> Result<TableView, ApiError> {
    let items = state.db.call(|db| db.list_items()).await?;
    Ok(table_view(
        &state.listings.items,
        &items,
        params,
        principal,
        caps,
        ROUTES,
    ))
}

async fn load_item(state: &SharedState, id: i64) -> Result<Item, ApiError> {
    state
        .db
        .call(move |db| db.get_item(id))
        .await?
        .ok_or_else(|| AppError::ItemNotFound { id }.into())
}

async fn refresh(
    state: &SharedState,
    principal: &Principal,
    htmx: &Htmx,
    query: Option<&str>,
) -> Result<Response, ApiError> {
    let params = ParamSet::resolve(htmx.current_url.as_deref(), query.unwrap_or_default());
    let table = load_table(state, principal, &params, capabilities(state, principal)).await?;
    modal_success(state, &table)
}

fn render_form(
    state: &SharedState,
    title: &str,
    action: &str,
    submit_label: &str,
    form: &ItemForm,
    errors: &FormErrors,
) -> Result<Html<String>, ApiError> {
    render_modal_form(
        state,
        ModalForm {
            template: FORM_TEMPLATE,
            title,
            action,
            submit_label,
            form,
            errors,
        },
    )
}

// ── Listing ───────────────────────────────────────────────────────────

pub async fn list(
    State(state): State<SharedState>,
    principal: Principal,
    htmx: Htmx,
    RawQuery(query): RawQuery,
) -> Result<Html<String>, ApiError> {
    let caps = capabilities(&state, &principal);
    caps.require_list()?;
    let params = ParamSet::from_query_str(query.as_deref().unwrap_or_default());
    let table = load_table(&state, &principal, &params, caps).await?;
    let context = base_context(&state, &principal, "items").await?;
    render_list(&state, context, &table, htmx.is_partial)
}

pub async fn table(
    State(state): State<SharedState>,
    principal: Principal,
    RawQuery(query): RawQuery,
) -> Result<Html<String>, ApiError> {
    let caps = capabilities(&state, &principal);
    caps.require_list()?;
    let params = ParamSet::from_query_str(query.as_deref().unwrap_or_default());
    let table = load_table(&state, &principal, &params, caps).await?;
    render_table(&state, &table)
}

// ── Create / edit ─────────────────────────────────────────────────────

pub async fn create_form(
    State(state): State<SharedState>,
    principal: Principal,
    RawQuery(query): RawQuery,
) -> Result<Html<String>, ApiError> {
    capabilities(&state, &principal).require_create()?;
    let labels = &state.listings.items.labels;
    render_form(
        &state,
        &labels.create_title,
        &super::with_query("/items/create/", query.as_deref()),
        &labels.create_submit,
        &ItemForm::initial(),
        &FormErrors::default(),
    )
}

pub async fn create(
    State(state): State<SharedState>,
    principal: Principal,
    htmx: Htmx,
    RawQuery(query): RawQuery,
    Form(form): Form<ItemForm>,
) -> Result<Response, ApiError> {
    capabilities(&state, &principal).require_create()?;
    let (name, status) = match form.clean() {
        Ok(cleaned) => cleaned,
        Err(errors) => {
            let labels = &state.listings.items.labels;
            return Ok(render_form(
                &state,
                &labels.create_title,
                &super::with_query("/items/create/", query.as_deref()),
                &labels.create_submit,
                &form,
                &errors,
            )?
            .into_response());
        }
    };

    let item = state
        .db
        .call(move |db| db.create_item(&name, status))
        .await?;
    tracing::info!(item = item.id, by = ?principal.id(), "item created");
    refresh(&state, &principal, &htmx, query.as_deref()).await
}

pub async fn edit_form(
    State(state): State<SharedState>,
    principal: Principal,
    Path(id): Path<i64>,
    RawQuery(query): RawQuery,
) -> Result<Html<String>, ApiError> {
    capabilities(&state, &principal).require_edit()?;
    let item = load_item(&state, id).await?;
    let labels = &state.listings.items.labels;
    render_form(
        &state,
        &labels.edit_title_for(id),
        &super::with_query(&format!("/items/{}/edit/", id), query.as_deref()),
        &labels.edit_submit,
        &ItemForm::from_item(&item.name, item.status),
        &FormErrors::default(),
    )
}

pub async fn edit(
    State(state): State<SharedState>,
    principal: Principal,
    htmx: Htmx,
    Path(id): Path<i64>,
    RawQuery(query): RawQuery,
    Form(form): Form<ItemForm>,
) -> Result<Response, ApiError> {
    capabilities(&state, &principal).require_edit()?;
    load_item(&state, id).await?;

    let (name, status): (String, ItemStatus) = match form.clean() {
        Ok(cleaned) => cleaned,
        Err(errors) => {
            let labels = &state.listings.items.labels;
            return Ok(render_form(
                &state,
                &labels.edit_title_for(id),
                &super::with_query(&format!("/items/{}/edit/", id), query.as_deref()),
                &labels.edit_submit,
                &form,
                &errors,
            )?
            .into_response());
        }
    };

    state
        .db
        .call(move |db| db.update_item(id, &name, status))
        .await?;
    tracing::info!(item = id, by = ?principal.id(), "item updated");
    refresh(&state, &principal, &htmx, query.as_deref()).await
}

// ── Delete ────────────────────────────────────────────────────────────

pub async fn delete_confirm(
    State(state): State<SharedState>,
    principal: Principal,
    Path(id): Path<i64>,
    RawQuery(query): RawQuery,
) -> Result<Html<String>, ApiError> {
    capabilities(&state, &principal).require_delete()?;
    let item = load_item(&state, id).await?;
    let labels = &state.listings.items.labels;
    let modal = ConfirmModal {
        modal_title: labels.delete_title_for(id),
        modal_size: "sm",
        confirm_action: Some(super::with_query(
            &format!("/items/{}/delete/", id),
            query.as_deref(),
        )),
        confirm_label: labels.delete_confirm.clone(),
        confirm_variant: "danger",
        confirm_message: "¿Eliminar este registro?".to_string(),
        confirm_detail: item.name,
    };
    render_confirm(&state, &modal)
}

pub async fn delete(
    State(state): State<SharedState>,
    principal: Principal,
    htmx: Htmx,
    Path(id): Path<i64>,
    RawQuery(query): RawQuery,
) -> Result<Response, ApiError> {
    capabilities(&state, &principal).require_delete()?;
    let deleted = state.db.call(move |db| db.delete_item(id)).await?;
    if !deleted {
        return Err(AppError::ItemNotFound { id }.into());
    }
    tracing::info!(item = id, by = ?principal.id(), "item deleted");
    refresh(&state, &principal, &htmx, query.as_deref()).await
}

// ── Export ────────────────────────────────────────────────────────────

pub async fn export(
    State(state): State<SharedState>,
    principal: Principal,
    Path(format): Path<String>,
    RawQuery(query): RawQuery,
) -> Result<Response, ApiError> {
    let listing = state.listings.items.clone();
    let can_export = state.authorizer.can_export(&principal, &listing.permissions);
    let plan = authorize_export(&listing, &format, can_export)?;

    let items = state.db.call(|db| db.list_items()).await?;
    let params = ParamSet::from_query_str(query.as_deref().unwrap_or_default());
    export_response(listing, plan, items, &params, &principal)
}
