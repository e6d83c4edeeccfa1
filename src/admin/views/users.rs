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
use crate::admin::forms::{FormErrors, UserCreateForm, UserEditForm};
use crate::admin::htmx::Htmx;
use crate::admin::models::User;
use crate::admin::passwords::hash_password;
use crate::errors::AppError;

const ROUTES: TableRoutes = TableRoutes {
    list: "/users/",
    edit_action: "Editar",
    delete_action: "Cambiar estado",
    delete_needs_edit: true,
};

const CREATE_TEMPLATE: &str = "users/_create_modal.html";
const EDIT_TEMPLATE: &str = "users/_edit_modal.html";

fn capabilities(state: &SharedState, principal: &Principal) -> Capabilities {
    Capabilities::resolve(state, principal, &state.listings.users.permissions)
}

async fn load_table(
    state: &SharedState,
    principal: &Principal,
    params: &ParamSet,
    caps: Capabilities,
) -> Result<TableView, ApiError> {
    let users = state.db.call(|db| db.list_users()).await?;
    Ok(table_view(
        &state.listings.users,
        &users,
        params,
        principal,
        caps,
        ROUTES,
    ))
}

async fn load_user(state: &SharedState, id: i64) -> Result<User, ApiError> {
    state
        .db
        .call(move |db| db.get_user(id))
        .await?
        .ok_or_else(|| AppError::UserNotFound { id }.into())
}

/// Table rebuilt from the page the modal was opened on.
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
    let context = base_context(&state, &principal, "users").await?;
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

// ── Create ────────────────────────────────────────────────────────────

fn render_create(
    state: &SharedState,
    form: &UserCreateForm,
    errors: &FormErrors,
    query: Option<&str>,
) -> Result<Html<String>, ApiError> {
    let labels = &state.listings.users.labels;
    render_modal_form(
        state,
        ModalForm {
            template: CREATE_TEMPLATE,
            title: &labels.create_title,
            action: &super::with_query("/users/create/", query),
            submit_label: &labels.create_submit,
            form,
            errors,
        },
    )
}

pub async fn create_form(
    State(state): State<SharedState>,
    principal: Principal,
    RawQuery(query): RawQuery,
) -> Result<Html<String>, ApiError> {
    capabilities(&state, &principal).require_create()?;
    render_create(
        &state,
        &UserCreateForm::initial(),
        &FormErrors::default(),
        query.as_deref(),
    )
}

pub async fn create(
    State(state): State<SharedState>,
    principal: Principal,
    htmx: Htmx,
    RawQuery(query): RawQuery,
    Form(form): Form<UserCreateForm>,
) -> Result<Response, ApiError> {
    capabilities(&state, &principal).require_create()?;

    let submitted = form.clone();
    let errors = state
        .db
        .call(move |db| {
            let errors = submitted.validate(db)?;
            if errors.is_empty() {
                let hash = hash_password(&submitted.password1)?;
                db.create_user(&submitted.to_new_user(hash))?;
            }
            Ok(errors)
        })
        .await?;

    if !errors.is_empty() {
        return Ok(render_create(&state, &form, &errors, query.as_deref())?.into_response());
    }
    tracing::info!(username = %form.username.trim(), by = ?principal.id(), "user created");
    refresh(&state, &principal, &htmx, query.as_deref()).await
}

// ── Edit ──────────────────────────────────────────────────────────────

fn render_edit(
    state: &SharedState,
    id: i64,
    form: &UserEditForm,
    errors: &FormErrors,
    query: Option<&str>,
) -> Result<Html<String>, ApiError> {
    let labels = &state.listings.users.labels;
    render_modal_form(
        state,
        ModalForm {
            template: EDIT_TEMPLATE,
            title: &labels.edit_title_for(id),
            action: &super::with_query(&format!("/users/{}/edit/", id), query),
            submit_label: &labels.edit_submit,
            form,
            errors,
        },
    )
}

pub async fn edit_form(
    State(state): State<SharedState>,
    principal: Principal,
    Path(id): Path<i64>,
    RawQuery(query): RawQuery,
) -> Result<Html<String>, ApiError> {
    capabilities(&state, &principal).require_edit()?;
    let user = load_user(&state, id).await?;
    render_edit(
        &state,
        id,
        &UserEditForm::from_user(&user),
        &FormErrors::default(),
        query.as_deref(),
    )
}

pub async fn edit(
    State(state): State<SharedState>,
    principal: Principal,
    htmx: Htmx,
    Path(id): Path<i64>,
    RawQuery(query): RawQuery,
    Form(form): Form<UserEditForm>,
) -> Result<Response, ApiError> {
    capabilities(&state, &principal).require_edit()?;
    load_user(&state, id).await?;

    let submitted = form.clone();
    let editor = principal.id();
    let errors = state
        .db
        .call(move |db| {
            let errors = submitted.validate(db, id, editor)?;
            if errors.is_empty() {
                db.update_user(id, &submitted.to_changes())?;
            }
            Ok(errors)
        })
        .await?;

    if !errors.is_empty() {
        return Ok(render_edit(&state, id, &form, &errors, query.as_deref())?.into_response());
    }
    tracing::info!(user = id, by = ?editor, "user updated");
    refresh(&state, &principal, &htmx, query.as_deref()).await
}

// ── Toggle active ─────────────────────────────────────────────────────

pub async fn toggle_confirm(
    State(state): State<SharedState>,
    principal: Principal,
    Path(id): Path<i64>,
    RawQuery(query): RawQuery,
) -> Result<Html<String>, ApiError> {
    capabilities(&state, &principal).require_edit()?;
    let user = load_user(&state, id).await?;

    let deactivating = user.is_active;
    let modal = ConfirmModal {
        modal_title: state.listings.users.labels.delete_title_for(id),
        modal_size: "sm",
        confirm_action: Some(super::with_query(
            &format!("/users/{}/toggle/", id),
            query.as_deref(),
        )),
        confirm_label: if deactivating { "Desactivar" } else { "Activar" }.to_string(),
        confirm_variant: if deactivating { "danger" } else { "primary" },
        confirm_message: if deactivating {
            "¿Deseas desactivar este usuario?"
        } else {
            "¿Deseas activar este usuario?"
        }
        .to_string(),
        confirm_detail: format!(
            "{} ({})",
            user.username,
            if user.email.is_empty() {
                "sin email"
            } else {
                user.email.as_str()
            }
        ),
    };
    render_confirm(&state, &modal)
}

pub async fn toggle(
    State(state): State<SharedState>,
    principal: Principal,
    htmx: Htmx,
    Path(id): Path<i64>,
    RawQuery(query): RawQuery,
) -> Result<Response, ApiError> {
    capabilities(&state, &principal).require_edit()?;
    let user = load_user(&state, id).await?;

    if user.is_active && principal.id() == Some(id) {
        let modal = ConfirmModal {
            modal_title: "Acción no permitida".to_string(),
            modal_size: "sm",
            confirm_action: None,
            confirm_label: "Cerrar".to_string(),
            confirm_variant: "secondary",
            confirm_message: "No puedes desactivar tu propio usuario.".to_string(),
            confirm_detail: user.username,
        };
        return Ok(render_confirm(&state, &modal)?.into_response());
    }

    let active = !user.is_active;
    state
        .db
        .call(move |db| db.set_user_active(id, active))
        .await?;
    tracing::info!(user = id, active, by = ?principal.id(), "user status changed");
    refresh(&state, &principal, &htmx, query.as_deref()).await
}

// ── Export ────────────────────────────────────────────────────────────

pub async fn export(
    State(state): State<SharedState>,
    principal: Principal,
    Path(format): Path<String>,
    RawQuery(query): RawQuery,
) -> Result<Response, ApiError> {
    let listing = state.listings.users.clone();
    let can_export = state.authorizer.can_export(&principal, &listing.permissions);
    let plan = authorize_export(&listing, &format, can_export)?;

    let users = state.db.call(|db| db.list_users()).await?;
    let params = ParamSet::from_query_str(query.as_deref().unwrap_or_default());
    export_response(listing, plan, users, &params, &principal)
}
