//! The signed-in user's own profile and password.

use axum::{
    Form,
    extract::{Query, State},
    response::{Html, IntoResponse, Redirect, Response},
};
use tera::Context;

use super::{SavedFlag, base_context, insert_success};
use crate::admin::api::{ApiError, SharedState};
use crate::admin::auth::Principal;
use crate::admin::forms::{FormErrors, PasswordChangeForm, ProfileForm};
use crate::admin::htmx::Htmx;
use crate::admin::passwords::hash_password;

const PROFILE_SAVED: &str = "Perfil actualizado correctamente";
const PASSWORD_SAVED: &str = "Contraseña actualizada correctamente";

async fn page_context(
    state: &SharedState,
    principal: &Principal,
    title: &str,
) -> Result<Context, ApiError> {
    let mut context = base_context(state, principal, "accounts").await?;
    context.insert("page_title", title);
    Ok(context)
}

// ── Profile ───────────────────────────────────────────────────────────

pub async fn profile(
    State(state): State<SharedState>,
    principal: Principal,
    htmx: Htmx,
    Query(flag): Query<SavedFlag>,
) -> Result<Html<String>, ApiError> {
    let user = principal.require_user()?;
    let mut context = page_context(&state, &principal, "Mi Perfil").await?;
    context.insert("user", user);
    match flag.saved.as_deref() {
        Some("password") => insert_success(&mut context, PASSWORD_SAVED),
        Some(_) => insert_success(&mut context, PROFILE_SAVED),
        None => {}
    }
    Ok(Html(state.renderer.render_page(
        "accounts/profile.html",
        htmx.is_partial,
        &context,
    )?))
}

async fn render_profile_edit(
    state: &SharedState,
    principal: &Principal,
    partial: bool,
    form: &ProfileForm,
    errors: &FormErrors,
) -> Result<Html<String>, ApiError> {
    let mut context = page_context(state, principal, "Editar Perfil").await?;
    context.insert("form", form);
    context.insert("errors", errors);
    Ok(Html(state.renderer.render_page(
        "accounts/profile_edit.html",
        partial,
        &context,
    )?))
}

pub async fn profile_edit_form(
    State(state): State<SharedState>,
    principal: Principal,
    htmx: Htmx,
) -> Result<Html<String>, ApiError> {
    let form = ProfileForm::from_user(principal.require_user()?);
    render_profile_edit(
        &state,
        &principal,
        htmx.is_partial,
        &form,
        &FormErrors::default(),
    )
    .await
}

pub async fn profile_edit(
    State(state): State<SharedState>,
    principal: Principal,
    htmx: Htmx,
    Form(form): Form<ProfileForm>,
) -> Result<Response, ApiError> {
    let user_id = principal.require_user()?.id;

    let submitted = form.clone();
    let errors = state
        .db
        .call(move |db| {
            let errors = submitted.validate(db, user_id)?;
            if errors.is_empty() {
                db.update_profile(
                    user_id,
                    submitted.first_name.trim(),
                    submitted.last_name.trim(),
                    submitted.email.trim(),
                )?;
            }
            Ok(errors)
        })
        .await?;

    if !errors.is_empty() {
        return Ok(
            render_profile_edit(&state, &principal, htmx.is_partial, &form, &errors)
                .await?
                .into_response(),
        );
    }
    tracing::info!(user = user_id, "profile updated");
    Ok(Redirect::to("/accounts/profile/?saved=1").into_response())
}

// ── Password ──────────────────────────────────────────────────────────

async fn render_password_change(
    state: &SharedState,
    principal: &Principal,
    partial: bool,
    errors: &FormErrors,
) -> Result<Html<String>, ApiError> {
    let mut context = page_context(state, principal, "Cambiar Contraseña").await?;
    context.insert("errors", errors);
    Ok(Html(state.renderer.render_page(
        "accounts/password_change.html",
        partial,
        &context,
    )?))
}

pub async fn password_change_form(
    State(state): State<SharedState>,
    principal: Principal,
    htmx: Htmx,
) -> Result<Html<String>, ApiError> {
    principal.require_user()?;
    render_password_change(&state, &principal, htmx.is_partial, &FormErrors::default()).await
}

/// Passwords are never echoed back into the form on errors.
pub async fn password_change(
    State(state): State<SharedState>,
    principal: Principal,
    htmx: Htmx,
    Form(form): Form<PasswordChangeForm>,
) -> Result<Response, ApiError> {
    let user = principal.require_user()?;
    let errors = form.validate(user);
    if !errors.is_empty() {
        return Ok(
            render_password_change(&state, &principal, htmx.is_partial, &errors)
                .await?
                .into_response(),
        );
    }

    let user_id = user.id;
    let new_password = form.new_password1;
    state
        .db
        .call(move |db| {
            let hash = hash_password(&new_password)?;
            db.set_password(user_id, &hash)
        })
        .await?;
    tracing::info!(user = user_id, "password changed");
    Ok(Redirect::to("/accounts/profile/?saved=password").into_response())
}
