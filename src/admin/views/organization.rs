use axum::{
    Form,
    extract::{Query, State},
    response::{Html, IntoResponse, Redirect, Response},
};

use super::{SavedFlag, base_context, insert_success};
use crate::admin::api::{ApiError, SharedState};
use crate::admin::auth::Principal;
use crate::admin::forms::{FormErrors, GlobalConfigForm};
use crate::admin::htmx::Htmx;

const SAVED_MESSAGE: &str = "Configuración actualizada correctamente";

pub async fn detail(
    State(state): State<SharedState>,
    principal: Principal,
    htmx: Htmx,
    Query(flag): Query<SavedFlag>,
) -> Result<Html<String>, ApiError> {
    principal.require_user()?;
    let mut context = base_context(&state, &principal, "organization").await?;
    context.insert("page_title", "Configuración de Empresa");
    if flag.saved.is_some() {
        insert_success(&mut context, SAVED_MESSAGE);
    }
    Ok(Html(state.renderer.render_page(
        "organization/detail.html",
        htmx.is_partial,
        &context,
    )?))
}

async fn render_edit(
    state: &SharedState,
    principal: &Principal,
    partial: bool,
    form: &GlobalConfigForm,
    errors: &FormErrors,
) -> Result<Html<String>, ApiError> {
    let mut context = base_context(state, principal, "organization").await?;
    context.insert("page_title", "Editar Configuración");
    context.insert("form", form);
    context.insert("errors", errors);
    Ok(Html(state.renderer.render_page(
        "organization/edit.html",
        partial,
        &context,
    )?))
}

pub async fn edit_form(
    State(state): State<SharedState>,
    principal: Principal,
    htmx: Htmx,
) -> Result<Html<String>, ApiError> {
    principal.require_user()?;
    let config = state.db.call(|db| db.load_global_config()).await?;
    render_edit(
        &state,
        &principal,
        htmx.is_partial,
        &GlobalConfigForm::from_config(&config),
        &FormErrors::default(),
    )
    .await
}

pub async fn edit(
    State(state): State<SharedState>,
    principal: Principal,
    htmx: Htmx,
    Form(form): Form<GlobalConfigForm>,
) -> Result<Response, ApiError> {
    principal.require_user()?;
    let current = state.db.call(|db| db.load_global_config()).await?;
    let config = match form.clean(&current) {
        Ok(config) => config,
        Err(errors) => {
            return Ok(render_edit(&state, &principal, htmx.is_partial, &form, &errors)
                .await?
                .into_response());
        }
    };

    let saved = state
        .db
        .call(move |db| db.save_global_config(&config))
        .await?;
    tracing::info!(site = %saved.site_name, by = ?principal.id(), "organization settings updated");
    Ok(Redirect::to("/organization/?saved=1").into_response())
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use tower::ServiceExt;

    use crate::admin::api::testing::*;

    #[tokio::test]
    async fn test_detail_shows_defaults() {
        let (app, _) = test_app();
        let response = app.oneshot(get_as(VIEWER, "/organization/")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let html = body_string(response.into_body()).await;
        assert!(html.contains("Configuración de Empresa"));
        assert!(html.contains("#0d6efd"));
    }

    #[tokio::test]
    async fn test_edit_form_full_page_and_fragment() {
        let (app, _) = test_app();
        let response = app
            .clone()
            .oneshot(get_as(ADMIN, "/organization/edit/"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let html = body_string(response.into_body()).await;
        assert!(html.contains("<html"));
        assert!(html.contains("Editar Configuración"));
        assert!(html.contains("name=\"primary_color\""));

        let mut req = get_as(ADMIN, "/organization/edit/");
        req.headers_mut().insert("HX-Request", "true".parse().unwrap());
        let response = app.oneshot(req).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let html = body_string(response.into_body()).await;
        assert!(!html.contains("<html"));
        assert!(html.contains("name=\"primary_color\""));
    }

    #[tokio::test]
    async fn test_edit_validation_errors() {
        let (app, state) = test_app();
        let response = app
            .oneshot(post_form_as(
                ADMIN,
                "/organization/edit/",
                "site_name=Acme&primary_color=blue&secondary_color=%23123456&social_twitter=twitter.com",
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let html = body_string(response.into_body()).await;
        assert!(html.contains("Introduce un color en formato #RRGGBB."));
        assert!(html.contains("Introduce una URL válida"));
        let config = state.db.lock_sync().unwrap().load_global_config().unwrap();
        assert_eq!(config.site_name, "Backoffice");
    }

    #[tokio::test]
    async fn test_edit_saves_and_redirects_with_flash() {
        let (app, state) = test_app();
        let response = app
            .clone()
            .oneshot(post_form_as(
                ADMIN,
                "/organization/edit/",
                "site_name=Acme&primary_color=%23112233&secondary_color=%23445566&company_email=hola%40acme.test",
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(
            response.headers().get("location").unwrap(),
            "/organization/?saved=1"
        );
        let config = state.db.lock_sync().unwrap().load_global_config().unwrap();
        assert_eq!(config.site_name, "Acme");
        assert_eq!(config.primary_color, "#112233");

        let html = body_string(
            app.oneshot(get_as(ADMIN, "/organization/?saved=1"))
                .await
                .unwrap()
                .into_body(),
        )
        .await;
        assert!(html.contains("Configuración actualizada correctamente"));
        assert!(html.contains("Acme"));
    }
}
