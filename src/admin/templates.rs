//! Tera rendering over the embedded `templates/` tree.
//!
//! Pages come in two shapes: `<name>.html` extends `base.html`, and
//! `_<name>.html` is the fragment swapped in by HTMX. Both are rendered from
//! the same context.

use anyhow::anyhow;
use serde::Serialize;
use tera::{Context, Tera};

use super::embedded::TemplateAssets;
use crate::errors::AppError;

pub struct Renderer {
    tera: Tera,
}

impl Renderer {
    /// Parse every embedded template. Fails on the first syntax error.
    pub fn new() -> Result<Self, AppError> {
        let mut templates = Vec::new();
        for name in TemplateAssets::iter() {
            let Some(file) = TemplateAssets::get(&name) else {
                continue;
            };
            let source = String::from_utf8(file.data.into_owned())
                .map_err(|e| anyhow!("Template {} is not UTF-8: {}", name, e))?;
            templates.push((name.to_string(), source));
        }

        let mut tera = Tera::default();
        tera.autoescape_on(vec![".html"]);
        tera.add_raw_templates(templates)?;
        tracing::debug!(count = tera.get_template_names().count(), "templates loaded");
        Ok(Self { tera })
    }

    pub fn render(&self, name: &str, context: &Context) -> Result<String, AppError> {
        Ok(self.tera.render(name, context)?)
    }

    pub fn render_serialize<T: Serialize>(&self, name: &str, value: &T) -> Result<String, AppError> {
        let context = Context::from_serialize(value)?;
        self.render(name, &context)
    }

    /// `dir/page.html`, or its `dir/_page.html` fragment for partial requests.
    pub fn render_page(
        &self,
        page: &str,
        partial: bool,
        context: &Context,
    ) -> Result<String, AppError> {
        if partial {
            self.render(&fragment_name(page), context)
        } else {
            self.render(page, context)
        }
    }

    pub fn has_template(&self, name: &str) -> bool {
        self.tera.get_template_names().any(|n| n == name)
    }
}

/// `users/list.html` → `users/_list.html`.
pub fn fragment_name(page: &str) -> String {
    match page.rsplit_once('/') {
        Some((dir, file)) => format!("{}/_{}", dir, file),
        None => format!("_{}", page),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fragment_name() {
        assert_eq!(fragment_name("crud/list.html"), "crud/_list.html");
        assert_eq!(fragment_name("index.html"), "_index.html");
    }

    #[test]
    fn test_all_templates_parse() {
        let renderer = Renderer::new().unwrap();
        assert!(renderer.has_template("base.html"));
        assert!(renderer.has_template("crud/list.html"));
        assert!(renderer.has_template("crud/_list.html"));
    }

    #[test]
    fn test_every_page_has_fragment() {
        let renderer = Renderer::new().unwrap();
        for page in [
            "crud/list.html",
            "dashboard/index.html",
            "organization/detail.html",
            "organization/edit.html",
            "accounts/profile.html",
            "accounts/profile_edit.html",
            "accounts/password_change.html",
        ] {
            assert!(renderer.has_template(page), "{page}");
            assert!(renderer.has_template(&fragment_name(page)), "{page}");
        }
    }

    #[test]
    fn test_autoescape() {
        let renderer = Renderer::new().unwrap();
        let mut context = Context::new();
        context.insert("message", "<script>");
        context.insert("level", "info");
        let html = renderer.render("partials/_alert.html", &context).unwrap();
        assert!(html.contains("&lt;script&gt;"));
    }
}
