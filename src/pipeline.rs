//! Top-level render entry point
//!
//! Resolves a scheme reference to cached markup, seeds the per-call data
//! context, drives the template renderer over it, and gates the final
//! response on the accumulated errors and the ignore-errors setting.

use crate::config::ConfigStore;
use crate::context::{DataContext, Value};
use crate::error::PipelineError;
use crate::scheme::{Scheme, SchemeRegistry};
use crate::template::TemplateRenderer;

/// Either identifier form a caller can pass for a scheme
///
/// An entry reference is treated as carrying its name for the same registry
/// lookup, so both forms resolve identically.
#[derive(Debug, Clone, Copy)]
pub enum SchemeRef<'a> {
    Name(&'a str),
    Entry(&'a Scheme),
}

impl<'a> SchemeRef<'a> {
    fn name(&self) -> &'a str {
        match *self {
            SchemeRef::Name(name) => name,
            SchemeRef::Entry(scheme) => &scheme.name,
        }
    }
}

impl<'a> From<&'a str> for SchemeRef<'a> {
    fn from(name: &'a str) -> Self {
        SchemeRef::Name(name)
    }
}

impl<'a> From<&'a Scheme> for SchemeRef<'a> {
    fn from(scheme: &'a Scheme) -> Self {
        SchemeRef::Entry(scheme)
    }
}

/// A successful render response
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedPage {
    pub status: u16,
    pub content_type: &'static str,
    pub body: String,
}

/// Orchestrates scheme resolution, rendering, and the error gate
#[derive(Debug, Default)]
pub struct RenderPipeline {
    schemes: SchemeRegistry,
    config: ConfigStore,
}

impl RenderPipeline {
    pub fn new(schemes: SchemeRegistry, config: ConfigStore) -> Self {
        Self { schemes, config }
    }

    pub fn schemes(&self) -> &SchemeRegistry {
        &self.schemes
    }

    pub fn config(&self) -> &ConfigStore {
        &self.config
    }

    /// Render `view_name` inside a scheme with the supplied data
    ///
    /// When `scheme` is None the `default_scheme` config key is consulted.
    /// Outcomes: success carries the fully resolved markup; a missing or
    /// empty scheme short-circuits to [`PipelineError::SchemeNotFound`]
    /// before any rendering; accumulated marker errors fail the call with
    /// [`PipelineError::EvaluationFailed`] unless `ignore_errors` is set.
    pub fn render(
        &self,
        view_name: &str,
        data: serde_json::Value,
        scheme: Option<SchemeRef<'_>>,
    ) -> Result<RenderedPage, PipelineError> {
        let scheme_name = match &scheme {
            Some(scheme_ref) => scheme_ref.name(),
            None => self
                .config
                .default_scheme()
                .ok_or(PipelineError::SchemeNotFound)?,
        };

        let scheme = self
            .schemes
            .get(scheme_name)
            .ok_or(PipelineError::SchemeNotFound)?;
        if scheme.markup.is_empty() {
            return Err(PipelineError::SchemeNotFound);
        }

        // Fresh context per call; shared by every nested include
        let mut ctx = DataContext::from_json(data);
        ctx.insert("file_name", Value::String(view_name.to_string()));

        let mut renderer = TemplateRenderer::new(self.config.views_dir());
        let body = renderer.run(&scheme.markup, &mut ctx)?;

        let errors = renderer.take_errors();
        if !errors.is_empty() && !self.config.ignore_errors() {
            for error in &errors {
                tracing::error!(%error, view = view_name, "marker evaluation failed");
            }
            return Err(PipelineError::EvaluationFailed { errors });
        }

        Ok(RenderedPage {
            status: 200,
            content_type: "text/html",
            body,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn pipeline_with_scheme(markup: &str) -> RenderPipeline {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("main.html"), markup).unwrap();
        let mut schemes = SchemeRegistry::new();
        schemes.load(dir.path()).unwrap();
        RenderPipeline::new(schemes, ConfigStore::new())
    }

    #[test]
    fn test_render_success() {
        let pipeline = pipeline_with_scheme("<h1>{{ title }}</h1>");
        let page = pipeline
            .render(
                "home",
                serde_json::json!({"title": "Hi"}),
                Some("main".into()),
            )
            .expect("Should render");
        assert_eq!(page.status, 200);
        assert_eq!(page.content_type, "text/html");
        assert_eq!(page.body, "<h1>Hi</h1>");
    }

    #[test]
    fn test_file_name_seeded() {
        let pipeline = pipeline_with_scheme("{{ file_name }}");
        let page = pipeline
            .render("home", serde_json::json!({}), Some("main".into()))
            .unwrap();
        assert_eq!(page.body, "home");
    }

    #[test]
    fn test_scheme_not_found() {
        let pipeline = pipeline_with_scheme("irrelevant");
        let err = pipeline
            .render("home", serde_json::json!({}), Some("missing".into()))
            .expect_err("Should fail");
        assert!(matches!(err, PipelineError::SchemeNotFound));
        assert_eq!(err.to_string(), "Html scheme not found.");
        assert_eq!(err.status(), 404);
    }

    #[test]
    fn test_empty_scheme_markup_is_not_found() {
        let pipeline = pipeline_with_scheme("");
        let err = pipeline
            .render("home", serde_json::json!({}), Some("main".into()))
            .expect_err("Should fail");
        assert!(matches!(err, PipelineError::SchemeNotFound));
    }

    #[test]
    fn test_entry_reference_resolves_by_name() {
        let pipeline = pipeline_with_scheme("ok");
        let scheme = pipeline.schemes().get("main").unwrap().clone();
        let page = pipeline
            .render("home", serde_json::json!({}), Some((&scheme).into()))
            .unwrap();
        assert_eq!(page.body, "ok");
    }

    #[test]
    fn test_default_scheme_fallback() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("main.html"), "fallback").unwrap();
        let mut schemes = SchemeRegistry::new();
        schemes.load(dir.path()).unwrap();
        let mut config = ConfigStore::new();
        config.set("default_scheme", "main");

        let pipeline = RenderPipeline::new(schemes, config);
        let page = pipeline
            .render("home", serde_json::json!({}), None)
            .unwrap();
        assert_eq!(page.body, "fallback");
    }

    #[test]
    fn test_no_scheme_and_no_default_is_not_found() {
        let pipeline = pipeline_with_scheme("x");
        let err = pipeline
            .render("home", serde_json::json!({}), None)
            .expect_err("Should fail");
        assert!(matches!(err, PipelineError::SchemeNotFound));
    }

    #[test]
    fn test_evaluation_failure_gates_response() {
        let pipeline = pipeline_with_scheme("a{{ undefinedVar.prop }}b");
        let err = pipeline
            .render("home", serde_json::json!({}), Some("main".into()))
            .expect_err("Should fail");
        match err {
            PipelineError::EvaluationFailed { errors } => {
                assert_eq!(errors.len(), 1);
                assert_eq!(errors[0].expression, "undefinedVar.prop");
            }
            other => panic!("expected EvaluationFailed, got {:?}", other),
        }
    }

    #[test]
    fn test_ignore_errors_returns_partial_markup() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("main.html"), "a{{ undefinedVar.prop }}b").unwrap();
        let mut schemes = SchemeRegistry::new();
        schemes.load(dir.path()).unwrap();
        let mut config = ConfigStore::new();
        config.set("ignore_errors", true);

        let pipeline = RenderPipeline::new(schemes, config);
        let page = pipeline
            .render("home", serde_json::json!({}), Some("main".into()))
            .expect("Should succeed with ignore_errors");
        assert_eq!(page.status, 200);
        assert_eq!(page.body, "ab");
    }
}
