//! Reweave - a server-side template renderer
//!
//! Markup files carry `{{ ... }}` expression markers that are evaluated
//! against a per-call data context and substituted back into the page. The
//! cycle repeats to a fixed point, so an `include("name")` marker can splice
//! in another view whose own markers resolve in the same call, sharing the
//! same context.
//!
//! # Example
//!
//! ```rust
//! use reweave::render_markup;
//!
//! let html = render_markup("a{{ 1+1 }}b", serde_json::json!({})).unwrap();
//! assert_eq!(html, "a2b");
//! ```
//!
//! Declarations made by one marker are visible to every later marker:
//!
//! ```rust
//! use reweave::render_markup;
//!
//! let html = render_markup("{{ let x = 5 }}{{ x * 2 }}", serde_json::json!({})).unwrap();
//! assert_eq!(html, "10");
//! ```
//!
//! For the full pipeline - named schemes loaded from a directory, a views
//! directory for includes, and the ignore-errors response gate - see
//! [`RenderPipeline`].

pub mod config;
pub mod context;
pub mod error;
pub mod expr;
pub mod pipeline;
pub mod scheme;
pub mod template;

pub use config::{ConfigStore, SettingValue};
pub use context::{DataContext, Value};
pub use error::{EvalError, ParseError, PipelineError, RenderError};
pub use pipeline::{RenderPipeline, RenderedPage, SchemeRef};
pub use scheme::{Scheme, SchemeRegistry};
pub use template::{RenderLimits, TemplateRenderer};

/// Render a markup string against JSON data, with no include capability
///
/// This is the quickest entry point for embedding. Marker failures fail the
/// call with [`PipelineError::EvaluationFailed`]; use [`RenderPipeline`]
/// when the ignore-errors gate or includes are needed.
pub fn render_markup(
    markup: &str,
    data: serde_json::Value,
) -> Result<String, PipelineError> {
    let mut ctx = DataContext::from_json(data);
    let mut renderer = TemplateRenderer::new(None);
    let body = renderer.run(markup, &mut ctx)?;

    let errors = renderer.take_errors();
    if !errors.is_empty() {
        return Err(PipelineError::EvaluationFailed { errors });
    }
    Ok(body)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_markup_plain_text() {
        let markup = "<p>nothing to resolve</p>";
        let html = render_markup(markup, serde_json::json!({"any": "data"})).unwrap();
        assert_eq!(html, markup);
    }

    #[test]
    fn test_render_markup_with_data() {
        let html = render_markup(
            "<title>{{ title }}</title>",
            serde_json::json!({"title": "Start"}),
        )
        .unwrap();
        assert_eq!(html, "<title>Start</title>");
    }

    #[test]
    fn test_render_markup_error_surfaces() {
        let err = render_markup("{{ undefinedVar.prop }}", serde_json::json!({}))
            .expect_err("Should fail");
        assert!(matches!(err, PipelineError::EvaluationFailed { .. }));
    }

    #[test]
    fn test_render_markup_invalid_character_fails() {
        let err = render_markup("{{ title @ }}", serde_json::json!({"title": "Home"}))
            .expect_err("Should fail");
        assert!(matches!(err, PipelineError::EvaluationFailed { .. }));
    }

    #[test]
    fn test_render_markup_is_deterministic() {
        let markup = "{{ let greeting = 'hi ' }}{{ greeting + name }}";
        let data = serde_json::json!({"name": "ada"});
        let first = render_markup(markup, data.clone()).unwrap();
        let second = render_markup(markup, data).unwrap();
        assert_eq!(first, second);
        assert_eq!(first, "hi ada");
    }
}
