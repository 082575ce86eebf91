//! Fixed-point render engine
//!
//! One pass scans the current markup, evaluates every marker in document
//! order against the shared data context, and splices the results back in at
//! their recorded byte spans. Because a substitution can inject new markers
//! (an include's content, or a data value that itself contains `{{`), the
//! engine re-scans and repeats until a pass finds none, bounded by
//! [`RenderLimits`].

use std::path::PathBuf;

use crate::context::{DataContext, Value};
use crate::error::{EvalError, PipelineError, RenderError};
use crate::expr::{self, EvalHost};
use crate::scheme::normalize_newlines;
use crate::template::scanner::scan;

/// Bounds on the resolution process
///
/// The fixed-point loop is not otherwise guaranteed to terminate: a marker
/// whose output contains another marker can regenerate forever, and a view
/// that includes itself recurses without bound.
#[derive(Debug, Clone, Copy)]
pub struct RenderLimits {
    /// Maximum scan-evaluate-substitute passes over one markup string
    pub max_passes: usize,
    /// Maximum nesting of `include` calls
    pub max_include_depth: usize,
}

impl Default for RenderLimits {
    fn default() -> Self {
        Self {
            max_passes: 16,
            max_include_depth: 32,
        }
    }
}

/// Drives marker resolution for one render call
///
/// Holds the views directory for include resolution and accumulates every
/// marker failure across the whole call tree; the pipeline inspects the
/// accumulated errors once at the end.
#[derive(Debug)]
pub struct TemplateRenderer {
    views_dir: Option<PathBuf>,
    limits: RenderLimits,
    errors: Vec<RenderError>,
    include_depth: usize,
}

impl TemplateRenderer {
    /// Create a renderer; `views_dir` is the directory `include` loads from
    pub fn new(views_dir: Option<PathBuf>) -> Self {
        Self {
            views_dir,
            limits: RenderLimits::default(),
            errors: Vec::new(),
            include_depth: 0,
        }
    }

    /// Override the resolution bounds
    pub fn with_limits(mut self, limits: RenderLimits) -> Self {
        self.limits = limits;
        self
    }

    /// Resolve all markers in `markup` to a fixed point
    ///
    /// Marker failures do not abort the run; they accumulate and the markers
    /// render as empty output. Only exceeding the pass limit fails the call.
    pub fn run(
        &mut self,
        markup: &str,
        ctx: &mut DataContext,
    ) -> Result<String, PipelineError> {
        let mut current = markup.to_string();

        for _ in 0..self.limits.max_passes {
            let markers = scan(&current);
            if markers.is_empty() {
                return Ok(current);
            }

            // Evaluate in document order so later markers see earlier
            // declarations, splicing per span position
            let mut resolved = String::with_capacity(current.len());
            let mut cursor = 0;
            for marker in &markers {
                resolved.push_str(&current[cursor..marker.span.start]);
                resolved.push_str(&self.resolve_marker(&marker.raw, ctx));
                cursor = marker.span.end;
            }
            resolved.push_str(&current[cursor..]);
            current = resolved;
        }

        Err(PipelineError::DidNotConverge {
            passes: self.limits.max_passes,
        })
    }

    /// Errors accumulated so far, in document order
    pub fn errors(&self) -> &[RenderError] {
        &self.errors
    }

    /// Drain the accumulated errors
    pub fn take_errors(&mut self) -> Vec<RenderError> {
        std::mem::take(&mut self.errors)
    }

    /// Parse and evaluate one marker; failures yield empty output
    fn resolve_marker(&mut self, raw: &str, ctx: &mut DataContext) -> String {
        let parsed = match expr::parse(raw) {
            Ok(marker) => marker,
            Err(parse_errors) => {
                for cause in parse_errors {
                    self.errors.push(RenderError {
                        expression: raw.to_string(),
                        cause: EvalError::Parse(cause),
                    });
                }
                return String::new();
            }
        };

        match expr::eval_marker(&parsed, ctx, self) {
            Ok(value) => value.display_text().unwrap_or_default(),
            Err(cause) => {
                self.errors.push(RenderError {
                    expression: raw.to_string(),
                    cause,
                });
                String::new()
            }
        }
    }
}

impl EvalHost for TemplateRenderer {
    /// Load `<views>/<view>.html` and render it with the same context
    ///
    /// A missing views directory or view file is non-fatal: it logs a
    /// warning and yields null, which renders as empty output.
    fn include(&mut self, view: &str, ctx: &mut DataContext) -> Result<Value, EvalError> {
        let Some(dir) = self.views_dir.clone() else {
            tracing::warn!(view, "include skipped: no views directory configured");
            return Ok(Value::Null);
        };

        let path = dir.join(format!("{view}.html"));
        let content = match std::fs::read_to_string(&path) {
            Ok(content) => normalize_newlines(&content),
            Err(err) => {
                tracing::warn!(view, path = %path.display(), %err, "included view not found");
                return Ok(Value::Null);
            }
        };

        if self.include_depth >= self.limits.max_include_depth {
            return Err(EvalError::RecursionLimit {
                message: format!(
                    "include of '{}' exceeds maximum depth {}",
                    view, self.limits.max_include_depth
                ),
            });
        }

        self.include_depth += 1;
        let result = self.run(&content, ctx);
        self.include_depth -= 1;

        match result {
            Ok(rendered) => Ok(Value::String(rendered)),
            Err(PipelineError::DidNotConverge { passes }) => Err(EvalError::RecursionLimit {
                message: format!(
                    "included view '{}' did not converge after {} passes",
                    view, passes
                ),
            }),
            Err(other) => Err(EvalError::RecursionLimit {
                message: format!("included view '{}' failed: {}", view, other),
            }),
        }
    }
}
