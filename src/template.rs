use std::fmt::Display;

use handlebars::Handlebars;
use serde::{Serialize, ser::SerializeStruct};

/// Name under which the compiled template is registered.
const JOB_TEMPLATE: &str = "job";

/// Parameters bound into the template for a single job.
///
/// Visible to the template source as `{{Parallel}}`, `{{Repeat}}` and
/// `{{JobNumber}}`. `{{Count}}` is the same value as `{{Repeat}}`, the name
/// older templates use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct JobContext {
    pub parallelism: usize,
    pub repeat: usize,
    pub job_index: usize,
}

impl Serialize for JobContext {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut bindings = serializer.serialize_struct("JobContext", 4)?;
        bindings.serialize_field("Parallel", &self.parallelism)?;
        bindings.serialize_field("Repeat", &self.repeat)?;
        bindings.serialize_field("Count", &self.repeat)?;
        bindings.serialize_field("JobNumber", &self.job_index)?;
        bindings.end()
    }
}

/// Command text produced by rendering the template for one job.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RenderedCommand(String);

impl RenderedCommand {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for RenderedCommand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// A template compiled once and shared read-only by every job.
///
/// Rendering runs in strict mode, so referencing a binding that
/// [`JobContext`] does not provide is a [`RenderError`] instead of an empty
/// string. Output is never HTML-escaped.
#[derive(Debug)]
pub struct Renderer {
    handlebars: Handlebars<'static>,
}

impl Renderer {
    /// Compiles `source`. `name` only shows up in error messages.
    pub fn compile(name: &str, source: &str) -> Result<Self, CompileError> {
        let mut handlebars = Handlebars::new();
        handlebars.set_strict_mode(true);
        handlebars.register_escape_fn(handlebars::no_escape);
        handlebars
            .register_template_string(JOB_TEMPLATE, source)
            .map_err(|source| CompileError {
                name: name.to_string(),
                source,
            })?;
        Ok(Self { handlebars })
    }

    pub fn render(&self, context: &JobContext) -> Result<RenderedCommand, RenderError> {
        let rendered = self.handlebars.render(JOB_TEMPLATE, context)?;
        Ok(RenderedCommand(rendered))
    }
}

#[derive(Debug, thiserror::Error)]
#[error("Failed to compile template '{name}': {source}")]
pub struct CompileError {
    name: String,
    #[source]
    source: handlebars::TemplateError,
}

#[derive(Debug, thiserror::Error)]
#[error("Failed to render template: {0}")]
pub struct RenderError(#[from] handlebars::RenderError);
