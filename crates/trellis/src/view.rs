//! MiniJinja-backed view renderer.
//!
//! The default [`Renderer`] implementation. Templates are registered
//! inline by name or loaded from a directory. What a template sees:
//!
//! - every view datum from the page context, at the top level
//! - `page` - status, title, description
//! - `styles` / `scripts` - the asset handle lists, in insertion order
//! - `blocks` - the declarative block list (`kind`, `data`)
//!
//! The renderer merges; it does not invent. Asset handle resolution and
//! block markup are template concerns.

use std::path::Path;

use minijinja::Environment;
use serde_json::{json, Map, Value};

use trellis_core::{PageContext, RenderError, Renderer};

/// Template renderer over a MiniJinja environment.
pub struct ViewRenderer {
    env: Environment<'static>,
}

impl Default for ViewRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl ViewRenderer {
    /// Creates a renderer with no templates.
    pub fn new() -> Self {
        Self {
            env: Environment::new(),
        }
    }

    /// Creates a renderer loading templates from a directory.
    ///
    /// Template names are paths relative to the directory, e.g.
    /// `"pages/detail.html"`.
    pub fn from_dir(dir: impl AsRef<Path>) -> Self {
        let mut env = Environment::new();
        env.set_loader(minijinja::path_loader(dir.as_ref()));
        Self { env }
    }

    /// Registers an inline template under a name.
    pub fn add_template(&mut self, name: &str, source: &str) -> Result<(), RenderError> {
        self.env
            .add_template_owned(name.to_string(), source.to_string())
            .map_err(|err| RenderError::Engine(err.to_string()))
    }

    /// The underlying environment, for custom filters and functions.
    pub fn environment_mut(&mut self) -> &mut Environment<'static> {
        &mut self.env
    }

    fn template_context(page: &PageContext) -> Value {
        let mut root = Map::new();
        for (key, value) in page.view_data() {
            root.insert(key.clone(), value.clone());
        }
        root.insert(
            "page".to_string(),
            json!({
                "status": page.status(),
                "title": page.title(),
                "description": page.description(),
            }),
        );
        root.insert("styles".to_string(), json!(page.styles()));
        root.insert("scripts".to_string(), json!(page.scripts()));
        root.insert(
            "blocks".to_string(),
            Value::Array(
                page.blocks()
                    .iter()
                    .map(|block| json!({"kind": block.kind, "data": block.data}))
                    .collect(),
            ),
        );
        Value::Object(root)
    }
}

impl Renderer for ViewRenderer {
    fn render(&self, template: &str, page: &PageContext) -> Result<String, RenderError> {
        let tmpl = self.env.get_template(template).map_err(|err| {
            if err.kind() == minijinja::ErrorKind::TemplateNotFound {
                RenderError::TemplateNotFound(template.to_string())
            } else {
                RenderError::Engine(err.to_string())
            }
        })?;

        tmpl.render(Self::template_context(page))
            .map_err(|err| RenderError::Engine(err.to_string()))
    }
}
