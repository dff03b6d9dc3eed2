//! Per-request page state.
//!
//! [`PageContext`] is the mutable bag a controller fills while handling a
//! request: HTTP status, meta data, view data, asset handles, and block
//! configuration. The renderer consumes it read-only afterwards. It holds
//! no rendering logic and no business logic, and it is instantiated fresh
//! for every request inside the request entry point - never stored on the
//! application.

use serde_json::Value;

/// Declarative content block, interpreted by the block renderer via a
/// type-to-template lookup.
///
/// An unknown `kind` is a render-time error, not a construction-time one.
#[derive(Debug, Clone, PartialEq)]
pub struct BlockSpec {
    /// Block type, e.g. "hero" or "text-columns".
    pub kind: String,
    /// Free-form block data handed to the template.
    pub data: Value,
}

impl BlockSpec {
    /// Creates a block spec.
    pub fn new(kind: impl Into<String>, data: Value) -> Self {
        Self {
            kind: kind.into(),
            data,
        }
    }
}

/// Mutable page state: status, meta, view data, assets, blocks.
///
/// Built by the controller through chained mutators, read by the renderer.
/// No further mutation happens after the controller returns.
#[derive(Debug, Default)]
pub struct PageContext {
    status: Option<u16>,
    title: String,
    description: Option<String>,
    view_data: Vec<(String, Value)>,
    styles: Vec<String>,
    scripts: Vec<String>,
    blocks: Vec<BlockSpec>,
}

impl PageContext {
    /// Creates an empty page context (status 200, no meta, no assets).
    pub fn new() -> Self {
        Self::default()
    }

    // -------------------------------------------------
    // Status / meta
    // -------------------------------------------------

    /// Sets the HTTP status code of the response.
    pub fn with_status(&mut self, status: u16) -> &mut Self {
        self.status = Some(status);
        self
    }

    /// The HTTP status, defaulting to 200.
    pub fn status(&self) -> u16 {
        self.status.unwrap_or(200)
    }

    /// Sets title and meta description.
    pub fn with_meta(&mut self, title: impl Into<String>, description: Option<String>) -> &mut Self {
        self.title = title.into();
        self.description = description;
        self
    }

    /// The page title.
    pub fn title(&self) -> &str {
        &self.title
    }

    /// The meta description, if set.
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Opt-in for the global base assets.
    ///
    /// No auto-load: layouts that want the base stack ask for it.
    pub fn with_globals(&mut self) -> &mut Self {
        self.add_style("reset")
            .add_style("base")
            .add_style("typography")
            .add_style("grid")
            .add_style("layout")
            .add_style("helpers")
            .add_script("core")
    }

    // -------------------------------------------------
    // Assets (handles, not URLs)
    // -------------------------------------------------

    /// Adds a style handle. Insertion order is render order; duplicates
    /// are ignored.
    pub fn add_style(&mut self, handle: impl Into<String>) -> &mut Self {
        let handle = handle.into();
        if !self.styles.contains(&handle) {
            self.styles.push(handle);
        }
        self
    }

    /// Adds a script handle. Same ordering and de-duplication rules as
    /// styles.
    pub fn add_script(&mut self, handle: impl Into<String>) -> &mut Self {
        let handle = handle.into();
        if !self.scripts.contains(&handle) {
            self.scripts.push(handle);
        }
        self
    }

    /// Style handles in insertion order.
    pub fn styles(&self) -> &[String] {
        &self.styles
    }

    /// Script handles in insertion order.
    pub fn scripts(&self) -> &[String] {
        &self.scripts
    }

    // -------------------------------------------------
    // View data
    // -------------------------------------------------

    /// Sets a view datum. Re-using a key replaces the value but keeps the
    /// original position.
    pub fn with(&mut self, key: impl Into<String>, value: Value) -> &mut Self {
        let key = key.into();
        match self.view_data.iter_mut().find(|(k, _)| *k == key) {
            Some((_, existing)) => *existing = value,
            None => self.view_data.push((key, value)),
        }
        self
    }

    /// View data in insertion order.
    pub fn view_data(&self) -> &[(String, Value)] {
        &self.view_data
    }

    // -------------------------------------------------
    // Blocks
    // -------------------------------------------------

    /// Replaces the block list.
    pub fn with_blocks(&mut self, blocks: Vec<BlockSpec>) -> &mut Self {
        self.blocks = blocks;
        self
    }

    /// Appends a single block.
    pub fn add_block(&mut self, block: BlockSpec) -> &mut Self {
        self.blocks.push(block);
        self
    }

    /// Blocks in declaration order.
    pub fn blocks(&self) -> &[BlockSpec] {
        &self.blocks
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_defaults() {
        let page = PageContext::new();
        assert_eq!(page.status(), 200);
        assert_eq!(page.title(), "");
        assert!(page.description().is_none());
        assert!(page.styles().is_empty());
        assert!(page.blocks().is_empty());
    }

    #[test]
    fn test_chained_mutators() {
        let mut page = PageContext::new();
        page.with_status(404)
            .with_meta("Not Found", Some("nothing here".to_string()))
            .add_style("base")
            .add_script("core")
            .with("attempted", json!("/missing"));

        assert_eq!(page.status(), 404);
        assert_eq!(page.title(), "Not Found");
        assert_eq!(page.description(), Some("nothing here"));
        assert_eq!(page.styles(), ["base".to_string()]);
        assert_eq!(page.scripts(), ["core".to_string()]);
        assert_eq!(page.view_data()[0], ("attempted".to_string(), json!("/missing")));
    }

    #[test]
    fn test_style_handles_deduplicate_keeping_first_position() {
        let mut page = PageContext::new();
        page.add_style("base").add_style("brand").add_style("base");

        assert_eq!(page.styles(), ["base".to_string(), "brand".to_string()]);
    }

    #[test]
    fn test_with_globals_opts_into_base_stack() {
        let mut page = PageContext::new();
        page.with_globals();

        assert_eq!(
            page.styles(),
            ["reset", "base", "typography", "grid", "layout", "helpers"]
                .map(String::from)
        );
        assert_eq!(page.scripts(), ["core".to_string()]);
    }

    #[test]
    fn test_view_data_replacement_keeps_order() {
        let mut page = PageContext::new();
        page.with("a", json!(1)).with("b", json!(2)).with("a", json!(3));

        assert_eq!(
            page.view_data(),
            [
                ("a".to_string(), json!(3)),
                ("b".to_string(), json!(2)),
            ]
        );
    }

    #[test]
    fn test_blocks_keep_declaration_order() {
        let mut page = PageContext::new();
        page.with_blocks(vec![BlockSpec::new("hero", json!({"h": 1}))]);
        page.add_block(BlockSpec::new("text", json!({"t": "x"})));

        let kinds: Vec<&str> = page.blocks().iter().map(|b| b.kind.as_str()).collect();
        assert_eq!(kinds, vec!["hero", "text"]);
    }
}
