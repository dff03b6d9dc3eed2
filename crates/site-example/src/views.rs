//! The example's inline templates.
//!
//! A real deployment points `templates` in the config at a directory
//! instead; inline sources keep the example self-contained.

use anyhow::Context;
use trellis::ViewRenderer;

/// Builds the view renderer with the site's templates registered.
pub fn build_views() -> anyhow::Result<ViewRenderer> {
    let mut view = ViewRenderer::new();
    for (name, source) in [
        (
            "home",
            "<html><head><title>{{ page.title }}</title></head>\
             <body><h1>{{ headline }}</h1></body></html>",
        ),
        (
            "demo",
            "<html><head><title>{{ page.title }}</title></head><body>\
             {% for b in blocks %}<section class=\"{{ b.kind }}\">{{ b.data.text }}</section>{% endfor %}\
             </body></html>",
        ),
        (
            "page",
            "<html><head><title>{{ page.title }}</title></head>\
             <body><article>{{ slug }}</article></body></html>",
        ),
        (
            "error",
            "<html><head><title>{{ page.title }}</title></head>\
             <body><h1>404</h1><p>{{ attempted }}</p></body></html>",
        ),
    ] {
        view.add_template(name, source)
            .with_context(|| format!("template '{name}' failed to register"))?;
    }
    Ok(view)
}
