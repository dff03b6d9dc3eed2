//! Front controller for the example site.
//!
//! Deliberately small, explicit, and deterministic: parse the request
//! from the command line (CGI style), load configuration, boot, wire
//! extensions, run the lifecycle once, write the HTTP response to
//! stdout. No business logic, no routing logic, no rendering logic.

use std::path::PathBuf;
use std::rc::Rc;
use std::str::FromStr;

use anyhow::Context;
use clap::Parser;

use trellis::{AppConfig, Bootstrap, Renderer, Response, ResponseSink};
use trellis_core::{HttpSink, Method, Request};

use site_example::pages::PagesComponent;
use site_example::trace::TracePlugin;
use site_example::views::build_views;

/// Serve a single request through the Trellis lifecycle.
#[derive(Debug, Parser)]
#[command(name = "site", version, about)]
struct Cli {
    /// HTTP method of the request.
    #[arg(long, default_value = "GET")]
    method: String,

    /// Request path, without the query string.
    #[arg(long, default_value = "/")]
    path: String,

    /// Declared Content-Length in bytes.
    #[arg(long, default_value_t = 0)]
    content_length: u64,

    /// Client address, for the rate-limit guards.
    #[arg(long, default_value = "127.0.0.1")]
    remote_addr: String,

    /// Path to the application config file (JSON). A `credentials.json`
    /// next to it is merged over it when present.
    #[arg(long)]
    config: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let method = Method::from_str(&cli.method).context("unsupported request method")?;
    let request = Request::builder(method, cli.path)
        .content_length(cli.content_length)
        .remote_addr(cli.remote_addr)
        .build();

    let config = load_config(cli.config.as_deref())?;

    // A bootstrap failure means no request serving at all: answer 503
    // and stop before the lifecycle, with no partial startup.
    let mut app = match Bootstrap::boot(config) {
        Ok(app) => app,
        Err(err) => {
            eprintln!("bootstrap failed: {err}");
            let mut sink = HttpSink::new(std::io::stdout().lock());
            sink.send(Response::html("503 Service Unavailable", 503))?;
            std::process::exit(1);
        }
    };

    app.set_service("renderer", Rc::new(build_views()?) as Rc<dyn Renderer>);

    // Explicit extension wiring; order is registration order.
    app.add_component(PagesComponent);
    app.add_plugin(TracePlugin);

    let mut sink = HttpSink::new(std::io::stdout().lock());
    app.run(request, &mut sink)
        .context("request lifecycle failed")?;

    Ok(())
}

fn load_config(path: Option<&std::path::Path>) -> anyhow::Result<AppConfig> {
    let Some(path) = path else {
        return Ok(AppConfig::default());
    };
    let overlay = path.with_file_name("credentials.json");
    AppConfig::load_with_overlay(path, overlay).context("cannot load configuration")
}
