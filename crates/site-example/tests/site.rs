//! The example site driven end-to-end through the bootstrap wiring.

use std::rc::Rc;

use site_example::pages::PagesComponent;
use site_example::trace::TracePlugin;
use site_example::views::build_views;
use trellis::{App, AppConfig, Bootstrap, Renderer};
use trellis_core::{Method, Request, Response, ResponseSink};

#[derive(Default)]
struct CaptureSink {
    responses: Vec<Response>,
}

impl ResponseSink for CaptureSink {
    fn send(&mut self, response: Response) -> std::io::Result<()> {
        self.responses.push(response);
        Ok(())
    }
}

fn site() -> App {
    let mut app = Bootstrap::boot(AppConfig::default()).unwrap();
    app.set_service("renderer", Rc::new(build_views().unwrap()) as Rc<dyn Renderer>);
    app.add_component(PagesComponent);
    app.add_plugin(TracePlugin);
    app
}

fn serve(app: &mut App, method: Method, path: &str) -> Response {
    let mut sink = CaptureSink::default();
    let request = Request::builder(method, path).build();
    app.run(request, &mut sink).unwrap();
    assert_eq!(sink.responses.len(), 1);
    sink.responses.remove(0)
}

#[test]
fn home_page_renders() {
    let mut app = site();
    let response = serve(&mut app, Method::Get, "/");

    assert_eq!(response.status, 200);
    let body = String::from_utf8(response.body).unwrap();
    assert!(body.contains("<title>Home</title>"));
    assert!(body.contains("<h1>It works</h1>"));
}

#[test]
fn demo_page_renders_blocks_in_order() {
    let mut app = site();
    let response = serve(&mut app, Method::Get, "/demo");

    assert_eq!(response.status, 200);
    let body = String::from_utf8(response.body).unwrap();
    let hero = body.find("class=\"hero\"").unwrap();
    let text = body.find("class=\"text\"").unwrap();
    assert!(hero < text);
}

#[test]
fn api_status_returns_json() {
    let mut app = site();
    let response = serve(&mut app, Method::Get, "/api/status");

    assert_eq!(response.status, 200);
    let data: serde_json::Value = serde_json::from_slice(&response.body).unwrap();
    assert_eq!(data["ok"], serde_json::json!(true));
    assert_eq!(data["env"], serde_json::json!("prod"));
}

#[test]
fn slug_page_shows_the_slug() {
    let mut app = site();
    let response = serve(&mut app, Method::Get, "/pages/hello-world");

    let body = String::from_utf8(response.body).unwrap();
    assert!(body.contains("<article>hello-world</article>"));
}

#[test]
fn legacy_path_redirects_home() {
    let mut app = site();
    let response = serve(&mut app, Method::Get, "/old-home");

    assert_eq!(response.status, 301);
    assert!(response
        .headers
        .contains(&("Location".to_string(), "/".to_string())));
}

#[test]
fn unknown_slug_renders_the_404_page() {
    let mut app = site();
    // Two segments miss every specific route and land in the catch-all.
    let response = serve(&mut app, Method::Get, "/no/such-page");

    assert_eq!(response.status, 404);
    let body = String::from_utf8(response.body).unwrap();
    assert!(body.contains("no/such-page"));
}

#[test]
fn disallowed_method_is_rejected_by_the_guard_stack() {
    let mut app = site();
    let mut sink = CaptureSink::default();
    let request = Request::builder(Method::Delete, "/").build();
    // No DELETE route exists, so this lands in the fallback branch; the
    // guard stack never runs there, and the router answers 404.
    app.run(request, &mut sink).unwrap();
    assert_eq!(sink.responses[0].status, 404);

    // A DELETE that *does* match a route is stopped by the whitelist.
    let mut app = site();
    app.router_mut()
        .map(
            Method::Delete,
            "/direct",
            trellis_core::RouteTarget::new("home", "index"),
        )
        .unwrap();
    let response = serve(&mut app, Method::Delete, "/direct");
    assert_eq!(response.status, 405);
}

#[test]
fn security_headers_are_attached() {
    let mut app = site();
    let response = serve(&mut app, Method::Get, "/");

    assert!(response
        .headers
        .contains(&("X-Content-Type-Options".to_string(), "nosniff".to_string())));
}
