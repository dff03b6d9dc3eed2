//! The pages component: routes, controllers, and the capability they
//! need. Everything is registered explicitly - this file is the whole
//! wiring story for the example site's frontend.

use serde_json::json;

use trellis::{App, Component, Controller, Outcome, RequestCx};
use trellis_core::{BlockSpec, DispatchError, Method, RouteTarget};

/// Registers the example site's routes, controllers, and capability.
pub struct PagesComponent;

impl Component for PagesComponent {
    fn register(&self, app: &mut App) -> Result<(), DispatchError> {
        app.register_capability("pages.render", "PagesComponent")?;

        let router = app.router_mut();
        router.map(Method::Get, "/", RouteTarget::new("home", "index"))?;
        router.map(
            Method::Get,
            "/demo",
            RouteTarget::new("demo", "index").capability("pages.render"),
        )?;
        router.map(
            Method::Get,
            "/api/status",
            RouteTarget::new("demo", "status").named("api.status"),
        )?;
        router.map(Method::Get, "/pages/:slug", RouteTarget::new("pages", "show"))?;
        // Catch-all resolve - must stay last.
        router.map(
            Method::Get,
            "/*slug",
            RouteTarget::new("pages", "resolve").named("pages.resolve"),
        )?;

        app.register_controller("home", || Box::new(HomeController))?;
        app.register_controller("demo", || Box::new(DemoController))?;
        app.register_controller("pages", || Box::new(PagesController))?;
        app.register_controller("error", || Box::new(ErrorController))?;

        Ok(())
    }

    fn capabilities(&self) -> Vec<String> {
        vec!["pages.render".to_string()]
    }
}

/// Landing page.
pub struct HomeController;

impl Controller for HomeController {
    fn handle(&mut self, action: &str, cx: &mut RequestCx<'_>) -> Result<Outcome, DispatchError> {
        match action {
            "index" => {
                cx.page()
                    .with_globals()
                    .with_meta("Home", Some("Explicitly wired example site".to_string()))
                    .add_style("home")
                    .with("headline", json!("It works"));
                cx.render("home")
            }
            _ => unknown("home", action),
        }
    }
}

/// Demo page exercising blocks plus a JSON action.
pub struct DemoController;

impl Controller for DemoController {
    fn handle(&mut self, action: &str, cx: &mut RequestCx<'_>) -> Result<Outcome, DispatchError> {
        match action {
            "index" => {
                cx.require_capability("pages.render")?;
                cx.page()
                    .with_globals()
                    .with_meta("Demo", None)
                    .with_blocks(vec![
                        BlockSpec::new("hero", json!({"text": "Block demo"})),
                        BlockSpec::new("text", json!({"text": "Rendered in order."})),
                    ]);
                cx.render("demo")
            }
            "status" => Ok(cx.json(
                json!({
                    "ok": true,
                    "env": cx.config().env,
                }),
                200,
            )),
            _ => unknown("demo", action),
        }
    }
}

/// Slug pages and the catch-all resolver.
pub struct PagesController;

impl Controller for PagesController {
    fn handle(&mut self, action: &str, cx: &mut RequestCx<'_>) -> Result<Outcome, DispatchError> {
        match action {
            "show" => {
                let slug = cx.param("slug").unwrap_or_default().to_string();
                cx.page()
                    .with_globals()
                    .with_meta(slug.clone(), None)
                    .with("slug", json!(slug));
                cx.render("page")
            }
            "resolve" => {
                // Legacy paths redirect home; everything else is a 404
                // rendered by this controller, not a routing error.
                let slug = cx.param("slug").unwrap_or_default().to_string();
                if slug == "old-home" {
                    return Ok(cx.redirect("/", 301));
                }
                cx.page()
                    .with_status(404)
                    .with_meta("Not Found", None)
                    .with("attempted", json!(slug));
                cx.render("error")
            }
            _ => unknown("pages", action),
        }
    }
}

/// Fallback controller for router misses (configured under `fallbacks`).
pub struct ErrorController;

impl Controller for ErrorController {
    fn handle(&mut self, action: &str, _cx: &mut RequestCx<'_>) -> Result<Outcome, DispatchError> {
        match action {
            "error404" => Ok(Outcome::html(
                "<html><body><h1>404 Not Found</h1></body></html>",
            )
            .with_status(404)),
            _ => unknown("error", action),
        }
    }
}

fn unknown(controller: &str, action: &str) -> Result<Outcome, DispatchError> {
    Err(DispatchError::UnknownAction {
        controller: controller.to_string(),
        action: action.to_string(),
    })
}
