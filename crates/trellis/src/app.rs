//! Central application runtime.
//!
//! [`App`] owns the full request lifecycle: it registers extensions
//! exactly once, applies security headers, asks the router for a match,
//! threads the middleware pipeline, dispatches to the controller action,
//! normalizes the returned [`Outcome`] into a transport response, and
//! fires the lifecycle hooks along the way.
//!
//! # Single-Threaded Design
//!
//! One request is one synchronous pass; the app, its registries, and the
//! controllers are not shared across threads. Shared structures use `Rc`
//! with interior mutability, and the extension-registration latch - not
//! locking - enforces "register once, serially, before serving". A
//! long-running server builds one `App` per request from shared immutable
//! configuration.

use std::any::Any;
use std::collections::HashMap;
use std::rc::Rc;

use serde_json::{json, Value};

use trellis_core::{
    CapabilityError, CapabilityRegistry, DispatchError, MatchResult, Middleware, Outcome,
    PageContext, PathParams, PermissionPolicy, Pipeline, Renderer, Request, RequestContext,
    Response, ResponseSink, RouteDescriptor, RouteMatch, RouteTarget, Router,
};

use crate::config::AppConfig;
use crate::controller::{Controller, ControllerFactory, RequestCx};
use crate::extension::{Component, Plugin};
use crate::logging::{LogLevel, Logger, NullLogger};
use crate::security::security_headers;

/// Central framework runtime.
pub struct App {
    config: AppConfig,
    router: Router,
    pipeline: Pipeline,
    hooks: Rc<trellis_core::HookRegistry>,
    capabilities: Rc<CapabilityRegistry>,
    permission_resolver: Option<Rc<dyn PermissionPolicy>>,
    services: HashMap<String, Rc<dyn Any>>,
    controllers: HashMap<String, ControllerFactory>,
    components: Vec<Rc<dyn Component>>,
    plugins: Vec<Rc<dyn Plugin>>,
    extensions_registered: bool,
}

impl App {
    /// Creates an application from merged configuration.
    pub fn new(config: AppConfig) -> Self {
        let router = Router::new().with_base_path(config.base_path.clone());
        Self {
            config,
            router,
            pipeline: Pipeline::new(),
            hooks: Rc::new(trellis_core::HookRegistry::new()),
            capabilities: Rc::new(CapabilityRegistry::new()),
            permission_resolver: None,
            services: HashMap::new(),
            controllers: HashMap::new(),
            components: Vec::new(),
            plugins: Vec::new(),
            extensions_registered: false,
        }
    }

    // =========================================================================
    // Extensions
    // =========================================================================

    /// Adds a component. Registration order is execution order.
    pub fn add_component(&mut self, component: impl Component + 'static) -> &mut Self {
        self.components.push(Rc::new(component));
        self
    }

    /// Adds a plugin. Registration order is execution order.
    pub fn add_plugin(&mut self, plugin: impl Plugin + 'static) -> &mut Self {
        self.plugins.push(Rc::new(plugin));
        self
    }

    /// Runs the extension registration phase.
    ///
    /// Order: components first, then plugins, then the `components.ready`
    /// action fires. Idempotent - a second call is a no-op, guarded by a
    /// latch, so routes and hook subscriptions are never duplicated.
    pub fn register_extensions(&mut self) -> Result<(), DispatchError> {
        if self.extensions_registered {
            return Ok(());
        }
        self.extensions_registered = true;

        self.logger().log(
            LogLevel::DEBUG,
            "core",
            "App",
            "Registering extensions",
            &json!({
                "components": self.components.len(),
                "plugins": self.plugins.len(),
            }),
        );

        let components = self.components.clone();
        for component in &components {
            component.register(self)?;
        }

        let plugins = self.plugins.clone();
        let hooks = self.hooks.clone();
        for plugin in &plugins {
            plugin.register(&hooks, self);
        }

        self.hooks.do_action(
            "components.ready",
            &json!({
                "components": components.len(),
                "plugins": plugins.len(),
            }),
        )?;

        Ok(())
    }

    // =========================================================================
    // Capabilities
    // =========================================================================

    /// Registers a capability for a provider.
    ///
    /// Fails fast on duplicates; the first provider is never overwritten.
    pub fn register_capability(&self, name: &str, provider: &str) -> Result<(), DispatchError> {
        self.capabilities.register(name, provider)?;
        Ok(())
    }

    /// Existence-only capability check.
    pub fn has_capability(&self, name: &str) -> bool {
        self.capabilities.has(name)
    }

    /// Shared handle to the capability registry, e.g. for the capability
    /// guard.
    pub fn capability_registry(&self) -> Rc<CapabilityRegistry> {
        self.capabilities.clone()
    }

    /// Whether a capability exists *and* is currently allowed.
    ///
    /// Unregistered capabilities are never allowed. Registered ones are
    /// allowed unless a configured permission resolver denies them - the
    /// default is fail open.
    pub fn can(&self, capability: &str) -> bool {
        if !self.capabilities.has(capability) {
            return false;
        }
        match &self.permission_resolver {
            Some(resolver) => resolver.allows(capability),
            None => true,
        }
    }

    /// Fails with [`CapabilityError::NotAllowed`] unless [`App::can`]
    /// says yes.
    pub fn require_capability(&self, capability: &str) -> Result<(), DispatchError> {
        if !self.can(capability) {
            return Err(CapabilityError::NotAllowed(capability.to_string()).into());
        }
        Ok(())
    }

    /// Configures the permission policy consulted by [`App::can`].
    pub fn set_permission_resolver(&mut self, resolver: Rc<dyn PermissionPolicy>) {
        self.permission_resolver = Some(resolver);
    }

    // =========================================================================
    // Services
    // =========================================================================

    /// Stores a service under a string id, replacing any previous one.
    ///
    /// Trait-object services are stored as `Rc<dyn Trait>` so they can be
    /// retrieved without knowing the concrete type:
    ///
    /// ```rust,ignore
    /// app.set_service("renderer", Rc::new(view) as Rc<dyn Renderer>);
    /// ```
    pub fn set_service<T: 'static>(&mut self, id: &str, service: T) {
        self.services.insert(id.to_string(), Rc::new(service));
    }

    /// Looks up a service by id and type.
    ///
    /// # Errors
    ///
    /// [`DispatchError::ServiceNotFound`] when the id is unknown,
    /// [`DispatchError::ServiceType`] when the stored instance is not a
    /// `T`.
    pub fn get_service<T: 'static>(&self, id: &str) -> Result<Rc<T>, DispatchError> {
        let service = self
            .services
            .get(id)
            .ok_or_else(|| DispatchError::ServiceNotFound(id.to_string()))?;
        service
            .clone()
            .downcast::<T>()
            .map_err(|_| DispatchError::ServiceType {
                id: id.to_string(),
                expected: std::any::type_name::<T>(),
            })
    }

    /// Whether a service id is registered.
    pub fn has_service(&self, id: &str) -> bool {
        self.services.contains_key(id)
    }

    /// The configured logger, or a [`NullLogger`] when none is set up.
    ///
    /// Logging absence never takes the core down.
    pub fn logger(&self) -> Rc<dyn Logger> {
        self.get_service::<Rc<dyn Logger>>("logger")
            .map(|service| (*service).clone())
            .unwrap_or_else(|_| Rc::new(NullLogger))
    }

    /// The renderer service.
    pub fn renderer(&self) -> Result<Rc<dyn Renderer>, DispatchError> {
        self.get_service::<Rc<dyn Renderer>>("renderer")
            .map(|service| (*service).clone())
    }

    // =========================================================================
    // Controllers / routes / middleware / hooks
    // =========================================================================

    /// Registers a controller factory under an id routes refer to.
    ///
    /// # Errors
    ///
    /// [`DispatchError::DuplicateController`] when the id is taken -
    /// controller wiring is explicit and collisions are bugs.
    pub fn register_controller<F>(&mut self, id: &str, factory: F) -> Result<(), DispatchError>
    where
        F: Fn() -> Box<dyn Controller> + 'static,
    {
        if self.controllers.contains_key(id) {
            return Err(DispatchError::DuplicateController(id.to_string()));
        }
        self.controllers.insert(id.to_string(), Rc::new(factory));
        Ok(())
    }

    /// The route table.
    pub fn router(&self) -> &Router {
        &self.router
    }

    /// Mutable route table, for components registering routes.
    pub fn router_mut(&mut self) -> &mut Router {
        &mut self.router
    }

    /// Appends a middleware to the guard pipeline.
    pub fn add_middleware(&mut self, middleware: impl Middleware + 'static) {
        self.pipeline.add(middleware);
    }

    /// Number of registered middleware.
    pub fn middleware_count(&self) -> usize {
        self.pipeline.len()
    }

    /// The hook registry.
    pub fn hooks(&self) -> &trellis_core::HookRegistry {
        &self.hooks
    }

    /// The application configuration.
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Resolves a dotted key inside the free-form config map.
    pub fn config_value(&self, key: &str) -> Option<&Value> {
        self.config.custom_value(key)
    }

    // =========================================================================
    // Request lifecycle
    // =========================================================================

    /// Serves one request: the full lifecycle pass.
    ///
    /// Expected conditions (no route, guard rejections) produce responses
    /// through the sink. Programmer errors - unregistered controller,
    /// unknown action, missing required capability, broken hook callback -
    /// propagate as [`DispatchError`] for the front controller to turn
    /// into a generic 5xx.
    pub fn run(
        &mut self,
        request: Request,
        sink: &mut dyn ResponseSink,
    ) -> Result<(), DispatchError> {
        self.logger()
            .log(LogLevel::INFO, "core", "App", "App run start", &Value::Null);

        self.register_extensions()?;

        let headers = security_headers(&self.config);
        let matched = self.router.match_request(request.method(), request.path());

        match matched {
            MatchResult::Fallback { status } => {
                self.handle_fallback(status, request, sink, &headers)
            }
            MatchResult::Route(route_match) => {
                self.handle_route(route_match, request, sink, &headers)
            }
        }
    }

    /// Dispatches a matched route through the pipeline to its controller.
    fn handle_route(
        &self,
        route_match: RouteMatch,
        request: Request,
        sink: &mut dyn ResponseSink,
        headers: &[(String, String)],
    ) -> Result<(), DispatchError> {
        let RouteMatch { route, params } = route_match;

        let factory = self
            .controllers
            .get(&route.controller)
            .ok_or_else(|| DispatchError::ControllerNotFound(route.controller.clone()))?
            .clone();
        let mut controller = factory();
        let action = route.action.clone();

        let mut cx = RequestContext::new(request, route, params);
        let mut page = PageContext::new();

        let outcome = {
            let mut terminal = |cx: &mut RequestContext| {
                let mut rcx = RequestCx::new(self, cx, &mut page);
                controller.handle(&action, &mut rcx)
            };
            self.pipeline.handle(&mut cx, &mut terminal)?
        };

        match outcome {
            Outcome::AlreadySent => self.flush_deferred(&mut cx, sink, headers),
            other => self.send_outcome(other, None, sink, headers),
        }
    }

    /// Handles a router miss via the configured fallback, or a bare
    /// status response when none is configured.
    fn handle_fallback(
        &self,
        status: u16,
        request: Request,
        sink: &mut dyn ResponseSink,
        headers: &[(String, String)],
    ) -> Result<(), DispatchError> {
        let Some(spec) = self.config.fallbacks.get(&status).cloned() else {
            let bare = Response::status_only(status);
            let body = format!("{} {}", status, bare.reason());
            return self.finish(Response::html(body, status), sink, headers);
        };

        let factory = self
            .controllers
            .get(&spec.controller)
            .ok_or_else(|| DispatchError::ControllerNotFound(spec.controller.clone()))?
            .clone();
        let mut controller = factory();

        // Fallbacks bypass routing and middleware: synthesize a descriptor
        // and invoke the action with empty params.
        let route = RouteDescriptor::new(
            request.method(),
            "/",
            RouteTarget::new(spec.controller.clone(), spec.action.clone()),
        );
        let mut cx = RequestContext::new(request, route, PathParams::new());
        let mut page = PageContext::new();

        let outcome = {
            let mut rcx = RequestCx::new(self, &mut cx, &mut page);
            controller.handle(&spec.action, &mut rcx)?
        };

        match outcome {
            Outcome::AlreadySent => self.flush_deferred(&mut cx, sink, headers),
            other => self.send_outcome(other, Some(spec.status), sink, headers),
        }
    }

    /// Normalizes an outcome into a transport response and sends it.
    ///
    /// The `app.ready` action fires first, with the status and outcome
    /// kind as payload, so subscribers observe the result before any
    /// transport write happens.
    fn send_outcome(
        &self,
        outcome: Outcome,
        status_override: Option<u16>,
        sink: &mut dyn ResponseSink,
        headers: &[(String, String)],
    ) -> Result<(), DispatchError> {
        let status = status_override.unwrap_or(match &outcome {
            Outcome::Html { status, .. } | Outcome::Json { status, .. } => *status,
            Outcome::AlreadySent => 200,
        });

        self.hooks.do_action(
            "app.ready",
            &json!({"status": status, "response": outcome.kind()}),
        )?;

        let response = match outcome {
            Outcome::Html { body, .. } => Response::html(body, status),
            Outcome::Json { data, .. } => Response::json(&data, status)?,
            Outcome::AlreadySent => return Ok(()),
        };

        self.finish(response, sink, headers)
    }

    /// Flushes a terminal response a controller or guard queued, if any.
    fn flush_deferred(
        &self,
        cx: &mut RequestContext,
        sink: &mut dyn ResponseSink,
        headers: &[(String, String)],
    ) -> Result<(), DispatchError> {
        if let Some(response) = cx.take_deferred() {
            self.finish(response, sink, headers)?;
        }
        Ok(())
    }

    /// Attaches the security headers and writes the response.
    fn finish(
        &self,
        mut response: Response,
        sink: &mut dyn ResponseSink,
        headers: &[(String, String)],
    ) -> Result<(), DispatchError> {
        for (name, value) in headers {
            response = response.with_header(name.clone(), value.clone());
        }
        sink.send(response)?;
        Ok(())
    }
}

impl std::fmt::Debug for App {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("App")
            .field("env", &self.config.env)
            .field("routes", &self.router.routes().count())
            .field("middleware", &self.pipeline.len())
            .field("services", &self.services.len())
            .field("components", &self.components.len())
            .field("plugins", &self.plugins.len())
            .field("extensions_registered", &self.extensions_registered)
            .finish()
    }
}
