//! Application bootstrap.
//!
//! Wires core services and the guard stack into a fresh [`App`]. The
//! front controller calls [`Bootstrap::boot`] once; a failure here means
//! the process must answer 503 and stop before entering the request
//! lifecycle - there is no partial startup.
//!
//! Bootstrap wires. It contains no business logic, renders nothing, and
//! handles no requests.

use std::path::PathBuf;
use std::rc::Rc;
use std::time::Duration;

use thiserror::Error;

use trellis_core::{
    BurstGuard, CapabilityGuard, InvalidMethod, Method, MethodWhitelist, PayloadLimit,
    RateLimitGuard, Renderer,
};

use crate::app::App;
use crate::config::{AppConfig, ConfigError, LoggingConfig};
use crate::logging::{FileTarget, LogLevel, Logger, MaskLogger, StderrTarget};
use crate::view::ViewRenderer;

/// Errors that abort startup.
#[derive(Debug, Error)]
pub enum BootstrapError {
    /// Configuration could not be loaded.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The guard configuration names an unknown HTTP method.
    #[error(transparent)]
    GuardMethod(#[from] InvalidMethod),

    /// The configured log target could not be opened.
    #[error("cannot open log target: {0}")]
    LogTarget(#[from] std::io::Error),
}

/// One-shot application wiring.
pub struct Bootstrap;

impl Bootstrap {
    /// Builds a fully wired application from merged configuration.
    ///
    /// Wires, in order: the logger (when enabled), the view renderer
    /// (from the configured template directory, or empty), and the guard
    /// middleware stack. Components and plugins are added by the caller
    /// afterwards - explicitly, never discovered.
    pub fn boot(config: AppConfig) -> Result<App, BootstrapError> {
        let mut app = App::new(config);

        if app.config().logging.enabled {
            let logging = app.config().logging.clone();
            let logger = build_logger(&logging)?;
            app.set_service("logger", logger);
        }

        let view = match &app.config().templates {
            Some(dir) => ViewRenderer::from_dir(dir),
            None => ViewRenderer::new(),
        };
        app.set_service("renderer", Rc::new(view) as Rc<dyn Renderer>);

        let guards = app.config().guards.clone();
        let mut methods = Vec::with_capacity(guards.methods.len());
        for name in &guards.methods {
            methods.push(name.parse::<Method>()?);
        }

        app.add_middleware(RateLimitGuard::new(
            guards.rate_limit,
            Duration::from_secs(guards.rate_window_secs),
        ));
        app.add_middleware(MethodWhitelist::new(methods));
        app.add_middleware(PayloadLimit::new(guards.max_payload_bytes));
        app.add_middleware(BurstGuard::new(
            guards.burst_limit,
            Duration::from_secs(guards.burst_window_secs),
        ));
        app.add_middleware(CapabilityGuard::new(app.capability_registry()));

        Ok(app)
    }
}

fn build_logger(config: &LoggingConfig) -> Result<Rc<dyn Logger>, BootstrapError> {
    let mask = LogLevel::mask_from_names(&config.mask);
    let logger = MaskLogger::new(mask);

    let logger = match config.target.as_str() {
        "file" => {
            let path = config
                .file
                .clone()
                .unwrap_or_else(|| PathBuf::from("var/logs/app.log"));
            logger.add_target(FileTarget::open(path)?)
        }
        _ => logger.add_target(StderrTarget),
    };

    Ok(Rc::new(logger))
}
