//! Core trace plugin: request observability through hooks only.

use trellis::logging::LogLevel;
use trellis::{App, Plugin};
use trellis_core::HookRegistry;

/// Logs every `app.ready` firing with the response status and kind.
///
/// Activation is explicit - add it in the front controller when you want
/// runtime tracing.
pub struct TracePlugin;

impl Plugin for TracePlugin {
    fn register(&self, hooks: &HookRegistry, app: &App) {
        let logger = app.logger();
        hooks.add_action("app.ready", move |payload| {
            logger.log(
                LogLevel::INFO,
                "plugin",
                "TracePlugin",
                "App ready hook triggered",
                payload,
            );
            Ok(())
        });
    }
}
