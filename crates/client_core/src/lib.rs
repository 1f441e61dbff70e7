use std::sync::Arc;

use anyhow::Result;
use tracing::info;

pub mod backend;
pub mod controller;
pub mod error;
pub mod session;
pub mod settings;
pub mod simulated;
pub mod todo;
pub mod transport;
pub mod typewriter;

pub use backend::{AuthBackend, AuthGrant};
pub use controller::{IntoOutcome, SessionController};
pub use error::AuthError;
pub use session::{Session, SessionPhase};
pub use settings::{load_settings, ClientSettings};
pub use simulated::{SimulatedAuthBackend, SimulatedDelays};
pub use todo::{NewTodo, TodoError, TodoFilter, TodoList};
pub use transport::HttpAuthBackend;
pub use typewriter::{Frame, Typewriter, TypewriterTimings};

/// Picks the HTTP backend when a server url is configured, the simulated one
/// otherwise.
pub fn backend_from_settings(settings: &ClientSettings) -> Result<Arc<dyn AuthBackend>> {
    match settings.server_url.as_deref() {
        Some(url) => {
            info!(%url, "using http auth backend");
            Ok(Arc::new(HttpAuthBackend::with_timeout(
                url,
                settings.request_timeout(),
            )?))
        }
        None => {
            info!("using simulated auth backend");
            Ok(Arc::new(SimulatedAuthBackend::new(
                SimulatedDelays::from(&settings.delays),
            )))
        }
    }
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
