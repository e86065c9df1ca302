//! Desktop platform implementation.

use std::time::Duration;

use rand::rngs::ThreadRng;
use tracing_error::ErrorLayer;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

use crate::error::PlatformError;
use crate::formatter::FrameFormatter;

/// Filter used when `RUST_LOG` is unset or invalid.
const DEFAULT_FILTER: &str = "info";

/// Sleeps for the rest of a frame; precise while focused, cheap otherwise.
pub fn sleep(duration: Duration, focused: bool) {
    if focused {
        spin_sleep::sleep(duration);
    } else {
        std::thread::sleep(duration);
    }
}

/// Installs the global tracing subscriber.
///
/// The filter comes from `RUST_LOG` (e.g. `RUST_LOG=heks=trace`), defaulting to `info`.
///
/// # Errors
///
/// Returns `PlatformError::LoggingInit` if a global subscriber is already set.
pub fn init_logging() -> Result<(), PlatformError> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().event_format(FrameFormatter))
        .with(ErrorLayer::default())
        .try_init()
        .map_err(|e| PlatformError::LoggingInit(e.to_string()))
}

pub fn rng() -> ThreadRng {
    rand::rng()
}
