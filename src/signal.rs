//! Signal handling for graceful shutdown.
//!
//! Ctrl+C sets a shared `AtomicBool`. The walker checks it between entries
//! and the hashing phases check it between buckets; a file that is already
//! being hashed is always finished.
//!
//! # Usage
//!
//! ```rust,no_run
//! use dupfunnel::signal::install_handler;
//! use dupfunnel::duplicates::FinderConfig;
//!
//! let handler = install_handler().expect("Failed to install signal handler");
//! let config = FinderConfig::default().with_shutdown_flag(handler.get_flag());
//! ```

use std::io::Write;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, OnceLock};

/// Shared shutdown flag.
#[derive(Debug, Clone, Default)]
pub struct ShutdownHandler {
    flag: Arc<AtomicBool>,
}

impl ShutdownHandler {
    /// Create a new handler with no shutdown requested.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Check if shutdown has been requested.
    #[must_use]
    pub fn is_shutdown_requested(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }

    /// Manually request a shutdown.
    pub fn request_shutdown(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    /// Get a clone of the flag for the finder and walkers.
    #[must_use]
    pub fn get_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.flag)
    }

    /// Reset the flag to `false`.
    pub fn reset(&self) {
        self.flag.store(false, Ordering::SeqCst);
    }
}

/// Error type for signal handler installation.
#[derive(Debug, thiserror::Error)]
pub enum SignalError {
    /// Failed to install the Ctrl+C handler.
    #[error("Failed to install signal handler: {0}")]
    InstallFailed(#[from] ctrlc::Error),
}

static GLOBAL_HANDLER: OnceLock<ShutdownHandler> = OnceLock::new();

/// Install a Ctrl+C handler that sets the shutdown flag on interrupt.
///
/// The hook can only be registered once per process. Later calls return the
/// already-installed handler with its flag reset, and if some other code owns
/// the Ctrl+C hook an unhooked handler is returned instead, which still
/// honours [`ShutdownHandler::request_shutdown`].
///
/// # Errors
///
/// Currently never fails; the `Result` leaves room for platforms where
/// installing the hook is mandatory.
pub fn install_handler() -> Result<ShutdownHandler, SignalError> {
    if let Some(handler) = GLOBAL_HANDLER.get() {
        handler.reset();
        return Ok(handler.clone());
    }

    let handler = ShutdownHandler::new();
    let flag = handler.get_flag();

    let installed = ctrlc::set_handler(move || {
        flag.store(true, Ordering::SeqCst);
        let _ = writeln!(std::io::stderr(), "\nInterrupted. Finishing current bucket...");
        let _ = std::io::stderr().flush();
        log::info!("Shutdown signal received");
    });

    if let Err(e) = installed {
        log::debug!("Ctrl+C handler not installed ({e}), using unhooked handler");
    }

    // Whoever wins the race becomes the process-wide handler
    let handler = GLOBAL_HANDLER.get_or_init(|| handler).clone();
    Ok(handler)
}
