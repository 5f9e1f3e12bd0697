//! # educollab-client
//!
//! Domain-consistency layer of the EduCollab client.
//!
//! - [`access`]: owner / team member / guest derivation
//! - [`progress`] and [`rating`]: aggregates over child collections
//! - [`cache`] and [`invalidation`]: keyed query cache and the table of
//!   which keys each mutation invalidates
//! - [`fanout`]: best-effort notifications
//! - [`commands`]: the read accessors and mutation entry points on
//!   [`Platform`]

pub mod access;
pub mod cache;
pub mod commands;
pub mod config;
pub mod error;
pub mod fanout;
pub mod invalidation;
pub mod keys;
pub mod progress;
pub mod queries;
pub mod rating;
pub mod session;
pub mod state;

pub use access::ProjectAccess;
pub use config::{Backend, ClientConfig};
pub use error::{ClientError, Result};
pub use fanout::{FanoutOutcome, Notified};
pub use invalidation::Mutation;
pub use keys::QueryKey;
pub use progress::Progress;
pub use queries::{ProjectSummary, StatusFilter};
pub use rating::{RatingOutcome, RatingSummary};
pub use session::SessionContext;
pub use state::Platform;

use tracing_subscriber::{fmt, EnvFilter};

/// Install the global tracing subscriber. `RUST_LOG` overrides the default
/// filter. Safe to call more than once.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("educollab_client=debug,educollab_store=info,warn"));

    let _ = fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .try_init();
}

/// Load [`ClientConfig`] from the environment and open the platform.
pub fn connect() -> Result<Platform> {
    let config = ClientConfig::from_env();
    tracing::info!("Starting {} client", educollab_shared::constants::APP_NAME);
    Platform::from_config(&config)
}
