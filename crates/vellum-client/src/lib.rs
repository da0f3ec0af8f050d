//! # Vellum Client
//!
//! Client-side synchronization orchestration for the Vellum note-taking
//! client: session bootstrap, sync status aggregation, auth/session
//! transitions, and the backup import pipeline. The encryption, sync
//! transport, and storage engines are consumed through the traits in
//! [`vellum_core::engines`].
//!
//! # Startup
//!
//! ```rust,ignore
//! use vellum_client::{LoggingConfig, SessionBootstrapper, init_logging};
//!
//! init_logging(LoggingConfig::default());
//! let bootstrapper = SessionBootstrapper::new(/* engines */);
//! let _timer = bootstrapper.run().await;
//! ```

#![warn(clippy::all)]

pub mod auth;
pub mod bootstrap;
pub mod import;
pub mod logging;
pub mod strings;
pub mod sync_status;

pub use auth::{AccountCoordinator, LoginOutcome, RegisterOutcome};
pub use bootstrap::SessionBootstrapper;
pub use import::{ImportPayload, ImportPipeline, ImportReport};
pub use logging::{init_logging, LoggingConfig};
pub use sync_status::SyncStatusAggregator;
