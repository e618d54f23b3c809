//! # Harbor State
//!
//! The Application State Coordinator: owns every collection and is the
//! only place state changes.
//!
//! ## Module Organization
//! ```text
//! harbor_state/
//! ├── lib.rs          ◄─── You are here (logging setup & exports)
//! ├── state/
//! │   ├── mod.rs      ◄─── AppState, Clock
//! │   ├── catalog.rs  ◄─── Outlets, products, taxes, payment methods, ...
//! │   ├── users.rs    ◄─── Staff accounts, role names
//! │   ├── sales.rs    ◄─── Cart and checkout
//! │   ├── shifts.rs   ◄─── Shift open/close
//! │   ├── inventory.rs◄─── Stock adjustments, purchase orders
//! │   ├── cashflow.rs ◄─── Manual cash entries, period summaries
//! │   └── expenses.rs ◄─── Expenses and dues
//! ├── commands/
//! │   ├── mod.rs      ◄─── Command, CommandOutcome, dispatch
//! │   └── cart.rs     ◄─── Cart handlers
//! ├── config.rs       ◄─── PosConfig (TOML + env)
//! └── error.rs        ◄─── ApiError, ConfigError
//! ```
//!
//! ## Startup
//! ```rust,no_run
//! use harbor_state::{init_tracing, AppState, PosConfig};
//!
//! let config = PosConfig::load_or_default(None);
//! init_tracing(&config.logging.filter);
//!
//! let mut state = AppState::new(config);
//! let reply = state.dispatch_json(r#"{"type": "getCart"}"#);
//! assert!(reply.is_ok());
//! ```

pub mod commands;
pub mod config;
pub mod error;
pub mod state;

use tracing::info;
use tracing_subscriber::EnvFilter;

pub use commands::{cart::CartResponse, Command, CommandOutcome};
pub use config::PosConfig;
pub use error::{ApiError, ConfigError, ErrorCode};
pub use state::{
    AppState, Clock, DuePayment, FixedClock, PurchaseOrderDraft, PurchaseOrderLineDraft,
    ShiftClosure, StateResult, SystemClock,
};

/// Installs the global fmt subscriber.
///
/// `RUST_LOG` wins over `default_filter`. Calling it again is a no-op.
pub fn init_tracing(default_filter: &str) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_filter))
        .unwrap_or_else(|_| EnvFilter::new(config::default_log_filter()));

    if tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .try_init()
        .is_ok()
    {
        info!("Tracing initialised");
    }
}
