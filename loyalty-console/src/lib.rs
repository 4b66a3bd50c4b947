//! Loyalty Console - merchant admin for the loyalty program
//!
//! # Overview
//!
//! - **Session** (`storage`, `context`): durable login state and the selected
//!   sales channel, published to every view as a [`ChannelScope`]
//! - **Stores** (`stores`): points, ways-to-earn and ways-to-redeem settings
//!   scoped to one (store, channel)
//! - **Guard** (`guard`): unsaved-changes tracking and leave prompts
//! - **Reconcile** (`reconcile`): edits against filtered list views
//!
//! ```text
//! loyalty-console/src/
//! ├── config.rs      # environment configuration
//! ├── logger.rs      # tracing setup
//! ├── storage.rs     # local storage file
//! ├── context.rs     # channel context
//! ├── stores/        # settings stores + backend seam
//! ├── guard.rs       # change guard
//! ├── reconcile.rs   # list reconciler
//! └── dashboard.rs   # program overview
//! ```

pub mod config;
pub mod context;
pub mod dashboard;
pub mod error;
pub mod guard;
pub mod logger;
pub mod reconcile;
pub mod storage;
pub mod stores;

pub use config::ConsoleConfig;
pub use context::{AppContext, ChannelScope};
pub use dashboard::DashboardSummary;
pub use error::{ConsoleError, ConsoleResult};
pub use guard::{ChangeGuard, LeaveDecision, NavigationPort};
pub use logger::init_logger;
pub use reconcile::{BulkDeletePolicy, BulkSelection, EventList, Reconcilable};
pub use storage::{SessionStore, StorageError};
pub use stores::{EarnStore, PointsStore, RedeemStore, SettingsSource};
