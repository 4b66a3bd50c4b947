//! Settings stores
//!
//! One store per settings resource. Each follows the same load cycle:
//! [`begin_load`](PointsStore::begin_load) issues a request token for the
//! current scope, [`finish_load`](PointsStore::finish_load) applies the
//! response only when that token is still the latest.

mod earn;
mod points;
mod redeem;
mod source;
mod tokens;

pub use earn::EarnStore;
pub use points::PointsStore;
pub use redeem::{BulkDeleteOutcome, CouponForm, RedeemStore, RestrictionChoice};
pub use source::SettingsSource;
pub use tokens::{LoadRequest, LoadTicket, RequestTokens};
