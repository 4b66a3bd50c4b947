//! Data models
//!
//! Wire types for the loyalty backend. Every document type deserializes with
//! field-level fallbacks so a partial server payload never leaves a field unset.

pub mod channel;
pub mod collect;
pub mod event;
pub mod point;
pub mod redeem;
pub mod session;
pub mod store_info;

// Re-exports
pub use channel::*;
pub use collect::*;
pub use event::*;
pub use point::*;
pub use redeem::*;
pub use session::*;
pub use store_info::*;
