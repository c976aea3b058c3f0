//! Purchase Common Types
//!
//! Shared types for the purchase conversion pipeline: transaction
//! identifiers, purchase records, converted output records, the service
//! error type and the date arithmetic used by the rate lookback policy.

pub mod identifiers;
pub mod transaction;
pub mod error;
pub mod time;

pub use identifiers::*;
pub use transaction::*;
pub use error::*;
pub use time::*;
