//! Domain records shared by the tracker, parsers and stores
//!
//! - `Asin`: validated product identifier
//! - `Task`: an (ASIN, keyword) submission
//! - `ListingEntry`, `PositionResult`, `StoredResult`: search outcomes

mod asin;
mod result;
mod task;

pub use asin::{Asin, ASIN_LEN};
pub use result::{ListingEntry, PositionResult, StoredResult, VariantSet};
pub use task::{Task, MIN_KEYWORD_LEN};
