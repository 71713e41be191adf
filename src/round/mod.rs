//! Check rounds: concurrent probing of the full target list.

mod executor;
mod result;

pub use executor::{RoundExecutor, DEFAULT_MAX_IN_FLIGHT};
pub use result::{DownSet, RoundResult};
