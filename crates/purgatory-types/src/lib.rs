//! Shared data model and error hierarchy for Password Purgatory.

pub mod attempt;
pub mod error;
mod util;

pub use attempt::{Attempt, History, SessionId};
pub use error::{ConfigError, NotifyError, StoreError};
pub use util::truncate_str;
