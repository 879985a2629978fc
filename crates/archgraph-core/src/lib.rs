pub mod config_manager;
pub mod element;
pub mod error;
pub mod logging;
pub mod records;
pub mod relationship;
pub mod rules;
pub mod traits;
pub mod types;

pub use config_manager::*;
pub use element::*;
pub use error::*;
pub use records::*;
pub use relationship::*;
pub use rules::{CompatibilityRules, RuleTable, TargetSet};
pub use traits::*;
pub use types::*;
