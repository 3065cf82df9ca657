// src/sema/mod.rs
pub mod call_info;
pub mod intents;
pub mod oracle;
pub mod rules;
pub mod well_known;

pub use call_info::CallInfo;
pub use intents::{blank_intent_for_type, concrete_intent, concrete_intent_for_arg};
pub use oracle::{CalleeStatus, Dispatch, Resolution};
pub use rules::RuleResolution;
pub use well_known::Builtins;
