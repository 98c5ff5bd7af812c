pub mod funding_policy;
pub mod state_machine;
pub mod types;
