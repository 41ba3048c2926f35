pub mod config;
pub mod eligibility;
pub mod errors;
pub mod greeter_utils;
