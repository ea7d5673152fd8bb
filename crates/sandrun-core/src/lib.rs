//! sandrun core: the environment config layer and observability shared by
//! the generator, the sandbox facade and the CLI.

pub mod config;
pub mod observability;
