//! Host-side facade for running untrusted scripts in Nanvix sandboxes.
//!
//! The isolation itself happens inside the `hyperlight-nanvix` runner; this
//! crate validates workloads, drives a [`SandboxBackend`] under resource
//! limits and turns the outcome into a [`WorkloadResult`].

pub mod backend;
pub mod cache;
pub mod common;
pub mod config;
pub mod direct;
pub mod error;
pub mod runner;
pub mod sandbox;
pub mod workload;

pub use backend::{backend_from_name, ExecutionResult, KillReason, SandboxBackend, Workload};
pub use cache::RegistryCache;
pub use common::ResourceLimits;
pub use config::RuntimeConfig;
pub use direct::DirectBackend;
pub use error::SandboxError;
pub use runner::NanvixRunnerBackend;
pub use sandbox::{Sandbox, WorkloadResult};
pub use workload::WorkloadType;
