//! Quire book catalogue: the application modules and the bootstrap that
//! wires them onto the module kernel.

pub mod app;
pub mod modules;

pub use app::{build_registry, run};
