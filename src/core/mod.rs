//! Application wiring: scan runtime, daily scheduler and HTTP dispatch

pub mod http;
pub mod runtime;
pub mod scheduler;

pub use http::*;
pub use runtime::*;
pub use scheduler::*;
