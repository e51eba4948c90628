//! Volume indicators: MFI

pub mod mfi;

pub use mfi::*;
