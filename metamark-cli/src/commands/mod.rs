//! CLI command implementations.

pub mod classify;
pub mod compare;
pub mod embed;
pub mod tamper;
pub mod train;
pub mod verify;
