//! Centralized error type for the prism umbrella crate.
//!
//! Wraps the subsystem errors so `?` propagates naturally across crate boundaries.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Core(#[from] prism_core::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
