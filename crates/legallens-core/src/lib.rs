#![deny(clippy::unwrap_used)]
#![allow(clippy::missing_errors_doc)]

pub mod api;
pub mod constants;

pub use crate::api::*;
pub use crate::constants::*;
