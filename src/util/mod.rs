//! Provide various utility functions and structs.
//!
//! The utility objects in this submodule are not documented.
//! Use at your own risk.
#![allow(missing_docs)]

mod basic;
pub(crate) mod hash;
pub mod he_standard_params;
mod number_theory;
mod ntt;
mod rns;
mod uintsmallmod;

// gather utilities in this module
pub use basic::*;
pub use ntt::*;
pub use number_theory::*;
pub use rns::*;
pub use uintsmallmod::*;
