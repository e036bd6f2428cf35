//! Parameter validation and context setup for RLWE homomorphic encryption.
//!
//! Users describe a parameter set with [EncryptionParameters] and hand it to
//! [EncryptionContext::create]. The context checks the parameters, records the
//! outcome in [EncryptionParameterQualifiers], and builds the modulus switching
//! chain of [ContextData] levels, each with its precomputed tables. Everything
//! built here is immutable afterwards and can be shared across threads.
//!
//! ```rust
//! # use he_context::*;
//! # fn main() -> Result<()> {
//! let mut parms = EncryptionParameters::new(SchemeType::CKKS);
//! parms
//!     .set_poly_modulus_degree(8192)?
//!     .set_coeff_modulus(&CoeffModulus::create(8192, &[60, 40, 40, 60])?)?;
//! let context = EncryptionContext::create_default(&parms);
//! assert!(context.parameters_set());
//! assert_eq!(context.first_context_data().unwrap().chain_index(), 2);
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

mod error;
mod modulus;
mod encryption_parameters;
mod qualifiers;
mod security_standard;
mod memory;
mod context;
mod serialize_serde;
pub mod util;

pub use error::{Error, Result};
pub use modulus::{Modulus, CoeffModulus, PlainModulus};
pub use encryption_parameters::{
    EncryptionParameters, SchemeType, SecurityLevel, ParmsID, PARMS_ID_ZERO,
};
pub use qualifiers::{ErrorCode, EncryptionParameterQualifiers};
pub use security_standard::{SecurityStandard, HomomorphicEncryptionStandard};
pub use memory::{MemoryPool, MemoryPoolHandle, MemoryProfile};
pub use context::{ContextData, ContextDataPointer, ContextOptions, EncryptionContext};
