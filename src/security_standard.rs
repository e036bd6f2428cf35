//! Security bounds consulted when validating encryption parameters.
//!
//! The bounds come from an external, versioned standard and are revised over
//! time, so validation talks to them through the [SecurityStandard] trait.

use crate::{
    util::he_standard_params::{self, BitCountTable},
    SecurityLevel,
};

/// A table of the largest total coefficient modulus bit count that meets a
/// security level at a given ring degree.
pub trait SecurityStandard: std::fmt::Debug {
    /// Largest allowed bit count of the coefficient modulus product, or
    /// `None` if the standard has no entry for this degree and level.
    /// [SecurityLevel::None] never has an entry.
    fn max_total_bit_count(&self, poly_modulus_degree: usize, sec_level: SecurityLevel) -> Option<usize>;
}

/// The HomomorphicEncryption.org standard with a ternary secret.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HomomorphicEncryptionStandard {
    tc128: &'static BitCountTable,
    tc192: &'static BitCountTable,
    tc256: &'static BitCountTable,
}

impl HomomorphicEncryptionStandard {

    /// Bounds against classical attackers. This is the default.
    pub const fn classical() -> Self {
        HomomorphicEncryptionStandard {
            tc128: &he_standard_params::HE_STANDARD_PARAMS_128_TC,
            tc192: &he_standard_params::HE_STANDARD_PARAMS_192_TC,
            tc256: &he_standard_params::HE_STANDARD_PARAMS_256_TC,
        }
    }

    /// Bounds against quantum attackers.
    pub const fn quantum() -> Self {
        HomomorphicEncryptionStandard {
            tc128: &he_standard_params::HE_STANDARD_PARAMS_128_TQ,
            tc192: &he_standard_params::HE_STANDARD_PARAMS_192_TQ,
            tc256: &he_standard_params::HE_STANDARD_PARAMS_256_TQ,
        }
    }

}

impl Default for HomomorphicEncryptionStandard {
    fn default() -> Self {
        Self::classical()
    }
}

impl SecurityStandard for HomomorphicEncryptionStandard {
    fn max_total_bit_count(&self, poly_modulus_degree: usize, sec_level: SecurityLevel) -> Option<usize> {
        let table = match sec_level {
            SecurityLevel::None => return None,
            SecurityLevel::Tc128 => self.tc128,
            SecurityLevel::Tc192 => self.tc192,
            SecurityLevel::Tc256 => self.tc256,
        };
        he_standard_params::lookup(table, poly_modulus_degree)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug)]
    struct Lenient;

    impl SecurityStandard for Lenient {
        fn max_total_bit_count(&self, _: usize, sec_level: SecurityLevel) -> Option<usize> {
            (sec_level != SecurityLevel::None).then_some(usize::MAX)
        }
    }

    #[test]
    fn test_classical_and_quantum() {
        let classical = HomomorphicEncryptionStandard::classical();
        assert_eq!(classical.max_total_bit_count(4096, SecurityLevel::Tc128), Some(109));
        assert_eq!(classical.max_total_bit_count(4096, SecurityLevel::Tc192), Some(75));
        assert_eq!(classical.max_total_bit_count(4096, SecurityLevel::Tc256), Some(58));
        assert_eq!(classical.max_total_bit_count(4096, SecurityLevel::None), None);
        assert_eq!(classical.max_total_bit_count(4, SecurityLevel::Tc128), None);
        assert_eq!(HomomorphicEncryptionStandard::default(), classical);

        let quantum = HomomorphicEncryptionStandard::quantum();
        assert_eq!(quantum.max_total_bit_count(4096, SecurityLevel::Tc128), Some(101));
        assert_eq!(quantum.max_total_bit_count(32768, SecurityLevel::Tc256), Some(443));
    }

    #[test]
    fn test_custom_standard() {
        let lenient: &dyn SecurityStandard = &Lenient;
        assert_eq!(lenient.max_total_bit_count(4, SecurityLevel::Tc256), Some(usize::MAX));
        assert_eq!(lenient.max_total_bit_count(4, SecurityLevel::None), None);
    }
}
