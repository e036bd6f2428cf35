use std::cmp::Ordering;
use std::collections::HashMap;

use crate::{
    error::{Error, Result},
    security_standard::{HomomorphicEncryptionStandard, SecurityStandard},
    util,
    SecurityLevel,
};

/// Represent an integer modulus of up to 61 bits.
///
/// An instance of the Modulus
/// class represents a non-negative integer modulus up to 61 bits. In particular,
/// the encryption parameter plain_modulus, and the primes in coeff_modulus, are
/// represented by instances of Modulus. The purpose of this class is to
/// perform and store the pre-computation required by Barrett reduction.
///
/// The value zero is a placeholder ("no modulus"). It carries no reduction
/// constants and is never prime.
///
/// - See [EncryptionParameters](crate::EncryptionParameters) for a description of the encryption parameters.
#[derive(Debug, Eq, Clone, Copy, Default)]
pub struct Modulus {
    value: u64,
    const_ratio: [u64; 3],
    bit_count: usize,
    is_prime: bool,
}

impl Ord for Modulus {
    fn cmp(&self, other: &Self) -> Ordering {
        self.value.cmp(&other.value)
    }
}

impl PartialOrd for Modulus {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for Modulus {
    fn eq(&self, other: &Self) -> bool {
        self.value == other.value
    }
}

impl std::hash::Hash for Modulus {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.value.hash(state);
    }
}

impl Modulus {

    /// Create a new Modulus instance with the given value.
    ///
    /// Fails with [Error::InvalidArgument] if the value is 1 or needs more
    /// than 61 bits.
    pub fn new(value: u64) -> Result<Self> {
        if value == 0 {
            return Ok(Modulus::default());
        }
        if (value >> util::HE_MOD_BIT_COUNT_MAX != 0) || (value == 1) {
            return Err(Error::invalid_argument("value can be at most 61-bit and cannot be 1"));
        }
        // const_ratio = floor(2^128 / value) followed by the remainder
        let mut quotient = [0; 3];
        let remainder = util::divide_uint_u64(&[0, 0, 1], value, &mut quotient);
        Ok(Modulus {
            value,
            const_ratio: [quotient[0], quotient[1], remainder],
            bit_count: util::get_significant_bit_count(value),
            is_prime: util::is_prime(value),
        })
    }

    /// Calculate the Barrett reduction.
    #[inline]
    pub fn reduce(&self, value: u64) -> u64 {
        util::barrett_reduce_u64(value, self)
    }

    /// Calculate the Barrett reduction on [u128].
    ///
    /// The input must be less than `value * 2^64`.
    #[inline]
    pub fn reduce_u128(&self, value: u128) -> u64 {
        util::barrett_reduce_u128(value, self)
    }

    /// The three-word Barrett constant: `floor(2^128 / value)` in the first
    /// two words and `2^128 mod value` in the third.
    pub fn const_ratio(&self) -> &[u64; 3] {&self.const_ratio}
    /// The [u64] value.
    pub fn value(&self) -> u64 {self.value}
    /// Always 1 for a nonzero modulus.
    pub fn u64_count(&self) -> usize {usize::from(self.value != 0)}
    /// Is the value a prime number?
    pub fn is_prime(&self) -> bool {self.is_prime}
    /// Is the value zero?
    pub fn is_zero(&self) -> bool {self.value == 0}
    /// How many bits are there in the modulus?
    pub fn bit_count(&self) -> usize {self.bit_count}

}

impl TryFrom<u64> for Modulus {
    type Error = Error;
    fn try_from(value: u64) -> Result<Self> {
        Modulus::new(value)
    }
}

impl std::fmt::Display for Modulus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Modulus ({})", self.value)
    }
}

/// This class contains static methods for creating a coefficient modulus easily.
///
/// Note that while these functions take a [SecurityLevel] argument, all security
/// guarantees are lost if the output is used with encryption parameters with
/// a mismatching value for the poly_modulus_degree.
///
/// The default value [SecurityLevel::Tc128] provides a very high level of security
/// and is the default security level enforced when constructing
/// an [EncryptionContext](crate::EncryptionContext) object. Normal users should not have to specify the security
/// level explicitly anywhere.
pub struct CoeffModulus;

impl CoeffModulus {

    /// Returns the largest bit-length of the coefficient modulus, i.e., bit-length
    /// of the product of the primes in the coefficient modulus, that guarantees
    /// a given security level when using a given poly_modulus_degree, according
    /// to the HomomorphicEncryption.org security standard.
    ///
    /// Returns 0 for a degree the standard does not cover.
    pub fn max_bit_count(poly_modulus_degree: usize, sec_level: SecurityLevel) -> usize {
        if sec_level == SecurityLevel::None {
            return i32::MAX as usize;
        }
        HomomorphicEncryptionStandard::classical()
            .max_total_bit_count(poly_modulus_degree, sec_level)
            .unwrap_or(0)
    }

    /// Returns a default coefficient modulus for the BFV scheme that guarantees
    /// a given security level when using a given poly_modulus_degree, according
    /// to the HomomorphicEncryption.org security standard. Note that all security
    /// guarantees are lost if the output is used with encryption parameters with
    /// a mismatching value for the poly_modulus_degree.
    ///
    /// The coefficient modulus returned by this function will not perform well
    /// if used with the CKKS scheme.
    pub fn bfv_default(poly_modulus_degree: usize, sec_level: SecurityLevel) -> Result<Vec<Modulus>> {
        let moduli: &[u64] = match (sec_level, poly_modulus_degree) {
            (SecurityLevel::Tc128, 1024) => &[0x7e00001],
            (SecurityLevel::Tc128, 2048) => &[0x3fffffff000001],
            (SecurityLevel::Tc128, 4096) => &[0xffffee001, 0xffffc4001, 0x1ffffe0001],
            (SecurityLevel::Tc128, 8192) => &[0x7fffffd8001, 0x7fffffc8001, 0xfffffffc001, 0xffffff6c001, 0xfffffebc001],
            (SecurityLevel::Tc128, 16384) => &[
                0xfffffffd8001, 0xfffffffa0001, 0xfffffff00001, 0x1fffffff68001, 0x1fffffff50001,
                0x1ffffffee8001, 0x1ffffffea0001, 0x1ffffffe88001, 0x1ffffffe48001],
            (SecurityLevel::Tc128, 32768) => &[
                0x7fffffffe90001, 0x7fffffffbf0001, 0x7fffffffbd0001, 0x7fffffffba0001, 0x7fffffffaa0001,
                0x7fffffffa50001, 0x7fffffff9f0001, 0x7fffffff7e0001, 0x7fffffff770001, 0x7fffffff380001,
                0x7fffffff330001, 0x7fffffff2d0001, 0x7fffffff170001, 0x7fffffff150001, 0x7ffffffef00001,
                0xfffffffff70001],

            (SecurityLevel::Tc192, 1024) => &[0x7f001],
            (SecurityLevel::Tc192, 2048) => &[0x1ffffc0001],
            (SecurityLevel::Tc192, 4096) => &[0x1ffc001, 0x1fce001, 0x1fc0001],
            (SecurityLevel::Tc192, 8192) => &[0x3ffffac001, 0x3ffff54001, 0x3ffff48001, 0x3ffff28001],
            (SecurityLevel::Tc192, 16384) => &[
                0x3ffffffdf0001, 0x3ffffffd48001, 0x3ffffffd20001, 0x3ffffffd18001, 0x3ffffffcd0001,
                0x3ffffffc70001],
            (SecurityLevel::Tc192, 32768) => &[
                0x3fffffffd60001, 0x3fffffffca0001, 0x3fffffff6d0001, 0x3fffffff5d0001, 0x3fffffff550001,
                0x7fffffffe90001, 0x7fffffffbf0001, 0x7fffffffbd0001, 0x7fffffffba0001, 0x7fffffffaa0001,
                0x7fffffffa50001],

            (SecurityLevel::Tc256, 1024) => &[0x3001],
            (SecurityLevel::Tc256, 2048) => &[0x1ffc0001],
            (SecurityLevel::Tc256, 4096) => &[0x3ffffffff040001],
            (SecurityLevel::Tc256, 8192) => &[0x7ffffec001, 0x7ffffb0001, 0xfffffdc001],
            (SecurityLevel::Tc256, 16384) => &[0x7ffffffc8001, 0x7ffffff00001, 0x7fffffe70001, 0xfffffffd8001, 0xfffffffa0001],
            (SecurityLevel::Tc256, 32768) => &[
                0xffffffff00001, 0x1fffffffe30001, 0x1fffffffd80001, 0x1fffffffd10001, 0x1fffffffc50001,
                0x1fffffffbf0001, 0x1fffffffb90001, 0x1fffffffb60001, 0x1fffffffa50001],

            (SecurityLevel::None, _) => return Err(Error::invalid_argument("invalid security level")),
            _ => return Err(Error::invalid_argument("non-standard poly modulus degree")),
        };
        moduli.iter().map(|&value| Modulus::new(value)).collect()
    }

    /// Returns a custom coefficient modulus suitable for use with the specified
    /// poly_modulus_degree. The return value will be a vector consisting of
    /// Modulus elements representing distinct prime numbers such that:
    /// 1) have bit-lengths as given in the bit_sizes parameter (at most 60 bits) and
    /// 2) are congruent to 1 modulo 2*poly_modulus_degree.
    ///
    /// Within one bit size the primes are handed out in increasing order.
    pub fn create(poly_modulus_degree: usize, bit_sizes: &[usize]) -> Result<Vec<Modulus>> {
        if !(util::HE_POLY_MOD_DEGREE_MIN..=util::HE_POLY_MOD_DEGREE_MAX).contains(&poly_modulus_degree) ||
            util::get_power_of_two(poly_modulus_degree as u64).is_none()
        {
            return Err(Error::invalid_argument("poly modulus degree is invalid"));
        }
        if !(util::HE_COEFF_MOD_COUNT_MIN..=util::HE_COEFF_MOD_COUNT_MAX).contains(&bit_sizes.len()) {
            return Err(Error::invalid_argument("bit sizes count is out of range"));
        }
        if bit_sizes.iter().any(|size| !(util::HE_USER_MOD_BIT_COUNT_MIN..=util::HE_USER_MOD_BIT_COUNT_MAX).contains(size)) {
            return Err(Error::invalid_argument("bit sizes invalid"));
        }
        let mut count_table: HashMap<usize, usize> = HashMap::new();
        for &size in bit_sizes {
            *count_table.entry(size).or_insert(0) += 1;
        }
        let factor = 2 * poly_modulus_degree as u64;
        let mut prime_table = HashMap::new();
        for (size, count) in count_table {
            prime_table.insert(size, util::get_primes(factor, size, count)?);
        }
        bit_sizes.iter()
            .map(|size| {
                prime_table.get_mut(size)
                    .and_then(Vec::pop)
                    .ok_or_else(|| Error::logic_error("failed to find enough qualifying primes"))
            })
            .collect()
    }

}

/// This class contains static methods for creating a plaintext modulus easily.
pub struct PlainModulus;

impl PlainModulus {

    /// Creates a plaintext modulus supporting batching in BFV/BGV.
    pub fn batching(poly_modulus_degree: usize, bit_size: usize) -> Result<Modulus> {
        let mut moduli = CoeffModulus::create(poly_modulus_degree, &[bit_size])?;
        moduli.pop().ok_or_else(|| Error::logic_error("failed to find enough qualifying primes"))
    }

    /// Creates multiple plaintext moduli supporting batching in BFV/BGV.
    pub fn batching_multiple(poly_modulus_degree: usize, bit_sizes: &[usize]) -> Result<Vec<Modulus>> {
        CoeffModulus::create(poly_modulus_degree, bit_sizes)
    }

}
