use crate::{
    error::{Error, Result},
    util, Modulus,
};

/// Describes the type of encryption scheme to be used.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default, serde::Serialize, serde::Deserialize)]
pub enum SchemeType {
    /// Fallback. Not valid for encryption.
    #[default]
    None,
    /// Brakerski/Fan-Vercauteren Scheme.
    /// - The original paper: [Somewhat Practical Fully Homomorphic Encryption](https://eprint.iacr.org/2012/144)
    /// - BEHV RNS-BFV: [A Full RNS Variant of FV like Somewhat Homomorphic Encryption Schemes](https://eprint.iacr.org/2016/510)
    BFV,
    /// Cheon-Kim-Kim-Song Scheme.
    /// - The original paper: [Homomorphic Encryption for Arithmetic of Approximate Numbers](https://eprint.iacr.org/2016/421)
    /// - RNS-CKKS: [A Full RNS Variant of Approximate Homomorphic Encryption](https://eprint.iacr.org/2018/931)
    CKKS,
    /// Brakerski-Gentry-Vaikuntanathan Scheme.
    /// - The original paper: [(Leveled) Fully Homomorphic Encryption without Bootstrapping](https://eprint.iacr.org/2011/277)
    BGV
}

impl SchemeType {

    /// Integer schemes carry a plain modulus and share the same validation rules.
    pub fn is_integer_scheme(&self) -> bool {
        matches!(self, SchemeType::BFV | SchemeType::BGV)
    }

}

impl From<SchemeType> for u8 {
    fn from(val: SchemeType) -> Self {
        match val {
            SchemeType::None => 0,
            SchemeType::BFV => 1,
            SchemeType::CKKS => 2,
            SchemeType::BGV => 3
        }
    }
}

impl TryFrom<u8> for SchemeType {
    type Error = Error;
    fn try_from(value: u8) -> Result<Self> {
        match value {
            0 => Ok(SchemeType::None),
            1 => Ok(SchemeType::BFV),
            2 => Ok(SchemeType::CKKS),
            3 => Ok(SchemeType::BGV),
            _ => Err(Error::invalid_argument("invalid scheme type"))
        }
    }
}

/// A unique identifier for a set (level) of encryption parameters.
///
/// This is the SHA-256 digest of the parameters' canonical byte image, read as
/// four little-endian words. See [EncryptionParameters::parms_id].
pub type ParmsID = util::hash::HashBlock;

/// The all-zero ParmsID. Reserved; never the id of a parameter set.
pub const PARMS_ID_ZERO: ParmsID = util::hash::HASH_ZERO_BLOCK;

/// A set of parameters defining the encryption scheme.
///
/// It includes [SchemeType], polynomial modulus degree, coefficient moduli chain
/// and for BFV/BGV, plain modulus.
///
/// Setters validate the *shape* of their input and fail with
/// [Error::InvalidArgument] without touching the object. Whether a populated
/// parameter set is actually usable is decided later by
/// [EncryptionParameterQualifiers](crate::EncryptionParameterQualifiers).
///
/// Two parameter sets are equal exactly when their [ParmsID]s are equal.
/// Every stored field participates in the id; there are no fields outside it.
#[derive(Clone, Debug)]
pub struct EncryptionParameters {
    scheme: SchemeType,
    poly_modulus_degree: usize,
    coeff_modulus: Vec<Modulus>,
    plain_modulus: Modulus,
    parms_id: ParmsID,
}

impl Default for EncryptionParameters {
    fn default() -> Self {
        Self::new(SchemeType::None)
    }
}

impl PartialEq for EncryptionParameters {
    fn eq(&self, other: &Self) -> bool {
        self.parms_id == other.parms_id
    }
}

impl Eq for EncryptionParameters {}

impl std::hash::Hash for EncryptionParameters {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.parms_id.hash(state);
    }
}

impl EncryptionParameters {

    /// What HE scheme do we use?
    pub fn scheme(&self) -> SchemeType {self.scheme}

    /// Polynomial modulus degree N. The HE scheme operates
    /// on the polynomial ring Z_q\[X\]/(X^N + 1).
    pub fn poly_modulus_degree(&self) -> usize {self.poly_modulus_degree}

    /// Coefficient moduli chain, defining the coefficient modulus q = q_0 * q_1 * ... * q_k.
    /// The HE scheme operates on the polynomial ring Z_q\[X\]/(X^N + 1).
    pub fn coeff_modulus(&self) -> &[Modulus] {
        &self.coeff_modulus
    }

    /// Plain modulus t. For BFV/BGV, the plaintext space is Z_t\[X\]/(X^N + 1).
    pub fn plain_modulus(&self) -> &Modulus {
        &self.plain_modulus
    }

    /// The unique identifier for the encryption parameters.
    pub fn parms_id(&self) -> &ParmsID {
        &self.parms_id
    }

    /// Creates a new EncryptionParameters object with the specified scheme.
    /// Usually the user just set the params after creating an instance.
    /// ```rust
    /// # use he_context::*;
    /// # fn main() -> Result<()> {
    /// let poly_modulus_degree = 8192;
    /// let mut parms = EncryptionParameters::new(SchemeType::BFV);
    /// parms
    ///     .set_poly_modulus_degree(poly_modulus_degree)?
    ///     .set_coeff_modulus(&CoeffModulus::create(poly_modulus_degree, &[60, 40, 40, 60])?)?
    ///     .set_plain_modulus(&PlainModulus::batching(poly_modulus_degree, 20)?);
    /// let context = EncryptionContext::create(&parms, true, SecurityLevel::Tc128);
    /// assert!(context.parameters_set());
    /// # Ok(())
    /// # }
    /// ```
    pub fn new(scheme: SchemeType) -> Self {
        let mut ret = EncryptionParameters {
            scheme,
            poly_modulus_degree: 0,
            coeff_modulus: vec![],
            plain_modulus: Modulus::default(),
            parms_id: PARMS_ID_ZERO,
        };
        ret.compute_parms_id();
        ret
    }

    /// Sets the degree N. Must be a power of two within
    /// \[HE_POLY_MOD_DEGREE_MIN, HE_POLY_MOD_DEGREE_MAX\]. Zero clears the degree.
    pub fn set_poly_modulus_degree(&mut self, poly_modulus_degree: usize) -> Result<&mut Self> {
        if self.scheme == SchemeType::None && poly_modulus_degree > 0 {
            return Err(Error::logic_error("poly modulus degree is not supported for this scheme"));
        }
        if poly_modulus_degree != 0 && (
            !(util::HE_POLY_MOD_DEGREE_MIN..=util::HE_POLY_MOD_DEGREE_MAX).contains(&poly_modulus_degree)
            || !poly_modulus_degree.is_power_of_two()
        ) {
            return Err(Error::invalid_argument(format!(
                "poly modulus degree {} is not a power of two in [{}, {}]",
                poly_modulus_degree, util::HE_POLY_MOD_DEGREE_MIN, util::HE_POLY_MOD_DEGREE_MAX
            )));
        }
        self.poly_modulus_degree = poly_modulus_degree;
        self.compute_parms_id();
        Ok(self)
    }

    /// Sets the ordered coefficient modulus. The list must hold between
    /// HE_COEFF_MOD_COUNT_MIN and HE_COEFF_MOD_COUNT_MAX entries whose product
    /// has at most HE_COEFF_MOD_TOTAL_BIT_COUNT_MAX bits. That ceiling is a
    /// fixed resource limit and does not depend on the degree; the
    /// degree-dependent bound is the security check in the qualifiers.
    pub fn set_coeff_modulus(&mut self, coeff_modulus: &[Modulus]) -> Result<&mut Self> {
        if self.scheme == SchemeType::None && !coeff_modulus.is_empty() {
            return Err(Error::logic_error("coeff modulus is not supported for this scheme"));
        }
        if !(util::HE_COEFF_MOD_COUNT_MIN..=util::HE_COEFF_MOD_COUNT_MAX).contains(&coeff_modulus.len()) {
            return Err(Error::invalid_argument(format!(
                "coeff modulus count {} is not in [{}, {}]",
                coeff_modulus.len(), util::HE_COEFF_MOD_COUNT_MIN, util::HE_COEFF_MOD_COUNT_MAX
            )));
        }
        let total_bit_count = total_bit_count(coeff_modulus);
        if total_bit_count > util::HE_COEFF_MOD_TOTAL_BIT_COUNT_MAX {
            return Err(Error::invalid_argument(format!(
                "coeff modulus product has {} bits, more than {}",
                total_bit_count, util::HE_COEFF_MOD_TOTAL_BIT_COUNT_MAX
            )));
        }
        self.coeff_modulus = coeff_modulus.to_vec();
        self.compute_parms_id();
        Ok(self)
    }

    /// Sets the plain modulus. Stored as is; validity is checked when a
    /// context is created.
    pub fn set_plain_modulus(&mut self, plain_modulus: &Modulus) -> &mut Self {
        self.plain_modulus = *plain_modulus;
        self.compute_parms_id();
        self
    }

    /// Shortcut for [EncryptionParameters::set_plain_modulus]. Fails only if
    /// `plain_modulus` cannot be a [Modulus] at all.
    pub fn set_plain_modulus_u64(&mut self, plain_modulus: u64) -> Result<&mut Self> {
        let plain_modulus = Modulus::new(plain_modulus)?;
        Ok(self.set_plain_modulus(&plain_modulus))
    }

    /// Parameters for the next level down: the same set without the last
    /// coefficient modulus prime. `None` when at most one prime is left.
    pub(crate) fn next_level_parms(&self) -> Option<Self> {
        if self.coeff_modulus.len() <= 1 {
            return None;
        }
        let mut next = self.clone();
        next.coeff_modulus.pop();
        next.compute_parms_id();
        Some(next)
    }

    /// Little-endian image hashed into the [ParmsID]: the scheme tag as one
    /// byte, then the degree, every coefficient modulus value in order and the
    /// plain modulus value as eight bytes each.
    fn canonical_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(1 + 8 * (2 + self.coeff_modulus.len()));
        bytes.push(u8::from(self.scheme));
        bytes.extend_from_slice(&(self.poly_modulus_degree as u64).to_le_bytes());
        for modulus in &self.coeff_modulus {
            bytes.extend_from_slice(&modulus.value().to_le_bytes());
        }
        bytes.extend_from_slice(&self.plain_modulus.value().to_le_bytes());
        bytes
    }

    fn compute_parms_id(&mut self) {
        self.parms_id = util::hash::hash_bytes(&self.canonical_bytes());
        // A zero digest would collide with the reserved id.
        debug_assert_ne!(self.parms_id, PARMS_ID_ZERO, "[Logic error] Parms id cannot be zero.");
    }

}

/// Bit length of the product of `moduli`.
pub(crate) fn total_bit_count(moduli: &[Modulus]) -> usize {
    let values = moduli.iter().map(|m| m.value()).collect::<Vec<_>>();
    let mut product = vec![0; values.len()];
    util::multiply_many_u64(&values, &mut product);
    util::get_significant_bit_count_uint(&product)
}

/// Represents a standard security level according to the HomomorphicEncryption.org
/// security standard.
///
/// Normal users should not
/// have to specify the security level explicitly anywhere.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, serde::Serialize, serde::Deserialize)]
pub enum SecurityLevel {
    /// No security guaranteed.
    #[default]
    None = 0,
    /// 128-bit classical security.
    Tc128 = 128,
    /// 192-bit classical security.
    Tc192 = 192,
    /// 256-bit classical security.
    Tc256 = 256
}
