use itertools::Itertools;

use crate::{
    security_standard::{HomomorphicEncryptionStandard, SecurityStandard},
    util::{self, NTTTables, RNSBase},
    EncryptionParameters, SchemeType, SecurityLevel,
};

/// Why a set of encryption parameters was rejected, or that it was not.
///
/// Exactly one code is recorded per validated parameter set: the first check
/// that failed, [ErrorCode::Success] if none did, or [ErrorCode::None] if the
/// parameters were never validated.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub enum ErrorCode {
    /**
    constructed but not yet validated
    */
    #[default]
    None,

    /**
    valid
    */
    Success,

    /**
    scheme must be BFV, CKKS or BGV
    */
    InvalidScheme,

    /**
    coeff_modulus's primes' count is not bounded by HE_COEFF_MOD_COUNT_MIN(MAX)
    */
    InvalidCoeffModulusSize,

    /**
    coeff_modulus's primes' bit counts are not bounded by HE_USER_MOD_BIT_COUNT_MIN(MAX)
    */
    InvalidCoeffModulusBitCount,

    /**
    coeff_modulus's primes are not congruent to 1 modulo (2 * poly_modulus_degree)
    */
    InvalidCoeffModulusNoNtt,

    /**
    poly_modulus_degree is not bounded by HE_POLY_MOD_DEGREE_MIN(MAX)
    */
    InvalidPolyModulusDegree,

    /**
    poly_modulus_degree is not a power of two
    */
    InvalidPolyModulusDegreeNonPowerOfTwo,

    /**
    parameters are too large to fit in usize
    */
    InvalidParametersTooLarge,

    /**
    parameters are not compliant with HomomorphicEncryption.org security standard
    */
    InvalidParametersInsecure,

    /**
    RNSBase cannot be constructed
    */
    FailedCreatingRnsBase,

    /**
    plain_modulus's bit count is not bounded by HE_PLAIN_MOD_BIT_COUNT_MIN(MAX)
    */
    InvalidPlainModulusBitCount,

    /**
    plain_modulus is not coprime to coeff_modulus
    */
    InvalidPlainModulusCoprimality,

    /**
    plain_modulus is not smaller than coeff_modulus
    */
    InvalidPlainModulusTooLarge,

    /**
    plain_modulus is not zero
    */
    InvalidPlainModulusNonzero,
}

impl ErrorCode {

    /// Stable snake_case identifier of the code.
    pub fn name(&self) -> &'static str {
        match self {
            ErrorCode::None => "none",
            ErrorCode::Success => "success",
            ErrorCode::InvalidScheme => "invalid_scheme",
            ErrorCode::InvalidCoeffModulusSize => "invalid_coeff_modulus_size",
            ErrorCode::InvalidCoeffModulusBitCount => "invalid_coeff_modulus_bit_count",
            ErrorCode::InvalidCoeffModulusNoNtt => "invalid_coeff_modulus_no_ntt",
            ErrorCode::InvalidPolyModulusDegree => "invalid_poly_modulus_degree",
            ErrorCode::InvalidPolyModulusDegreeNonPowerOfTwo => "invalid_poly_modulus_degree_non_power_of_two",
            ErrorCode::InvalidParametersTooLarge => "invalid_parameters_too_large",
            ErrorCode::InvalidParametersInsecure => "invalid_parameters_insecure",
            ErrorCode::FailedCreatingRnsBase => "failed_creating_rns_base",
            ErrorCode::InvalidPlainModulusBitCount => "invalid_plain_modulus_bit_count",
            ErrorCode::InvalidPlainModulusCoprimality => "invalid_plain_modulus_coprimality",
            ErrorCode::InvalidPlainModulusTooLarge => "invalid_plain_modulus_too_large",
            ErrorCode::InvalidPlainModulusNonzero => "invalid_plain_modulus_nonzero",
        }
    }

    /// Human-readable explanation of the code.
    pub fn message(&self) -> &'static str {
        match self {
            ErrorCode::None => "constructed but not yet validated",
            ErrorCode::Success => "valid",
            ErrorCode::InvalidScheme => "scheme must be BFV, CKKS or BGV",
            ErrorCode::InvalidCoeffModulusSize =>
                "coeff_modulus's primes' count is not bounded by HE_COEFF_MOD_COUNT_MIN(MAX)",
            ErrorCode::InvalidCoeffModulusBitCount =>
                "coeff_modulus's primes' bit counts are not bounded by HE_USER_MOD_BIT_COUNT_MIN(MAX)",
            ErrorCode::InvalidCoeffModulusNoNtt =>
                "coeff_modulus's primes are not congruent to 1 modulo (2 * poly_modulus_degree)",
            ErrorCode::InvalidPolyModulusDegree =>
                "poly_modulus_degree is not bounded by HE_POLY_MOD_DEGREE_MIN(MAX)",
            ErrorCode::InvalidPolyModulusDegreeNonPowerOfTwo => "poly_modulus_degree is not a power of two",
            ErrorCode::InvalidParametersTooLarge => "parameters are too large to fit in usize",
            ErrorCode::InvalidParametersInsecure =>
                "parameters are not compliant with HomomorphicEncryption.org security standard",
            ErrorCode::FailedCreatingRnsBase => "RNSBase cannot be constructed",
            ErrorCode::InvalidPlainModulusBitCount =>
                "plain_modulus's bit count is not bounded by HE_PLAIN_MOD_BIT_COUNT_MIN(MAX)",
            ErrorCode::InvalidPlainModulusCoprimality => "plain_modulus is not coprime to coeff_modulus",
            ErrorCode::InvalidPlainModulusTooLarge => "plain_modulus is not smaller than coeff_modulus",
            ErrorCode::InvalidPlainModulusNonzero => "plain_modulus is not zero",
        }
    }

}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.message())
    }
}

/// Stores a set of attributes (qualifiers) of a set of [EncryptionParameters].
///
/// These parameters are mainly used internally in various parts of the library,
/// e.g., to determine which algorithmic optimizations the current support. The
/// qualifiers are automatically created by the [crate::EncryptionContext] class, silently passed
/// on to downstream components, and the only way to
/// change them is by changing the encryption parameters themselves. In other
/// words, a user will never have to create their own instance of this class, and
/// in most cases never have to worry about it at all.
///
/// For every value produced by [EncryptionParameterQualifiers::derive],
/// `using_ntt` implies `using_fft` and `using_batching` implies `using_ntt`.
#[derive(Clone, Copy, Default, Debug, PartialEq, Eq)]
pub struct EncryptionParameterQualifiers {
    /**
    The variable parameter_error is set to:
    - none, if parameters are not validated;
    - success, if parameters are considered valid;
    - other values, if parameters are validated and invalid.
    */
    pub parameter_error: ErrorCode,
    /**
    Tells whether FFT can be used for polynomial multiplication. If the
    polynomial modulus is of the form X^N+1, where N is a power of two, then
    FFT can be used for fast multiplication of polynomials modulo the polynomial
    modulus. In this case the variable using_fft will be set to true. However,
    currently this is required for the parameters
    to be valid. Therefore, parameters_set can only be true if using_fft is
    true.
    */
    pub using_fft: bool,
    /**
    Tells whether NTT can be used for polynomial multiplication. If the primes
    in the coefficient modulus are congruent to 1 modulo 2N, where X^N+1 is the
    polynomial modulus and N is a power of two, then the number-theoretic
    transform (NTT) can be used for fast multiplications of polynomials modulo
    the polynomial modulus and coefficient modulus. In this case the variable
    using_ntt will be set to true. However, currently this is
    required for the parameters to be valid. Therefore, parameters_set
    can only be true if using_ntt is true.
    */
    pub using_ntt: bool,
    /**
    Tells whether batching is supported by the encryption parameters. If the
    plaintext modulus is congruent to 1 modulo 2N, where X^N+1 is the polynomial
    modulus and N is a power of two, then plaintext elements can be viewed as
    2-by-(N/2) matrices of integers modulo the plaintext modulus. This is
    called batching, and allows the user to
    operate on the matrix elements (slots) in a SIMD fashion. If the encryption parameters
    support batching, the variable using_batching is set to true. CKKS always
    supports batching.
    */
    pub using_batching: bool,
    /**
    Tells whether fast plain lift is supported by the encryption parameters.
    A certain performance optimization in multiplication of a ciphertext by
    a plaintext and in transforming a plaintext element to NTT domain can be
    used when the plaintext modulus is smaller than each prime in the
    coefficient modulus. In this case the variable using_fast_plain_lift is
    set to true.
    */
    pub using_fast_plain_lift: bool,
    /**
    Tells whether the coefficient modulus consists of a set of primes that
    are in decreasing order. If this is true, certain modular reductions in
    base conversion can be omitted, improving performance.

    The flag describes the primes of this level only, so it is not tied to
    the position in the chain: a single-prime level is always descending.
    */
    pub using_descending_modulus_chain: bool,
    /**
    The security level the parameters were verified against, following the
    HomomorphicEncryption.org security standard. [SecurityLevel::None] when
    no level was requested or the check failed.
    */
    pub security_level: SecurityLevel,
}

impl EncryptionParameterQualifiers {

    /// Are the parameters correctly set to enable HE?
    #[inline]
    pub fn parameters_set(&self) -> bool {
        self.parameter_error == ErrorCode::Success
    }

    /// Runs the validation pipeline on `parms` against the classical
    /// HomomorphicEncryption.org bounds for `sec_level`.
    ///
    /// Never fails: an unusable parameter set yields qualifiers whose
    /// `parameter_error` names the first violated condition.
    pub fn derive(parms: &EncryptionParameters, sec_level: SecurityLevel) -> Self {
        validate(parms, sec_level, &HomomorphicEncryptionStandard::classical()).qualifiers
    }

    /// Like [EncryptionParameterQualifiers::derive] with a custom security standard.
    pub fn derive_with_standard(
        parms: &EncryptionParameters,
        sec_level: SecurityLevel,
        standard: &dyn SecurityStandard,
    ) -> Self {
        validate(parms, sec_level, standard).qualifiers
    }

}

/// Everything the validation pipeline produces on the way to its verdict.
/// Fields past the failing step keep their empty defaults.
#[derive(Debug, Default)]
pub(crate) struct Validation {
    pub qualifiers: EncryptionParameterQualifiers,
    pub total_coeff_modulus: Vec<u64>,
    pub total_coeff_modulus_bit_count: usize,
    pub coeff_modulus_base: Option<RNSBase>,
    pub small_ntt_tables: Vec<NTTTables>,
    pub plain_ntt_tables: Option<NTTTables>,
}

impl Validation {
    fn fail(mut self, code: ErrorCode) -> Self {
        self.qualifiers.parameter_error = code;
        self
    }
}

#[inline]
fn bit_count_in(value: u64, min: usize, max: usize) -> bool {
    (min..=max).contains(&util::get_significant_bit_count(value))
}

/// Checks `parms` step by step and stops at the first failure.
pub(crate) fn validate(
    parms: &EncryptionParameters,
    sec_level: SecurityLevel,
    standard: &dyn SecurityStandard,
) -> Validation {
    let mut v = Validation::default();
    let coeff_modulus = parms.coeff_modulus();
    let plain_modulus = parms.plain_modulus();
    let scheme = parms.scheme();

    // The number of coeff moduli is restricted to prevent unexpected behaviors
    if !(util::HE_COEFF_MOD_COUNT_MIN..=util::HE_COEFF_MOD_COUNT_MAX).contains(&coeff_modulus.len()) {
        return v.fail(ErrorCode::InvalidCoeffModulusSize);
    }

    let values = coeff_modulus.iter().map(|m| m.value()).collect::<Vec<_>>();
    v.total_coeff_modulus = vec![0; values.len()];
    util::multiply_many_u64(&values, &mut v.total_coeff_modulus);
    v.total_coeff_modulus_bit_count = util::get_significant_bit_count_uint(&v.total_coeff_modulus);

    match scheme {
        SchemeType::None => return v.fail(ErrorCode::InvalidScheme),
        SchemeType::BFV | SchemeType::BGV => {
            if !bit_count_in(plain_modulus.value(), util::HE_PLAIN_MOD_BIT_COUNT_MIN, util::HE_PLAIN_MOD_BIT_COUNT_MAX) {
                return v.fail(ErrorCode::InvalidPlainModulusBitCount);
            }
        }
        SchemeType::CKKS => {
            if !plain_modulus.is_zero() {
                return v.fail(ErrorCode::InvalidPlainModulusNonzero);
            }
        }
    }

    if !values.iter().all(|&q| bit_count_in(q, util::HE_USER_MOD_BIT_COUNT_MIN, util::HE_USER_MOD_BIT_COUNT_MAX)) {
        return v.fail(ErrorCode::InvalidCoeffModulusBitCount);
    }

    let poly_modulus_degree = parms.poly_modulus_degree();
    if !(util::HE_POLY_MOD_DEGREE_MIN..=util::HE_POLY_MOD_DEGREE_MAX).contains(&poly_modulus_degree) {
        return v.fail(ErrorCode::InvalidPolyModulusDegree);
    }
    let Some(coeff_count_power) = util::get_power_of_two(poly_modulus_degree as u64) else {
        return v.fail(ErrorCode::InvalidPolyModulusDegreeNonPowerOfTwo);
    };
    if coeff_modulus.len().checked_mul(poly_modulus_degree).is_none() {
        return v.fail(ErrorCode::InvalidParametersTooLarge);
    }
    // Polynomial modulus X^(2^k) + 1 is guaranteed at this point
    v.qualifiers.using_fft = true;

    match RNSBase::new(coeff_modulus) {
        Ok(base) => v.coeff_modulus_base = Some(base),
        Err(_) => return v.fail(ErrorCode::FailedCreatingRnsBase),
    }

    match NTTTables::create_ntt_tables(coeff_count_power, coeff_modulus) {
        Ok(tables) => v.small_ntt_tables = tables,
        Err(_) => return v.fail(ErrorCode::InvalidCoeffModulusNoNtt),
    }
    v.qualifiers.using_ntt = true;

    if scheme.is_integer_scheme() {
        if !values.iter().all(|&q| util::are_coprime(q, plain_modulus.value())) {
            return v.fail(ErrorCode::InvalidPlainModulusCoprimality);
        }
        if !util::is_less_than_uint(&[plain_modulus.value()], &v.total_coeff_modulus) {
            return v.fail(ErrorCode::InvalidPlainModulusTooLarge);
        }
        // Batching needs NTT with plain_modulus; its absence is not an error
        v.plain_ntt_tables = NTTTables::new(coeff_count_power, plain_modulus).ok();
        v.qualifiers.using_batching = v.plain_ntt_tables.is_some();
        v.qualifiers.using_fast_plain_lift = values.iter().all(|&q| q > plain_modulus.value());
    } else {
        v.qualifiers.using_batching = true;
        v.qualifiers.using_fast_plain_lift = false;
    }

    if sec_level != SecurityLevel::None {
        let secure = standard.max_total_bit_count(poly_modulus_degree, sec_level)
            .map_or(false, |bound| v.total_coeff_modulus_bit_count <= bound);
        if !secure {
            return v.fail(ErrorCode::InvalidParametersInsecure);
        }
        v.qualifiers.security_level = sec_level;
    }

    v.qualifiers.using_descending_modulus_chain = values.iter().tuple_windows().all(|(a, b)| a > b);
    v.qualifiers.parameter_error = ErrorCode::Success;
    v
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{CoeffModulus, Modulus, PlainModulus};
    use rand::{Rng, SeedableRng};

    fn moduli(values: &[u64]) -> Vec<Modulus> {
        values.iter().map(|&v| Modulus::new(v).unwrap()).collect()
    }

    fn parms(scheme: SchemeType, degree: usize, coeff: &[u64], plain: u64) -> EncryptionParameters {
        let mut parms = EncryptionParameters::new(scheme);
        parms.set_poly_modulus_degree(degree).unwrap()
            .set_coeff_modulus(&moduli(coeff)).unwrap()
            .set_plain_modulus_u64(plain).unwrap();
        parms
    }

    fn derive(parms: &EncryptionParameters) -> EncryptionParameterQualifiers {
        EncryptionParameterQualifiers::derive(parms, SecurityLevel::None)
    }

    fn assert_coherent(q: &EncryptionParameterQualifiers) {
        assert!(!q.using_ntt || q.using_fft);
        assert!(!q.using_batching || q.using_ntt);
        assert_eq!(q.parameters_set(), q.parameter_error == ErrorCode::Success);
    }

    #[test]
    fn test_error_code_table() {
        assert_eq!(ErrorCode::default(), ErrorCode::None);
        assert_eq!(ErrorCode::FailedCreatingRnsBase.name(), "failed_creating_rns_base");
        assert_eq!(ErrorCode::InvalidPlainModulusTooLarge.message(), "plain_modulus is not smaller than coeff_modulus");
        assert_eq!(ErrorCode::Success.to_string(), "valid");
        assert!(!EncryptionParameterQualifiers::default().parameters_set());
    }

    #[test]
    fn test_not_coprime_coeff_modulus() {
        let q = derive(&parms(SchemeType::BFV, 4, &[2, 30], 3));
        assert!(!q.parameters_set());
        assert_eq!(q.parameter_error, ErrorCode::FailedCreatingRnsBase);
        assert!(q.using_fft);
        assert!(!q.using_ntt);
        assert!(!q.using_batching);
        assert!(!q.using_fast_plain_lift);
    }

    #[test]
    fn test_plain_modulus_checks() {
        let q = derive(&parms(SchemeType::BFV, 4, &[17, 41], 34));
        assert_eq!(q.parameter_error, ErrorCode::InvalidPlainModulusCoprimality);
        assert!(q.using_ntt);

        let q = derive(&parms(SchemeType::BFV, 4, &[17, 41], 16));
        assert!(q.parameters_set());
        assert!(q.using_fast_plain_lift);
        assert!(!q.using_batching);
        assert!(!q.using_descending_modulus_chain);

        let q = derive(&parms(SchemeType::BFV, 4, &[17, 41], 73));
        assert!(q.parameters_set());
        assert!(q.using_batching);
        assert!(!q.using_fast_plain_lift);
        assert_eq!(q.security_level, SecurityLevel::None);

        let q = derive(&parms(SchemeType::BGV, 4, &[17, 41], 73));
        assert!(q.parameters_set());
        assert!(q.using_batching);

        let q = derive(&parms(SchemeType::BFV, 4, &[17, 41], 701));
        assert_eq!(q.parameter_error, ErrorCode::InvalidPlainModulusTooLarge);

        let q = derive(&parms(SchemeType::BFV, 4, &[17, 41], 0));
        assert_eq!(q.parameter_error, ErrorCode::InvalidPlainModulusBitCount);
        let q = derive(&parms(SchemeType::BFV, 4, &[17, 41], 1 << 60));
        assert_eq!(q.parameter_error, ErrorCode::InvalidPlainModulusBitCount);

        let q = derive(&parms(SchemeType::CKKS, 4, &[17, 41], 73));
        assert_eq!(q.parameter_error, ErrorCode::InvalidPlainModulusNonzero);

        let q = derive(&parms(SchemeType::CKKS, 4, &[41, 17], 0));
        assert!(q.parameters_set());
        assert!(q.using_batching);
        assert!(!q.using_fast_plain_lift);
        assert!(q.using_descending_modulus_chain);
    }

    #[test]
    fn test_coeff_modulus_checks() {
        assert_eq!(derive(&EncryptionParameters::default()).parameter_error, ErrorCode::InvalidCoeffModulusSize);
        assert_eq!(derive(&EncryptionParameters::new(SchemeType::BFV)).parameter_error, ErrorCode::InvalidCoeffModulusSize);
        assert_eq!(derive(&EncryptionParameters::new(SchemeType::CKKS)).parameter_error, ErrorCode::InvalidCoeffModulusSize);

        let q = derive(&parms(SchemeType::BFV, 4, &[17, 1 << 60], 3));
        assert_eq!(q.parameter_error, ErrorCode::InvalidCoeffModulusBitCount);
        let q = derive(&parms(SchemeType::BFV, 4, &[17, 0], 3));
        assert_eq!(q.parameter_error, ErrorCode::InvalidCoeffModulusBitCount);

        // 19 is not 1 mod 8
        let q = derive(&parms(SchemeType::BFV, 4, &[17, 19], 3));
        assert_eq!(q.parameter_error, ErrorCode::InvalidCoeffModulusNoNtt);
        assert!(q.using_fft);
        assert!(!q.using_ntt);

        let mut no_degree = EncryptionParameters::new(SchemeType::BFV);
        no_degree.set_coeff_modulus(&moduli(&[17, 41])).unwrap().set_plain_modulus_u64(3).unwrap();
        let q = derive(&no_degree);
        assert_eq!(q.parameter_error, ErrorCode::InvalidPolyModulusDegree);
        assert!(!q.using_fft);
    }

    #[test]
    fn test_security_check() {
        let degree = 4096;
        let coeff = CoeffModulus::bfv_default(degree, SecurityLevel::Tc128).unwrap();
        let mut p = EncryptionParameters::new(SchemeType::BFV);
        p.set_poly_modulus_degree(degree).unwrap()
            .set_coeff_modulus(&coeff).unwrap()
            .set_plain_modulus(&PlainModulus::batching(degree, 20).unwrap());

        let q = EncryptionParameterQualifiers::derive(&p, SecurityLevel::Tc128);
        assert!(q.parameters_set());
        assert_eq!(q.security_level, SecurityLevel::Tc128);

        let q = EncryptionParameterQualifiers::derive(&p, SecurityLevel::Tc256);
        assert_eq!(q.parameter_error, ErrorCode::InvalidParametersInsecure);
        assert_eq!(q.security_level, SecurityLevel::None);
        // Earlier checks already ran
        assert!(q.using_ntt);
        assert!(q.using_batching);

        let q = EncryptionParameterQualifiers::derive_with_standard(
            &p, SecurityLevel::Tc128, &HomomorphicEncryptionStandard::quantum());
        assert_eq!(q.parameter_error, ErrorCode::InvalidParametersInsecure);

        // Degrees outside the standard are never secure
        let q = EncryptionParameterQualifiers::derive(&parms(SchemeType::BFV, 4, &[17, 41], 73), SecurityLevel::Tc128);
        assert_eq!(q.parameter_error, ErrorCode::InvalidParametersInsecure);
    }

    #[test]
    fn test_validation_products() {
        let v = validate(&parms(SchemeType::BFV, 4, &[17, 41], 16), SecurityLevel::None,
            &HomomorphicEncryptionStandard::classical());
        assert_eq!(v.total_coeff_modulus, vec![697, 0]);
        assert_eq!(v.total_coeff_modulus_bit_count, 10);
        assert_eq!(v.coeff_modulus_base.as_ref().map(|b| b.len()), Some(2));
        assert_eq!(v.small_ntt_tables.len(), 2);
        assert!(v.plain_ntt_tables.is_none());

        let v = validate(&parms(SchemeType::BFV, 4, &[2, 30], 3), SecurityLevel::None,
            &HomomorphicEncryptionStandard::classical());
        assert_eq!(v.total_coeff_modulus, vec![60, 0]);
        assert!(v.coeff_modulus_base.is_none());
        assert!(v.small_ntt_tables.is_empty());
    }

    #[test]
    fn test_coherence_and_idempotence() {
        let mut rng = rand_chacha::ChaCha8Rng::seed_from_u64(2024);
        let pool = [17u64, 41, 73, 97, 113, 137, 193, 257, 65537, 30, 34, 2, 19, 1 << 40];
        for _ in 0..300 {
            let scheme = [SchemeType::BFV, SchemeType::CKKS, SchemeType::BGV][rng.gen_range(0..3)];
            let degree = [2usize, 4, 8, 16][rng.gen_range(0..4)];
            let count = rng.gen_range(1..=4);
            let coeff = (0..count).map(|_| pool[rng.gen_range(0..pool.len())]).collect::<Vec<_>>();
            let plain = if scheme == SchemeType::CKKS && rng.gen_bool(0.8) {0} else {pool[rng.gen_range(0..pool.len())]};
            let p = parms(scheme, degree, &coeff, plain);
            let first = derive(&p);
            let second = derive(&p);
            assert_eq!(first, second);
            assert_coherent(&first);
            assert_ne!(first.parameter_error, ErrorCode::None);
        }
    }
}
