use std::{
    collections::HashMap,
    sync::{Arc, Weak},
};

use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::{
    qualifiers::{self, Validation},
    security_standard::{HomomorphicEncryptionStandard, SecurityStandard},
    util::{self, BaseConverter, MultiplyU64ModOperand, NTTTables, RNSBase},
    EncryptionParameterQualifiers, EncryptionParameters, Error, ErrorCode, MemoryPoolHandle,
    MemoryProfile, ParmsID, Result, SchemeType, SecurityLevel,
};

/**
Struct to hold pre-computation data for a given set of encryption parameters.

A [ContextData] is built for every level of the modulus switching chain. It
never owns its neighbours: [ContextData::next_context_data] and
[ContextData::previous_context_data] look them up through the [EncryptionContext]
that owns the chain, and return `None` once that context is gone.

Only the multi-word buffers come from the memory pool: the total coefficient
modulus, the plain and ciphertext upper-half tables, and the scratch used for
`floor(q / t)`. The NTT tables, the RNS base and the per-prime operand tables
are ordinary heap allocations.
*/
#[derive(Debug)]
pub struct ContextData {
    parms: EncryptionParameters,
    qualifiers: EncryptionParameterQualifiers,
    coeff_modulus_base: Option<RNSBase>,
    small_ntt_tables: Vec<NTTTables>,
    plain_ntt_tables: Option<NTTTables>,
    plain_base_converter: Option<BaseConverter>,
    next_base_converter: Option<BaseConverter>,
    total_coeff_modulus: Vec<u64>,
    total_coeff_modulus_bit_count: usize,
    coeff_div_plain_modulus: Vec<MultiplyU64ModOperand>,
    plain_upper_half_threshold: u64,
    plain_upper_half_increment: Vec<u64>,
    upper_half_threshold: Vec<u64>,
    upper_half_increment: Vec<u64>,
    coeff_modulus_mod_plain_modulus: u64,
    inv_last_coeff_mod_coeff: Vec<MultiplyU64ModOperand>,
    prev_parms_id: Option<ParmsID>,
    next_parms_id: Option<ParmsID>,
    chain_index: usize,
    context: Weak<EncryptionContext>,
    pool: MemoryPoolHandle,
}

impl ContextData {

    /// Validates `parms` and, if they pass, precomputes the tables of this level.
    /// Invalid parameters still produce a [ContextData]; its qualifiers say why.
    fn new(
        parms: EncryptionParameters,
        sec_level: SecurityLevel,
        standard: &dyn SecurityStandard,
        pool: &MemoryPoolHandle,
    ) -> Self {
        let Validation {
            qualifiers,
            total_coeff_modulus,
            total_coeff_modulus_bit_count,
            coeff_modulus_base,
            small_ntt_tables,
            plain_ntt_tables,
        } = qualifiers::validate(&parms, sec_level, standard);

        let mut stored_total = pool.allocate_uint(total_coeff_modulus.len());
        stored_total.copy_from_slice(&total_coeff_modulus);

        let mut c = ContextData {
            parms,
            qualifiers,
            coeff_modulus_base,
            small_ntt_tables,
            plain_ntt_tables,
            plain_base_converter: None,
            next_base_converter: None,
            total_coeff_modulus: stored_total,
            total_coeff_modulus_bit_count,
            coeff_div_plain_modulus: vec![],
            plain_upper_half_threshold: 0,
            plain_upper_half_increment: vec![],
            upper_half_threshold: vec![],
            upper_half_increment: vec![],
            coeff_modulus_mod_plain_modulus: 0,
            inv_last_coeff_mod_coeff: vec![],
            prev_parms_id: None,
            next_parms_id: None,
            chain_index: 0,
            context: Weak::new(),
            pool: pool.clone(),
        };
        if c.qualifiers.parameters_set() {
            c.precompute();
        }
        c
    }

    fn precompute(&mut self) {
        let Some(base) = self.coeff_modulus_base.clone() else {
            return;
        };
        let coeff_modulus = self.parms.coeff_modulus().to_vec();
        let coeff_modulus_size = coeff_modulus.len();
        let plain_modulus = *self.parms.plain_modulus();

        match self.parms.scheme() {
            SchemeType::BFV | SchemeType::BGV => {
                // Delta = floor(q / t), and q mod t as the remainder
                let mut temp_coeff_div_plain_modulus = self.pool.allocate_uint(coeff_modulus_size);
                let remainder = util::divide_uint_u64(
                    &self.total_coeff_modulus, plain_modulus.value(), &mut temp_coeff_div_plain_modulus);
                self.coeff_modulus_mod_plain_modulus = remainder;

                base.decompose(&mut temp_coeff_div_plain_modulus);
                self.coeff_div_plain_modulus = temp_coeff_div_plain_modulus.iter()
                    .zip(base.base())
                    .map(|(x, m)| MultiplyU64ModOperand::new(*x, m))
                    .collect();
                self.pool.release(temp_coeff_div_plain_modulus);

                self.upper_half_increment = self.pool.allocate_uint(coeff_modulus_size);
                self.upper_half_increment[0] = remainder;
                base.decompose(&mut self.upper_half_increment);

                self.plain_upper_half_threshold = (plain_modulus.value() + 1) >> 1;

                self.plain_upper_half_increment = self.pool.allocate_uint(coeff_modulus_size);
                if self.qualifiers.using_fast_plain_lift {
                    for (out, q) in self.plain_upper_half_increment.iter_mut().zip(&coeff_modulus) {
                        *out = q.value() - plain_modulus.value();
                    }
                } else {
                    util::sub_uint(&self.total_coeff_modulus, &[plain_modulus.value()], &mut self.plain_upper_half_increment);
                }

                if let Ok(plain_base) = RNSBase::new(&[plain_modulus]) {
                    self.plain_base_converter = Some(BaseConverter::new(&base, &plain_base));
                }
            }
            SchemeType::CKKS => {
                // Most negative plaintext coefficient
                self.plain_upper_half_threshold = 1 << 63;

                // -2^64 mod q_i, for lifting negative plaintext coefficients
                self.plain_upper_half_increment = self.pool.allocate_uint(coeff_modulus_size);
                for (out, q) in self.plain_upper_half_increment.iter_mut().zip(&coeff_modulus) {
                    let half = q.reduce(1 << 63);
                    *out = util::multiply_u64_mod(half, q.value() - 2, q);
                }

                self.upper_half_threshold = self.pool.allocate_uint(coeff_modulus_size);
                util::increment_uint(&self.total_coeff_modulus, &mut self.upper_half_threshold);
                util::right_shift_uint_inplace(&mut self.upper_half_threshold, 1);
            }
            SchemeType::None => {}
        }

        if let Some((last, rest)) = coeff_modulus.split_last() {
            self.inv_last_coeff_mod_coeff = rest.iter()
                .map(|q| util::try_invert_u64_mod(q.reduce(last.value()), q)
                    .map(|inv| MultiplyU64ModOperand::new(inv, q)))
                .collect::<Option<Vec<_>>>()
                .unwrap_or_default();
        }
        if let Ok(next_base) = base.drop_last() {
            self.next_base_converter = Some(BaseConverter::new(&base, &next_base));
        }
    }

    /// Returns the [ParmsID] of this level of [ContextData].
    pub fn parms_id(&self) -> &ParmsID {
        self.parms.parms_id()
    }

    /// [EncryptionParameters] associated with this level of [ContextData].
    pub fn parms(&self) -> &EncryptionParameters {
        &self.parms
    }

    /// [EncryptionParameterQualifiers] associated [Self::parms].
    pub fn qualifiers(&self) -> &EncryptionParameterQualifiers {
        &self.qualifiers
    }

    /// Total bit count of the coefficient modulus (the product of all coefficients in the
    /// coefficient moduli chain).
    pub fn total_coeff_modulus_bit_count(&self) -> usize {
        self.total_coeff_modulus_bit_count
    }

    /// Returns the total coefficient modulus (the product of all coefficients in the
    /// coefficient moduli chain), least significant word first.
    pub fn total_coeff_modulus(&self) -> &[u64] {
        &self.total_coeff_modulus
    }

    /// The RNS base of the coefficient modulus. `None` if it could not be formed.
    pub fn coeff_modulus_base(&self) -> Option<&RNSBase> {
        self.coeff_modulus_base.as_ref()
    }

    /// NTT tables of the coeffcient moduli. Empty unless
    /// [EncryptionParameterQualifiers::using_ntt].
    pub fn small_ntt_tables(&self) -> &[NTTTables] {
        &self.small_ntt_tables
    }

    /// NTT tables of the plain modulus, present when batching is possible
    /// for an integer scheme.
    pub fn plain_ntt_tables(&self) -> Option<&NTTTables> {
        self.plain_ntt_tables.as_ref()
    }

    /// Converter from the coefficient modulus base to the plain modulus.
    pub fn plain_base_converter(&self) -> Option<&BaseConverter> {
        self.plain_base_converter.as_ref()
    }

    /// Converter from the coefficient modulus base to the base of the next
    /// level, which lacks the last prime.
    pub fn next_base_converter(&self) -> Option<&BaseConverter> {
        self.next_base_converter.as_ref()
    }

    /// Coefficient modulus divided by plain modulus. (q/t)
    pub fn coeff_div_plain_modulus(&self) -> &[MultiplyU64ModOperand] {
        &self.coeff_div_plain_modulus
    }

    /// Coefficient modulus mod by plain modulus. (q mod t)
    pub fn coeff_modulus_mod_plain_modulus(&self) -> u64 {
        self.coeff_modulus_mod_plain_modulus
    }

    /// Plaintext coefficients at or above this value are negative.
    pub fn plain_upper_half_threshold(&self) -> u64 {
        self.plain_upper_half_threshold
    }

    /// Per-prime value added to lift a negative plaintext coefficient.
    pub fn plain_upper_half_increment(&self) -> &[u64] {
        &self.plain_upper_half_increment
    }

    /// Approximation threshold used in decoding. (q+1)/2
    pub fn upper_half_threshold(&self) -> &[u64] {
        &self.upper_half_threshold
    }

    /// q mod t in RNS form.
    pub fn upper_half_increment(&self) -> &[u64] {
        &self.upper_half_increment
    }

    /// Inverse of the last prime modulo each of the other primes.
    pub fn inv_last_coeff_mod_coeff(&self) -> &[MultiplyU64ModOperand] {
        &self.inv_last_coeff_mod_coeff
    }

    /// The chain index of this level of [ContextData].
    pub fn chain_index(&self) -> usize {
        self.chain_index
    }

    /// Get the next level of [ContextData].
    pub fn next_context_data(&self) -> Option<ContextDataPointer> {
        self.context.upgrade()?.context_data(self.next_parms_id.as_ref()?)
    }

    /// Get the previous level of [ContextData].
    pub fn previous_context_data(&self) -> Option<ContextDataPointer> {
        self.context.upgrade()?.context_data(self.prev_parms_id.as_ref()?)
    }

    /// Is the scheme [SchemeType::BFV]?
    pub fn is_bfv(&self) -> bool {
        matches!(self.parms.scheme(), SchemeType::BFV)
    }

    /// Is the scheme [SchemeType::CKKS]?
    pub fn is_ckks(&self) -> bool {
        matches!(self.parms.scheme(), SchemeType::CKKS)
    }

    /// Is the scheme [SchemeType::BGV]?
    pub fn is_bgv(&self) -> bool {
        matches!(self.parms.scheme(), SchemeType::BGV)
    }

}

impl Drop for ContextData {
    fn drop(&mut self) {
        self.pool.release(std::mem::take(&mut self.total_coeff_modulus));
        self.pool.release(std::mem::take(&mut self.plain_upper_half_increment));
        self.pool.release(std::mem::take(&mut self.upper_half_threshold));
        self.pool.release(std::mem::take(&mut self.upper_half_increment));
    }
}

/// Shared pointer to one level of the chain.
pub type ContextDataPointer = Arc<ContextData>;

/// How an [EncryptionContext] is built.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContextOptions {
    /// Derive every level down to a single prime, not only the first data level.
    pub expand_mod_chain: bool,
    /// Security level the parameters must meet.
    pub security_level: SecurityLevel,
    /// Where the precomputed tables are stored.
    #[serde(skip)]
    pub memory_profile: MemoryProfile,
}

impl Default for ContextOptions {
    fn default() -> Self {
        ContextOptions {
            expand_mod_chain: true,
            security_level: SecurityLevel::Tc128,
            memory_profile: MemoryProfile::Global,
        }
    }
}

/// Stores a chain of [ContextData] used for a set of [EncryptionParameters].
///
/// Performs sanity checks (validation) and pre-computations for a given set of encryption
/// parameters. While [EncryptionParameters] is a light-weight struct that only stores
/// the parameters, the EncryptionContext is a heavy-weight one that is constructed from
/// them. It validates the parameters for correctness, evaluates their properties, and
/// stores the results of several costly pre-computations.
///
/// Construction never fails on bad parameters. Check [EncryptionContext::parameters_set],
/// and the [EncryptionParameterQualifiers] of the key level for the reason if it is false.
///
/// The first [ContextData] in the chain corresponds to the parameters reserved for keys.
/// These are exactly the parameters passed in, available through
/// [EncryptionContext::key_context_data] and [EncryptionContext::key_parms_id]. The rest
/// are derived by repeatedly removing the last prime of the coefficient modulus, for as
/// long as the result stays valid. [EncryptionContext::first_context_data] and
/// [EncryptionContext::last_context_data] are the first and last of these data levels,
/// i.e. the second and the last element of the full chain. Every level has a chain
/// index, 0 at the last one and growing by one towards the key level.
///
/// - See [EncryptionParameters] for more details on the parameters.
/// - See [EncryptionParameterQualifiers] for more details on the qualifiers.
#[derive(Debug)]
pub struct EncryptionContext {
    key_parms_id: ParmsID,
    first_parms_id: ParmsID,
    last_parms_id: ParmsID,
    context_data_map: HashMap<ParmsID, ContextDataPointer>,
    sec_level: SecurityLevel,
    using_keyswitching: bool,
    expand_mod_chain: bool,
    pool: MemoryPoolHandle,
}

impl EncryptionContext {

    /// Create [EncryptionContext] with the given parameters and security level.
    /// `expand_mod_chain` derives every level down to a single prime; without it
    /// only the key level and the first data level are built.
    pub fn create(parms: &EncryptionParameters, expand_mod_chain: bool, sec_level: SecurityLevel) -> Arc<Self> {
        Self::create_with_standard(
            parms, expand_mod_chain, sec_level,
            &HomomorphicEncryptionStandard::classical(), MemoryPoolHandle::global())
    }

    /// Create [EncryptionContext] with the given parameters and default [SecurityLevel::Tc128]
    /// security. `expand_mod_chain` is enabled. See [EncryptionContext::create] for more details.
    pub fn create_default(parms: &EncryptionParameters) -> Arc<Self> {
        Self::with_options(parms, &ContextOptions::default())
    }

    /// Create [EncryptionContext] as described by `options`.
    pub fn with_options(parms: &EncryptionParameters, options: &ContextOptions) -> Arc<Self> {
        Self::create_with_standard(
            parms, options.expand_mod_chain, options.security_level,
            &HomomorphicEncryptionStandard::classical(), options.memory_profile.get_pool())
    }

    /// Create [EncryptionContext] checking security against `standard`, with all
    /// tables drawn from `pool`.
    ///
    /// # Panics
    /// If `pool` is uninitialized.
    pub fn create_with_standard(
        parms: &EncryptionParameters,
        expand_mod_chain: bool,
        sec_level: SecurityLevel,
        standard: &dyn SecurityStandard,
        pool: MemoryPoolHandle,
    ) -> Arc<Self> {
        assert!(pool.is_initialized(), "[Invalid argument] Memory pool handle is not initialized.");

        // The key level is kept even if the parameters are not valid
        let key_context_data = ContextData::new(parms.clone(), sec_level, standard, &pool);
        let key_error = key_context_data.qualifiers.parameter_error;
        if key_error != ErrorCode::Success {
            warn!("[EncryptionContext] parameters rejected: {} ({})", key_error.name(), key_error.message());
        }
        let mut levels = vec![key_context_data];

        // The first data level is derived whenever possible; further ones only
        // with expand_mod_chain. Descent ends at the first invalid level.
        if key_error == ErrorCode::Success {
            while let Some(next_parms) = levels.last().and_then(|c| c.parms.next_level_parms()) {
                let next = ContextData::new(next_parms, sec_level, standard, &pool);
                if !next.qualifiers.parameters_set() {
                    debug!("[EncryptionContext] chain stops at {} primes: {}",
                        next.parms.coeff_modulus().len(), next.qualifiers.parameter_error.name());
                    break;
                }
                levels.push(next);
                if !expand_mod_chain {
                    break;
                }
            }
        }

        let ids = levels.iter().map(|c| *c.parms_id()).collect::<Vec<_>>();
        let key_parms_id = ids[0];
        let first_parms_id = ids.get(1).copied().unwrap_or(key_parms_id);
        let last_parms_id = ids[ids.len() - 1];
        let using_keyswitching = first_parms_id != key_parms_id;

        let level_count = levels.len();
        for (i, c) in levels.iter_mut().enumerate() {
            c.chain_index = level_count - 1 - i;
            c.prev_parms_id = i.checked_sub(1).map(|j| ids[j]);
            c.next_parms_id = ids.get(i + 1).copied();
            debug!("[EncryptionContext] level {}: {} primes, {} bits",
                c.chain_index, c.parms.coeff_modulus().len(), c.total_coeff_modulus_bit_count);
        }

        Arc::new_cyclic(|context| {
            let context_data_map = levels.into_iter()
                .map(|mut c| {
                    c.context = context.clone();
                    (*c.parms_id(), Arc::new(c))
                })
                .collect();
            EncryptionContext {
                key_parms_id,
                first_parms_id,
                last_parms_id,
                context_data_map,
                sec_level,
                using_keyswitching,
                expand_mod_chain,
                pool,
            }
        })
    }

    /// Get the [ParmsID] of the key level.
    pub fn key_parms_id(&self) -> &ParmsID {
        &self.key_parms_id
    }

    /// Get the [ParmsID] of the first ciphertext level.
    pub fn first_parms_id(&self) -> &ParmsID {
        &self.first_parms_id
    }

    /// Get the [ParmsID] of the last ciphertext level.
    pub fn last_parms_id(&self) -> &ParmsID {
        &self.last_parms_id
    }

    /// Get the [ContextData] pointer of the specified [ParmsID]. `None` for
    /// parameters foreign to this context.
    pub fn context_data(&self, parms_id: &ParmsID) -> Option<ContextDataPointer> {
        self.context_data_map.get(parms_id).cloned()
    }

    /// Get the [ContextData] of the key level.
    pub fn key_context_data(&self) -> Option<ContextDataPointer> {
        self.context_data(&self.key_parms_id)
    }

    /// Get the [ContextData] of the first ciphertext level.
    pub fn first_context_data(&self) -> Option<ContextDataPointer> {
        self.context_data(&self.first_parms_id)
    }

    /// Get the [ContextData] of the last ciphertext level.
    pub fn last_context_data(&self) -> Option<ContextDataPointer> {
        self.context_data(&self.last_parms_id)
    }

    /// Number of levels in the chain, key level included.
    pub fn level_count(&self) -> usize {
        self.context_data_map.len()
    }

    /// Does this set of encryption parameters support keyswitching?
    pub fn using_keyswitching(&self) -> bool {
        self.using_keyswitching
    }

    /// Was the full modulus switching chain requested?
    pub fn expand_mod_chain(&self) -> bool {
        self.expand_mod_chain
    }

    /// Get the security level requested for this set of encryption parameters.
    pub fn security_level(&self) -> SecurityLevel {
        self.sec_level
    }

    /// The pool backing the tables of this context.
    pub fn pool(&self) -> &MemoryPoolHandle {
        &self.pool
    }

    /// Are the parameters correctly set? See [EncryptionParameterQualifiers::parameters_set].
    pub fn parameters_set(&self) -> bool {
        self.first_context_data()
            .map_or(false, |c| c.qualifiers.parameters_set())
    }

    /// For components that must refuse to work with unusable parameters.
    pub fn ensure_parameters_set(&self) -> Result<()> {
        match self.first_context_data() {
            Some(c) if c.qualifiers.parameters_set() => Ok(()),
            Some(c) => Err(Error::ParametersNotSet(c.qualifiers.parameter_error)),
            None => Err(Error::ParametersNotSet(ErrorCode::None)),
        }
    }

}
