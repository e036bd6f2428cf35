//! Largest allowed bit counts for coeff_modulus based on the security estimates from
//! HomomorphicEncryption.org security standard. The secret key is sampled
//! from a ternary {-1, 0, 1} distribution.
//!
//! Each table maps a ring degree to the largest total coefficient modulus
//! bit count that still meets the security level. Degrees outside a table
//! have no entry.

/// One row per ring degree: `(poly_modulus_degree, max_total_bit_count)`.
pub type BitCountTable = [(usize, usize); 6];

/// Ternary secret; 128 bits classical security
pub const HE_STANDARD_PARAMS_128_TC: BitCountTable =
    [(1024, 27), (2048, 54), (4096, 109), (8192, 218), (16384, 438), (32768, 881)];

/// Ternary secret; 192 bits classical security
pub const HE_STANDARD_PARAMS_192_TC: BitCountTable =
    [(1024, 19), (2048, 37), (4096, 75), (8192, 152), (16384, 305), (32768, 611)];

/// Ternary secret; 256 bits classical security
pub const HE_STANDARD_PARAMS_256_TC: BitCountTable =
    [(1024, 14), (2048, 29), (4096, 58), (8192, 118), (16384, 237), (32768, 476)];

/// Ternary secret; 128 bits quantum security
pub const HE_STANDARD_PARAMS_128_TQ: BitCountTable =
    [(1024, 25), (2048, 51), (4096, 101), (8192, 202), (16384, 411), (32768, 827)];

/// Ternary secret; 192 bits quantum security
pub const HE_STANDARD_PARAMS_192_TQ: BitCountTable =
    [(1024, 17), (2048, 35), (4096, 70), (8192, 141), (16384, 284), (32768, 571)];

/// Ternary secret; 256 bits quantum security
pub const HE_STANDARD_PARAMS_256_TQ: BitCountTable =
    [(1024, 13), (2048, 27), (4096, 54), (8192, 109), (16384, 220), (32768, 443)];

/// Looks up `poly_modulus_degree` in `table`.
pub fn lookup(table: &BitCountTable, poly_modulus_degree: usize) -> Option<usize> {
    table.iter()
        .find(|(degree, _)| *degree == poly_modulus_degree)
        .map(|(_, bits)| *bits)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup() {
        assert_eq!(lookup(&HE_STANDARD_PARAMS_128_TC, 4096), Some(109));
        assert_eq!(lookup(&HE_STANDARD_PARAMS_256_TQ, 32768), Some(443));
        assert_eq!(lookup(&HE_STANDARD_PARAMS_128_TC, 4), None);
        assert_eq!(lookup(&HE_STANDARD_PARAMS_128_TC, 65536), None);
    }

    #[test]
    fn test_tables_are_ordered() {
        let tables = [
            HE_STANDARD_PARAMS_128_TC, HE_STANDARD_PARAMS_192_TC, HE_STANDARD_PARAMS_256_TC,
            HE_STANDARD_PARAMS_128_TQ, HE_STANDARD_PARAMS_192_TQ, HE_STANDARD_PARAMS_256_TQ,
        ];
        for table in &tables {
            for pair in table.windows(2) {
                assert_eq!(pair[1].0, pair[0].0 * 2);
                assert!(pair[1].1 > pair[0].1);
            }
        }
        // Stronger levels allow fewer bits at every degree
        for i in 0..6 {
            assert!(HE_STANDARD_PARAMS_128_TC[i].1 > HE_STANDARD_PARAMS_192_TC[i].1);
            assert!(HE_STANDARD_PARAMS_192_TC[i].1 > HE_STANDARD_PARAMS_256_TC[i].1);
            assert!(HE_STANDARD_PARAMS_128_TC[i].1 > HE_STANDARD_PARAMS_128_TQ[i].1);
        }
    }
}
