use crate::error::{Error, Result};
use crate::modulus::Modulus;
use crate::util;
use rand::Rng;

// First twelve primes; Miller-Rabin with these bases is exact below 3.3 * 10^24.
const IS_PRIME_BASES: [u64; 12] = [2, 3, 5, 7, 11, 13, 17, 19, 23, 29, 31, 37];
const TRY_PRIMITIVE_ROOT_NUM_ROUNDS: usize = 100;

pub fn gcd(x: u64, y: u64) -> u64 {
    if x < y {
        gcd(y, x)
    } else if y == 0 {
        x
    } else {
        let f = x % y;
        if f == 0 { y } else { gcd(y, f) }
    }
}

/** Extended GCD:
Returns (gcd, x, y) where gcd is the greatest common divisor of a and b.
The numbers x, y are such that gcd = ax + by.
*/
pub fn xgcd(mut x: u64, mut y: u64) -> (u64, i64, i64) {
    let (mut prev_a, mut a) = (1i64, 0i64);
    let (mut prev_b, mut b) = (0i64, 1i64);
    while y != 0 {
        let q = (x / y) as i64;
        (x, y) = (y, x % y);
        (prev_a, a) = (a, prev_a - q * a);
        (prev_b, b) = (b, prev_b - q * b);
    }
    (x, prev_a, prev_b)
}

#[inline]
pub fn are_coprime(x: u64, y: u64) -> bool {
    gcd(x, y) <= 1
}

pub fn try_invert_u64_mod_u64(value: u64, modulus: u64) -> Option<u64> {
    if value == 0 {return None;}
    let (cd, a, _) = xgcd(value, modulus);
    if cd != 1 {
        None
    } else if a < 0 {
        Some((modulus as i64 + a) as u64)
    } else {
        Some(a as u64)
    }
}

#[inline]
fn mul_mod(a: u64, b: u64, modulus: u64) -> u64 {
    ((a as u128 * b as u128) % modulus as u128) as u64
}

fn pow_mod(mut base: u64, mut exponent: u64, modulus: u64) -> u64 {
    let mut result = 1 % modulus;
    base %= modulus;
    while exponent > 0 {
        if exponent & 1 == 1 {
            result = mul_mod(result, base, modulus);
        }
        base = mul_mod(base, base, modulus);
        exponent >>= 1;
    }
    result
}

/// Deterministic primality test, exact for every `u64`.
pub fn is_prime(value: u64) -> bool {
    if value < 2 {return false;}
    for &p in &IS_PRIME_BASES {
        if value == p {return true;}
        if value % p == 0 {return false;}
    }
    // Find r and odd d that satisfy value = 2^r * d + 1.
    let mut d = value - 1;
    let mut r = 0;
    while (d & 1) == 0 {d >>= 1; r += 1;}
    'witness: for &a in &IS_PRIME_BASES {
        let mut x = pow_mod(a, d, value);
        if x == 1 || x == value - 1 {continue;}
        for _ in 1..r {
            x = mul_mod(x, x, value);
            if x == value - 1 {continue 'witness;}
        }
        return false;
    }
    true
}

/**
Finds `count` primes of exactly `bit_size` bits that are congruent to 1 modulo `factor`,
scanning downward from the top of the range.
*/
pub fn get_primes(factor: u64, bit_size: usize, count: usize) -> Result<Vec<Modulus>> {
    if !(util::HE_USER_MOD_BIT_COUNT_MIN..=util::HE_USER_MOD_BIT_COUNT_MAX).contains(&bit_size) {
        return Err(Error::invalid_argument("bit_size is invalid"));
    }
    if factor == 0 {
        return Err(Error::invalid_argument("factor must be positive"));
    }
    let mut destination = Vec::with_capacity(count);
    // Start with (2^bit_size - 1) / factor * factor + 1
    let mut value = ((1u64 << bit_size) - 1) / factor * factor + 1;
    let lower_bound = 1u64 << (bit_size - 1);
    while destination.len() < count && value > lower_bound {
        if is_prime(value) {
            destination.push(Modulus::new(value)?);
        }
        value = match value.checked_sub(factor) {
            Some(next) => next,
            None => break,
        };
    }
    if destination.len() < count {
        return Err(Error::logic_error("failed to find enough qualifying primes"));
    }
    Ok(destination)
}

pub fn get_prime(factor: u64, bit_size: usize) -> Result<Modulus> {
    let mut primes = get_primes(factor, bit_size, 1)?;
    primes.pop().ok_or_else(|| Error::logic_error("failed to find enough qualifying primes"))
}

pub fn is_primitive_root(root: u64, degree: u64, modulus: &Modulus) -> bool {
    if root == 0 {
        false
    } else {
        // root is a degree-th root of unity for power-of-two degree iff
        // root^(degree/2) is -1 modulo modulus.
        util::exponentiate_u64_mod(root, degree >> 1, modulus) == (modulus.value() - 1)
    }
}

pub fn try_primitive_root(degree: u64, modulus: &Modulus) -> Option<u64> {
    if degree < 2 || modulus.value() < 2 {
        return None;
    }
    let size_entire_group = modulus.value() - 1;
    let size_quotient_group = size_entire_group / degree;
    // The root exists only if degree divides the group order.
    if size_entire_group % degree != 0 {
        return None;
    }
    let mut random_generator = rand::thread_rng();
    for _ in 0..TRY_PRIMITIVE_ROOT_NUM_ROUNDS {
        let candidate = util::barrett_reduce_u64(random_generator.gen::<u64>(), modulus);
        // Raise to the quotient size to land in the subgroup of order degree
        let candidate = util::exponentiate_u64_mod(candidate, size_quotient_group, modulus);
        if is_primitive_root(candidate, degree, modulus) {
            return Some(candidate);
        }
    }
    None
}

/// Smallest primitive `degree`-th root of unity modulo `modulus`.
pub fn try_minimal_primitive_root(degree: u64, modulus: &Modulus) -> Option<u64> {
    let root = try_primitive_root(degree, modulus)?;
    // Every primitive root is an odd power of any other one.
    let generator_sq = util::multiply_u64_mod(root, root, modulus);
    let mut current_generator = root;
    let mut minimal = root;
    for _ in 0..((degree + 1) / 2) {
        minimal = minimal.min(current_generator);
        current_generator = util::multiply_u64_mod(current_generator, generator_sq, modulus);
    }
    Some(minimal)
}

#[cfg(test)]
mod tests {

    use super::*;

    #[test]
    fn test_gcd() {
        assert_eq!(1, gcd(1, 1));
        assert_eq!(1, gcd(2, 1));
        assert_eq!(1, gcd(1, 2));
        assert_eq!(2, gcd(2, 2));
        assert_eq!(3, gcd(6, 15));
        assert_eq!(3, gcd(15, 6));
        assert_eq!(1, gcd(7, 15));
        assert_eq!(3, gcd(11112, 44445));
        assert_eq!(17, gcd(34, 697));

        assert_eq!(xgcd(7, 7), (7, 0, 1));
        assert_eq!(xgcd(1, 2), (1, 1, 0));
        assert_eq!(xgcd(5, 6), (1, -1, 1));
        assert_eq!(xgcd(13, 19), (1, 3, -2));
        assert_eq!(xgcd(14, 21), (7, -1, 1));
        assert_eq!(xgcd(19, 13), (1, -2, 3));
        assert_eq!(xgcd(21, 14), (7, 1, -1));

        assert!(are_coprime(16, 697));
        assert!(!are_coprime(2, 30));
    }

    #[test]
    fn test_try_invert_uint_mod() {
        assert_eq!(try_invert_u64_mod_u64(1, 2), Some(1));
        assert_eq!(try_invert_u64_mod_u64(2, 2), None);
        assert_eq!(try_invert_u64_mod_u64(3, 2), Some(1));
        assert_eq!(try_invert_u64_mod_u64(0xffffff, 2), Some(1));
        assert_eq!(try_invert_u64_mod_u64(0xfffffe, 2), None);
        assert_eq!(try_invert_u64_mod_u64(12345, 3), None);
        assert_eq!(try_invert_u64_mod_u64(5, 19), Some(4));
        assert_eq!(try_invert_u64_mod_u64(4, 19), Some(5));
    }

    #[test]
    fn test_is_prime() {
        assert!(!is_prime(0));
        assert!(!is_prime(1));
        assert!(is_prime(2));
        assert!(is_prime(3));
        assert!(!is_prime(4));
        assert!(is_prime(5));
        assert!(!is_prime(221));
        assert!(is_prime(65537));
        assert!(!is_prime(65536));
        assert!(is_prime(59399));
        assert!(is_prime(72307));
        assert!(!is_prime(72307 * 59399));
        assert!(is_prime(36893488147419103));
        assert!(!is_prime(36893488147419107));
        assert!(is_prime(0xffffffffffc0001));
        // Strong pseudoprime to bases 2, 3, 5 and 7
        assert!(!is_prime(3215031751));
    }

    #[test]
    fn test_get_primes() {
        let primes = get_primes(8, 10, 3).unwrap();
        assert_eq!(primes.len(), 3);
        for (i, prime) in primes.iter().enumerate() {
            assert!(prime.is_prime());
            assert_eq!(prime.value() % 8, 1);
            assert_eq!(prime.bit_count(), 10);
            if i > 0 {
                assert!(prime.value() < primes[i - 1].value());
            }
        }
        assert_eq!(get_prime(8, 10).unwrap(), primes[0]);

        assert!(matches!(get_primes(8, 1, 1), Err(Error::InvalidArgument(_))));
        assert!(matches!(get_primes(8, 61, 1), Err(Error::InvalidArgument(_))));
        // Only five 5-bit odd primes exist
        assert!(matches!(get_primes(2, 5, 100), Err(Error::LogicError(_))));
    }

    #[test]
    fn test_primitive_root() {
        let check = |modulus: u64, degree: u64, corrects: &[u64]| {
            let modulus = Modulus::new(modulus).unwrap();
            let root = try_primitive_root(degree, &modulus).unwrap();
            assert!(corrects.contains(&root));
        };
        check(11, 2, &[10]);
        check(29, 2, &[28]);
        check(29, 4, &[12, 17]);
        check(1234565441, 2, &[1234565440]);
        check(1234565441, 8, &[984839708, 273658408, 249725733, 960907033]);

        // 4 does not divide 10
        assert_eq!(try_primitive_root(4, &Modulus::new(11).unwrap()), None);

        let modulus = Modulus::new(11).unwrap();
        assert!(is_primitive_root(10, 2, &modulus));
        assert!(!is_primitive_root(9, 2, &modulus));
        assert!(!is_primitive_root(10, 4, &modulus));
        let modulus = Modulus::new(29).unwrap();
        assert!(is_primitive_root(28, 2, &modulus));
        assert!(is_primitive_root(12, 4, &modulus));
        assert!(!is_primitive_root(12, 2, &modulus));
        assert!(!is_primitive_root(12, 8, &modulus));
        let modulus = Modulus::new(1234565441).unwrap();
        assert!(is_primitive_root(1234565440, 2, &modulus));
        assert!(is_primitive_root(960907033, 8, &modulus));
        assert!(is_primitive_root(1180581915, 16, &modulus));
        assert!(!is_primitive_root(1180581915, 32, &modulus));
        assert!(!is_primitive_root(1180581915, 8, &modulus));

        let modulus = Modulus::new(11).unwrap();
        assert_eq!(try_minimal_primitive_root(2, &modulus), Some(10));
        let modulus = Modulus::new(29).unwrap();
        assert_eq!(try_minimal_primitive_root(2, &modulus), Some(28));
        assert_eq!(try_minimal_primitive_root(4, &modulus), Some(12));
        let modulus = Modulus::new(1234565441).unwrap();
        assert_eq!(try_minimal_primitive_root(2, &modulus), Some(1234565440));
        assert_eq!(try_minimal_primitive_root(8, &modulus), Some(249725733));
    }
}
