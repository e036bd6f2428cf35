use std::cmp::Ordering;

pub const HE_MOD_BIT_COUNT_MAX: usize = 61;

pub const HE_POLY_MOD_DEGREE_MAX: usize = 131072;
pub const HE_POLY_MOD_DEGREE_MIN: usize = 2;

pub const HE_COEFF_MOD_COUNT_MAX: usize = 64;
pub const HE_COEFF_MOD_COUNT_MIN: usize = 1;

pub const HE_USER_MOD_BIT_COUNT_MAX: usize = 60;
pub const HE_USER_MOD_BIT_COUNT_MIN: usize = 2;

pub const HE_PLAIN_MOD_BIT_COUNT_MAX: usize = HE_USER_MOD_BIT_COUNT_MAX;
pub const HE_PLAIN_MOD_BIT_COUNT_MIN: usize = HE_USER_MOD_BIT_COUNT_MIN;

/// Resource ceiling on the bit length of the whole coefficient modulus product,
/// enforced when the coefficient modulus is set.
pub const HE_COEFF_MOD_TOTAL_BIT_COUNT_MAX: usize = HE_COEFF_MOD_COUNT_MAX * HE_USER_MOD_BIT_COUNT_MAX;

#[inline]
pub fn get_significant_bit_count(value: u64) -> usize {
    (u64::BITS - value.leading_zeros()) as usize
}

/// Bit length of a little-endian multi-word integer.
pub fn get_significant_bit_count_uint(value: &[u64]) -> usize {
    match value.iter().rposition(|&x| x != 0) {
        Some(top) => 64 * top + get_significant_bit_count(value[top]),
        None => 0,
    }
}

/// Returns `k` if `value == 2^k`.
#[inline]
pub fn get_power_of_two(value: u64) -> Option<usize> {
    if value.is_power_of_two() {
        Some(value.trailing_zeros() as usize)
    } else {
        None
    }
}

#[inline]
pub fn reverse_bits_u64(operand: u64, bit_count: usize) -> u64 {
    if bit_count == 0 {
        0
    } else {
        operand.reverse_bits() >> (64 - bit_count)
    }
}

/// `result = operand1 * operand2`, truncated to `result.len()` words.
pub fn multiply_uint_u64(operand1: &[u64], operand2: u64, result: &mut [u64]) {
    result.fill(0);
    let mut carry = 0u64;
    for (i, out) in result.iter_mut().enumerate() {
        let word = operand1.get(i).copied().unwrap_or(0);
        let product = (word as u128) * (operand2 as u128) + carry as u128;
        *out = product as u64;
        carry = (product >> 64) as u64;
    }
}

/// Product of all operands; `result` must hold `operands.len()` words.
pub fn multiply_many_u64(operands: &[u64], result: &mut [u64]) {
    result.fill(0);
    let Some((&first, rest)) = operands.split_first() else {
        return;
    };
    result[0] = first;
    let mut temp = vec![0; result.len()];
    for &operand in rest {
        multiply_uint_u64(result, operand, &mut temp);
        result.copy_from_slice(&temp);
    }
}

/// Long division of a multi-word integer by a single word.
/// Writes the quotient and returns the remainder.
pub fn divide_uint_u64(numerator: &[u64], denominator: u64, quotient: &mut [u64]) -> u64 {
    assert_ne!(denominator, 0, "[Invalid argument] Division by zero.");
    quotient.fill(0);
    let divisor = denominator as u128;
    let mut remainder = 0u128;
    for i in (0..numerator.len()).rev() {
        let current = (remainder << 64) | numerator[i] as u128;
        if let Some(q) = quotient.get_mut(i) {
            *q = (current / divisor) as u64;
        }
        remainder = current % divisor;
    }
    remainder as u64
}

/// `result = operand1 + operand2`; returns the outgoing carry.
pub fn add_uint(operand1: &[u64], operand2: &[u64], result: &mut [u64]) -> bool {
    let mut carry = false;
    for (i, out) in result.iter_mut().enumerate() {
        let a = operand1.get(i).copied().unwrap_or(0);
        let b = operand2.get(i).copied().unwrap_or(0);
        let (sum, c1) = a.overflowing_add(b);
        let (sum, c2) = sum.overflowing_add(carry as u64);
        *out = sum;
        carry = c1 || c2;
    }
    carry
}

/// `result = operand1 - operand2`; returns the outgoing borrow.
pub fn sub_uint(operand1: &[u64], operand2: &[u64], result: &mut [u64]) -> bool {
    let mut borrow = false;
    for (i, out) in result.iter_mut().enumerate() {
        let a = operand1.get(i).copied().unwrap_or(0);
        let b = operand2.get(i).copied().unwrap_or(0);
        let (diff, b1) = a.overflowing_sub(b);
        let (diff, b2) = diff.overflowing_sub(borrow as u64);
        *out = diff;
        borrow = b1 || b2;
    }
    borrow
}

#[inline]
pub fn increment_uint(operand: &[u64], result: &mut [u64]) -> bool {
    add_uint(operand, &[1], result)
}

pub fn right_shift_uint_inplace(value: &mut [u64], shift_amount: usize) {
    let word_shift = shift_amount / 64;
    let bit_shift = shift_amount % 64;
    let len = value.len();
    for i in 0..len {
        let low = value.get(i + word_shift).copied().unwrap_or(0);
        let high = value.get(i + word_shift + 1).copied().unwrap_or(0);
        value[i] = if bit_shift == 0 {
            low
        } else {
            (low >> bit_shift) | (high << (64 - bit_shift))
        };
    }
}

/// `operand1 = (operand1 + operand2) mod modulus`, both inputs already reduced.
pub fn add_uint_mod_inplace(operand1: &mut [u64], operand2: &[u64], modulus: &[u64]) {
    let mut sum = vec![0; operand1.len()];
    let carry = add_uint(operand1, operand2, &mut sum);
    if carry || compare_uint(&sum, modulus) != Ordering::Less {
        sub_uint(&sum, modulus, operand1);
    } else {
        operand1.copy_from_slice(&sum);
    }
}

/// Compares two multi-word integers that may differ in word count.
pub fn compare_uint(operand1: &[u64], operand2: &[u64]) -> Ordering {
    let len = operand1.len().max(operand2.len());
    for i in (0..len).rev() {
        let a = operand1.get(i).copied().unwrap_or(0);
        let b = operand2.get(i).copied().unwrap_or(0);
        match a.cmp(&b) {
            Ordering::Equal => continue,
            other => return other,
        }
    }
    Ordering::Equal
}

#[inline]
pub fn is_less_than_uint(operand1: &[u64], operand2: &[u64]) -> bool {
    compare_uint(operand1, operand2) == Ordering::Less
}
