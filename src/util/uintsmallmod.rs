use crate::modulus::Modulus;

use super::try_invert_u64_mod_u64;

/**
Reduces a 128-bit input with base 2^64 Barrett reduction.
Correctness: input must be less than modulus * 2^64.
*/
pub fn barrett_reduce_u128(input: u128, modulus: &Modulus) -> u64 {
    let lo = input as u64;
    let hi = (input >> 64) as u64;
    let const_ratio = modulus.const_ratio();

    // Round 1
    let carry = ((lo as u128 * const_ratio[0] as u128) >> 64) as u64;
    let tmp2 = lo as u128 * const_ratio[1] as u128;
    let (tmp1, c) = (tmp2 as u64).overflowing_add(carry);
    let tmp3 = ((tmp2 >> 64) as u64).wrapping_add(c as u64);

    // Round 2
    let tmp2 = hi as u128 * const_ratio[0] as u128;
    let (_, c) = tmp1.overflowing_add(tmp2 as u64);
    let carry = ((tmp2 >> 64) as u64).wrapping_add(c as u64);

    let quotient = hi.wrapping_mul(const_ratio[1]).wrapping_add(tmp3).wrapping_add(carry);

    // Barrett subtraction; one more subtraction is enough
    let remainder = lo.wrapping_sub(quotient.wrapping_mul(modulus.value()));
    if remainder >= modulus.value() {remainder - modulus.value()} else {remainder}
}

#[inline]
pub fn barrett_reduce_u64(input: u64, modulus: &Modulus) -> u64 {
    // floor(2^64 / mod) == floor( floor(2^128 / mod) )
    let quotient = ((input as u128 * modulus.const_ratio()[1] as u128) >> 64) as u64;
    let remainder = input - quotient * modulus.value();
    if remainder >= modulus.value() {remainder - modulus.value()} else {remainder}
}

#[inline]
pub fn multiply_u64_mod(operand1: u64, operand2: u64, modulus: &Modulus) -> u64 {
    barrett_reduce_u128(operand1 as u128 * operand2 as u128, modulus)
}

/**
An operand together with its precomputed quotient `(operand << 64) / modulus`
for one specific modulus, so that multiplication by it needs no division.
Operand must be less than modulus.
*/
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MultiplyU64ModOperand {
    pub operand: u64,
    pub quotient: u64,
}

impl MultiplyU64ModOperand {

    pub fn new(operand: u64, modulus: &Modulus) -> Self {
        debug_assert!(operand < modulus.value(), "[Invalid argument] Operand must be less than modulus.");
        let quotient = (((operand as u128) << 64) / modulus.value() as u128) as u64;
        MultiplyU64ModOperand { operand, quotient }
    }

}

impl std::fmt::Display for MultiplyU64ModOperand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.operand, self.quotient)
    }
}

/**
Returns x * y mod modulus.
Correctness: modulus should be at most 63-bit, and y must be less than modulus.
*/
#[inline]
pub fn multiply_u64operand_mod(x: u64, y: &MultiplyU64ModOperand, modulus: &Modulus) -> u64 {
    let p = modulus.value();
    let tmp1 = ((x as u128 * y.quotient as u128) >> 64) as u64;
    let tmp2 = y.operand.wrapping_mul(x).wrapping_sub(tmp1.wrapping_mul(p));
    if tmp2 >= p {tmp2 - p} else {tmp2}
}

/** Returns value mod modulus for a multi-word value. */
pub fn modulo_uint(value: &[u64], modulus: &Modulus) -> u64 {
    match value.len() {
        0 => 0,
        1 => barrett_reduce_u64(value[0], modulus),
        len => {
            let mut acc = barrett_reduce_u64(value[len - 1], modulus);
            for &word in value[..len - 1].iter().rev() {
                acc = barrett_reduce_u128(((acc as u128) << 64) | word as u128, modulus);
            }
            acc
        }
    }
}

#[inline]
pub fn try_invert_u64_mod(operand: u64, modulus: &Modulus) -> Option<u64> {
    try_invert_u64_mod_u64(operand, modulus.value())
}

/** Returns operand^exponent mod modulus. */
pub fn exponentiate_u64_mod(operand: u64, mut exponent: u64, modulus: &Modulus) -> u64 {
    let mut power = barrett_reduce_u64(operand, modulus);
    let mut result = 1 % modulus.value();
    while exponent > 0 {
        if exponent & 1 == 1 {
            result = multiply_u64_mod(result, power, modulus);
        }
        exponent >>= 1;
        power = multiply_u64_mod(power, power, modulus);
    }
    result
}
