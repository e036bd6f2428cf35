use crate::{
    error::{Error, Result},
    util::{self, MultiplyU64ModOperand},
    Modulus,
};

/**
Precomputed tables for the negacyclic NTT of degree `2^coeff_count_power`
modulo one prime: powers of the minimal primitive 2N-th root of unity in
bit-reversed order, powers of its inverse in scrambled order, and N^-1.
*/
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NTTTables {
    root: u64,
    coeff_count_power: usize,
    coeff_count: usize,
    modulus: Modulus,
    inv_degree_modulo: MultiplyU64ModOperand,
    root_powers: Vec<MultiplyU64ModOperand>,
    inv_root_powers: Vec<MultiplyU64ModOperand>,
}

impl NTTTables {

    pub fn new(coeff_count_power: usize, modulus: &Modulus) -> Result<Self> {
        if !(1..=util::HE_POLY_MOD_DEGREE_MAX.trailing_zeros() as usize).contains(&coeff_count_power) {
            return Err(Error::invalid_argument("coeff_count_power is out of range"));
        }
        let coeff_count = 1usize << coeff_count_power;
        let modulus = *modulus;
        if !modulus.is_prime() {
            return Err(Error::invalid_argument("modulus is not prime"));
        }
        let root = util::try_minimal_primitive_root(2 * coeff_count as u64, &modulus)
            .ok_or_else(|| Error::invalid_argument("invalid modulus, no primitive root"))?;
        let inv_root = util::try_invert_u64_mod(root, &modulus)
            .ok_or_else(|| Error::invalid_argument("invalid modulus, unable to invert"))?;

        let root_powers = Self::scrambled_powers(root, coeff_count_power, &modulus, |i| {
            util::reverse_bits_u64(i as u64, coeff_count_power) as usize
        });
        let inv_root_powers = Self::scrambled_powers(inv_root, coeff_count_power, &modulus, |i| {
            util::reverse_bits_u64((i - 1) as u64, coeff_count_power) as usize + 1
        });

        let inv_degree_modulo = util::try_invert_u64_mod(coeff_count as u64 % modulus.value(), &modulus)
            .ok_or_else(|| Error::invalid_argument("invalid modulus, unable to invert degree"))?;
        let inv_degree_modulo = MultiplyU64ModOperand::new(inv_degree_modulo, &modulus);

        Ok(NTTTables {
            root,
            coeff_count_power,
            coeff_count,
            modulus,
            inv_degree_modulo,
            root_powers,
            inv_root_powers,
        })
    }

    // Entry 0 is always 1; power i of the base lands at position(i).
    fn scrambled_powers(
        base: u64,
        coeff_count_power: usize,
        modulus: &Modulus,
        position: impl Fn(usize) -> usize,
    ) -> Vec<MultiplyU64ModOperand> {
        let coeff_count = 1 << coeff_count_power;
        let mut powers = vec![MultiplyU64ModOperand::default(); coeff_count];
        powers[0] = MultiplyU64ModOperand::new(1, modulus);
        let base_operand = MultiplyU64ModOperand::new(base, modulus);
        let mut power = base;
        for i in 1..coeff_count {
            powers[position(i)] = MultiplyU64ModOperand::new(power, modulus);
            power = util::multiply_u64operand_mod(power, &base_operand, modulus);
        }
        powers
    }

    pub fn root(&self) -> u64 {self.root}
    pub fn root_powers(&self) -> &[MultiplyU64ModOperand] {&self.root_powers}
    pub fn inv_root_powers(&self) -> &[MultiplyU64ModOperand] {&self.inv_root_powers}
    pub fn inv_degree_modulo(&self) -> &MultiplyU64ModOperand {&self.inv_degree_modulo}
    pub fn modulus(&self) -> &Modulus {&self.modulus}
    pub fn coeff_count_power(&self) -> usize {self.coeff_count_power}
    pub fn coeff_count(&self) -> usize {self.coeff_count}

    /// Builds one table per modulus; fails if any modulus does not admit one.
    pub fn create_ntt_tables(coeff_count_power: usize, moduli: &[Modulus]) -> Result<Vec<NTTTables>> {
        if moduli.is_empty() {
            return Err(Error::invalid_argument("moduli is empty"));
        }
        moduli.iter()
            .map(|modulus| Self::new(coeff_count_power, modulus))
            .collect()
    }

}

#[cfg(test)]
mod tests {
    use crate::CoeffModulus;

    use super::*;

    #[test]
    fn test_ntt_basics() {
        let coeff_count_power = 1;
        let modulus = util::get_prime(2 << coeff_count_power, 60).unwrap();
        let tables = NTTTables::new(coeff_count_power, &modulus).unwrap();
        assert_eq!(2, tables.coeff_count());
        assert_eq!(1, tables.coeff_count_power());
        assert_eq!(&modulus, tables.modulus());

        let coeff_count_power = 2;
        let modulus = util::get_prime(2 << coeff_count_power, 50).unwrap();
        let tables = NTTTables::new(coeff_count_power, &modulus).unwrap();
        assert_eq!(4, tables.coeff_count());
        assert_eq!(2, tables.coeff_count_power());

        let coeff_count_power = 10;
        let modulus = util::get_prime(2 << coeff_count_power, 40).unwrap();
        let tables = NTTTables::new(coeff_count_power, &modulus).unwrap();
        assert_eq!(1024, tables.coeff_count());
        assert_eq!(10, tables.coeff_count_power());

        let tables = NTTTables::create_ntt_tables(
            coeff_count_power,
            &CoeffModulus::create(1 << coeff_count_power, &[20, 20, 20, 20, 20]).unwrap(),
        ).unwrap();
        assert_eq!(tables.len(), 5);
        tables.iter().for_each(|table| {
            assert_eq!(1024, table.coeff_count());
            assert_eq!(10, table.coeff_count_power());
        });
    }

    #[test]
    fn test_ntt_primitive_roots() {
        let coeff_count_power = 1;
        let modulus = Modulus::new(0xffffffffffc0001).unwrap();
        let tables = NTTTables::new(coeff_count_power, &modulus).unwrap();
        assert_eq!(1, tables.root_powers()[0].operand);
        assert_eq!(288794978602139552, tables.root_powers()[1].operand);
        assert_eq!(288794978602139552, tables.root());
        let inv = util::try_invert_u64_mod(288794978602139552, &modulus).unwrap();
        assert_eq!(inv, tables.inv_root_powers()[1].operand);

        let coeff_count_power = 2;
        let tables = NTTTables::new(coeff_count_power, &modulus).unwrap();
        assert_eq!(288794978602139552, tables.root_powers()[1].operand);
        assert_eq!(178930308976060547, tables.root_powers()[2].operand);
        assert_eq!(748001537669050592, tables.root_powers()[3].operand);

        let degree_times_inverse = util::multiply_u64_mod(4, tables.inv_degree_modulo().operand, &modulus);
        assert_eq!(degree_times_inverse, 1);
    }

    #[test]
    fn test_ntt_rejects_unfriendly_moduli() {
        // 17 is 1 mod 8 but not 1 mod 32
        let modulus = Modulus::new(17).unwrap();
        assert!(NTTTables::new(2, &modulus).is_ok());
        assert!(NTTTables::new(4, &modulus).is_err());
        // composite
        assert!(NTTTables::new(1, &Modulus::new(15).unwrap()).is_err());
        assert!(NTTTables::new(0, &modulus).is_err());
        assert!(NTTTables::create_ntt_tables(2, &[]).is_err());
        assert!(NTTTables::create_ntt_tables(2, &[Modulus::new(17).unwrap(), Modulus::new(19).unwrap()]).is_err());
    }
}
