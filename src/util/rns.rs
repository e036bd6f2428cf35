use crate::{
    error::{Error, Result},
    util::{self, MultiplyU64ModOperand},
    Modulus,
};

/**
A residue number system basis: pairwise-coprime moduli together with the
punctured products and their inverses needed for CRT composition.
*/
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RNSBase {
    base: Vec<Modulus>,
    base_prod: Vec<u64>,
    punctured_prod: Vec<Vec<u64>>,
    inv_punctured_prod_mod_base: Vec<MultiplyU64ModOperand>,
}

fn multiply_many_u64_except(operands: &[u64], except: usize, result: &mut [u64]) {
    let others = operands.iter().enumerate()
        .filter(|(i, _)| *i != except)
        .map(|(_, &x)| x)
        .collect::<Vec<_>>();
    if others.is_empty() {
        result.fill(0);
        result[0] = 1;
    } else {
        util::multiply_many_u64(&others, result);
    }
}

impl RNSBase {

    pub fn new(rnsbase: &[Modulus]) -> Result<Self> {
        if rnsbase.is_empty() {
            return Err(Error::invalid_argument("RNSBase cannot be empty"));
        }
        for (i, modulus) in rnsbase.iter().enumerate() {
            if modulus.is_zero() {
                return Err(Error::invalid_argument("RNSBase modulus cannot be zero"));
            }
            if rnsbase[..i].iter().any(|other| !util::are_coprime(modulus.value(), other.value())) {
                return Err(Error::invalid_argument("RNSBase moduli must be pairwise coprime"));
            }
        }
        Self::initialize(rnsbase.to_vec())
    }

    fn initialize(base: Vec<Modulus>) -> Result<Self> {
        let n = base.len();
        let values = base.iter().map(|x| x.value()).collect::<Vec<_>>();

        let mut punctured_prod = vec![vec![0; n]; n];
        for (i, prod) in punctured_prod.iter_mut().enumerate() {
            multiply_many_u64_except(&values, i, prod);
        }

        let mut base_prod = vec![0; n];
        util::multiply_uint_u64(&punctured_prod[0], values[0], &mut base_prod);

        let inv_punctured_prod_mod_base = punctured_prod.iter().zip(base.iter())
            .map(|(prod, modulus)| {
                let temp = util::modulo_uint(prod, modulus);
                util::try_invert_u64_mod(temp, modulus)
                    .map(|inv| MultiplyU64ModOperand::new(inv, modulus))
                    .ok_or_else(|| Error::invalid_argument("RNSBase product is not invertible"))
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(RNSBase { base, base_prod, punctured_prod, inv_punctured_prod_mod_base })
    }

    pub fn contains(&self, modulus: &Modulus) -> bool {
        self.base.iter().any(|x| x == modulus)
    }

    pub fn is_subbase_of(&self, superbase: &Self) -> bool {
        self.base.iter().all(|x| superbase.contains(x))
    }

    pub fn is_proper_subbase_of(&self, superbase: &Self) -> bool {
        self.base.len() < superbase.base.len() && self.is_subbase_of(superbase)
    }

    pub fn drop(&self, modulus: &Modulus) -> Result<Self> {
        if self.base.len() == 1 {
            return Err(Error::logic_error("cannot drop the only modulus"));
        }
        if !self.contains(modulus) {
            return Err(Error::logic_error("does not contain this modulus"));
        }
        Self::initialize(self.base.iter().filter(|&x| x != modulus).copied().collect())
    }

    pub fn drop_last(&self) -> Result<Self> {
        match self.base.last() {
            Some(&last) => self.drop(&last),
            None => Err(Error::logic_error("cannot drop from an empty base")),
        }
    }

    /// Replaces a multi-word integer (one word per modulus) by its residues.
    pub fn decompose(&self, value: &mut [u64]) {
        assert_eq!(value.len(), self.base.len(), "[Invalid argument] Value should have same length as base.");
        if self.base.len() > 1 {
            let copied = value.to_vec();
            for (residue, modulus) in value.iter_mut().zip(self.base.iter()) {
                *residue = util::modulo_uint(&copied, modulus);
            }
        }
    }

    /// Inverse of [RNSBase::decompose] by CRT reconstruction.
    pub fn compose(&self, value: &mut [u64]) {
        assert_eq!(value.len(), self.base.len(), "[Invalid argument] Value should have same length as base.");
        let size = self.base.len();
        if size > 1 {
            let residues = value.to_vec();
            value.fill(0);
            let mut temp_mpi = vec![0; size];
            for i in 0..size {
                let temp_prod = util::multiply_u64operand_mod(residues[i],
                    &self.inv_punctured_prod_mod_base[i], &self.base[i]);
                util::multiply_uint_u64(&self.punctured_prod[i], temp_prod, &mut temp_mpi);
                util::add_uint_mod_inplace(value, &temp_mpi, &self.base_prod);
            }
        }
    }

    pub fn len(&self) -> usize {self.base.len()}
    pub fn is_empty(&self) -> bool {self.base.is_empty()}
    pub fn punctured_prod(&self) -> &[Vec<u64>] {&self.punctured_prod}
    pub fn base(&self) -> &[Modulus] {&self.base}
    pub fn inv_punctured_prod_mod_base(&self) -> &[MultiplyU64ModOperand] {&self.inv_punctured_prod_mod_base}
    pub fn base_prod(&self) -> &[u64] {&self.base_prod}

}

impl std::ops::Index<usize> for RNSBase {
    type Output = Modulus;
    fn index(&self, index: usize) -> &Self::Output {
        &self.base[index]
    }
}

/**
Descriptor for converting RNS values from `ibase` to `obase`.
Row `i` of the base change matrix holds every punctured product of `ibase`
reduced modulo the `i`-th modulus of `obase`.
*/
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BaseConverter {
    ibase: RNSBase,
    obase: RNSBase,
    base_change_matrix: Vec<Vec<u64>>,
}

impl BaseConverter {

    pub fn new(ibase: &RNSBase, obase: &RNSBase) -> Self {
        let base_change_matrix = obase.base().iter()
            .map(|out_modulus| {
                ibase.punctured_prod().iter()
                    .map(|prod| util::modulo_uint(prod, out_modulus))
                    .collect()
            })
            .collect();
        BaseConverter {
            ibase: ibase.clone(),
            obase: obase.clone(),
            base_change_matrix,
        }
    }

    pub fn ibase(&self) -> &RNSBase {&self.ibase}
    pub fn obase(&self) -> &RNSBase {&self.obase}
    pub fn base_change_matrix(&self) -> &[Vec<u64>] {&self.base_change_matrix}

}
