use sha2::{Digest, Sha256};

const HASH_BLOCK_U64_COUNT: usize = 4;

pub type HashBlock = [u64; HASH_BLOCK_U64_COUNT];

pub const HASH_ZERO_BLOCK: HashBlock = [0; HASH_BLOCK_U64_COUNT];

/// SHA-256 of `input`, read back as four little-endian words.
pub fn hash_bytes(input: &[u8]) -> HashBlock {
    let digest = Sha256::digest(input);
    let mut destination = HASH_ZERO_BLOCK;
    for (word, chunk) in destination.iter_mut().zip(digest.chunks_exact(8)) {
        let mut bytes = [0u8; 8];
        bytes.copy_from_slice(chunk);
        *word = u64::from_le_bytes(bytes);
    }
    destination
}

#[cfg(test)]
pub mod test {
    use super::*;

    fn words(input: &[u64]) -> Vec<u8> {
        input.iter().flat_map(|x| x.to_le_bytes()).collect()
    }

    #[test]
    fn test_hash() {
        assert_eq!(
            hash_bytes(&words(&[1, 2, 3, 4, 5, 6, 7, 8])),
            [0xc91516ef25e48a80, 0x800f0651aad1f12c, 0x52396646e3748df1, 0xfa6485cfcd94ff4e],
        );
        assert_ne!(hash_bytes(&words(&[1, 2, 3])), hash_bytes(&words(&[1, 3, 2])));
        assert_ne!(hash_bytes(&[]), HASH_ZERO_BLOCK);
    }
}
