//! # Input Generation
//!
//! Seeded generator producing inputs shaped for each precompile, so most
//! calls get past input validation and exercise the arithmetic. A share of
//! calls can be replaced by unstructured bytes.

use hex_literal::hex;
use rand::{rngs::StdRng, Rng, SeedableRng};

/// Default seed, so runs are reproducible unless told otherwise.
pub const DEFAULT_SEED: u64 = 42;

/// Default upper bound for unstructured inputs.
pub const DEFAULT_MAX_LEN: usize = 256;

/// alt_bn128 G1 generator (1, 2).
const G1_GENERATOR: [u8; 64] = {
    let mut point = [0u8; 64];
    point[31] = 1;
    point[63] = 2;
    point
};

/// alt_bn128 G2 generator, imaginary part first (EIP-197 encoding).
const G2_GENERATOR: [[u8; 32]; 4] = [
    hex!("198e9393920d483a7260bfb731fb5d25f1aa493335a9e71297e485b7aef312c2"),
    hex!("1800deef121f1e76426a00665e5c4479674322d4f75edadd46debd5cd992f6ed"),
    hex!("090689d0585ff075ec9e99ad690c3395bc4b313370b38ef355acdadcd122975b"),
    hex!("12c85ea5db8c6deb4aab71808dcb408fe3d1e7690c43d37b4ce6cc0166fa7daa"),
];

/// Produces precompile inputs from a seeded RNG.
pub struct InputGenerator {
    rng: StdRng,
    invalid_ratio: f64,
    max_len: usize,
}

impl InputGenerator {
    /// Generator with `seed`, no invalid inputs, default max length.
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            invalid_ratio: 0.0,
            max_len: DEFAULT_MAX_LEN,
        }
    }

    /// Share of calls (0.0 to 1.0) that get unstructured bytes.
    #[must_use]
    pub fn with_invalid_ratio(mut self, ratio: f64) -> Self {
        self.invalid_ratio = if ratio.is_finite() { ratio.clamp(0.0, 1.0) } else { 0.0 };
        self
    }

    /// Upper bound for unstructured inputs.
    #[must_use]
    pub fn with_max_len(mut self, max_len: usize) -> Self {
        self.max_len = max_len;
        self
    }

    /// Next input for `address`.
    pub fn next_input(&mut self, address: u8) -> Vec<u8> {
        if self.rng.gen_bool(self.invalid_ratio) {
            return self.random_bytes();
        }

        match address {
            0x01 => self.ecrecover(),
            0x05 => self.modexp(),
            0x06 => self.bn256_add(),
            0x07 => self.bn256_mul(),
            0x08 => self.bn256_pairing(),
            0x09 => self.blake2f(),
            _ => self.random_bytes(),
        }
    }

    fn random_bytes(&mut self) -> Vec<u8> {
        let len = self.rng.gen_range(0..=self.max_len);
        self.fill(len)
    }

    fn fill(&mut self, len: usize) -> Vec<u8> {
        let mut buf = vec![0u8; len];
        self.rng.fill(buf.as_mut_slice());
        buf
    }

    fn word(&mut self) -> [u8; 32] {
        self.rng.gen()
    }

    fn small_word(value: u64) -> [u8; 32] {
        let mut word = [0u8; 32];
        word[24..].copy_from_slice(&value.to_be_bytes());
        word
    }

    /// hash, v (27 or 28), r, s.
    fn ecrecover(&mut self) -> Vec<u8> {
        let mut input = Vec::with_capacity(128);
        input.extend_from_slice(&self.word());
        input.extend_from_slice(&Self::small_word(self.rng.gen_range(27..=28)));
        input.extend_from_slice(&self.word());
        input.extend_from_slice(&self.word());
        input
    }

    /// Three 32-byte lengths, then base, exponent and modulus.
    fn modexp(&mut self) -> Vec<u8> {
        let lens: [usize; 3] = [
            self.rng.gen_range(0..=64),
            self.rng.gen_range(0..=32),
            self.rng.gen_range(0..=64),
        ];
        let mut input = Vec::with_capacity(96 + lens.iter().sum::<usize>());
        for len in lens {
            input.extend_from_slice(&Self::small_word(len as u64));
        }
        for len in lens {
            let bytes = self.fill(len);
            input.extend_from_slice(&bytes);
        }
        input
    }

    /// Either the generator or the point at infinity.
    fn g1(&mut self) -> [u8; 64] {
        if self.rng.gen_bool(0.8) {
            G1_GENERATOR
        } else {
            [0u8; 64]
        }
    }

    fn bn256_add(&mut self) -> Vec<u8> {
        let mut input = Vec::with_capacity(128);
        input.extend_from_slice(&self.g1());
        input.extend_from_slice(&self.g1());
        input
    }

    fn bn256_mul(&mut self) -> Vec<u8> {
        let mut input = Vec::with_capacity(96);
        input.extend_from_slice(&self.g1());
        input.extend_from_slice(&self.word());
        input
    }

    /// Up to four (G1, G2) pairs built from the generators.
    fn bn256_pairing(&mut self) -> Vec<u8> {
        let pairs = self.rng.gen_range(0..=4);
        let mut input = Vec::with_capacity(pairs * 192);
        for _ in 0..pairs {
            input.extend_from_slice(&self.g1());
            for coordinate in &G2_GENERATOR {
                input.extend_from_slice(coordinate);
            }
        }
        input
    }

    /// rounds (BE u32), h, m, t, final flag.
    fn blake2f(&mut self) -> Vec<u8> {
        let rounds: u32 = self.rng.gen_range(0..=24);
        let mut input = Vec::with_capacity(213);
        input.extend_from_slice(&rounds.to_be_bytes());
        let state = self.fill(64 + 128 + 16);
        input.extend_from_slice(&state);
        input.push(u8::from(self.rng.gen_bool(0.5)));
        input
    }
}

impl Default for InputGenerator {
    fn default() -> Self {
        Self::new(DEFAULT_SEED)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_seed_same_inputs() {
        let mut a = InputGenerator::new(7);
        let mut b = InputGenerator::new(7);
        for address in 1..=9 {
            assert_eq!(a.next_input(address), b.next_input(address));
        }
    }

    #[test]
    fn test_fixed_size_shapes() {
        let mut generator = InputGenerator::default();
        for _ in 0..20 {
            assert_eq!(generator.next_input(0x01).len(), 128);
            assert_eq!(generator.next_input(0x06).len(), 128);
            assert_eq!(generator.next_input(0x07).len(), 96);
            assert_eq!(generator.next_input(0x08).len() % 192, 0);

            let blake = generator.next_input(0x09);
            assert_eq!(blake.len(), 213);
            assert!(blake[212] <= 1);
        }
    }

    #[test]
    fn test_ecrecover_v_byte() {
        let mut generator = InputGenerator::new(1);
        let input = generator.next_input(0x01);
        assert!(input[32..63].iter().all(|&b| b == 0));
        assert!(input[63] == 27 || input[63] == 28);
    }

    #[test]
    fn test_modexp_lengths_match_body() {
        let mut generator = InputGenerator::new(3);
        let input = generator.next_input(0x05);
        let len = |i: usize| {
            let word: [u8; 8] = input[i * 32 + 24..i * 32 + 32].try_into().unwrap();
            u64::from_be_bytes(word) as usize
        };
        assert_eq!(input.len(), 96 + len(0) + len(1) + len(2));
    }

    #[test]
    fn test_random_bytes_respect_max_len() {
        let mut generator = InputGenerator::new(5).with_max_len(8);
        for _ in 0..50 {
            assert!(generator.next_input(0x02).len() <= 8);
        }
    }

    #[test]
    fn test_invalid_ratio_one_is_unstructured() {
        let mut generator = InputGenerator::new(11).with_invalid_ratio(1.0).with_max_len(4);
        for _ in 0..20 {
            assert!(generator.next_input(0x01).len() <= 4);
        }
    }

    #[test]
    fn test_g2_generator_constant() {
        let x_imaginary = "198e9393920d483a7260bfb731fb5d25f1aa493335a9e71297e485b7aef312c2";
        let x_imaginary = hex::decode(x_imaginary).unwrap();
        assert_eq!(G2_GENERATOR[0].to_vec(), x_imaginary);
        assert_eq!(G2_GENERATOR[3][31], 0xaa);

        let mut generator = InputGenerator::new(9);
        let pairing = (0..20)
            .map(|_| generator.next_input(0x08))
            .find(|input| !input.is_empty())
            .unwrap();
        assert_eq!(&pairing[64..96], &G2_GENERATOR[0]);
    }
}
