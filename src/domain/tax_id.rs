//! Synthetic CPF generation and checksum validation.
//!
//! The Pix rail requires a payer tax identifier for risk screening. The storefront
//! never collects one, so a structurally valid CPF is generated per payment. It only
//! needs to pass the modulus-11 checksum; it does not identify a real person.

use rand::Rng;
use std::fmt;

const BASE_LEN: usize = 9;
const CPF_LEN: usize = 11;

/// An 11-digit CPF whose two trailing check digits satisfy the modulus-11 checksum.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyntheticTaxId(String);

impl SyntheticTaxId {
    /// Draws a fresh identifier from the thread-local RNG.
    pub fn generate() -> Self {
        Self::generate_with(&mut rand::thread_rng())
    }

    pub fn generate_with<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let mut base = [0u8; BASE_LEN];
        loop {
            for d in base.iter_mut() {
                *d = rng.gen_range(0..10);
            }
            // Repeated-digit sequences pass the checksum but are refused by risk screening.
            if base.iter().any(|&d| d != base[0]) {
                break;
            }
        }
        Self::from_base(base)
    }

    /// Completes nine base digits with their two check digits.
    pub fn from_base(base: [u8; BASE_LEN]) -> Self {
        let (v1, v2) = check_digits(&base);
        let digits: String = base
            .iter()
            .chain([v1, v2].iter())
            .map(|d| char::from(b'0' + d))
            .collect();
        Self(digits)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn check_digits(&self) -> (u8, u8) {
        let bytes = self.0.as_bytes();
        (bytes[9] - b'0', bytes[10] - b'0')
    }
}

impl fmt::Display for SyntheticTaxId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Recomputes both check digits from the first nine digits of `s` and compares them
/// to the trailing two. Anything that is not exactly eleven ASCII digits is rejected.
pub fn validate(s: &str) -> bool {
    if s.len() != CPF_LEN || !s.bytes().all(|b| b.is_ascii_digit()) {
        return false;
    }
    let digits: Vec<u8> = s.bytes().map(|b| b - b'0').collect();
    let mut base = [0u8; BASE_LEN];
    base.copy_from_slice(&digits[..BASE_LEN]);
    check_digits(&base) == (digits[9], digits[10])
}

fn check_digits(base: &[u8; BASE_LEN]) -> (u8, u8) {
    let v1 = mod11_digit(base.iter().copied(), 10);
    let v2 = mod11_digit(base.iter().copied().chain(std::iter::once(v1)), 11);
    (v1, v2)
}

/// Weighted sum with weights descending from `first_weight`, reduced modulo 11.
/// A remainder of 0 or 1 yields a raw digit of 11 or 10, which collapses to 0.
fn mod11_digit(digits: impl Iterator<Item = u8>, first_weight: u32) -> u8 {
    let sum: u32 = digits
        .zip((2..=first_weight).rev())
        .map(|(d, w)| u32::from(d) * w)
        .sum();
    let v = 11 - sum % 11;
    if v >= 10 { 0 } else { v as u8 }
}
