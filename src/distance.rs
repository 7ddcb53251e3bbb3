//! Hamming distance primitives.
//!
//! Placement quality is measured in bit flips: the number of bits that
//! differ between a write buffer and a page's current content. That is the
//! population count of the bytewise XOR of the two buffers.

/// Count the differing bits between two equal-length byte slices.
///
/// Scans eight bytes at a time and falls back to a byte loop for the tail.
#[inline]
pub fn hamming_distance(a: &[u8], b: &[u8]) -> u32 {
    debug_assert_eq!(a.len(), b.len(), "Hamming distance requires equal lengths");

    let mut flips = 0u32;

    let mut a_chunks = a.chunks_exact(8);
    let mut b_chunks = b.chunks_exact(8);
    for (ca, cb) in (&mut a_chunks).zip(&mut b_chunks) {
        let xa = u64::from_le_bytes(ca.try_into().unwrap());
        let xb = u64::from_le_bytes(cb.try_into().unwrap());
        flips += (xa ^ xb).count_ones();
    }

    for (&x, &y) in a_chunks.remainder().iter().zip(b_chunks.remainder()) {
        flips += (x ^ y).count_ones();
    }

    flips
}

/// Fraction of differing bits between two equal-length byte slices, in `[0, 1]`.
///
/// Returns `0.0` for empty slices.
pub fn hamming_ratio(a: &[u8], b: &[u8]) -> f64 {
    let total_bits = (a.len() * 8) as f64;
    if total_bits == 0.0 {
        return 0.0;
    }
    hamming_distance(a, b) as f64 / total_bits
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identical_buffers() {
        let a = vec![0xABu8; 37];
        assert_eq!(hamming_distance(&a, &a), 0);
    }

    #[test]
    fn test_complement_buffers() {
        let a = vec![0x00u8; 16];
        let b = vec![0xFFu8; 16];
        assert_eq!(hamming_distance(&a, &b), 128);
        assert_eq!(hamming_ratio(&a, &b), 1.0);
    }

    #[test]
    fn test_single_bit() {
        let a = [0u8; 9];
        let mut b = [0u8; 9];
        b[8] = 0b0000_0100; // lands in the chunk remainder
        assert_eq!(hamming_distance(&a, &b), 1);
    }

    #[test]
    fn test_matches_byte_loop() {
        // Cross-check the chunked scan against the obvious per-byte loop.
        let a: Vec<u8> = (0..100).map(|i| (i * 31) as u8).collect();
        let b: Vec<u8> = (0..100).map(|i| (i * 57 + 3) as u8).collect();

        let reference: u32 = a
            .iter()
            .zip(b.iter())
            .map(|(&x, &y)| (x ^ y).count_ones())
            .sum();
        assert_eq!(hamming_distance(&a, &b), reference);
    }

    #[test]
    fn test_empty() {
        assert_eq!(hamming_distance(&[], &[]), 0);
        assert_eq!(hamming_ratio(&[], &[]), 0.0);
    }
}
