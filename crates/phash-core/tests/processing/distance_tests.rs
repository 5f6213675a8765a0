use phash_core::processing::{hamming64, normalized_hamming, DISTANCE_ERROR};

#[test]
fn test_hamming64_identity_and_symmetry() {
    let values = [0u64, 1, 0x8000_0000_0000_0000, 0x0f0f_1234_abcd_ffff, u64::MAX];
    for &a in &values {
        assert_eq!(hamming64(a, a), 0);
        for &b in &values {
            assert_eq!(hamming64(a, b), hamming64(b, a));
            assert!(hamming64(a, b) <= 64);
        }
    }
}

#[test]
fn test_normalized_identity_and_symmetry() {
    let a: Vec<u8> = (0..72).map(|i| (i * 31) as u8).collect();
    let b: Vec<u8> = (0..72).map(|i| (i * 17 + 3) as u8).collect();
    assert_eq!(normalized_hamming(&a, &a), 0.0);
    assert_eq!(normalized_hamming(&a, &b), normalized_hamming(&b, &a));
    assert!((0.0..=1.0).contains(&normalized_hamming(&a, &b)));
}

#[test]
fn test_sentinel_on_bad_lengths() {
    assert_eq!(normalized_hamming(&[1, 2, 3], &[1, 2]), DISTANCE_ERROR);
    assert_eq!(normalized_hamming(&[], &[]), -1.0);
}
