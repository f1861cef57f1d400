//! Shannon entropy over the characters of a string.

use std::collections::BTreeMap;

/// Shannon entropy (base 2) of the character distribution of `s`.
///
/// Returns 0.0 for the empty string. Counts are summed in character order so
/// repeated calls on the same input produce bit-identical results.
pub fn shannon_entropy(s: &str) -> f64 {
    let mut counts: BTreeMap<char, usize> = BTreeMap::new();
    let mut total = 0usize;
    for c in s.chars() {
        *counts.entry(c).or_insert(0) += 1;
        total += 1;
    }
    if total == 0 {
        return 0.0;
    }

    let len = total as f64;
    let mut entropy = 0.0f64;
    for &count in counts.values() {
        let p = count as f64 / len;
        entropy -= p * p.log2();
    }
    entropy
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_string_has_zero_entropy() {
        assert_eq!(shannon_entropy(""), 0.0);
    }

    #[test]
    fn single_symbol_has_zero_entropy() {
        assert_eq!(shannon_entropy("aaaa"), 0.0);
    }

    #[test]
    fn two_equiprobable_symbols_is_one_bit() {
        assert_eq!(shannon_entropy("ab"), 1.0);
        assert_eq!(shannon_entropy("abab"), 1.0);
    }

    #[test]
    fn four_equiprobable_symbols_is_two_bits() {
        assert!((shannon_entropy("abcd") - 2.0).abs() < 1e-12);
    }

    #[test]
    fn counts_unicode_scalars_not_bytes() {
        // Two distinct scalars, each multi-byte in UTF-8.
        assert_eq!(shannon_entropy("éü"), 1.0);
    }
}
