//! Text utilities: Shannon entropy and a stable non-cryptographic hash.

use std::collections::BTreeMap;

/// FNV-1a 32-bit offset basis.
const FNV_OFFSET: u32 = 0x811c_9dc5;
/// FNV-1a 32-bit prime.
const FNV_PRIME: u32 = 0x0100_0193;

/// Shannon entropy, in bits, of the character distribution of `s`.
///
/// Frequencies are summed in character order so the result is bit-stable
/// across runs. Empty input has entropy 0.
pub fn text_entropy(s: &str) -> f64 {
    let mut freq: BTreeMap<char, usize> = BTreeMap::new();
    for ch in s.chars() {
        *freq.entry(ch).or_default() += 1;
    }
    let n = freq.values().sum::<usize>() as f64;
    freq.values()
        .map(|&count| {
            let p = count as f64 / n;
            -p * p.log2()
        })
        .sum()
}

/// FNV-1a 32-bit hash of `s` as lowercase hex without padding.
///
/// The hash runs over UTF-16 code units, one unit per step.
pub fn hash_str(s: &str) -> String {
    format!("{:x}", fnv1a_utf16(s))
}

fn fnv1a_utf16(s: &str) -> u32 {
    s.encode_utf16().fold(FNV_OFFSET, |h, unit| {
        (h ^ u32::from(unit)).wrapping_mul(FNV_PRIME)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f64 = 1e-12;

    // -- text_entropy --

    #[test]
    fn entropy_of_repeated_symbol_is_zero() {
        assert_eq!(text_entropy("aaaa"), 0.0);
    }

    #[test]
    fn entropy_of_two_equiprobable_symbols_is_one_bit() {
        assert!((text_entropy("ab") - 1.0).abs() < EPSILON);
        assert!((text_entropy("abab") - 1.0).abs() < EPSILON);
    }

    #[test]
    fn entropy_of_four_equiprobable_symbols_is_two_bits() {
        assert!((text_entropy("abcd") - 2.0).abs() < EPSILON);
    }

    #[test]
    fn entropy_of_empty_string_is_zero() {
        assert_eq!(text_entropy(""), 0.0);
    }

    #[test]
    fn entropy_counts_characters_not_bytes() {
        // Two distinct multi-byte characters, equally frequent.
        assert!((text_entropy("éü") - 1.0).abs() < EPSILON);
    }

    // -- hash_str --

    #[test]
    fn hash_of_empty_string_is_offset_basis() {
        assert_eq!(hash_str(""), "811c9dc5");
    }

    #[test]
    fn hash_matches_reference_vectors() {
        assert_eq!(hash_str("a"), "e40c292c");
        assert_eq!(hash_str("foobar"), "bf9cf968");
    }

    #[test]
    fn hash_is_stable_and_lowercase() {
        let a = hash_str("procedural");
        let b = hash_str("procedural");
        assert_eq!(a, b);
        assert!(a.chars().all(|c| c.is_ascii_digit() || ('a'..='f').contains(&c)));
    }

    #[test]
    fn hash_distinguishes_inputs() {
        assert_ne!(hash_str("flow"), hash_str("flux"));
    }
}
