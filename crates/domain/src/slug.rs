use std::iter;

/// Derives a URL slug from a display name.
///
/// The name is lowercased and every character that is not an ASCII letter or
/// digit becomes `-`. Runs of separators are kept as-is, so
/// `"Men's Shoes"` becomes `"men-s-shoes"` and `"A  B"` becomes `"a--b"`.
///
/// Replacement counts UTF-16 code units, so a character outside the Basic
/// Multilingual Plane (most emoji) becomes `--`.
pub fn slugify(name: &str) -> String {
    name.chars()
        .flat_map(char::to_lowercase)
        .flat_map(|c| {
            if c.is_ascii_alphanumeric() {
                iter::repeat_n(c, 1)
            } else {
                iter::repeat_n('-', c.len_utf16())
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lowercases_and_replaces_separators() {
        assert_eq!(slugify("Men's Shoes"), "men-s-shoes");
        assert_eq!(slugify("Electronics"), "electronics");
        assert_eq!(slugify("TV & Audio"), "tv---audio");
    }

    #[test]
    fn non_ascii_becomes_dash() {
        assert_eq!(slugify("Café"), "caf-");
        assert_eq!(slugify("4K Monitors"), "4k-monitors");
    }

    #[test]
    fn astral_characters_take_two_dashes() {
        assert_eq!(slugify("Party 🎉"), "party---");
        assert_eq!(slugify("🎉"), "--");
    }

    #[test]
    fn lowercase_expansion_is_replaced_per_character() {
        // 'İ' lowercases to 'i' followed by a combining dot.
        assert_eq!(slugify("İstanbul"), "i-stanbul");
    }
}
