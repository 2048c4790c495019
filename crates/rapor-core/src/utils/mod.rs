//! String normalization helpers
//!
//! Directory group and person names arrive with inconsistent casing and
//! Turkish/Latin diacritics depending on which environment produced them.
//! All lookups and comparisons go through `normalize` so that
//! "İstanbul Şube" and "istanbul sube" resolve to the same record.

/// Diacritic-fold and lower-case a string for comparison and storage in
/// `normalized_*` columns.
pub fn normalize(s: &str) -> String {
    s.chars().filter_map(fold_char).collect()
}

fn fold_char(c: char) -> Option<char> {
    let folded = match c {
        // Turkish
        'ç' | 'Ç' => 'c',
        'ğ' | 'Ğ' => 'g',
        'ı' | 'İ' => 'i',
        'ö' | 'Ö' => 'o',
        'ş' | 'Ş' => 's',
        'ü' | 'Ü' => 'u',
        // Common Latin diacritics
        'á' | 'à' | 'â' | 'ä' | 'ã' | 'å' | 'Á' | 'À' | 'Â' | 'Ä' | 'Ã' | 'Å' => 'a',
        'é' | 'è' | 'ê' | 'ë' | 'É' | 'È' | 'Ê' | 'Ë' => 'e',
        'í' | 'ì' | 'î' | 'ï' | 'Í' | 'Ì' | 'Î' | 'Ï' => 'i',
        'ó' | 'ò' | 'ô' | 'õ' | 'Ó' | 'Ò' | 'Ô' | 'Õ' => 'o',
        'ú' | 'ù' | 'û' | 'Ú' | 'Ù' | 'Û' => 'u',
        'ñ' | 'Ñ' => 'n',
        'ý' | 'ÿ' | 'Ý' => 'y',
        // Combining marks left over from decomposed input
        '\u{0300}'..='\u{036f}' => return None,
        other => other.to_ascii_lowercase(),
    };
    Some(folded)
}

/// Upper-case the first letter and lower-case the rest.
///
/// Used for the first-name fallback derived from a logon name.
pub fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_folds_turkish_characters() {
        assert_eq!(normalize("İstanbul Şube"), "istanbul sube");
        assert_eq!(normalize("YÖNETİCİLER"), "yoneticiler");
        assert_eq!(normalize("Çağrı Gül"), "cagri gul");
    }

    #[test]
    fn normalize_folds_latin_diacritics() {
        assert_eq!(normalize("José Müller"), "jose muller");
        assert_eq!(normalize("FRANÇOIS"), "francois");
    }

    #[test]
    fn normalize_strips_combining_marks() {
        // "i" followed by a combining dot above, as produced by NFD input
        assert_eq!(normalize("i\u{0307}stanbul"), "istanbul");
    }

    #[test]
    fn normalize_leaves_plain_ascii_lowercased() {
        assert_eq!(normalize("Domain Admins"), "domain admins");
    }

    #[test]
    fn capitalize_handles_usernames() {
        assert_eq!(capitalize("jdoe"), "Jdoe");
        assert_eq!(capitalize("MKAYA"), "Mkaya");
        assert_eq!(capitalize(""), "");
    }
}
