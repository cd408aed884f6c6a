//! Text normalization for word and sort indexes
//!
//! Every char outside the kept class is either blankified, replaced by an
//! unaccented equivalent, or dropped, in that order of precedence.

/// Chars turned into blanks in most situations
const BASE_BLANKIFIED: &str = ".,:;*+=~?%^'\u{2019}\"<>{}[]#|\t\\\u{b0}-\u{2011}";

/// Extra chars blankified when extracting text
const TEXT_BLANKIFIED: &str = "\n/()_";

/// Text normalizer
pub struct Normalize;

/// Whether `c` is kept as is
fn kept(c: char, keep_dash: bool, keep_blank: bool) -> bool {
    c.is_ascii_alphanumeric() || (keep_blank && c == ' ') || (keep_dash && c == '-')
}

/// Replacement for accented Latin-1 chars and char variants
fn replacement(c: char) -> Option<&'static str> {
    let r = match c {
        'À' | 'Á' | 'Â' | 'Ã' | 'Ä' | 'Å' => "A",
        'à' | 'á' | 'â' | 'ã' | 'ä' | 'å' => "a",
        'Æ' => "AE",
        'æ' => "ae",
        'Œ' => "OE",
        'œ' => "oe",
        'Ç' => "C",
        'ç' => "c",
        'Ð' => "D",
        'ß' => "S",
        'È' | 'É' | 'Ê' | 'Ë' => "E",
        'è' | 'é' | 'ê' | 'ë' => "e",
        'Ì' | 'Í' | 'Î' | 'Ï' => "I",
        'ì' | 'í' | 'î' | 'ï' => "i",
        'Ñ' => "N",
        'ñ' => "n",
        'Ò' | 'Ó' | 'Ô' | 'Õ' | 'Ö' | 'Ø' => "O",
        'ò' | 'ó' | 'ô' | 'õ' | 'ö' | 'ð' | 'ø' => "o",
        'Ù' | 'Ú' | 'Û' | 'Ü' => "U",
        'ù' | 'ú' | 'û' | 'ü' => "u",
        'Ý' => "Y",
        'ý' | 'ÿ' => "y",
        '\u{a0}' => " ",
        '\u{2011}' => "-",
        _ => return None,
    };
    Some(r)
}

fn blankified(c: char, keep_dash: bool) -> bool {
    if keep_dash && (c == '-' || c == '\u{2011}') {
        return false;
    }
    BASE_BLANKIFIED.contains(c) || TEXT_BLANKIFIED.contains(c)
}

impl Normalize {
    /// Normalizes `s` for keyword indexing or search terms.
    ///
    /// Accents are removed and punctuation becomes blanks. Dashes are kept
    /// only when `keep_dash` is set; other blanks are kept only when
    /// `keep_blank` is set.
    ///
    /// ```text
    /// Jean-François (keep_dash)  -> jean-francois
    /// Jean-François              -> jean francois
    /// ```
    pub fn text(s: &str, lower: bool, keep_dash: bool, keep_blank: bool) -> String {
        let mut r = String::with_capacity(s.len());
        for c in s.chars() {
            if kept(c, keep_dash, keep_blank) {
                r.push(c);
            } else if blankified(c, keep_dash) {
                r.push(' ');
            } else if let Some(replaced) = replacement(c) {
                r.push_str(replaced);
            }
        }
        if lower {
            r.make_ascii_lowercase();
        }
        r
    }
}
