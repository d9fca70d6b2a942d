//! ASCII folding of quantity-marked Latin text.

use unicode_normalization::UnicodeNormalization;

/// Strips diacritics by NFKD-decomposing `text` and keeping only ASCII
/// code points. Combining marks (macrons, breves) decompose away and any
/// code point outside the basic Latin alphabet is dropped. Newlines
/// survive, so whole source files can be folded in one pass. Idempotent.
pub fn fold(text: &str) -> String {
    text.nfkd().filter(char::is_ascii).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn folds_quantity_marks() {
        assert_eq!(fold("vīta"), "vita");
        assert_eq!(fold("ĭōrĕm"), "iorem");
        assert_eq!(fold("ĕpŭlae"), "epulae");
    }

    #[test]
    fn preserves_plain_ascii_and_structure() {
        assert_eq!(fold("des:1-6:1:a;a;am;ae;ae;a"), "des:1-6:1:a;a;am;ae;ae;a");
        assert_eq!(fold("ā\nē"), "a\ne");
    }

    #[test]
    fn idempotent() {
        let once = fold("plērīquĕ");
        assert_eq!(fold(&once), once);
    }
}
