//! Grouping keys for subject labels.
//!
//! Learners and content authors type the same subject in different ways
//! ("Chemistry", "chemistry ", "Chémistry"). Summaries group by a key that is
//! lenient on case, accents and whitespace.

use unicode_normalization::UnicodeNormalization;

/// Normalize a label into a grouping key.
///
/// Applies, in order: lowercase, ligature expansion, NFD decomposition,
/// removal of combining marks and punctuation, whitespace collapse.
pub fn grouping_key(s: &str) -> String {
    s.to_lowercase()
        .replace('ß', "ss")
        .replace('æ', "ae")
        .replace('œ', "oe")
        .nfd()
        .filter(|c| c.is_alphanumeric() || c.is_whitespace())
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_case_and_whitespace() {
        assert_eq!(grouping_key("Organic  Chemistry "), "organic chemistry");
        assert_eq!(grouping_key("ORGANIC chemistry"), grouping_key("organic Chemistry"));
    }

    #[test]
    fn test_accents() {
        assert_eq!(grouping_key("Géographie"), "geographie");
        assert_eq!(grouping_key("Straße"), "strasse");
    }

    #[test]
    fn test_punctuation() {
        assert_eq!(grouping_key("Maths (Paper-I)"), "maths paperi");
    }

    #[test]
    fn test_distinct_subjects_stay_distinct() {
        assert_ne!(grouping_key("Physics"), grouping_key("Physical Education"));
    }

    #[test]
    fn test_empty() {
        assert_eq!(grouping_key(""), "");
        assert_eq!(grouping_key("  "), "");
    }
}
