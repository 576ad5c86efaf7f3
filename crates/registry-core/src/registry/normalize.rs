//! Field canonicalization.
//!
//! Two transforms exist for names: a comparison form (trimmed, lowercased)
//! that the duplicate probes match against, and a display form (title-cased
//! per whitespace word) used for storage. Phone numbers are reduced to their
//! digits and emails are lowercased. Dates of birth are trimmed but never
//! validated or reformatted; a malformed value simply becomes a literal
//! comparison token.
//!
//! Every transform here is pure and idempotent.

use crate::models::PatientDraft;

/// Trim and lowercase.
pub fn fold(s: &str) -> String {
    s.trim().to_lowercase()
}

/// Strip every non-digit character.
pub fn digits_only(s: &str) -> String {
    s.chars().filter(char::is_ascii_digit).collect()
}

/// Title-case each whitespace-delimited word.
pub fn display_case(s: &str) -> String {
    s.split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}

/// The normalized comparison tuple of a patient-like record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComparisonForm {
    pub first_name: String,
    pub last_name: String,
    pub dob: String,
    pub phone: String,
    pub email: String,
}

impl ComparisonForm {
    pub fn new(
        first_name: &str,
        last_name: &str,
        dob: &str,
        phone: Option<&str>,
        email: Option<&str>,
    ) -> Self {
        Self {
            first_name: fold(first_name),
            last_name: fold(last_name),
            dob: dob.trim().to_string(),
            phone: digits_only(phone.unwrap_or("")),
            email: fold(email.unwrap_or("")),
        }
    }

    pub fn of_draft(draft: &PatientDraft) -> Self {
        Self::new(
            &draft.first_name,
            &draft.last_name,
            &draft.dob,
            draft.phone.as_deref(),
            draft.email.as_deref(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_fold() {
        assert_eq!(fold("  Jane "), "jane");
        assert_eq!(fold("DOE"), "doe");
        assert_eq!(fold(""), "");
    }

    #[test]
    fn test_digits_only() {
        assert_eq!(digits_only("+27 (71) 234-5678"), "27712345678");
        assert_eq!(digits_only("071-111-2222"), "0711112222");
        assert_eq!(digits_only("no digits"), "");
    }

    #[test]
    fn test_display_case() {
        assert_eq!(display_case("jane"), "Jane");
        assert_eq!(display_case("VAN DER  merwe"), "Van Der Merwe");
        assert_eq!(display_case("  "), "");
    }

    #[test]
    fn test_dob_is_passed_through_verbatim() {
        // Malformed dates are literal comparison tokens, not errors
        let form = ComparisonForm::new("Jane", "Doe", " 01/02/1990 ", None, None);
        assert_eq!(form.dob, "01/02/1990");
    }

    #[test]
    fn test_comparison_form_of_draft() {
        let draft = PatientDraft {
            first_name: " JANE ".into(),
            last_name: "Doe".into(),
            dob: "1990-01-01".into(),
            phone: Some("+27 (71) 234-5678".into()),
            email: Some(" Jane@Example.COM ".into()),
            ..Default::default()
        };

        let form = ComparisonForm::of_draft(&draft);
        assert_eq!(form.first_name, "jane");
        assert_eq!(form.last_name, "doe");
        assert_eq!(form.dob, "1990-01-01");
        assert_eq!(form.phone, "27712345678");
        assert_eq!(form.email, "jane@example.com");
    }

    proptest! {
        #[test]
        fn prop_fold_idempotent(s in ".{0,40}") {
            prop_assert_eq!(fold(&fold(&s)), fold(&s));
        }

        #[test]
        fn prop_digits_only_idempotent(s in ".{0,40}") {
            prop_assert_eq!(digits_only(&digits_only(&s)), digits_only(&s));
        }

        #[test]
        fn prop_display_case_idempotent(s in "[a-zA-Z '\\-]{0,40}") {
            prop_assert_eq!(display_case(&display_case(&s)), display_case(&s));
        }

        #[test]
        fn prop_display_and_fold_agree(s in "[a-zA-Z ]{0,40}") {
            // Folding the display form gives the same comparison value as
            // folding the raw input, up to interior whitespace
            let direct: String = fold(&s).split_whitespace().collect::<Vec<_>>().join(" ");
            prop_assert_eq!(fold(&display_case(&s)), direct);
        }
    }
}
