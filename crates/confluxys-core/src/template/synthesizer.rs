//! One-shot pattern synthesis from a highlighted example.
//!
//! The literal text around the example anchors the match, and the example
//! value itself is generalized into a capture group chosen from its shape.
//! A single example is all there is to go on, so a value that is numeric by
//! accident produces a numeric-only pattern.

use tracing::debug;

use super::patterns::{
    DECIMAL_CAPTURE, DECIMAL_VALUE, INTEGER_CAPTURE, INTEGER_VALUE, NON_IDENTIFIER,
    PHRASE_CAPTURE, TABLE_PREFIX, TOKEN_CAPTURE,
};

/// Shape of an example value, deciding its capture group.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueShape {
    /// Digits only.
    Integer,
    /// Digits, a dot, digits.
    Decimal,
    /// Several space-separated tokens.
    Phrase,
    /// One token.
    Token,
}

impl ValueShape {
    /// Classify an example value, most specific rule first.
    pub fn classify(value: &str) -> Self {
        if INTEGER_VALUE.is_match(value) {
            ValueShape::Integer
        } else if DECIMAL_VALUE.is_match(value) {
            ValueShape::Decimal
        } else if value.trim().contains(' ') {
            ValueShape::Phrase
        } else {
            ValueShape::Token
        }
    }

    /// The capture group that generalizes values of this shape.
    pub fn capture_group(&self) -> &'static str {
        match self {
            ValueShape::Integer => INTEGER_CAPTURE,
            ValueShape::Decimal => DECIMAL_CAPTURE,
            ValueShape::Phrase => PHRASE_CAPTURE,
            ValueShape::Token => TOKEN_CAPTURE,
        }
    }
}

/// Build a pattern that captures `value` wherever `context` recurs.
///
/// Uses the first occurrence of `value`. If `value` does not occur at all,
/// the escaped context is returned with any escaped occurrence of the value
/// swapped for a lazy capture group.
pub fn synthesize_pattern(context: &str, value: &str) -> String {
    let Some(start) = context.find(value) else {
        debug!("Example value not found in context, using literal fallback");
        return regex::escape(context).replace(&regex::escape(value), PHRASE_CAPTURE);
    };

    let before = &context[..start];
    let after = &context[start + value.len()..];
    let shape = ValueShape::classify(value);

    format!(
        "{}{}{}",
        regex::escape(before),
        shape.capture_group(),
        regex::escape(after)
    )
}

/// Column name for a field: non-identifier characters become `_`, lower-cased.
pub fn column_name(field_name: &str) -> String {
    NON_IDENTIFIER.replace_all(field_name, "_").to_lowercase()
}

/// Table name for a document type.
pub fn table_name(type_name: &str) -> String {
    format!("{}{}", TABLE_PREFIX, column_name(type_name))
}

#[cfg(test)]
mod tests {
    use super::*;
    use regex::RegexBuilder;

    fn capture(pattern: &str, text: &str) -> Option<String> {
        let re = RegexBuilder::new(pattern)
            .case_insensitive(true)
            .multi_line(true)
            .build()
            .unwrap();
        re.captures(text)
            .and_then(|c| c.get(1))
            .map(|m| m.as_str().trim().to_string())
    }

    #[test]
    fn test_integer_round_trip() {
        let pattern = synthesize_pattern("Total: 42 USD", "42");
        assert_eq!(pattern, r"Total: (\d+) USD");
        assert_eq!(capture(&pattern, "Total: 42 USD").as_deref(), Some("42"));
        assert_eq!(capture(&pattern, "Total: 99 USD").as_deref(), Some("99"));
    }

    #[test]
    fn test_decimal_capture() {
        let pattern = synthesize_pattern("Price: 12.50 EUR", "12.50");
        assert_eq!(pattern, r"Price: (\d+\.?\d*) EUR");
        assert_eq!(capture(&pattern, "Price: 7.25 EUR").as_deref(), Some("7.25"));
        assert_eq!(capture(&pattern, "Price: 8 EUR").as_deref(), Some("8"));
    }

    #[test]
    fn test_phrase_capture_is_lazy() {
        let pattern = synthesize_pattern("Author: Jane Doe\nYear", "Jane Doe");
        assert_eq!(pattern, "Author: (.+?)\nYear");
        assert_eq!(
            capture(&pattern, "Author: Emily Brontë Smith\nYear: 1847").as_deref(),
            Some("Emily Brontë Smith")
        );
    }

    #[test]
    fn test_token_capture() {
        let pattern = synthesize_pattern("Invoice No: INV-2024/001 issued", "INV-2024/001");
        assert_eq!(pattern, r"Invoice No: (\S+) issued");
        assert_eq!(
            capture(&pattern, "invoice no: X-9 issued").as_deref(),
            Some("X-9")
        );
    }

    #[test]
    fn test_metacharacters_are_literal() {
        let pattern = synthesize_pattern("Cost ($): 5 [net]", "5");
        assert_eq!(capture(&pattern, "Cost ($): 17 [net]").as_deref(), Some("17"));
        assert_eq!(capture(&pattern, "Cost $: 17 net"), None);
    }

    #[test]
    fn test_first_occurrence_is_used() {
        let pattern = synthesize_pattern("7 of 7", "7");
        assert_eq!(pattern, r"(\d+) of 7");
    }

    #[test]
    fn test_value_missing_from_context_falls_back_to_literal() {
        assert_eq!(synthesize_pattern("Hello world", "planet"), "Hello world");
        assert_eq!(synthesize_pattern("a.b", "zzz"), r"a\.b");
    }

    #[test]
    fn test_classification() {
        assert_eq!(ValueShape::classify("123"), ValueShape::Integer);
        assert_eq!(ValueShape::classify("1.5"), ValueShape::Decimal);
        assert_eq!(ValueShape::classify("1."), ValueShape::Token);
        assert_eq!(ValueShape::classify("Main Street"), ValueShape::Phrase);
        assert_eq!(ValueShape::classify("abc"), ValueShape::Token);
        assert_eq!(ValueShape::classify(" 12 apples "), ValueShape::Phrase);
    }

    #[test]
    fn test_generated_names() {
        assert_eq!(column_name("Invoice Number"), "invoice_number");
        assert_eq!(column_name("Total (EUR)"), "total__eur_");
        assert_eq!(table_name("Recipe Card"), "doc_recipe_card");
    }
}
