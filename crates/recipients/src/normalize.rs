//! Cell value normalization

use contracts::Recipient;
use std::collections::HashSet;

/// Trim a cell and strip a trailing float artifact (`5511999.0` -> `5511999`)
pub fn normalize_number(raw: &str) -> String {
    let trimmed = raw.trim();
    match trimmed.split_once('.') {
        Some((head, tail))
            if !head.is_empty()
                && head.chars().all(|c| c.is_ascii_digit() || c == '+')
                && !tail.is_empty()
                && tail.chars().all(|c| c == '0') =>
        {
            head.to_string()
        }
        _ => trimmed.to_string(),
    }
}

/// Build a recipient from one cell, `None` for blank or null-like cells
pub fn recipient_from_cell(raw: &str) -> Option<Recipient> {
    let normalized = normalize_number(raw);
    if normalized.is_empty() || is_null_marker(&normalized) {
        return None;
    }
    Some(Recipient::new(raw, normalized))
}

fn is_null_marker(value: &str) -> bool {
    matches!(value.to_lowercase().as_str(), "nan" | "null" | "none")
}

/// Keep the first occurrence of each normalized number, preserving order
pub fn dedupe(recipients: Vec<Recipient>) -> Vec<Recipient> {
    let mut seen = HashSet::with_capacity(recipients.len());
    recipients
        .into_iter()
        .filter(|r| seen.insert(r.normalized_number.clone()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_trims_and_strips_float_suffix() {
        assert_eq!(normalize_number("  5511999999999  "), "5511999999999");
        assert_eq!(normalize_number("5511999999999.0"), "5511999999999");
        assert_eq!(normalize_number("+5511999.00"), "+5511999");
    }

    #[test]
    fn test_normalize_keeps_real_fractions_and_text() {
        assert_eq!(normalize_number("12.5"), "12.5");
        assert_eq!(normalize_number("abc.0"), "abc.0");
        assert_eq!(normalize_number("(11) 9999-0000"), "(11) 9999-0000");
    }

    #[test]
    fn test_blank_and_null_cells_dropped() {
        assert!(recipient_from_cell("   ").is_none());
        assert!(recipient_from_cell("NaN").is_none());
        assert!(recipient_from_cell("null").is_none());

        let r = recipient_from_cell(" 123.0 ").unwrap();
        assert_eq!(r.raw_input, " 123.0 ");
        assert_eq!(r.normalized_number, "123");
    }

    #[test]
    fn test_dedupe_keeps_first() {
        let input = vec![
            Recipient::new("1", "1"),
            Recipient::new("2", "2"),
            Recipient::new("1.0", "1"),
            Recipient::new("3", "3"),
        ];
        let out = dedupe(input);
        let numbers: Vec<_> = out.iter().map(|r| r.normalized_number.as_str()).collect();
        assert_eq!(numbers, vec!["1", "2", "3"]);
        assert_eq!(out[0].raw_input, "1");
    }
}
