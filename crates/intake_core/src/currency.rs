/// Canonical digits plus the grouped string shown next to the input.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormattedAmount {
    pub raw: String,
    pub display: String,
}

/// Splits user keystrokes into the stored digits and their display form.
pub fn format_currency_input(input: &str) -> FormattedAmount {
    let raw = digits_only(input);
    let display = display_amount(&raw);
    FormattedAmount { raw, display }
}

pub fn digits_only(input: &str) -> String {
    input.chars().filter(char::is_ascii_digit).collect()
}

/// Renders a digit string with Indian grouping (`7,00,000`, `1,23,45,678`).
///
/// Works on the digit string directly so arbitrarily large claims never
/// round. Leading zeros are dropped since the display shows the value.
pub fn display_amount(raw: &str) -> String {
    let digits = digits_only(raw);
    if digits.is_empty() {
        return String::new();
    }

    let significant = digits.trim_start_matches('0');
    if significant.is_empty() {
        return "0".to_string();
    }

    group_en_in(significant)
}

fn group_en_in(digits: &str) -> String {
    if digits.len() <= 3 {
        return digits.to_string();
    }

    let (head, tail) = digits.split_at(digits.len() - 3);
    let mut out = String::with_capacity(digits.len() + digits.len() / 2);
    for (idx, ch) in head.chars().enumerate() {
        if idx > 0 && (head.len() - idx) % 2 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out.push(',');
    out.push_str(tail);
    out
}
