//! Masking of debtor surnames and CPF numbers in assembled documents.

use regex::Regex;
use std::sync::LazyLock;

static CPF_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d{3}[.\s]?\d{3}[.\s]?\d{3}[-\s]?\d{2}").unwrap());

/// Keeps the first name and masks every other word with `*`.
pub fn mask_name(name: &str) -> String {
    let mut words = name.split_whitespace();
    let Some(first) = words.next() else {
        return name.to_string();
    };
    let mut out = first.to_string();
    for w in words {
        out.push(' ');
        out.extend(std::iter::repeat_n('*', w.chars().count()));
    }
    out
}

/// `***.***.***-NN` for an 11-digit CPF; anything else is returned as is.
pub fn mask_cpf(cpf: &str) -> String {
    let digits: String = cpf.chars().filter(char::is_ascii_digit).collect();
    if digits.len() != 11 {
        return cpf.to_string();
    }
    format!("***.***.***-{}", &digits[9..])
}

/// Masks the first CPF-shaped number in free text.
pub fn mask_cpf_in_text(text: &str) -> String {
    match CPF_RE.find(text) {
        Some(m) => text.replacen(m.as_str(), &mask_cpf(m.as_str()), 1),
        None => text.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn masks_surnames_only() {
        assert_eq!(mask_name("Maria da Silva"), "Maria ** *****");
        assert_eq!(mask_name("Maria"), "Maria");
    }

    #[test]
    fn masks_cpf() {
        assert_eq!(mask_cpf("123.456.789-01"), "***.***.***-01");
        assert_eq!(mask_cpf("12345"), "12345");
        assert_eq!(
            mask_cpf_in_text("CPF nº 123.456.789-01, residente"),
            "CPF nº ***.***.***-01, residente"
        );
    }
}
