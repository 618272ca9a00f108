//! Spelled-out Brazilian currency amounts ("valor por extenso").

use crate::money::{parse_amount, to_cents};

const UNITS: [&str; 10] = [
    "", "um", "dois", "três", "quatro", "cinco", "seis", "sete", "oito", "nove",
];
const TEENS: [&str; 10] = [
    "dez", "onze", "doze", "treze", "quatorze", "quinze", "dezesseis", "dezessete", "dezoito",
    "dezenove",
];
const TENS: [&str; 10] = [
    "", "dez", "vinte", "trinta", "quarenta", "cinquenta", "sessenta", "setenta", "oitenta",
    "noventa",
];
const HUNDREDS: [&str; 10] = [
    "", "cento", "duzentos", "trezentos", "quatrocentos", "quinhentos", "seiscentos",
    "setecentos", "oitocentos", "novecentos",
];

/// Words for 1..=999, parts joined by " e ". Zero yields an empty string.
fn below_thousand(n: u64) -> String {
    debug_assert!(n < 1000);
    if n == 100 {
        return "cem".to_string();
    }

    let mut parts: Vec<&str> = Vec::with_capacity(3);
    let h = (n / 100) as usize;
    if h > 0 {
        parts.push(HUNDREDS[h]);
    }
    let rest = (n % 100) as usize;
    if (10..=19).contains(&rest) {
        parts.push(TEENS[rest - 10]);
    } else {
        if rest / 10 > 0 {
            parts.push(TENS[rest / 10]);
        }
        if rest % 10 > 0 {
            parts.push(UNITS[rest % 10]);
        }
    }
    parts.join(" e ")
}

fn integer_words(n: u64) -> String {
    if n == 0 {
        return "zero".to_string();
    }

    let millions = n / 1_000_000;
    let thousands = (n / 1000) % 1000;
    let rest = n % 1000;

    let mut parts = Vec::with_capacity(3);
    match millions {
        0 => {}
        1 => parts.push("um milhão".to_string()),
        m => parts.push(format!("{} milhões", integer_words(m))),
    }
    match thousands {
        0 => {}
        1 => parts.push("mil".to_string()),
        t => parts.push(format!("{} mil", below_thousand(t))),
    }
    if rest > 0 {
        parts.push(below_thousand(rest));
    }
    parts.join(" e ")
}

/// Currency noun that follows the integer words.
///
/// Whole thousands ("mil", "dois mil") carry no noun; round millions take
/// "de reais"; a final group of exactly one is singular.
fn currency_noun(n: u64) -> Option<&'static str> {
    let rest = n % 1000;
    match (n, rest) {
        (0, _) => None,
        (n, 0) if n % 1_000_000 == 0 => Some("de reais"),
        (_, 0) => None,
        (_, 1) => Some("real"),
        _ => Some("reais"),
    }
}

/// Spells out a non-negative amount, e.g. `2.5` -> "dois reais e cinquenta centavos".
pub fn spell_out(amount: f64) -> String {
    let total_cents = to_cents(amount);
    let integer = total_cents / 100;
    let cents = total_cents % 100;

    let mut out = integer_words(integer);
    if let Some(noun) = currency_noun(integer) {
        out.push(' ');
        out.push_str(noun);
    }

    if cents > 0 {
        out.push_str(" e ");
        if cents == 1 {
            out.push_str("um centavo");
        } else {
            out.push_str(&below_thousand(cents));
            out.push_str(" centavos");
        }
    }
    out
}

/// Parses a locale-formatted amount and spells it out.
pub fn spell_out_str(raw: &str) -> Option<String> {
    parse_amount(raw).map(spell_out)
}
