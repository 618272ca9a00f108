use debt_recalc::money::{format_amount, parse_amount, round_cents};

#[test]
fn locale_strings_survive_parse_and_render() {
    for s in [
        "0,01",
        "1,00",
        "12,34",
        "999,99",
        "1.000,00",
        "12.345,67",
        "100.000,10",
        "1.234.567,89",
    ] {
        let v = parse_amount(s).unwrap_or_else(|| panic!("parse {s}"));
        assert_eq!(format_amount(v), s);
    }
}

#[test]
fn tolerates_prefix_and_trailing_separators() {
    assert_eq!(parse_amount("R$ 1.500,00"), Some(1500.0));
    assert_eq!(parse_amount("1.500,00,"), Some(1500.0));
    assert_eq!(parse_amount(" 980,1 "), Some(980.1));
    assert_eq!(parse_amount("1500"), Some(1500.0));
}

#[test]
fn rejects_non_amounts() {
    assert_eq!(parse_amount("NÃO ENCONTRADO"), None);
    assert_eq!(parse_amount(""), None);
    assert_eq!(parse_amount("1,234,56"), None);
    assert_eq!(parse_amount(","), None);
}

#[test]
fn rounds_half_away_from_zero() {
    assert_eq!(round_cents(2.675_000_1), 2.68);
    assert_eq!(round_cents(10.0), 10.0);
    assert_eq!(format_amount(round_cents(1061.7006)), "1.061,70");
}
