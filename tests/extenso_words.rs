use debt_recalc::extenso::{spell_out, spell_out_str};

#[test]
fn singular_and_plural_reais() {
    assert_eq!(spell_out(1.00), "um real");
    assert_eq!(spell_out(2.50), "dois reais e cinquenta centavos");
    assert_eq!(spell_out(21.0), "vinte e um reais");
    assert_eq!(spell_out(15.15), "quinze reais e quinze centavos");
}

#[test]
fn thousands_carry_no_plural_noun() {
    assert_eq!(spell_out(1000.00), "mil");
    assert_eq!(spell_out(2000.00), "dois mil");
    assert_eq!(spell_out(1001.00), "mil e um real");
    assert_eq!(
        spell_out(1234.56),
        "mil e duzentos e trinta e quatro reais e cinquenta e seis centavos"
    );
    assert_eq!(
        spell_out(45_300.0),
        "quarenta e cinco mil e trezentos reais"
    );
}

#[test]
fn hundred_is_cem_only_when_exact() {
    assert_eq!(spell_out(100.0), "cem reais");
    assert_eq!(spell_out(101.0), "cento e um reais");
    assert_eq!(spell_out(100_000.0), "cem mil");
}

#[test]
fn cents_only() {
    assert_eq!(spell_out(0.01), "zero e um centavo");
    assert_eq!(spell_out(0.10), "zero e dez centavos");
    assert_eq!(spell_out(0.0), "zero");
}

#[test]
fn millions() {
    assert_eq!(spell_out(1_000_000.0), "um milhão de reais");
    assert_eq!(
        spell_out(2_500_001.0),
        "dois milhões e quinhentos mil e um real"
    );
}

#[test]
fn from_locale_string() {
    assert_eq!(
        spell_out_str("1.269,54").as_deref(),
        Some("mil e duzentos e sessenta e nove reais e cinquenta e quatro centavos")
    );
    assert_eq!(spell_out_str("NÃO ENCONTRADO"), None);
}
