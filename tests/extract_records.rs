use debt_recalc::{
    config::Config,
    engine::SourceFile,
    extract::{AnchorExtractor, Extractor},
};

const NOT_FOUND: &str = "NÃO ENCONTRADO";

fn extractor() -> AnchorExtractor {
    AnchorExtractor::new(&Config::default().extraction).expect("extractor")
}

const TWO_DEBTS: &str = "INSTRUMENTO PARTICULAR DE CONFISSÃO DE DÍVIDA\n\
De um lado AFUBRA, e de outro lado, JOÃO DA SILVA, brasileiro, agricultor,\n\
confessa dever a quantia de R$ 1.500,00, referente a insumos,\n\
e ainda R$ 2.300,50 referente a parcelas vencidas.\n\
Santa Cruz do Sul.";

#[test]
fn one_record_per_amount_in_order() {
    let src = SourceFile::new("contrato.pdf", TWO_DEBTS);
    let out = extractor().extract(&src);

    assert_eq!(out.records.len(), 2);
    assert_eq!(out.records[0].sequence_index, 1);
    assert_eq!(out.records[1].sequence_index, 2);
    assert_eq!(out.records[0].raw_amount, "1.500,00");
    assert_eq!(out.records[1].raw_amount, "2.300,50");
    for rec in &out.records {
        assert_eq!(rec.source_file, "contrato.pdf");
        assert_eq!(rec.debtor_name, "JOÃO DA SILVA");
    }
    assert_eq!(out.segments[0].artifact_stem, "contrato_1");
    assert_eq!(out.segments[1].artifact_stem, "contrato_2");
    assert_eq!(out.records[0].segment, "contrato_1");
    assert_eq!(out.records[1].segment, "contrato_2");
}

#[test]
fn spans_partition_text_up_to_last_amount() {
    let src = SourceFile::new("contrato.pdf", TWO_DEBTS);
    let out = extractor().extract(&src);

    assert_eq!(out.segments[0].start, 0);
    for pair in out.segments.windows(2) {
        assert_eq!(pair[0].end, pair[1].start);
    }
    let last_end = out.segments.last().unwrap().end;
    let joined: String = out
        .segments
        .iter()
        .map(|s| &src.text[s.start..s.end])
        .collect();
    assert_eq!(joined, &src.text[..last_end]);

    assert!(out.segments[0].text(&src.text).ends_with("R$ 1.500,00,"));
    assert!(out.segments[1].text(&src.text).starts_with("referente a insumos"));
    assert!(out.segments[1].text(&src.text).ends_with("R$ 2.300,50"));
}

#[test]
fn single_amount_has_unsuffixed_artifact() {
    let src = SourceFile::new(
        "maria.pdf",
        "e de OUTRO LADO, MARIA SOUZA\nconfessa dever R$ 980,10 à credora.",
    );
    let out = extractor().extract(&src);

    assert_eq!(out.records.len(), 1);
    assert_eq!(out.records[0].debtor_name, "MARIA SOUZA");
    assert_eq!(out.records[0].raw_amount, "980,10");
    assert_eq!(out.segments[0].artifact_stem, "maria");
    assert_eq!(out.records[0].segment, "maria");
}

#[test]
fn no_amount_yields_single_not_found_record() {
    let src = SourceFile::new("ilegivel.pdf", "de outro lado, PEDRO ALVES, sem valores legíveis");
    let out = extractor().extract(&src);

    assert_eq!(out.records.len(), 1);
    let rec = &out.records[0];
    assert_eq!(rec.sequence_index, 1);
    assert_eq!(rec.debtor_name, "PEDRO ALVES");
    assert_eq!(rec.raw_amount, NOT_FOUND);
    assert_eq!(out.segments[0].artifact_stem, "ilegivel_1");
    assert_eq!(out.segments[0].text(&src.text), src.text.trim());
}

#[test]
fn empty_text_still_yields_one_record() {
    let src = SourceFile::new("branco.pdf", "");
    let out = extractor().extract(&src);

    assert_eq!(out.records.len(), 1);
    assert_eq!(out.records[0].debtor_name, NOT_FOUND);
    assert_eq!(out.records[0].raw_amount, NOT_FOUND);
}

#[test]
fn first_anchor_occurrence_wins() {
    let src = SourceFile::new(
        "dois.pdf",
        "do outro lado, ANA LIMA, deve R$ 10,00\nE de outro lado, CARLOS, deve R$ 20,00",
    );
    let out = extractor().extract(&src);
    assert_eq!(out.records.len(), 2);
    assert!(out.records.iter().all(|r| r.debtor_name == "ANA LIMA"));
}
