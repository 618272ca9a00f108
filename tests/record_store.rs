use debt_recalc::records::{
    read_recalculated, read_store, write_store, ExtractedRecord, RecalculatedRecord,
};

#[test]
fn extraction_store_uses_contract_headers() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("resultado_dados.csv");
    let rows = vec![ExtractedRecord {
        source_file: "contrato.pdf".into(),
        debtor_name: "JOÃO DA SILVA".into(),
        raw_amount: "1.500,00".into(),
        sequence_index: 1,
        segment: "contrato".into(),
    }];

    write_store(&path, &rows).unwrap();
    let raw = std::fs::read_to_string(&path).unwrap();
    assert_eq!(raw.lines().next(), Some("Arquivo,Nome,Dívida,Número da Dívida,Segmento"));

    let back: Vec<ExtractedRecord> = read_store(&path).unwrap();
    assert_eq!(back, rows);
}

#[test]
fn empty_store_still_has_headers() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("dados_atualizados.csv");
    write_store::<RecalculatedRecord>(&path, &[]).unwrap();

    let raw = std::fs::read_to_string(&path).unwrap();
    assert_eq!(raw.trim_end(), "Arquivo,Nome,Dívida Atualizada,Número da Dívida,Segmento");
    assert!(read_recalculated(&path).unwrap().is_empty());
}

#[test]
fn spelled_out_amount_is_restored_on_read() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("dados_atualizados.csv");
    let rows = vec![
        RecalculatedRecord {
            artifact_file: "contrato.json".into(),
            debtor_name: "JOÃO".into(),
            corrected_amount: "2,50".into(),
            sequence_index: 1,
            segment: "contrato_1".into(),
            spelled_out_amount: String::new(),
        },
        RecalculatedRecord {
            artifact_file: "contrato_2.json".into(),
            debtor_name: "JOÃO".into(),
            corrected_amount: "NÃO ENCONTRADO".into(),
            sequence_index: 2,
            segment: "contrato_2".into(),
            spelled_out_amount: String::new(),
        },
    ];
    write_store(&path, &rows).unwrap();

    let back = read_recalculated(&path).unwrap();
    assert_eq!(back[0].spelled_out_amount, "dois reais e cinquenta centavos");
    assert_eq!(back[1].spelled_out_amount, "NÃO ENCONTRADO");
    assert_eq!(back[1].sequence_index, 2);
}

#[test]
fn stores_without_segment_column_still_load() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("dados_atualizados.csv");
    std::fs::write(
        &path,
        "Arquivo,Nome,Dívida Atualizada,Número da Dívida\nmaria.json,MARIA,\"1,00\",1\n",
    )
    .unwrap();

    let back = read_recalculated(&path).unwrap();
    assert_eq!(back[0].artifact_file, "maria.json");
    assert_eq!(back[0].segment, "");
    assert_eq!(back[0].spelled_out_amount, "um real");
}
