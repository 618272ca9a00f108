use debt_recalc::archive::{deliver_intake, RunArchiver};
use std::fs;
use std::path::Path;

fn names(dir: &Path) -> Vec<String> {
    let mut v: Vec<String> = fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    v.sort();
    v
}

#[test]
fn non_empty_dirs_are_archived_and_recreated() {
    let root = tempfile::tempdir().unwrap();
    let logs = root.path().join("logs");
    let txts = root.path().join("txts");
    let statements = root.path().join("statements");
    fs::create_dir_all(txts.join("nested")).unwrap();
    fs::write(txts.join("a_1.txt"), "um").unwrap();
    fs::write(txts.join("nested").join("b.txt"), "dois").unwrap();
    fs::create_dir_all(&statements).unwrap();
    fs::write(statements.join("a.json"), "{}").unwrap();

    let mut archiver = RunArchiver::new(&logs, "run", "2025-04-23_10-00-00");
    let summary = archiver.archive_and_reset(&[txts.clone(), statements.clone()]);

    assert!(summary.errors.is_empty());
    assert_eq!(summary.archived.len(), 2);
    assert!(txts.is_dir() && names(&txts).is_empty());
    assert!(statements.is_dir() && names(&statements).is_empty());

    let run_dir = logs.join("run_2025-04-23_10-00-00");
    assert_eq!(summary.run_dir.as_deref(), Some(run_dir.as_path()));
    assert_eq!(names(&logs), vec!["run_2025-04-23_10-00-00"]);
    assert_eq!(names(&run_dir.join("txts")), vec!["a_1.txt", "nested"]);
    assert_eq!(
        fs::read_to_string(run_dir.join("txts").join("nested").join("b.txt")).unwrap(),
        "dois"
    );
    assert_eq!(names(&run_dir.join("statements")), vec!["a.json"]);
}

#[test]
fn absent_or_empty_dirs_leave_no_archive() {
    let root = tempfile::tempdir().unwrap();
    let logs = root.path().join("logs");
    let empty = root.path().join("empty");
    fs::create_dir_all(&empty).unwrap();
    let missing = root.path().join("missing");

    let mut archiver = RunArchiver::new(&logs, "run", "2025-04-23_10-00-00");
    let summary = archiver.archive_and_reset(&[empty.clone(), missing.clone()]);

    assert!(summary.archived.is_empty());
    assert_eq!(summary.untouched.len(), 2);
    assert!(summary.run_dir.is_none());
    assert!(!logs.exists());
    assert!(empty.is_dir());
    assert!(!missing.exists());
}

#[test]
fn repeated_stamp_gets_its_own_run_dir() {
    let root = tempfile::tempdir().unwrap();
    let logs = root.path().join("logs");
    let work = root.path().join("work");

    for round in 0..2 {
        fs::create_dir_all(&work).unwrap();
        fs::write(work.join("report.json"), format!("{round}")).unwrap();
        let mut archiver = RunArchiver::new(&logs, "run", "same");
        archiver.archive_and_reset(&[work.clone()]);
    }

    assert_eq!(names(&logs), vec!["run_same", "run_same_1"]);
    assert_eq!(
        fs::read_to_string(logs.join("run_same_1").join("work").join("report.json")).unwrap(),
        "1"
    );
}

#[test]
fn delivery_suffixes_files_and_skips_existing_dirs() {
    let root = tempfile::tempdir().unwrap();
    let intake = root.path().join("extract");
    let delivery = root.path().join("delivery");
    fs::create_dir_all(intake.join("lote")).unwrap();
    fs::create_dir_all(delivery.join("lote")).unwrap();
    fs::write(intake.join("contrato.pdf"), "novo").unwrap();
    fs::write(intake.join("outro.pdf"), "x").unwrap();
    fs::write(delivery.join("contrato.pdf"), "antigo").unwrap();

    let summary = deliver_intake(&intake, &delivery).unwrap();

    assert_eq!(summary.renamed, 1);
    assert_eq!(summary.skipped_dirs, vec!["lote".to_string()]);
    assert_eq!(
        names(&delivery),
        vec!["contrato.pdf", "contrato_1.pdf", "lote", "outro.pdf"]
    );
    assert_eq!(fs::read_to_string(delivery.join("contrato.pdf")).unwrap(), "antigo");
    assert_eq!(fs::read_to_string(delivery.join("contrato_1.pdf")).unwrap(), "novo");
    assert_eq!(names(&intake), vec!["lote"]);
}

#[test]
fn missing_intake_is_not_an_error() {
    let root = tempfile::tempdir().unwrap();
    let summary = deliver_intake(&root.path().join("nope"), &root.path().join("out")).unwrap();
    assert!(summary.delivered.is_empty());
}

fn move_unless_locked(src: &Path, dst: &Path) -> anyhow::Result<()> {
    if src.file_name().is_some_and(|n| n.to_string_lossy().starts_with("locked")) {
        anyhow::bail!("device busy");
    }
    fs::rename(src, dst)?;
    Ok(())
}

#[test]
fn leftovers_after_partial_move_are_force_removed() {
    let root = tempfile::tempdir().unwrap();
    let logs = root.path().join("logs");
    let txts = root.path().join("txts");
    fs::create_dir_all(txts.join("locked_dir")).unwrap();
    fs::write(txts.join("locked_dir").join("c.txt"), "tres").unwrap();
    fs::write(txts.join("locked.txt"), "dois").unwrap();
    fs::write(txts.join("ok.txt"), "um").unwrap();

    let mut archiver =
        RunArchiver::new(&logs, "run", "partial").with_mover(move_unless_locked);
    let summary = archiver.archive_and_reset(&[txts.clone()]);

    assert!(summary.errors.is_empty());
    let done = &summary.archived[0];
    assert_eq!(done.moved, 1);
    assert_eq!(done.failed, 2);
    assert!(done.forced_cleanup);
    assert!(txts.is_dir());
    assert!(names(&txts).is_empty());
    assert_eq!(names(&logs.join("run_partial").join("txts")), vec!["ok.txt"]);
}
