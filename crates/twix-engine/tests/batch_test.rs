use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use twix_core::fixtures;
use twix_engine::{AnonymizeOptions, Anonymizer, run_batch};
use twix_security::{EXAM_DATE, Redactor};
use twix_storage::{ANONYMIZED_ID, ORIG_FILENAME, RecordTable};

fn write_inputs(dir: &Path) -> Vec<PathBuf> {
    let vd = fixtures::vd_file(&[
        (fixtures::header_text("PID-A1", "Doe^Jane"), fixtures::payload(512, 1)),
        (fixtures::header_text("PID-A2", "Doe^Jane"), fixtures::payload(256, 2)),
    ]);
    let vb = fixtures::vb_file(
        &fixtures::header_text("PID-B", "Roe^Rick"),
        &fixtures::payload(1024, 3),
    );
    let broken_text = String::from_utf8(fixtures::header_text("PID-C", "Poe^Ann"))
        .unwrap()
        .replace("InstitutionName", "Unrelated");
    let broken = fixtures::vb_file(broken_text.as_bytes(), &fixtures::payload(64, 4));

    let files = vec![
        (dir.join("a.dat"), vd),
        (dir.join("b.dat"), vb),
        (dir.join("c.dat"), broken),
    ];
    for (path, bytes) in &files {
        fs::write(path, bytes).unwrap();
    }
    files.into_iter().map(|(path, _)| path).collect()
}

fn dat_files(dir: &Path) -> Vec<PathBuf> {
    let mut files: Vec<_> = fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().path())
        .filter(|p| p.extension().is_some_and(|e| e == "dat"))
        .collect();
    files.sort();
    files
}

#[tokio::test]
async fn test_batch_with_failure() {
    let dir = tempfile::tempdir().unwrap();
    let inputs = write_inputs(dir.path());
    let out_dir = dir.path().join("out");
    fs::create_dir(&out_dir).unwrap();
    let table = RecordTable::new(out_dir.join("records.csv"));

    let anonymizer = Arc::new(Anonymizer::new(Redactor::default(), AnonymizeOptions::default()));
    let summary = run_batch(anonymizer, inputs.clone(), out_dir.clone(), table.clone(), 2)
        .await
        .unwrap();

    assert_eq!(summary.processed, 2);
    assert_eq!(summary.failed.len(), 1);
    assert_eq!(summary.failed[0].0, inputs[2]);
    assert_eq!(summary.rows, 2);

    let outputs = dat_files(&out_dir);
    assert_eq!(outputs.len(), 2);
    assert_eq!(fs::read_dir(&out_dir).unwrap().count(), 3);

    let read = table.read().unwrap();
    assert_eq!(read.columns[..3], [ANONYMIZED_ID, ORIG_FILENAME, EXAM_DATE]);
    assert_eq!(read.get(0, ORIG_FILENAME), Some(inputs[0].display().to_string().as_str()));
    assert_eq!(read.get(0, "Patient_id"), Some("PID-A2"));
    assert_eq!(read.get(1, "Patient_id"), Some("PID-B"));
    assert_eq!(read.get(1, EXAM_DATE), Some("2023-06-15"));

    for row in 0..2 {
        let id = read.get(row, ANONYMIZED_ID).unwrap();
        let output = out_dir.join(format!("{}.dat", id));
        assert_eq!(
            fs::metadata(&output).unwrap().len(),
            fs::metadata(&inputs[row]).unwrap().len()
        );
        let bytes = fs::read(&output).unwrap();
        let text = String::from_utf8_lossy(&bytes);
        assert!(!text.contains("PID-"));
        assert!(!text.contains("General Hospital"));
    }
}

#[tokio::test]
async fn test_metadata_only_writes_no_containers() {
    let dir = tempfile::tempdir().unwrap();
    let inputs = write_inputs(dir.path());
    let out_dir = dir.path().join("out");
    fs::create_dir(&out_dir).unwrap();
    let table = RecordTable::new(out_dir.join("records.csv"));

    let options = AnonymizeOptions {
        metadata_only: true,
        ..Default::default()
    };
    let anonymizer = Arc::new(Anonymizer::new(Redactor::default(), options));
    let summary = run_batch(anonymizer, inputs[..2].to_vec(), out_dir.clone(), table.clone(), 1)
        .await
        .unwrap();

    assert_eq!(summary.processed, 2);
    assert!(summary.failed.is_empty());
    assert!(dat_files(&out_dir).is_empty());

    let read = table.read().unwrap();
    assert_eq!(read.rows.len(), 2);
    assert_eq!(read.get(0, "Patient_name"), Some("Doe^Jane"));
    assert_eq!(read.get(1, "Sequence"), Some("t1_mprage_sag"));
}

#[tokio::test]
async fn test_rows_appended_across_runs() {
    let dir = tempfile::tempdir().unwrap();
    let inputs = write_inputs(dir.path());
    let out_dir = dir.path().join("out");
    fs::create_dir(&out_dir).unwrap();
    let table = RecordTable::new(out_dir.join("records.csv"));
    let anonymizer = Arc::new(Anonymizer::new(Redactor::default(), AnonymizeOptions::default()));

    run_batch(anonymizer.clone(), vec![inputs[0].clone()], out_dir.clone(), table.clone(), 1)
        .await
        .unwrap();
    let summary = run_batch(anonymizer, vec![inputs[1].clone()], out_dir.clone(), table.clone(), 1)
        .await
        .unwrap();

    assert_eq!(summary.rows, 2);
    assert_eq!(dat_files(&out_dir).len(), 2);
}

#[test]
fn test_second_pass_is_identity() {
    let dir = tempfile::tempdir().unwrap();
    let inputs = write_inputs(dir.path());
    let anonymizer = Anonymizer::new(Redactor::default(), AnonymizeOptions::default());

    let first_dir = dir.path().join("first");
    let second_dir = dir.path().join("second");
    fs::create_dir(&first_dir).unwrap();
    fs::create_dir(&second_dir).unwrap();

    for input in &inputs[..2] {
        let first = anonymizer.process_file(input, &first_dir).unwrap();
        let first_output = first.output.unwrap();
        let second = anonymizer.process_file(&first_output, &second_dir).unwrap();

        assert_eq!(
            fs::read(&first_output).unwrap(),
            fs::read(second.output.unwrap()).unwrap()
        );
        assert_eq!(second.records[0].matches.exam_date(), None);
        assert_eq!(second.records[0].matches.get("Patient_id"), None);
    }
}
