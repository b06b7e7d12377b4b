use orderbench::dataset::verify_dataset;
use orderbench::errors::BenchError;
use orderbench::generator::{dataset_path, generate};
use orderbench::record::DATASET_HEADER;
use std::fs;
use tempfile::tempdir;

fn header_line() -> String {
    DATASET_HEADER.join(",")
}

#[test]
fn test_five_rows_in_chunks_of_two() {
    let dir = tempdir().unwrap();
    let out = dir.path().join("orders.csv");
    let rep = generate(&out, 5, 2, 42).unwrap();
    assert_eq!(rep.rows_written, 5);
    assert_eq!(rep.chunk_sizes, vec![2, 2, 1]);

    let s = fs::read_to_string(&out).unwrap();
    let lines: Vec<&str> = s.lines().collect();
    assert_eq!(lines.len(), 6);
    assert_eq!(lines[0], header_line());
    let ids: Vec<&str> = lines[1..].iter().map(|l| l.split(',').next().unwrap()).collect();
    assert_eq!(ids, vec!["1", "2", "3", "4", "5"]);
}

#[test]
fn test_header_written_once() {
    let dir = tempdir().unwrap();
    let out = dir.path().join("orders.csv");
    generate(&out, 1000, 7, 3).unwrap();
    let s = fs::read_to_string(&out).unwrap();
    assert_eq!(s.matches(&header_line()).count(), 1);
    assert!(s.starts_with(&header_line()));
    assert_eq!(s.lines().count(), 1001);
}

#[test]
fn test_output_independent_of_chunk_size() {
    let dir = tempdir().unwrap();
    let reference = dir.path().join("ref.csv");
    generate(&reference, 257, 1000, 42).unwrap();
    let expected = fs::read(&reference).unwrap();
    for chunk in [1, 2, 50, 256, 257] {
        let out = dir.path().join(format!("c{chunk}.csv"));
        generate(&out, 257, chunk, 42).unwrap();
        assert_eq!(fs::read(&out).unwrap(), expected, "chunk_size={chunk}");
    }
}

#[test]
fn test_repeat_run_is_byte_identical() {
    let dir = tempdir().unwrap();
    let out = dir.path().join("orders.csv");
    generate(&out, 300, 64, 9).unwrap();
    let first = fs::read(&out).unwrap();
    generate(&out, 300, 64, 9).unwrap();
    assert_eq!(fs::read(&out).unwrap(), first);
}

#[test]
fn test_seed_changes_output() {
    let dir = tempdir().unwrap();
    let a = dir.path().join("a.csv");
    let b = dir.path().join("b.csv");
    generate(&a, 50, 10, 1).unwrap();
    generate(&b, 50, 10, 2).unwrap();
    assert_ne!(fs::read(a).unwrap(), fs::read(b).unwrap());
}

#[test]
fn test_existing_file_is_replaced() {
    let dir = tempdir().unwrap();
    let out = dir.path().join("orders.csv");
    fs::write(&out, "stale,content\n1,2\n".repeat(100)).unwrap();
    generate(&out, 3, 2, 42).unwrap();
    let s = fs::read_to_string(&out).unwrap();
    assert!(!s.contains("stale"));
    assert_eq!(s.lines().count(), 4);
}

#[test]
fn test_parent_directories_created() {
    let dir = tempdir().unwrap();
    let out = dir.path().join("nested").join("deeper").join("orders.csv");
    generate(&out, 10, 4, 42).unwrap();
    assert!(out.exists());
}

#[test]
fn test_zero_rows_rejected_without_touching_disk() {
    let dir = tempdir().unwrap();
    let out = dir.path().join("sub").join("orders.csv");
    let err = generate(&out, 0, 10, 42).unwrap_err();
    assert!(matches!(err, BenchError::Validation(_)));
    assert!(!out.exists());
    assert!(!dir.path().join("sub").exists());
}

#[test]
fn test_zero_chunk_size_rejected() {
    let dir = tempdir().unwrap();
    let out = dir.path().join("orders.csv");
    fs::write(&out, "keep me").unwrap();
    let err = generate(&out, 10, 0, 42).unwrap_err();
    assert!(matches!(err, BenchError::Validation(_)));
    // validation happens before the old file is removed
    assert_eq!(fs::read_to_string(&out).unwrap(), "keep me");
}

#[test]
fn test_directory_destination_rejected() {
    let dir = tempdir().unwrap();
    let err = generate(dir.path(), 10, 5, 42).unwrap_err();
    assert!(matches!(err, BenchError::Validation(_)));
}

#[test]
fn test_uncreatable_parent_is_io_error() {
    let dir = tempdir().unwrap();
    let blocker = dir.path().join("blocker");
    fs::write(&blocker, "file, not a dir").unwrap();
    let err = generate(blocker.join("orders.csv"), 10, 5, 42).unwrap_err();
    assert!(matches!(err, BenchError::Io(_)), "{err}");
}

#[test]
fn test_generated_file_verifies() {
    let dir = tempdir().unwrap();
    let out = dataset_path(dir.path(), 2000);
    assert!(out.ends_with("orders_2000.csv"));
    generate(&out, 2000, 300, 42).unwrap();
    let summary = verify_dataset(&out).unwrap();
    assert_eq!(summary.rows, 2000);
    assert!(summary.max_user_id < 2000 / 10 + 50);
    assert!(summary.price_sum > 2000.0);
}
