use super::combiner::{Combiner, HaddCombiner, stderr_tail};
use crate::engine::errors::CombineError;
use std::fs;
use std::path::PathBuf;
use tempfile::tempdir;

#[test]
fn partial_path_is_hidden_sibling() {
    let partial = HaddCombiner::partial_path(&PathBuf::from("/o/MC_X_2018_Y_Hist_Merged.root"));
    assert_eq!(
        partial,
        PathBuf::from("/o/.MC_X_2018_Y_Hist_Merged.root.partial.root")
    );
}

#[test]
fn outputs_differing_by_extension_get_distinct_partials() {
    let root = HaddCombiner::partial_path(&PathBuf::from("/o/MC_X_2018_Y_Merged.root"));
    let hist = HaddCombiner::partial_path(&PathBuf::from("/o/MC_X_2018_Y_Merged.hist"));
    assert_ne!(root, hist);
}

#[test]
fn stderr_tail_keeps_last_lines() {
    let tail = stderr_tail(b"one\n\ntwo\nthree\nfour\n");
    assert_eq!(tail, "two | three | four");
    assert_eq!(stderr_tail(b""), "");
}

#[cfg(unix)]
#[tokio::test]
async fn successful_tool_output_is_renamed_into_place() {
    let tmp = tempdir().unwrap();
    let input = tmp.path().join("in.root");
    fs::write(&input, b"payload").unwrap();
    let output = tmp.path().join("merged").join("A_Merged.root");

    // `cp <src> <dst>` with the partial as first positional: emulate with sh.
    let combiner = HaddCombiner::new(
        "sh",
        vec!["-c".into(), "cat \"$2\" > \"$1\"".into(), "combine".into()],
    );
    combiner.combine(&output, &[input]).await.unwrap();

    assert_eq!(fs::read(&output).unwrap(), b"payload");
    assert!(!HaddCombiner::partial_path(&output).exists());
}

#[cfg(unix)]
#[tokio::test]
async fn failing_tool_reports_status_and_leaves_no_output() {
    let tmp = tempdir().unwrap();
    let output = tmp.path().join("A_Merged.root");

    let combiner = HaddCombiner::new(
        "sh",
        vec![
            "-c".into(),
            "echo partial > \"$1\"; echo 'bad input' >&2; exit 3".into(),
            "combine".into(),
        ],
    );
    let err = combiner
        .combine(&output, &[tmp.path().join("missing.root")])
        .await
        .unwrap_err();

    match err {
        CombineError::ExitStatus { stderr_tail, .. } => assert_eq!(stderr_tail, "bad input"),
        other => panic!("unexpected error: {other:?}"),
    }
    assert!(!output.exists());
    assert!(!HaddCombiner::partial_path(&output).exists());
}

#[tokio::test]
async fn missing_program_is_spawn_error() {
    let tmp = tempdir().unwrap();
    let combiner = HaddCombiner::new("definitely-not-a-real-merge-tool", vec![]);
    let err = combiner
        .combine(&tmp.path().join("o.root"), &[])
        .await
        .unwrap_err();
    assert!(matches!(err, CombineError::Spawn { .. }));
}
