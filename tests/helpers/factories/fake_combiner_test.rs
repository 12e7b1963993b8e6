use super::fake_combiner::FakeCombiner;
use crate::engine::merge::Combiner;
use std::fs;
use tempfile::tempdir;

#[tokio::test]
async fn writes_sum_of_inputs() {
    let tmp = tempdir().unwrap();
    let a = tmp.path().join("a.root");
    let b = tmp.path().join("b.root");
    fs::write(&a, "2.5").unwrap();
    fs::write(&b, "4").unwrap();
    let out = tmp.path().join("out").join("m.root");

    let combiner = FakeCombiner::new();
    combiner.combine(&out, &[a, b]).await.unwrap();

    assert_eq!(fs::read_to_string(&out).unwrap(), "6.5");
    assert_eq!(combiner.calls().len(), 1);
}
