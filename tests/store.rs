mod common;

use std::collections::HashSet;
use std::fs;

use codress::config::ConfDir;
use codress::store::{EmbeddingStore, read_snapshot};
use common::{FakeEmbedder, write_image};
use rstest::*;
use tempfile::TempDir;

#[fixture]
fn conf_dir() -> TempDir {
    TempDir::new().unwrap()
}

fn open(conf: &ConfDir, embedder: &FakeEmbedder) -> EmbeddingStore {
    EmbeddingStore::open(conf.clone(), conf.images(), embedder).unwrap()
}

#[rstest]
fn open_empty_does_not_persist(conf_dir: TempDir) {
    let conf = ConfDir::new(conf_dir.path());
    let embedder = FakeEmbedder::new();
    let store = open(&conf, &embedder);

    assert!(store.index().is_empty());
    assert!(conf.images().is_dir());
    assert!(!conf.snapshot().exists());
    assert_eq!(embedder.image_calls(), 0);
}

#[rstest]
fn open_rebuilds_and_persists(conf_dir: TempDir) {
    let conf = ConfDir::new(conf_dir.path());
    write_image(&conf.images(), "b.png", &[0., 1.]);
    write_image(&conf.images(), "a.jpg", &[1., 0.]);
    write_image(&conf.images(), "broken.png", &[]);
    fs::write(conf.images().join("notes.txt"), "1,0").unwrap();

    let embedder = FakeEmbedder::new();
    let store = open(&conf, &embedder);

    assert_eq!(store.index().paths(), ["a.jpg", "b.png"]);
    assert_eq!(embedder.image_calls(), 3);
    let snapshot = read_snapshot(&conf.snapshot()).unwrap();
    assert_eq!(&snapshot, store.index());
    assert!(!conf.snapshot_tmp().exists());
}

#[rstest]
fn open_loads_snapshot_without_embedding(conf_dir: TempDir) {
    let conf = ConfDir::new(conf_dir.path());
    write_image(&conf.images(), "a.png", &[1., 0.]);
    open(&conf, &FakeEmbedder::new());

    let embedder = FakeEmbedder::new();
    let store = open(&conf, &embedder);
    assert_eq!(store.index().paths(), ["a.png"]);
    assert_eq!(embedder.image_calls(), 0);
}

#[rstest]
fn open_drops_stale_entries(conf_dir: TempDir) {
    let conf = ConfDir::new(conf_dir.path());
    write_image(&conf.images(), "a.png", &[1., 0.]);
    write_image(&conf.images(), "b.png", &[0., 1.]);
    open(&conf, &FakeEmbedder::new());
    fs::remove_file(conf.images().join("a.png")).unwrap();

    let store = open(&conf, &FakeEmbedder::new());
    assert_eq!(store.index().paths(), ["b.png"]);
    assert_eq!(read_snapshot(&conf.snapshot()).unwrap().paths(), ["b.png"]);
}

#[rstest]
#[case::not_json("not json")]
#[case::count_mismatch(r#"{"embeddings":[[1.0,0.0]],"paths":["a.png","b.png"]}"#)]
#[case::missing_field(r#"{"paths":["a.png"]}"#)]
fn open_replaces_corrupt_snapshot(conf_dir: TempDir, #[case] content: &str) {
    let conf = ConfDir::new(conf_dir.path());
    write_image(&conf.images(), "a.png", &[1., 0.]);
    fs::write(conf.snapshot(), content).unwrap();

    let embedder = FakeEmbedder::new();
    let store = open(&conf, &embedder);
    assert_eq!(store.index().paths(), ["a.png"]);
    assert_eq!(embedder.image_calls(), 1);
    assert!(read_snapshot(&conf.snapshot()).is_ok());
}

#[rstest]
fn load_is_fail_soft(conf_dir: TempDir) {
    let conf = ConfDir::new(conf_dir.path());
    assert!(EmbeddingStore::load(&conf.snapshot(), &conf.images()).is_empty());

    fs::write(conf.snapshot(), "{").unwrap();
    assert!(EmbeddingStore::load(&conf.snapshot(), &conf.images()).is_empty());
    assert!(!conf.snapshot().exists());
}

#[rstest]
fn add_and_persist(conf_dir: TempDir) {
    let conf = ConfDir::new(conf_dir.path());
    write_image(&conf.images(), "a.png", &[1., 0.]);
    let mut store = open(&conf, &FakeEmbedder::new());

    store.add_and_persist("b.png", &[0., 1.]).unwrap();
    assert_eq!(read_snapshot(&conf.snapshot()).unwrap().paths(), ["a.png", "b.png"]);

    assert!(store.add_and_persist("b.png", &[0., 1.]).is_err());
    assert!(store.add_and_persist("c.png", &[0., 1., 0.]).is_err());
    assert_eq!(store.index().len(), 2);
}

#[rstest]
fn remove_stale_keeps_alignment(conf_dir: TempDir) {
    let conf = ConfDir::new(conf_dir.path());
    write_image(&conf.images(), "a.png", &[1., 0.]);
    write_image(&conf.images(), "b.png", &[0., 1.]);
    write_image(&conf.images(), "c.png", &[0.6, 0.8]);
    let mut store = open(&conf, &FakeEmbedder::new());

    let live = HashSet::from(["a.png".to_string(), "c.png".to_string()]);
    assert_eq!(store.remove_stale(&live), 1);
    assert_eq!(store.remove_stale(&live), 0);

    let index = store.index();
    assert_eq!(index.paths(), ["a.png", "c.png"]);
    assert_eq!(index.rows(), vec![vec![1., 0.], vec![0.6, 0.8]]);
    index.check_consistency().unwrap();
}

#[rstest]
fn sync_with_disk_persists(conf_dir: TempDir) {
    let conf = ConfDir::new(conf_dir.path());
    write_image(&conf.images(), "a.png", &[1., 0.]);
    write_image(&conf.images(), "b.png", &[0., 1.]);
    let mut store = open(&conf, &FakeEmbedder::new());

    fs::remove_file(conf.images().join("b.png")).unwrap();
    assert_eq!(store.sync_with_disk().unwrap(), 1);
    assert_eq!(read_snapshot(&conf.snapshot()).unwrap().paths(), ["a.png"]);
}

#[rstest]
fn reset_rebuilds_from_images(conf_dir: TempDir) {
    let conf = ConfDir::new(conf_dir.path());
    write_image(&conf.images(), "a.png", &[1., 0.]);
    let mut store = open(&conf, &FakeEmbedder::new());

    write_image(&conf.images(), "b.png", &[0., 1.]);
    let embedder = FakeEmbedder::new();
    assert_eq!(store.reset(&embedder).unwrap(), 2);
    assert_eq!(embedder.image_calls(), 2);
    assert_eq!(read_snapshot(&conf.snapshot()).unwrap().paths(), ["a.png", "b.png"]);

    fs::remove_file(conf.images().join("a.png")).unwrap();
    fs::remove_file(conf.images().join("b.png")).unwrap();
    assert_eq!(store.reset(&embedder).unwrap(), 0);
    assert!(!conf.snapshot().exists());
}
