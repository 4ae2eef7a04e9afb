//! End-to-end tests against small datasets written to the temp directory.

use std::path::{Path, PathBuf};

use image::{GenericImageView, Rgb, RgbImage};
use muct_dataset::{
    DatasetConfig, Error, Fetch, Landmarks, MuctDataset, Pairing, NUM_LANDMARKS,
};

struct Fixture {
    root: PathBuf,
}

impl Fixture {
    fn new(name: &str) -> Self {
        let root = std::env::temp_dir().join(format!("muct-it-{}-{name}", std::process::id()));
        std::fs::remove_dir_all(&root).ok();
        std::fs::create_dir_all(root.join("muct-landmarks")).unwrap();
        std::fs::create_dir_all(root.join("jpg")).unwrap();
        Fixture { root }
    }

    fn config(&self) -> DatasetConfig {
        DatasetConfig::with_data_dir(&self.root)
    }

    fn write_table(&self, rows: &[(&str, Vec<f64>)]) {
        write_table(&self.root, rows);
    }

    fn dataset(&self) -> MuctDataset {
        let mut muct = MuctDataset::new(self.config());
        muct.load().unwrap();
        muct
    }
}

impl Drop for Fixture {
    fn drop(&mut self) {
        std::fs::remove_dir_all(&self.root).ok();
    }
}

fn write_table(root: &Path, rows: &[(&str, Vec<f64>)]) {
    let mut text = String::from("name,tag");
    for i in 0..NUM_LANDMARKS {
        text.push_str(&format!(",x{i:02},y{i:02}"));
    }
    text.push('\n');
    for (name, values) in rows {
        let coords: Vec<String> = values.iter().map(|v| v.to_string()).collect();
        text.push_str(&format!("{name},{},{}\n", &name[name.len() - 2..], coords.join(",")));
    }
    std::fs::write(root.join("muct-landmarks/muct76-opencv.csv"), text).unwrap();
}

/// Flat coordinates with every point at `(v, v)`.
fn face(v: f64) -> Vec<f64> {
    vec![v; 2 * NUM_LANDMARKS]
}

/// `face(v)` with point `idx` replaced by `(x, y)`.
fn face_with(v: f64, idx: usize, x: f64, y: f64) -> Vec<f64> {
    let mut values = face(v);
    values[2 * idx] = x;
    values[2 * idx + 1] = y;
    values
}

fn lmks(values: &[f64]) -> Landmarks {
    Landmarks::from_flat(values).unwrap()
}

/// Three subjects, canonical rows first, mirrored rows after.
fn three_subjects(fx: &Fixture) {
    fx.write_table(&[
        ("i000qa-fn", face(1.0)),
        ("i001qb-fn", face_with(2.0, 5, 0.0, 0.0)),
        ("i002qc-mn", face_with(3.0, 5, 0.0, 3.0)),
        ("ir000qa-fn", face(10.0)),
        ("ir001qb-fn", face(20.0)),
        ("ir002qc-mn", face(30.0)),
    ]);
}

#[test]
fn load_produces_aligned_arrays() {
    let fx = Fixture::new("aligned");
    three_subjects(&fx);
    let muct = fx.dataset();

    assert_eq!(muct.len(), 3);
    assert_eq!(muct.names().len(), 3);
    assert_eq!(muct.tags().len(), 3);
    assert_eq!(muct.landmarks().len(), 3);
    assert_eq!(muct.landmarks_flip().len(), 3);
    assert_eq!(muct.names(), ["i000qa-fn", "i001qb-fn", "i002qc-mn"]);
    assert_eq!(muct.tags(), ["fn", "fn", "mn"]);
    assert_eq!(muct.landmarks_flip()[1], lmks(&face(20.0)));
}

#[test]
fn load_replaces_previous_state() {
    let fx = Fixture::new("reload");
    three_subjects(&fx);
    let mut muct = fx.dataset();
    muct.ignore("i000qa-fn");
    assert_eq!(muct.len(), 2);

    muct.load().unwrap();
    assert_eq!(muct.len(), 3);
}

#[test]
fn clean_drops_only_exact_origin() {
    let fx = Fixture::new("clean");
    three_subjects(&fx);
    let mut muct = fx.dataset();

    assert_eq!(muct.clean(), 1);
    assert_eq!(muct.names(), ["i000qa-fn", "i002qc-mn"]);
    assert!(muct.landmarks().iter().all(|l| l.is_complete()));
    // the mirror of the dropped record left with it
    assert_eq!(muct.landmarks_flip()[1], lmks(&face(30.0)));

    let before: Vec<String> = muct.names().to_vec();
    assert_eq!(muct.clean(), 0);
    assert_eq!(muct.names(), before.as_slice());
}

#[test]
fn clean_does_not_inspect_mirrored_landmarks() {
    let fx = Fixture::new("clean-asym");
    fx.write_table(&[
        ("i000qa-fn", face(1.0)),
        ("ir000qa-fn", face_with(10.0, 3, 0.0, 0.0)),
    ]);
    let mut muct = fx.dataset();
    assert_eq!(muct.clean(), 0);
    assert_eq!(muct.len(), 1);
}

#[test]
fn clean_on_load() {
    let fx = Fixture::new("clean-on-load");
    three_subjects(&fx);
    let mut muct = MuctDataset::new(DatasetConfig {
        clean_on_load: true,
        ignore: vec!["i002qc-mn".into()],
        ..fx.config()
    });
    muct.load().unwrap();
    assert_eq!(muct.names(), ["i000qa-fn"]);
}

#[test]
fn ignore_absent_name_changes_nothing() {
    let fx = Fixture::new("ignore-absent");
    three_subjects(&fx);
    let mut muct = fx.dataset();
    let names = muct.names().to_vec();
    let landmarks = muct.landmarks().to_vec();
    let flips = muct.landmarks_flip().to_vec();

    assert_eq!(muct.ignore("nobody"), 0);
    assert_eq!(muct.names(), names.as_slice());
    assert_eq!(muct.landmarks(), landmarks.as_slice());
    assert_eq!(muct.landmarks_flip(), flips.as_slice());
}

#[test]
fn ignore_keeps_relative_order() {
    let fx = Fixture::new("ignore-order");
    three_subjects(&fx);
    let mut muct = fx.dataset();

    assert_eq!(muct.ignore("i001qb-fn"), 1);
    assert_eq!(muct.names(), ["i000qa-fn", "i002qc-mn"]);
    assert_eq!(muct.tags(), ["fn", "mn"]);
    assert_eq!(muct.landmarks_flip()[0], lmks(&face(10.0)));
    assert_eq!(muct.landmarks_flip()[1], lmks(&face(30.0)));
}

#[test]
fn retain_with_custom_predicate() {
    let fx = Fixture::new("retain");
    three_subjects(&fx);
    let mut muct = fx.dataset();
    assert_eq!(muct.retain(|r| r.tag == "fn"), 1);
    assert_eq!(muct.len(), 2);
}

#[test]
fn all_landmarks_is_canonical_then_mirrored() {
    let fx = Fixture::new("all-lmks");
    three_subjects(&fx);
    let muct = fx.dataset();

    let all = muct.all_landmarks();
    assert_eq!(all.len(), 2 * muct.len());
    assert_eq!(&all[..3], muct.landmarks());
    assert_eq!(&all[3..], muct.landmarks_flip());
}

#[test]
fn iter_data_zips_records() {
    let fx = Fixture::new("iter-data");
    three_subjects(&fx);
    let muct = fx.dataset();

    let records: Vec<_> = muct.iter_data().collect();
    assert_eq!(records.len(), 3);
    assert_eq!(records[2].name, "i002qc-mn");
    assert_eq!(records[2].tag, "mn");
    assert_eq!(records[2].landmarks_flip, &lmks(&face(30.0)));
    assert_eq!(muct.get(2), Some(records[2]));
}

#[test]
fn tag_histogram() {
    let fx = Fixture::new("tags");
    three_subjects(&fx);
    let counts = fx.dataset().tag_counts();
    assert_eq!(counts.get("fn"), Some(&2));
    assert_eq!(counts.get("mn"), Some(&1));
}

#[test]
fn mirror_prefix_partition_example() {
    let fx = Fixture::new("partition");
    fx.write_table(&[("a01", face(1.0)), ("a02", face(2.0)), ("ir01", face(3.0))]);

    // a02 has no mirrored row: reported instead of silently misaligned
    let mut muct = MuctDataset::new(fx.config());
    match muct.load() {
        Err(Error::Unpaired { name }) => assert_eq!(name, "a02"),
        other => panic!("expected unpaired error, got {other:?}"),
    }

    let mut positional = MuctDataset::new(DatasetConfig {
        pairing: Pairing::Positional,
        ..fx.config()
    });
    assert!(matches!(
        positional.load(),
        Err(Error::PartitionMismatch {
            canonical: 2,
            mirrored: 1
        })
    ));
}

#[test]
fn malformed_table_fails_whole_load() {
    let fx = Fixture::new("malformed");
    three_subjects(&fx);
    let path = fx.root.join("muct-landmarks/muct76-opencv.csv");
    let mut text = std::fs::read_to_string(&path).unwrap();
    text.push_str("i003qd-fn,fn,1,2\n");
    std::fs::write(&path, text).unwrap();

    let mut muct = MuctDataset::new(fx.config());
    assert!(matches!(muct.load(), Err(Error::Schema { .. })));
    assert!(muct.is_empty());
}

#[test]
fn missing_table_is_an_io_error() {
    let fx = Fixture::new("no-table");
    let mut muct = MuctDataset::new(fx.config());
    assert!(matches!(muct.load(), Err(Error::Io(_))));
}

#[test]
fn topology_tables_are_exposed() {
    assert_eq!(MuctDataset::SYMMETRY.len(), NUM_LANDMARKS);
    let mut seen = [false; NUM_LANDMARKS];
    for &j in MuctDataset::SYMMETRY.iter() {
        assert!(!seen[j]);
        seen[j] = true;
    }
    assert!(seen.iter().all(|&s| s));
    assert!(MuctDataset::PAIRS
        .iter()
        .all(|&(a, b)| a < NUM_LANDMARKS && b < NUM_LANDMARKS));
}

fn write_image(fx: &Fixture, name: &str, left: [u8; 3]) {
    let mut img = RgbImage::from_pixel(8, 4, Rgb([0, 0, 0]));
    for y in 0..4 {
        img.put_pixel(0, y, Rgb(left));
    }
    img.save(fx.root.join("jpg").join(format!("{name}.png"))).unwrap();
}

#[test]
fn images_are_decoded_lazily_in_two_passes() {
    let fx = Fixture::new("images");
    three_subjects(&fx);
    write_image(&fx, "i000qa-fn", [255, 0, 0]);
    write_image(&fx, "i001qb-fn", [0, 255, 0]);
    write_image(&fx, "i002qc-mn", [0, 0, 255]);

    let mut muct = MuctDataset::new(DatasetConfig {
        image_ext: "png".into(),
        ..fx.config()
    });
    muct.load().unwrap();

    let single = muct.image("i001qb-fn", true).unwrap();
    assert_eq!(single.dimensions(), (8, 4));
    assert_eq!(single.get_pixel(7, 0).0[1], 255);

    let images = muct.iter_images(true);
    assert_eq!(images.len(), 6);
    let marks: Vec<(u8, u8)> = images
        .map(|img| {
            let img = img.unwrap();
            let left = img.get_pixel(0, 0).0;
            let right = img.get_pixel(7, 0).0;
            (left[0].max(left[1]).max(left[2]), right[0].max(right[1]).max(right[2]))
        })
        .collect();
    assert_eq!(&marks[..3], &[(255, 0); 3]);
    assert_eq!(&marks[3..], &[(0, 255); 3]);

    assert_eq!(muct.iter_images(false).count(), 3);
}

#[test]
fn image_rejects_image_dir_outside_the_dataset() {
    let fx = Fixture::new("image-escape");
    write_image(&fx, "i000qa-fn", [255, 0, 0]);
    let muct = MuctDataset::new(DatasetConfig {
        image_dir: fx.root.join("jpg"),
        image_ext: "png".into(),
        ..fx.config()
    });
    assert!(matches!(muct.image("i000qa-fn", false), Err(Error::Config(_))));
}

struct TableFetcher;

impl Fetch for TableFetcher {
    fn fetch(&self, _url: &str, dest: &Path) -> muct_dataset::Result<()> {
        std::fs::create_dir_all(dest.join("muct-landmarks"))?;
        write_table(
            dest,
            &[("i000qa-fn", face(1.0)), ("ir000qa-fn", face(2.0))],
        );
        Ok(())
    }
}

#[test]
fn download_then_load() {
    let fx = Fixture::new("download");
    std::fs::write(fx.root.join("leftover.txt"), "x").unwrap();

    let mut muct = MuctDataset::new(fx.config());
    muct.download_with(&TableFetcher).unwrap();
    assert!(!fx.root.join("leftover.txt").exists());

    muct.load().unwrap();
    assert_eq!(muct.names(), ["i000qa-fn"]);
}
