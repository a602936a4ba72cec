//! Shared fixtures: a miniature CodeFormer tree.

#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Relative paths of every file the fixture project ships
pub const PAYLOAD: &[&str] = &[
    "hack/verify.sh",
    "basicsr/__init__.py",
    "basicsr/archs/codeformer_arch.py",
    "basicsr/archs/vqgan_arch.py",
    "facelib/detection/retinaface.py",
    "options/CodeFormer_stage2.yml",
    "scripts/download_pretrained_models.py",
    "Makefile",
    "app.py",
    "inference_codeformer.py",
];

/// Files present in the tree but not part of a release
pub const NOISE: &[&str] = &["README.md", "docs/index.md", "weights/model.pth", ".hidden.py"];

/// Build a fixture project in a fresh temp dir
pub fn project() -> TempDir {
    let dir = TempDir::new().expect("tempdir");
    for rel in PAYLOAD.iter().chain(NOISE) {
        write(dir.path(), rel, &format!("content of {rel}\n"));
    }
    dir
}

pub fn write(root: &Path, rel: &str, content: &str) {
    let path = root.join(rel);
    fs::create_dir_all(path.parent().expect("parent")).expect("mkdir");
    fs::write(path, content).expect("write fixture");
}

/// Sorted file entries of a zip archive (directory entries dropped)
pub fn archive_files(path: &Path) -> Vec<String> {
    let file = fs::File::open(path).expect("open archive");
    let archive = zip::ZipArchive::new(file).expect("read archive");
    let mut names: Vec<String> = archive
        .file_names()
        .filter(|n| !n.ends_with('/'))
        .map(str::to_string)
        .collect();
    names.sort();
    names
}

/// Expected archive file entries for `version`
pub fn expected_files(version: &str) -> Vec<String> {
    let mut names: Vec<String> = PAYLOAD
        .iter()
        .map(|rel| format!("codeformer_v{version}/{rel}"))
        .collect();
    names.sort();
    names
}

/// Names directly inside `dir`, sorted
pub fn list_dir(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = fs::read_dir(dir)
        .expect("read dir")
        .map(|e| e.expect("entry").file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}

pub fn release_archive(root: &Path, version: &str) -> PathBuf {
    root.join("release").join(format!("codeformer_v{version}.zip"))
}
