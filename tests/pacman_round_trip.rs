//! Builds a real `.pkg.tar.zst` through `PacmanEmitter`, then decodes the
//! zstd tar back and checks that the side files and the checksum computed
//! from a real on-disk PKGBUILD both made it into the archive.

use std::io::Read;

use yap::pack::pacman::PacmanEmitter;
use yap::pack::Emitter;
use yap::recipe::Recipe;

#[test]
fn emits_a_pacman_archive_containing_pkginfo_and_buildinfo() {
    let build_dir = tempfile::tempdir().unwrap();
    let start_dir = build_dir.path().join("start");
    let package_dir = build_dir.path().join("pkg");
    let artifacts_dir = build_dir.path().join("out");
    std::fs::create_dir_all(package_dir.join("usr/bin")).unwrap();
    std::fs::create_dir_all(&start_dir).unwrap();
    std::fs::create_dir_all(&artifacts_dir).unwrap();
    std::fs::write(package_dir.join("usr/bin/hello"), b"#!/bin/sh\necho hi\n").unwrap();
    std::fs::write(start_dir.join("PKGBUILD"), b"pkgname=hello\npkgver=1.0\npkgrel=1\n").unwrap();

    let mut recipe = Recipe {
        pkg_name: "hello".into(),
        pkg_ver: "1.0".into(),
        pkg_rel: "1".into(),
        arch_computed: "x86_64".into(),
        start_dir,
        package_dir: package_dir.clone(),
        ..Default::default()
    };

    let emitter = PacmanEmitter;
    emitter.prepare_fakeroot(&mut recipe, &artifacts_dir).unwrap();
    assert_eq!(recipe.checksum.len(), 64, "sha256 hex digest of PKGBUILD should be recorded");

    let artifact = emitter.build_package(&recipe, &artifacts_dir).unwrap();
    assert_eq!(artifact.file_name().unwrap(), "hello-1.0-1-x86_64.pkg.tar.zst");

    let bytes = std::fs::read(&artifact).unwrap();
    let decoder = zstd::stream::read::Decoder::new(bytes.as_slice()).unwrap();
    let mut archive = tar::Archive::new(decoder);
    let mut names = Vec::new();
    for entry in archive.entries().unwrap() {
        let entry = entry.unwrap();
        names.push(entry.path().unwrap().to_string_lossy().into_owned());
    }

    assert!(names.iter().any(|n| n.ends_with(".PKGINFO")));
    assert!(names.iter().any(|n| n.ends_with(".BUILDINFO")));
    assert!(names.iter().any(|n| n.ends_with(".MTREE")));
    assert!(names.iter().any(|n| n.contains("usr/bin/hello")));
}

#[test]
fn build_package_output_is_non_empty_and_zstd_framed() {
    let build_dir = tempfile::tempdir().unwrap();
    let package_dir = build_dir.path().join("pkg");
    std::fs::create_dir_all(&package_dir).unwrap();
    std::fs::write(package_dir.join(".PKGINFO"), "pkgname = x\n").unwrap();

    let recipe = Recipe {
        pkg_name: "x".into(),
        pkg_ver: "1".into(),
        pkg_rel: "1".into(),
        arch_computed: "any".into(),
        package_dir,
        ..Default::default()
    };

    let artifacts_dir = build_dir.path().join("out");
    std::fs::create_dir_all(&artifacts_dir).unwrap();
    let artifact = PacmanEmitter.build_package(&recipe, &artifacts_dir).unwrap();
    let bytes = std::fs::read(&artifact).unwrap();
    assert!(!bytes.is_empty());
    assert_eq!(&bytes[0..4], &[0x28, 0xb5, 0x2f, 0xfd], "must start with the zstd magic number");
}
