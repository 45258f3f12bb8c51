//! Builds a real `.deb` through `DebEmitter::{prepare_fakeroot,
//! build_package}` against a staged package tree, then reads the
//! resulting `ar` container back apart and checks its members, rather
//! than trusting the filename alone.

use std::io::Read;

use yap::pack::deb::DebEmitter;
use yap::pack::Emitter;
use yap::recipe::Recipe;

#[test]
fn emits_a_deb_whose_ar_members_round_trip() {
    let build_dir = tempfile::tempdir().unwrap();
    let package_dir = build_dir.path().join("pkg");
    let artifacts_dir = build_dir.path().join("out");
    std::fs::create_dir_all(package_dir.join("usr/bin")).unwrap();
    std::fs::create_dir_all(&artifacts_dir).unwrap();
    std::fs::write(package_dir.join("usr/bin/hello"), b"#!/bin/sh\necho hi\n").unwrap();

    let mut recipe = Recipe {
        pkg_name: "hello".into(),
        pkg_ver: "1.0".into(),
        pkg_rel: "1".into(),
        pkg_desc: "a test package".into(),
        arch_computed: "x86_64".into(),
        package_dir: package_dir.clone(),
        depends: vec!["libc6>=2.38".into()],
        ..Default::default()
    };

    let emitter = DebEmitter;
    emitter.prepare_fakeroot(&mut recipe, &artifacts_dir).unwrap();
    let artifact = emitter.build_package(&recipe, &artifacts_dir).unwrap();

    assert_eq!(artifact.file_name().unwrap(), "hello_1.0-1_amd64.deb");

    let bytes = std::fs::read(&artifact).unwrap();
    let mut archive = ar::Archive::new(bytes.as_slice());
    let mut member_names = Vec::new();
    while let Some(entry) = archive.next_entry() {
        let mut entry = entry.unwrap();
        let name = String::from_utf8(entry.header().identifier().to_vec()).unwrap();
        if name == "debian-binary" {
            let mut contents = String::new();
            entry.read_to_string(&mut contents).unwrap();
            assert_eq!(contents, "2.0\n");
        }
        member_names.push(name);
    }

    assert_eq!(member_names, vec!["debian-binary", "control.tar.zst", "data.tar.zst"]);
}
