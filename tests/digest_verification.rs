//! Integrity verification end-to-end: a real file on disk, hashed with a
//! real `sha2` digest, checked back through `yap::digest::verify`.

use sha2::{Digest, Sha256};

#[test]
fn verifies_a_real_file_against_its_own_sha256() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("source.tar.gz");
    std::fs::write(&path, b"not actually a tarball, just test bytes").unwrap();

    let mut hasher = Sha256::new();
    hasher.update(b"not actually a tarball, just test bytes");
    let expected = hex::encode(hasher.finalize());

    yap::digest::verify(&path, &expected).unwrap();
}

#[test]
fn rejects_a_tampered_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("source.tar.gz");
    std::fs::write(&path, b"original bytes").unwrap();

    let mut hasher = Sha256::new();
    hasher.update(b"different bytes entirely");
    let wrong = hex::encode(hasher.finalize());

    let err = yap::digest::verify(&path, &wrong).unwrap_err();
    assert!(err.to_string().contains("digest mismatch"));
}

#[test]
fn skip_marker_always_passes() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("anything");
    std::fs::write(&path, b"contents").unwrap();
    yap::digest::verify(&path, "SKIP").unwrap();
}
