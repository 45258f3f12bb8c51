//! The `yap.json` workspace manifest.

use std::path::Path;

use serde::Deserialize;

use super::error::{Error, Result};

fn default_build_dir() -> String {
    "/tmp".to_string()
}

fn default_output() -> String {
    "artifacts".to_string()
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProjectEntry {
    pub name: String,
    #[serde(default)]
    pub depends: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Manifest {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default = "default_build_dir", rename = "buildDir")]
    pub build_dir: String,
    #[serde(default = "default_output")]
    pub output: String,
    #[serde(default, rename = "cleanPrevious")]
    pub clean_previous: bool,
    pub projects: Vec<ProjectEntry>,
}

impl Manifest {
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        serde_json::from_str(&text).map_err(|e| Error::ManifestParse(path.to_path_buf(), e))
    }

    pub fn project(&self, name: &str) -> Option<&ProjectEntry> {
        self.projects.iter().find(|p| p.name == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_minimal_manifest() {
        let json = r#"{
            "name": "ws",
            "projects": [
                { "name": "a", "depends": ["b"] },
                { "name": "b" }
            ]
        }"#;
        let manifest: Manifest = serde_json::from_str(json).unwrap();
        assert_eq!(manifest.build_dir, "/tmp");
        assert_eq!(manifest.output, "artifacts");
        assert_eq!(manifest.projects.len(), 2);
        assert_eq!(manifest.projects[0].depends, vec!["b".to_string()]);
    }

    #[test]
    fn honors_explicit_overrides() {
        let json = r#"{
            "name": "ws",
            "buildDir": "/var/build",
            "output": "out",
            "cleanPrevious": true,
            "projects": []
        }"#;
        let manifest: Manifest = serde_json::from_str(json).unwrap();
        assert_eq!(manifest.build_dir, "/var/build");
        assert_eq!(manifest.output, "out");
        assert!(manifest.clean_previous);
    }
}
