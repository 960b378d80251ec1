//! Output layout of a generated bundle.
//!
//! ```text
//! <output>/
//! ├── Dockerfile
//! └── config/
//!     ├── krakend.json
//!     ├── settings/
//!     │   └── service.json
//!     └── templates/
//!         ├── Endpoints.tmpl
//!         └── <SERVICE>.tmpl
//! ```

use super::manifest::ManifestBundle;
use super::templates::DISPATCHER_TEMPLATE;
use crate::config::{CONFIG_DIR, DOCKERFILE, MANIFEST_FILE};
use crate::error::{GenError, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

pub const SETTINGS_DIR: &str = "settings";
pub const TEMPLATES_DIR: &str = "templates";
pub const SERVICE_MAP_FILE: &str = "service.json";
pub const TEMPLATE_EXTENSION: &str = "tmpl";

/// One service fragment ready to be written
#[derive(Debug, Clone, PartialEq)]
pub struct ServiceFragment {
    pub service_name: String,
    pub content: String,
}

/// Every file of a bundle, fully rendered in memory
#[derive(Debug, Clone, PartialEq)]
pub struct BundlePlan {
    pub fragments: Vec<ServiceFragment>,
    pub dispatcher: String,
    pub artifacts: ManifestBundle,
}

/// Resolved output paths
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputLayout {
    pub root: PathBuf,
    pub config_dir: PathBuf,
    pub settings_dir: PathBuf,
    pub templates_dir: PathBuf,
}

impl OutputLayout {
    pub fn new(root: &Path) -> Self {
        let config_dir = root.join(CONFIG_DIR);
        OutputLayout {
            root: root.to_path_buf(),
            settings_dir: config_dir.join(SETTINGS_DIR),
            templates_dir: config_dir.join(TEMPLATES_DIR),
            config_dir,
        }
    }

    pub fn template_path(&self, name: &str) -> PathBuf {
        self.templates_dir
            .join(format!("{name}.{TEMPLATE_EXTENSION}"))
    }

    pub fn dockerfile_path(&self) -> PathBuf {
        self.root.join(DOCKERFILE)
    }

    pub fn manifest_path(&self) -> PathBuf {
        self.config_dir.join(MANIFEST_FILE)
    }

    pub fn service_map_path(&self) -> PathBuf {
        self.settings_dir.join(SERVICE_MAP_FILE)
    }

    fn create_dirs(&self) -> Result<()> {
        for dir in [&self.settings_dir, &self.templates_dir] {
            fs::create_dir_all(dir).map_err(|e| GenError::io(dir, e))?;
        }
        Ok(())
    }
}

fn write_file(path: &Path, content: &str) -> Result<()> {
    fs::write(path, content).map_err(|e| GenError::io(path, e))?;
    debug!(path = %path.display(), "Wrote file");
    Ok(())
}

/// Create the directory tree and write every file of `plan`
///
/// Existing files at the same paths are overwritten; unrelated files in the
/// output directory are left alone.
pub fn write_bundle(layout: &OutputLayout, plan: &BundlePlan) -> Result<()> {
    layout.create_dirs()?;

    info!("Writing endpoint files");
    for fragment in &plan.fragments {
        write_file(&layout.template_path(&fragment.service_name), &fragment.content)?;
    }

    info!("Writing {DISPATCHER_TEMPLATE}.{TEMPLATE_EXTENSION}");
    write_file(&layout.template_path(DISPATCHER_TEMPLATE), &plan.dispatcher)?;

    info!("Writing {SETTINGS_DIR}/{SERVICE_MAP_FILE}");
    write_file(&layout.service_map_path(), &plan.artifacts.service_map)?;

    info!("Writing {CONFIG_DIR}/{MANIFEST_FILE}");
    write_file(&layout.manifest_path(), &plan.artifacts.manifest)?;

    info!("Writing {DOCKERFILE}");
    write_file(&layout.dockerfile_path(), &plan.artifacts.dockerfile)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

    use super::*;

    fn plan() -> BundlePlan {
        BundlePlan {
            fragments: vec![ServiceFragment {
                service_name: "BETV1".to_string(),
                content: "{{define \"BETV1\"}}\n{{end}}".to_string(),
            }],
            dispatcher: "{{define \"Endpoints\"}}\n{{end}}".to_string(),
            artifacts: ManifestBundle {
                manifest: "{}".to_string(),
                service_map: "{}".to_string(),
                dockerfile: "FROM scratch\n".to_string(),
            },
        }
    }

    #[test]
    fn test_layout_paths() {
        let layout = OutputLayout::new(Path::new("/out"));
        assert_eq!(layout.template_path("BETV1"), Path::new("/out/config/templates/BETV1.tmpl"));
        assert_eq!(layout.manifest_path(), Path::new("/out/config/krakend.json"));
        assert_eq!(layout.service_map_path(), Path::new("/out/config/settings/service.json"));
        assert_eq!(layout.dockerfile_path(), Path::new("/out/Dockerfile"));
    }

    #[test]
    fn test_write_bundle_creates_tree() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("nested").join("out");
        let layout = OutputLayout::new(&root);
        write_bundle(&layout, &plan()).unwrap();

        assert_eq!(fs::read_to_string(root.join("Dockerfile")).unwrap(), "FROM scratch\n");
        assert!(root.join("config/templates/BETV1.tmpl").is_file());
        assert!(root.join("config/templates/Endpoints.tmpl").is_file());
        assert!(root.join("config/settings/service.json").is_file());
        assert!(root.join("config/krakend.json").is_file());
    }

    #[test]
    fn test_write_bundle_overwrites_existing_files() {
        let dir = tempfile::tempdir().unwrap();
        let layout = OutputLayout::new(dir.path());
        fs::create_dir_all(&layout.config_dir).unwrap();
        fs::write(layout.manifest_path(), "stale").unwrap();

        write_bundle(&layout, &plan()).unwrap();
        assert_eq!(fs::read_to_string(layout.manifest_path()).unwrap(), "{}");
    }
}
