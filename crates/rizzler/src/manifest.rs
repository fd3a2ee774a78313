// Copyright 2024-2026 Sitt Guruvanich
// SPDX-License-Identifier: Apache-2.0
// SPDX-License-Identifier: MIT

//! Vite build manifest.
//!
//! With `build.manifest` enabled, `vite build` writes a JSON map from source
//! paths (`pages/main.jsx`) to the hashed files it produced. Vite 5 puts it
//! in `<outDir>/.vite/manifest.json`; Vite 4 used `<outDir>/manifest.json`.

use crate::error::{RizzlerError, RizzlerResult};
use serde::Deserialize;
use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};

/// One chunk or asset in the manifest.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ManifestChunk {
    /// Output file, relative to the build directory.
    pub file: String,
    /// Source path for entries and dynamic entries.
    #[serde(default)]
    pub src: Option<String>,
    /// Whether the chunk is a build entry.
    #[serde(default)]
    pub is_entry: bool,
    /// Manifest keys of statically imported chunks.
    #[serde(default)]
    pub imports: Vec<String>,
    /// Manifest keys of dynamically imported chunks.
    #[serde(default)]
    pub dynamic_imports: Vec<String>,
    /// Stylesheets emitted for this chunk.
    #[serde(default)]
    pub css: Vec<String>,
    /// Other assets referenced by this chunk.
    #[serde(default)]
    pub assets: Vec<String>,
}

/// Files needed to load one entry in the browser.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EntryAssets {
    /// The entry's JavaScript module.
    pub script: String,
    /// Stylesheets of the entry and everything it imports statically.
    pub css: Vec<String>,
    /// Statically imported chunks, preloaded with `modulepreload`.
    pub preloads: Vec<String>,
}

/// Parsed Vite manifest.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(transparent)]
pub struct Manifest {
    chunks: BTreeMap<String, ManifestChunk>,
}

impl Manifest {
    /// Parses a manifest from JSON text.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON is not a Vite manifest.
    pub fn parse(json: &str) -> RizzlerResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Reads a manifest file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: impl AsRef<Path>) -> RizzlerResult<Self> {
        let content = fs::read_to_string(path)?;
        Self::parse(&content)
    }

    /// Finds the manifest inside a build directory.
    ///
    /// # Errors
    ///
    /// Returns [`RizzlerError::ManifestNotFound`] if neither location exists.
    pub fn locate(dist_dir: impl AsRef<Path>) -> RizzlerResult<PathBuf> {
        let dist_dir = dist_dir.as_ref();
        [
            dist_dir.join(".vite").join("manifest.json"),
            dist_dir.join("manifest.json"),
        ]
        .into_iter()
        .find(|path| path.is_file())
        .ok_or_else(|| RizzlerError::ManifestNotFound(dist_dir.to_path_buf()))
    }

    /// Locates and reads the manifest of a build directory.
    ///
    /// # Errors
    ///
    /// See [`Manifest::locate`] and [`Manifest::load`].
    pub fn from_dist(dist_dir: impl AsRef<Path>) -> RizzlerResult<Self> {
        Self::load(Self::locate(dist_dir)?)
    }

    /// Returns the chunk for a source path such as `pages/main.js`.
    ///
    /// A leading `/` is ignored.
    pub fn entry(&self, src: &str) -> Option<&ManifestChunk> {
        self.chunks.get(src.trim_start_matches('/'))
    }

    /// Entries declared by the build.
    pub fn entries(&self) -> impl Iterator<Item = (&str, &ManifestChunk)> {
        self.chunks
            .iter()
            .filter(|(_, chunk)| chunk.is_entry)
            .map(|(key, chunk)| (key.as_str(), chunk))
    }

    /// Collects everything the browser needs for `src`.
    ///
    /// CSS is gathered depth-first through static imports, imported chunks
    /// before the importer, without duplicates. Import cycles are tolerated.
    ///
    /// # Errors
    ///
    /// Returns [`RizzlerError::MissingEntry`] if `src` is not in the manifest.
    pub fn entry_assets(&self, src: &str) -> RizzlerResult<EntryAssets> {
        let chunk = self
            .entry(src)
            .ok_or_else(|| RizzlerError::MissingEntry(src.to_string()))?;

        let mut assets = EntryAssets {
            script: chunk.file.clone(),
            ..Default::default()
        };
        let mut visited = HashSet::new();
        visited.insert(src.trim_start_matches('/').to_string());

        for import in &chunk.imports {
            self.collect_import(import, &mut visited, &mut assets);
        }
        for css in &chunk.css {
            push_unique(&mut assets.css, css);
        }

        Ok(assets)
    }

    fn collect_import(&self, key: &str, visited: &mut HashSet<String>, assets: &mut EntryAssets) {
        if !visited.insert(key.to_string()) {
            return;
        }
        let Some(chunk) = self.chunks.get(key) else {
            tracing::debug!("Manifest import {:?} has no chunk", key);
            return;
        };

        for import in &chunk.imports {
            self.collect_import(import, visited, assets);
        }
        for css in &chunk.css {
            push_unique(&mut assets.css, css);
        }
        push_unique(&mut assets.preloads, &chunk.file);
    }
}

fn push_unique(list: &mut Vec<String>, item: &str) {
    if !list.iter().any(|existing| existing == item) {
        list.push(item.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MANIFEST: &str = r#"{
  "_shared-B7PI925R.js": {
    "file": "assets/shared-B7PI925R.js",
    "name": "shared",
    "imports": ["_vendor-a1b2c3.js"],
    "css": ["assets/shared-ChJ_j-JJ.css"]
  },
  "_vendor-a1b2c3.js": {
    "file": "assets/vendor-a1b2c3.js",
    "imports": ["_shared-B7PI925R.js"]
  },
  "pages/assets/logo.svg": {
    "file": "assets/logo-BuPIv-2h.svg",
    "src": "pages/assets/logo.svg"
  },
  "pages/main.jsx": {
    "file": "assets/main-BRBmoGS9.js",
    "name": "main",
    "src": "pages/main.jsx",
    "isEntry": true,
    "imports": ["_shared-B7PI925R.js"],
    "css": ["assets/main-5UjPuW-k.css"],
    "assets": ["assets/logo-BuPIv-2h.svg"]
  }
}"#;

    #[test]
    fn test_entry_lookup() {
        let manifest = Manifest::parse(MANIFEST).unwrap();
        assert_eq!(
            manifest.entry("pages/main.jsx").map(|c| c.file.as_str()),
            Some("assets/main-BRBmoGS9.js")
        );
        assert!(manifest.entry("/pages/main.jsx").is_some());
        assert!(manifest.entry("pages/missing.js").is_none());

        let entries: Vec<_> = manifest.entries().map(|(key, _)| key).collect();
        assert_eq!(entries, vec!["pages/main.jsx"]);
    }

    #[test]
    fn test_entry_assets_follow_imports_once() {
        let manifest = Manifest::parse(MANIFEST).unwrap();
        let assets = manifest.entry_assets("pages/main.jsx").unwrap();

        assert_eq!(assets.script, "assets/main-BRBmoGS9.js");
        assert_eq!(
            assets.css,
            vec!["assets/shared-ChJ_j-JJ.css", "assets/main-5UjPuW-k.css"]
        );
        assert_eq!(
            assets.preloads,
            vec!["assets/vendor-a1b2c3.js", "assets/shared-B7PI925R.js"]
        );
    }

    #[test]
    fn test_missing_entry() {
        let manifest = Manifest::parse(MANIFEST).unwrap();
        assert!(matches!(
            manifest.entry_assets("pages/main.ts"),
            Err(RizzlerError::MissingEntry(_))
        ));
    }

    #[test]
    fn test_locate_prefers_vite5_location() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            Manifest::locate(dir.path()),
            Err(RizzlerError::ManifestNotFound(_))
        ));

        fs::write(dir.path().join("manifest.json"), "{}").unwrap();
        assert_eq!(
            Manifest::locate(dir.path()).unwrap(),
            dir.path().join("manifest.json")
        );

        fs::create_dir_all(dir.path().join(".vite")).unwrap();
        fs::write(dir.path().join(".vite/manifest.json"), MANIFEST).unwrap();
        let manifest = Manifest::from_dist(dir.path()).unwrap();
        assert!(manifest.entry("pages/main.jsx").is_some());
    }
}
