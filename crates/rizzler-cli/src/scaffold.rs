// Copyright 2024-2026 Sitt Guruvanich
// SPDX-License-Identifier: Apache-2.0
// SPDX-License-Identifier: MIT

//! Turns a freshly scaffolded Vite project into the Rizzler layout.
//!
//! The scaffolding tool writes into [`TMP_DIR`]. From there `package.json`,
//! the Vite config, the TypeScript configs, `src/` (renamed to `pages/`) and
//! `public/` move into the project root, and the host template is written to
//! `templates/index.html`. Existing targets are replaced.

use include_dir::{include_dir, Dir, DirEntry};
use rizzler::rewrite::{patch_vite_config, VITE_CONFIG_FILES};
use rizzler::{Framework, RizzlerConfig};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::cli::CONFIG_FILE;

static SCAFFOLD_TEMPLATE: Dir = include_dir!("$CARGO_MANIFEST_DIR/templates/scaffold");

/// Directory the scaffolding tool writes into, relative to the project root.
pub const TMP_DIR: &str = "rzl-tmp";

/// Errors while adopting a scaffolded project.
#[derive(Error, Debug)]
pub enum ScaffoldError {
    /// The scaffolding tool did not produce a file the layout needs.
    #[error("Scaffolding did not produce {0}")]
    MissingOutput(PathBuf),

    /// Embedded template file is not valid UTF-8.
    #[error("Non-UTF8 template file: {0}")]
    InvalidTemplate(PathBuf),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

/// Files the adopted project is made of, relative to the project root.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Adopted {
    /// Paths created or replaced, in creation order.
    pub paths: Vec<PathBuf>,
    /// Whether the Vite config was patched. `false` if it had no
    /// `defineConfig` object to extend.
    pub vite_config_patched: bool,
}

/// Moves the contents of `root/rzl-tmp` into the Rizzler layout and removes
/// the temporary directory.
pub fn adopt(root: &Path, framework: Framework, vite_url: &str) -> Result<Adopted, ScaffoldError> {
    let tmp = root.join(TMP_DIR);
    let mut adopted = Adopted::default();

    let package_json = tmp.join("package.json");
    if !package_json.is_file() {
        return Err(ScaffoldError::MissingOutput(package_json));
    }
    let sources = tmp.join("src");
    if !sources.is_dir() {
        return Err(ScaffoldError::MissingOutput(sources));
    }

    replace(&package_json, &root.join("package.json"))?;
    adopted.paths.push(PathBuf::from("package.json"));

    if let Some(name) = VITE_CONFIG_FILES.iter().find(|name| tmp.join(name).is_file()) {
        for existing in VITE_CONFIG_FILES {
            remove_path(&root.join(existing))?;
        }
        let target = root.join(name);
        replace(&tmp.join(name), &target)?;

        let source = fs::read_to_string(&target)?;
        match patch_vite_config(&source, framework, vite_url) {
            Some(patched) => {
                fs::write(&target, patched)?;
                adopted.vite_config_patched = true;
            }
            None => tracing::warn!("No defineConfig in {}, left it unpatched", name),
        }
        adopted.paths.push(PathBuf::from(name));
    } else {
        tracing::warn!("Scaffolding produced no Vite config");
    }

    let mut compiler_configs = Vec::new();
    for entry in fs::read_dir(&tmp)? {
        let name = entry?.file_name().to_string_lossy().into_owned();
        if is_compiler_config(&name) {
            compiler_configs.push(name);
        }
    }
    compiler_configs.sort();
    for name in compiler_configs {
        replace(&tmp.join(&name), &root.join(&name))?;
        adopted.paths.push(PathBuf::from(name));
    }

    replace(&sources, &root.join("pages"))?;
    adopted.paths.push(PathBuf::from("pages"));

    let public = tmp.join("public");
    if public.is_dir() {
        replace(&public, &root.join("public"))?;
    } else {
        fs::create_dir_all(root.join("public"))?;
    }
    adopted.paths.push(PathBuf::from("public"));

    adopted.paths.extend(write_host_template(root, framework)?);

    fs::remove_dir_all(&tmp)?;
    Ok(adopted)
}

/// `tsconfig.json`, `tsconfig.app.json`, `jsconfig.json` and friends.
fn is_compiler_config(name: &str) -> bool {
    (name.starts_with("tsconfig") || name.starts_with("jsconfig")) && name.ends_with(".json")
}

/// Writes the host template for `framework` under `root/templates`,
/// replacing whatever was there.
pub fn write_host_template(root: &Path, framework: Framework) -> Result<Vec<PathBuf>, ScaffoldError> {
    remove_path(&root.join("templates"))?;

    // Pages Vite does not serve need the React Fast Refresh preamble.
    let react_refresh = match framework {
        Framework::React => "    {{ vite_react_refresh() | safe }}\n".to_string(),
        _ => String::new(),
    };
    let substitutions = [
        ("{{mount_markup}}", framework.mount_markup().to_string()),
        ("{{entry_path}}", framework.entry_path()),
        ("    {{react_refresh}}\n", react_refresh),
    ];
    let mut written = Vec::new();
    for entry in SCAFFOLD_TEMPLATE.entries() {
        extract_entry(entry, root, &substitutions, &mut written)?;
    }
    Ok(written)
}

fn extract_entry(
    entry: &DirEntry,
    target: &Path,
    substitutions: &[(&str, String)],
    written: &mut Vec<PathBuf>,
) -> Result<(), ScaffoldError> {
    match entry {
        DirEntry::Dir(dir) => {
            fs::create_dir_all(target.join(dir.path()))?;
            for child in dir.entries() {
                extract_entry(child, target, substitutions, written)?;
            }
        }
        DirEntry::File(file) => {
            let file_path = file.path();
            let content = file
                .contents_utf8()
                .ok_or_else(|| ScaffoldError::InvalidTemplate(file_path.to_path_buf()))?;

            let (relative, content) = match file_path.to_str().and_then(|p| p.strip_suffix(".tmpl")) {
                Some(stripped) => {
                    let content = substitutions
                        .iter()
                        .fold(content.to_string(), |acc, (key, value)| acc.replace(key, value));
                    (PathBuf::from(stripped), content)
                }
                None => (file_path.to_path_buf(), content.to_string()),
            };

            let target_path = target.join(&relative);
            if let Some(parent) = target_path.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::write(&target_path, content)?;
            written.push(relative);
        }
    }
    Ok(())
}

/// Writes `rizzler.toml` unless the project already has one.
///
/// Returns `true` if the file was written.
pub fn write_config_if_absent(root: &Path, config: &RizzlerConfig) -> anyhow::Result<bool> {
    let path = root.join(CONFIG_FILE);
    if path.exists() {
        return Ok(false);
    }
    let mut contents = String::from("# Read by `rzl serve` and `rzl build`\n");
    contents.push_str(&config.to_toml()?);
    fs::write(&path, contents)?;
    Ok(true)
}

/// Moves `from` onto `to`, removing `to` first.
fn replace(from: &Path, to: &Path) -> io::Result<()> {
    remove_path(to)?;
    fs::rename(from, to)
}

/// Removes a file or directory. Missing paths are fine.
pub(crate) fn remove_path(path: &Path) -> io::Result<()> {
    match fs::symlink_metadata(path) {
        Ok(meta) if meta.is_dir() => fs::remove_dir_all(path),
        Ok(_) => fs::remove_file(path),
        Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(err) => Err(err),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_host_template_per_framework() {
        let dir = tempfile::tempdir().unwrap();

        let written = write_host_template(dir.path(), Framework::React).unwrap();
        assert_eq!(written, vec![PathBuf::from("templates/index.html")]);

        let html = fs::read_to_string(dir.path().join("templates/index.html")).unwrap();
        assert!(html.contains(r#"<div id="root"></div>"#));
        assert!(html.contains(r#"{{ vite_asset(path="pages/main.jsx") | safe }}"#));
        assert!(html.contains("{{ vite_hmr_client() | safe }}"));
        assert!(html.contains("<title>{{ title }}</title>"));
        assert!(!html.contains("{{mount_markup}}"));
        let refresh = html.find("{{ vite_react_refresh() | safe }}").unwrap();
        let client = html.find("{{ vite_hmr_client() | safe }}").unwrap();
        assert!(refresh < client);

        write_host_template(dir.path(), Framework::Angular).unwrap();
        let html = fs::read_to_string(dir.path().join("templates/index.html")).unwrap();
        assert!(html.contains("<app-root></app-root>"));
        assert!(html.contains(r#"path="pages/main.ts""#));
        assert!(!html.contains("react_refresh"));
        assert!(!html.contains("\n\n"));
    }

    #[test]
    fn test_config_is_written_once() {
        let dir = tempfile::tempdir().unwrap();
        let config = RizzlerConfig::default();

        assert!(write_config_if_absent(dir.path(), &config).unwrap());
        let loaded = RizzlerConfig::load(dir.path().join(CONFIG_FILE)).unwrap();
        assert_eq!(loaded, config);

        fs::write(dir.path().join(CONFIG_FILE), "command = \"bun\"\n").unwrap();
        assert!(!write_config_if_absent(dir.path(), &config).unwrap());
        let kept = fs::read_to_string(dir.path().join(CONFIG_FILE)).unwrap();
        assert_eq!(kept, "command = \"bun\"\n");
    }

    #[test]
    fn test_compiler_configs() {
        assert!(is_compiler_config("tsconfig.json"));
        assert!(is_compiler_config("tsconfig.app.json"));
        assert!(is_compiler_config("jsconfig.json"));
        assert!(!is_compiler_config("package.json"));
        assert!(!is_compiler_config("tsconfig.json.bak"));
    }

    #[test]
    fn test_remove_path_tolerates_missing() {
        let dir = tempfile::tempdir().unwrap();
        remove_path(&dir.path().join("nothing-here")).unwrap();
    }
}
