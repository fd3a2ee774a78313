// Copyright 2024-2026 Sitt Guruvanich
// SPDX-License-Identifier: Apache-2.0
// SPDX-License-Identifier: MIT

//! Text edits over files Rizzler generates or consumes.
//!
//! These are narrow, pattern-based edits of known shapes: the
//! `vite.config.*` emitted by `create-vite`/`create-analog`, and the host
//! template written by `rzl initiate`. Nothing here is a general HTML or
//! JavaScript parser.

use crate::config::Framework;
use crate::error::RizzlerResult;
use crate::manifest::Manifest;
use crate::templating::{production_head_tags, production_script_tag};
use regex::Regex;
use std::sync::OnceLock;

/// Vite config file names, in lookup order.
pub const VITE_CONFIG_FILES: [&str; 4] = [
    "vite.config.js",
    "vite.config.ts",
    "vite.config.mjs",
    "vite.config.mts",
];

fn define_config_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        // `defineConfig({` or `defineConfig(({ mode }) => ({`
        Regex::new(r"defineConfig\(\s*(?:\([^)]*\)\s*=>\s*\(\s*)?\{").unwrap()
    })
}

fn src_reference_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r#"(['"`])\./src\b"#).unwrap())
}

fn hmr_call_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(
            r"[ \t]*\{\{-?\s*(?:vite_hmr_client|vite_react_refresh)\(\s*\)\s*(?:\|\s*safe\s*)?-?\}\}(?:[ \t]*\r?\n)?",
        )
        .unwrap()
    })
}

fn asset_call_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(
            r#"\{\{-?\s*vite_asset\(\s*path\s*=\s*(?:"([^"]*)"|'([^']*)')\s*\)\s*(?:\|\s*safe\s*)?-?\}\}"#,
        )
        .unwrap()
    })
}

fn head_close_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"(?im)^([ \t]*)</head>").unwrap())
}

/// Wires a scaffolded Vite config into the Rizzler layout.
///
/// Adds a `node:path` import and, inside the `defineConfig` object:
/// `build.manifest`, `build.rollupOptions.input` pointing at the framework's
/// entry under `pages/`, `server.origin` set to `vite_url`, and an `@` alias
/// for `./pages`. Keys the config already has are extended rather than
/// duplicated. `./src` references become `./pages`.
///
/// Returns `None` if no `defineConfig` object was found. A config that
/// already enables the manifest is returned unchanged.
pub fn patch_vite_config(source: &str, framework: Framework, vite_url: &str) -> Option<String> {
    if source.contains("manifest: true") {
        return Some(source.to_string());
    }
    define_config_pattern().find(source)?;

    let mut patched = src_reference_pattern()
        .replace_all(source, "${1}./pages")
        .into_owned();

    let entry = framework.entry_path();
    let sections = [
        (
            "build",
            format!(
                "manifest: true,\n    rollupOptions: {{\n      input: path.resolve(__dirname, './{}'),\n    }},",
                entry
            ),
        ),
        ("server", format!("origin: '{}',", vite_url.trim_end_matches('/'))),
        (
            "resolve",
            "alias: {\n      '@': path.resolve(__dirname, './pages'),\n    },".to_string(),
        ),
    ];
    // Inserted in reverse so each lands right after `defineConfig({` in order.
    for (key, body) in sections.iter().rev() {
        patched = merge_section(&patched, key, body);
    }

    if !patched.contains("import path from") {
        patched = add_import(&patched, "import path from 'node:path'");
    }

    Some(patched)
}

/// Inserts `body` into the top-level `key: {` of the config object, creating
/// the key if it is missing.
fn merge_section(source: &str, key: &str, body: &str) -> String {
    let Some(config_open) = define_config_pattern().find(source) else {
        return source.to_string();
    };
    let after_open = config_open.end();

    let existing = Regex::new(&format!(r"\n(\s*){}\s*:\s*\{{", regex::escape(key)))
        .ok()
        .and_then(|pattern| pattern.find_at(source, after_open));

    match existing {
        Some(found) => {
            let insert_at = found.end();
            format!(
                "{}\n    {}{}",
                &source[..insert_at],
                body,
                &source[insert_at..]
            )
        }
        None => format!(
            "{}\n  {}: {{\n    {}\n  }},{}",
            &source[..after_open],
            key,
            body,
            &source[after_open..]
        ),
    }
}

/// Inserts an import after the last top-level `import` line.
fn add_import(source: &str, import: &str) -> String {
    let mut lines: Vec<&str> = source.lines().collect();
    let position = lines
        .iter()
        .rposition(|line| line.starts_with("import "))
        .map(|index| index + 1)
        .unwrap_or(0);
    lines.insert(position, import);

    let mut result = lines.join("\n");
    if source.ends_with('\n') {
        result.push('\n');
    }
    result
}

/// Rewrites the host template into a production HTML entry point.
///
/// The `vite_hmr_client()` and `vite_react_refresh()` calls are dropped.
/// Every `vite_asset(path=...)` call becomes the built module script, and
/// the stylesheets and `modulepreload`
/// links of all entries go right before `</head>`. Everything else,
/// including other template expressions, is left as it was.
///
/// # Errors
///
/// Returns [`crate::RizzlerError::MissingEntry`] if a referenced entry is not
/// in the manifest.
pub fn rewrite_entry_html(template: &str, manifest: &Manifest, base: &str) -> RizzlerResult<String> {
    let without_client = hmr_call_pattern().replace_all(template, "");

    let mut output = String::with_capacity(without_client.len());
    let mut head_tags: Vec<String> = Vec::new();
    let mut last = 0;

    for captures in asset_call_pattern().captures_iter(&without_client) {
        let Some(call) = captures.get(0) else {
            continue;
        };
        let path = captures
            .get(1)
            .or_else(|| captures.get(2))
            .map(|m| m.as_str())
            .unwrap_or_default();

        let assets = manifest.entry_assets(path)?;
        for tag in production_head_tags(&assets, base) {
            if !head_tags.contains(&tag) {
                head_tags.push(tag);
            }
        }

        output.push_str(&without_client[last..call.start()]);
        output.push_str(&production_script_tag(&assets, base));
        last = call.end();
    }
    output.push_str(&without_client[last..]);

    if head_tags.is_empty() {
        return Ok(output);
    }

    match head_close_pattern().captures(&output) {
        Some(captures) => {
            let indent = captures.get(1).map(|m| m.as_str()).unwrap_or_default();
            let close_at = captures.get(0).map(|m| m.start()).unwrap_or(output.len());
            let links: String = head_tags
                .iter()
                .map(|tag| format!("{indent}  {tag}\n"))
                .collect();
            Ok(format!(
                "{}{}{}",
                &output[..close_at],
                links,
                &output[close_at..]
            ))
        }
        None => Ok(format!("{}\n{}", head_tags.join("\n"), output)),
    }
}
