// Copyright 2024-2026 Sitt Guruvanich
// SPDX-License-Identifier: Apache-2.0
// SPDX-License-Identifier: MIT

//! Template globals for Vite.
//!
//! [`RizzleTemplates`] wraps a Tera environment and registers two
//! functions for server-side templates:
//!
//! - `vite_hmr_client()`: the Vite client that receives hot updates
//! - `vite_asset(path="pages/main.js")`: the module script for an entry
//! - `vite_react_refresh()`: the `@vitejs/plugin-react` preamble, needed
//!   when the page is not served by Vite itself
//!
//! Both return markup, so templates pipe them through `safe`:
//!
//! ```html
//! {{ vite_hmr_client() | safe }}
//! {{ vite_asset(path="pages/main.js") | safe }}
//! ```

use crate::error::RizzlerResult;
use crate::manifest::{EntryAssets, Manifest};
use serde::Serialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tera::{Context, Tera, Value};

/// Where `vite_asset` points.
#[derive(Debug, Clone)]
pub enum AssetMode {
    /// Assets are served by the Vite dev server.
    Dev {
        /// Dev server origin, e.g. `http://localhost:5173`.
        vite_url: String,
    },
    /// Assets come from a finished build.
    Production {
        /// Manifest of the build.
        manifest: Arc<Manifest>,
        /// URL prefix the build directory is served under.
        base: String,
    },
}

/// `<script>` tag loading the Vite HMR client.
pub fn hmr_client_tag(vite_url: &str) -> String {
    format!(
        r#"<script type="module" src="{}/@vite/client"></script>"#,
        vite_url.trim_end_matches('/')
    )
}

/// Inline module installing React Fast Refresh from the dev server.
///
/// `@vitejs/plugin-react` only injects this into pages Vite serves, so a
/// host-rendered page must include it before any `.jsx` entry.
pub fn react_refresh_tag(vite_url: &str) -> String {
    format!(
        r#"<script type="module">
  import RefreshRuntime from '{}/@react-refresh'
  RefreshRuntime.injectIntoGlobalHook(window)
  window.$RefreshReg$ = () => {{}}
  window.$RefreshSig$ = () => (type) => type
  window.__vite_plugin_react_preamble_installed__ = true
</script>"#,
        vite_url.trim_end_matches('/')
    )
}

/// `<script>` tag loading an entry module from the dev server.
pub fn dev_asset_tag(vite_url: &str, path: &str) -> String {
    format!(
        r#"<script async defer type="module" src="{}/{}"></script>"#,
        vite_url.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}

fn asset_url(base: &str, file: &str) -> String {
    format!("{}/{}", base.trim_end_matches('/'), file.trim_start_matches('/'))
}

/// Stylesheet and `modulepreload` links for an entry. These belong in `<head>`.
pub fn production_head_tags(assets: &EntryAssets, base: &str) -> Vec<String> {
    let css = assets
        .css
        .iter()
        .map(|file| format!(r#"<link rel="stylesheet" href="{}" />"#, asset_url(base, file)));
    let preloads = assets
        .preloads
        .iter()
        .map(|file| format!(r#"<link rel="modulepreload" href="{}" />"#, asset_url(base, file)));
    css.chain(preloads).collect()
}

/// Module script tag for a built entry.
pub fn production_script_tag(assets: &EntryAssets, base: &str) -> String {
    format!(
        r#"<script type="module" src="{}"></script>"#,
        asset_url(base, &assets.script)
    )
}

/// Every tag an entry needs, head links first.
pub fn production_asset_tags(assets: &EntryAssets, base: &str) -> String {
    let mut tags = production_head_tags(assets, base);
    tags.push(production_script_tag(assets, base));
    tags.join("\n")
}

/// Tera environment with the Vite globals registered.
pub struct RizzleTemplates {
    tera: Tera,
    dir: PathBuf,
    glob: Option<String>,
    mode: AssetMode,
}

impl RizzleTemplates {
    /// Loads every `.html` template under `dir`.
    ///
    /// # Errors
    ///
    /// Returns an error if a template fails to parse.
    pub fn new(dir: impl AsRef<Path>, mode: AssetMode) -> RizzlerResult<Self> {
        let dir = dir.as_ref().to_path_buf();
        let glob = dir.join("**").join("*.html").to_string_lossy().into_owned();
        let tera = load_glob(&glob, &mode)?;

        Ok(Self {
            tera,
            dir,
            glob: Some(glob),
            mode,
        })
    }

    /// Builds an environment from in-memory templates.
    ///
    /// # Errors
    ///
    /// Returns an error if a template fails to parse.
    pub fn from_raw<'a, I>(templates: I, mode: AssetMode) -> RizzlerResult<Self>
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut tera = Tera::default();
        tera.add_raw_templates(templates)?;
        register_globals(&mut tera, &mode);

        Ok(Self {
            tera,
            dir: PathBuf::new(),
            glob: None,
            mode,
        })
    }

    /// Renders a template with a Tera context.
    ///
    /// # Errors
    ///
    /// Returns an error if the template is missing or fails to render.
    pub fn render(&self, name: &str, context: &Context) -> RizzlerResult<String> {
        Ok(self.tera.render(name, context)?)
    }

    /// Renders a template with any serializable value as context.
    ///
    /// # Errors
    ///
    /// Returns an error if the value is not a map or rendering fails.
    pub fn render_value<T: Serialize>(&self, name: &str, value: &T) -> RizzlerResult<String> {
        let context = Context::from_serialize(value)?;
        self.render(name, &context)
    }

    /// Re-reads templates from disk. In-memory templates are left as they are.
    ///
    /// # Errors
    ///
    /// Returns an error if a template fails to parse; the previous templates
    /// are kept in that case.
    pub fn reload(&mut self) -> RizzlerResult<()> {
        let Some(glob) = &self.glob else {
            return Ok(());
        };
        self.tera = load_glob(glob, &self.mode)?;
        tracing::debug!("Reloaded templates from {}", self.dir.display());
        Ok(())
    }

    /// Names of the loaded templates.
    pub fn template_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.tera.get_template_names().collect();
        names.sort_unstable();
        names
    }

    /// Returns the asset mode.
    pub fn mode(&self) -> &AssetMode {
        &self.mode
    }
}

fn load_glob(glob: &str, mode: &AssetMode) -> RizzlerResult<Tera> {
    let mut tera = Tera::new(glob)?;
    register_globals(&mut tera, mode);
    Ok(tera)
}

fn register_globals(tera: &mut Tera, mode: &AssetMode) {
    match mode.clone() {
        AssetMode::Dev { vite_url } => {
            let client = hmr_client_tag(&vite_url);
            tera.register_function("vite_hmr_client", move |_: &HashMap<String, Value>| {
                Ok(Value::String(client.clone()))
            });
            let preamble = react_refresh_tag(&vite_url);
            tera.register_function("vite_react_refresh", move |_: &HashMap<String, Value>| {
                Ok(Value::String(preamble.clone()))
            });
            tera.register_function("vite_asset", move |args: &HashMap<String, Value>| {
                let path = path_arg(args)?;
                Ok(Value::String(dev_asset_tag(&vite_url, path)))
            });
        }
        AssetMode::Production { manifest, base } => {
            for empty in ["vite_hmr_client", "vite_react_refresh"] {
                tera.register_function(empty, |_: &HashMap<String, Value>| {
                    Ok(Value::String(String::new()))
                });
            }
            tera.register_function("vite_asset", move |args: &HashMap<String, Value>| {
                let path = path_arg(args)?;
                let assets = manifest
                    .entry_assets(path)
                    .map_err(|err| tera::Error::msg(err.to_string()))?;
                Ok(Value::String(production_asset_tags(&assets, &base)))
            });
        }
    }
}

fn path_arg(args: &HashMap<String, Value>) -> tera::Result<&str> {
    args.get("path")
        .and_then(Value::as_str)
        .ok_or_else(|| tera::Error::msg("vite_asset expects a string `path` argument"))
}

#[cfg(test)]
mod tests {
    use super::*;

    const INDEX: &str = r#"<head><title>{{ title }}</title></head>
<body>
{{ vite_hmr_client() | safe }}
{{ vite_asset(path="pages/main.js") | safe }}
</body>"#;

    fn dev_mode() -> AssetMode {
        AssetMode::Dev {
            vite_url: "http://localhost:5173/".to_string(),
        }
    }

    #[test]
    fn test_dev_tags() {
        assert_eq!(
            hmr_client_tag("http://localhost:5173"),
            r#"<script type="module" src="http://localhost:5173/@vite/client"></script>"#
        );
        assert_eq!(
            dev_asset_tag("http://localhost:5173/", "/pages/main.js"),
            r#"<script async defer type="module" src="http://localhost:5173/pages/main.js"></script>"#
        );
    }

    #[test]
    fn test_render_dev_mode() {
        let templates = RizzleTemplates::from_raw([("index.html", INDEX)], dev_mode()).unwrap();
        let mut context = Context::new();
        context.insert("title", "Unspoken <Rizz>");
        let html = templates.render("index.html", &context).unwrap();

        assert!(html.contains("<title>Unspoken &lt;Rizz&gt;</title>"));
        assert!(html.contains(r#"src="http://localhost:5173/@vite/client""#));
        assert!(html.contains(r#"src="http://localhost:5173/pages/main.js""#));
    }

    #[test]
    fn test_render_production_mode() {
        let manifest = Manifest::parse(
            r#"{"pages/main.js": {"file": "assets/main-abc.js", "isEntry": true, "css": ["assets/main-def.css"]}}"#,
        )
        .unwrap();
        let mode = AssetMode::Production {
            manifest: Arc::new(manifest),
            base: "/dist/".to_string(),
        };
        let templates = RizzleTemplates::from_raw([("index.html", INDEX)], mode).unwrap();
        let html = templates
            .render_value("index.html", &serde_json::json!({ "title": "Prod" }))
            .unwrap();

        assert!(!html.contains("@vite/client"));
        assert!(html.contains(r#"<link rel="stylesheet" href="/dist/assets/main-def.css" />"#));
        assert!(html.contains(r#"<script type="module" src="/dist/assets/main-abc.js"></script>"#));
    }

    #[test]
    fn test_vite_asset_requires_path() {
        let templates = RizzleTemplates::from_raw(
            [("broken.html", "{{ vite_asset() | safe }}")],
            dev_mode(),
        )
        .unwrap();
        assert!(templates.render("broken.html", &Context::new()).is_err());
    }

    #[test]
    fn test_react_refresh_preamble() {
        let templates = RizzleTemplates::from_raw(
            [("react.html", "{{ vite_react_refresh() | safe }}\n{{ vite_asset(path=\"pages/main.jsx\") | safe }}")],
            dev_mode(),
        )
        .unwrap();
        let html = templates.render("react.html", &Context::new()).unwrap();

        assert!(html.starts_with(r#"<script type="module">"#));
        assert!(html.contains("import RefreshRuntime from 'http://localhost:5173/@react-refresh'"));
        assert!(html.contains("window.$RefreshReg$ = () => {}"));
        assert!(html.contains("window.__vite_plugin_react_preamble_installed__ = true"));
        let preamble = html.find("@react-refresh").unwrap();
        let entry = html.find("pages/main.jsx").unwrap();
        assert!(preamble < entry);
    }

    #[test]
    fn test_react_refresh_is_empty_in_production() {
        let mode = AssetMode::Production {
            manifest: Arc::new(Manifest::default()),
            base: "/dist".to_string(),
        };
        let templates =
            RizzleTemplates::from_raw([("react.html", "[{{ vite_react_refresh() | safe }}]")], mode)
                .unwrap();
        assert_eq!(templates.render("react.html", &Context::new()).unwrap(), "[]");
    }

    #[test]
    fn test_failed_reload_keeps_previous_templates() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("index.html"), "v1").unwrap();
        let mut templates = RizzleTemplates::new(dir.path(), dev_mode()).unwrap();

        std::fs::write(dir.path().join("index.html"), "{{ broken").unwrap();
        assert!(templates.reload().is_err());
        assert_eq!(templates.render("index.html", &Context::new()).unwrap(), "v1");

        std::fs::write(dir.path().join("index.html"), "v3 {{ vite_hmr_client() | safe }}").unwrap();
        templates.reload().unwrap();
        let html = templates.render("index.html", &Context::new()).unwrap();
        assert!(html.starts_with("v3 <script"));
    }

    #[test]
    fn test_load_and_reload_from_directory() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("index.html"), "v1 {{ vite_hmr_client() | safe }}").unwrap();

        let mut templates = RizzleTemplates::new(dir.path(), dev_mode()).unwrap();
        assert_eq!(templates.template_names(), vec!["index.html"]);
        let first = templates.render("index.html", &Context::new()).unwrap();
        assert!(first.starts_with("v1 <script"));

        std::fs::write(dir.path().join("index.html"), "v2").unwrap();
        templates.reload().unwrap();
        assert_eq!(templates.render("index.html", &Context::new()).unwrap(), "v2");
    }
}
