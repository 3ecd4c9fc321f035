// src/config/model.rs

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::Deserialize;

/// Top-level configuration as read from a TOML file.
///
/// ```toml
/// [build]
/// src = "src"
/// dist = "dist"
/// temp = "temp"
/// public = "public"
///
/// [build.paths]
/// styles = "assets/styles/*.scss"
/// html = "*.html"
///
/// [data]
/// title = "Home"
///
/// [server]
/// port = 3000
/// ```
///
/// All sections are optional and fall back to the defaults below.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct RawConfigFile {
    #[serde(default)]
    pub build: BuildSection,

    /// Values exposed to page templates as `{{ key }}`.
    #[serde(default)]
    pub data: BTreeMap<String, toml::Value>,

    #[serde(default)]
    pub server: ServerSection,
}

/// `[build]` section: directory layout plus source patterns.
#[derive(Debug, Clone, Deserialize)]
pub struct BuildSection {
    #[serde(default = "default_src")]
    pub src: String,

    #[serde(default = "default_dist")]
    pub dist: String,

    /// Staging directory for compiled-but-not-yet-post-processed output.
    #[serde(default = "default_temp")]
    pub temp: String,

    /// Static files copied verbatim into `dist`.
    #[serde(default = "default_public")]
    pub public: String,

    /// Remove `temp` once a `build` has succeeded.
    ///
    /// Off by default: staging persists between builds.
    #[serde(default)]
    pub purge_staging: bool,

    #[serde(default)]
    pub paths: PathPatterns,
}

fn default_src() -> String {
    "src".to_string()
}

fn default_dist() -> String {
    "dist".to_string()
}

fn default_temp() -> String {
    "temp".to_string()
}

fn default_public() -> String {
    "public".to_string()
}

impl Default for BuildSection {
    fn default() -> Self {
        Self {
            src: default_src(),
            dist: default_dist(),
            temp: default_temp(),
            public: default_public(),
            purge_staging: false,
            paths: PathPatterns::default(),
        }
    }
}

/// `[build.paths]`: glob patterns relative to `build.src`.
#[derive(Debug, Clone, Deserialize)]
pub struct PathPatterns {
    #[serde(default = "default_styles")]
    pub styles: String,
    #[serde(default = "default_scripts")]
    pub scripts: String,
    #[serde(default = "default_html")]
    pub html: String,
    #[serde(default = "default_images")]
    pub images: String,
    #[serde(default = "default_fonts")]
    pub fonts: String,
}

fn default_styles() -> String {
    "assets/styles/*.scss".to_string()
}

fn default_scripts() -> String {
    "assets/scripts/*.js".to_string()
}

fn default_html() -> String {
    "*.html".to_string()
}

fn default_images() -> String {
    "assets/images/**".to_string()
}

fn default_fonts() -> String {
    "assets/fonts/**".to_string()
}

impl Default for PathPatterns {
    fn default() -> Self {
        Self {
            styles: default_styles(),
            scripts: default_scripts(),
            html: default_html(),
            images: default_images(),
            fonts: default_fonts(),
        }
    }
}

impl PathPatterns {
    /// All patterns with their field names, for validation messages.
    pub fn named(&self) -> [(&'static str, &str); 5] {
        [
            ("styles", self.styles.as_str()),
            ("scripts", self.scripts.as_str()),
            ("html", self.html.as_str()),
            ("images", self.images.as_str()),
            ("fonts", self.fonts.as_str()),
        ]
    }
}

/// `[server]` section for the `dev` preview.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerSection {
    #[serde(default = "default_port")]
    pub port: u16,

    /// URL prefix -> directory, e.g. `"/node_modules" = "node_modules"`.
    #[serde(default = "default_routes")]
    pub routes: BTreeMap<String, String>,
}

fn default_port() -> u16 {
    3000
}

fn default_routes() -> BTreeMap<String, String> {
    let mut routes = BTreeMap::new();
    routes.insert("/node_modules".to_string(), "node_modules".to_string());
    routes
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            port: default_port(),
            routes: default_routes(),
        }
    }
}

/// Validated, immutable configuration.
///
/// Constructed only through validation (`config::validate`), so every
/// consumer can rely on the directory layout being sane. Relative
/// directories are resolved against `root`.
#[derive(Debug, Clone)]
pub struct ConfigFile {
    root: PathBuf,
    build: BuildSection,
    data: BTreeMap<String, toml::Value>,
    server: ServerSection,
}

impl ConfigFile {
    pub(crate) fn new_unchecked(raw: RawConfigFile, root: PathBuf) -> Self {
        Self {
            root,
            build: raw.build,
            data: raw.data,
            server: raw.server,
        }
    }

    /// Project root (directory containing the config file).
    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn build_section(&self) -> &BuildSection {
        &self.build
    }

    pub fn paths(&self) -> &PathPatterns {
        &self.build.paths
    }

    pub fn data(&self) -> &BTreeMap<String, toml::Value> {
        &self.data
    }

    pub fn server(&self) -> &ServerSection {
        &self.server
    }

    pub fn purge_staging(&self) -> bool {
        self.build.purge_staging
    }

    pub fn src_dir(&self) -> PathBuf {
        self.root.join(&self.build.src)
    }

    pub fn dist_dir(&self) -> PathBuf {
        self.root.join(&self.build.dist)
    }

    pub fn temp_dir(&self) -> PathBuf {
        self.root.join(&self.build.temp)
    }

    pub fn public_dir(&self) -> PathBuf {
        self.root.join(&self.build.public)
    }

    /// Resolve a path relative to the project root.
    pub fn resolve(&self, rel: impl AsRef<Path>) -> PathBuf {
        self.root.join(rel)
    }
}
