#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use pageflow::config::{ConfigFile, RawConfigFile};

/// Builder for `ConfigFile` rooted at a test directory.
pub struct ConfigFileBuilder {
    root: PathBuf,
    config: RawConfigFile,
}

impl ConfigFileBuilder {
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
            config: RawConfigFile::default(),
        }
    }

    pub fn with_purge_staging(mut self, val: bool) -> Self {
        self.config.build.purge_staging = val;
        self
    }

    pub fn with_data(mut self, key: &str, value: impl Into<toml::Value>) -> Self {
        self.config.data.insert(key.to_string(), value.into());
        self
    }

    pub fn with_route(mut self, prefix: &str, dir: &str) -> Self {
        self.config
            .server
            .routes
            .insert(prefix.to_string(), dir.to_string());
        self
    }

    pub fn with_styles_pattern(mut self, pattern: &str) -> Self {
        self.config.build.paths.styles = pattern.to_string();
        self
    }

    pub fn raw(&self) -> &RawConfigFile {
        &self.config
    }

    pub fn build(self) -> ConfigFile {
        ConfigFile::from_raw(self.config, self.root)
            .expect("Failed to build valid config from builder")
    }
}

/// Write `contents` to `root/rel`, creating parent directories.
pub fn write_file(root: &Path, rel: &str, contents: impl AsRef<[u8]>) -> PathBuf {
    let path = root.join(rel);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("create fixture dir");
    }
    fs::write(&path, contents).expect("write fixture file");
    path
}

/// A small but complete site under `root` using the default layout:
/// one stylesheet with a partial, one script, one page with build blocks,
/// an image, a font and a public file.
pub fn write_site_fixture(root: &Path) {
    write_file(
        root,
        "src/assets/styles/main.scss",
        "$brand: #336699;\n// header\nbody {\n  color: $brand;\n}\n",
    );
    write_file(root, "src/assets/styles/_vars.scss", "$unused: 1px;\n");
    write_file(
        root,
        "src/assets/scripts/main.js",
        "// entry\nconsole.log('hello');\n\nwindow.ready = true;\n",
    );
    write_file(
        root,
        "src/index.html",
        concat!(
            "<!DOCTYPE html>\n",
            "<html>\n<head>\n  <title>{{ site.title }}</title>\n",
            "  <!-- build:css assets/styles/bundle.css -->\n",
            "  <link rel=\"stylesheet\" href=\"assets/styles/main.css\">\n",
            "  <!-- endbuild -->\n",
            "</head>\n<body>\n  <h1>{{ site.title }}</h1>\n",
            "  <!-- build:js assets/scripts/bundle.js -->\n",
            "  <script src=\"assets/scripts/main.js\"></script>\n",
            "  <!-- endbuild -->\n",
            "</body>\n</html>\n",
        ),
    );
    write_file(root, "src/assets/images/logo.png", [0x89, b'P', b'N', b'G']);
    write_file(root, "src/assets/fonts/site.woff2", b"wOF2");
    write_file(root, "public/favicon.ico", b"ico");
}
