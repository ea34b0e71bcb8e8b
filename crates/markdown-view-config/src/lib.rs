use markdown_view_engine::{ClassResolver, Color, RenderContext, StyleOverride, TextStyle, Theme};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use thiserror::Error;
use url::Url;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {config_path}: {source}")]
    ConfigReadError {
        config_path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file at {config_path}: {source}")]
    ConfigParseError {
        config_path: PathBuf,
        source: toml::de::Error,
    },
}

/// Colors overriding the built-in theme; unset entries keep the default.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ThemeConfig {
    pub code_background: Option<Color>,
    pub symbol_link_background: Option<Color>,
    pub highlight_background: Option<Color>,
    pub highlight_foreground: Option<Color>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub theme: ThemeConfig,
    /// Text style code blocks are set in.
    pub code_block_style: TextStyle,
    /// Highlight search matches inside code blocks too.
    pub highlight_code: bool,
    /// Directory relative links and images resolve against.
    pub link_base: Option<PathBuf>,
    /// Styles for `{.class}` inline attribute specs, keyed by class name.
    pub inline_classes: BTreeMap<String, StyleOverride>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            theme: ThemeConfig::default(),
            code_block_style: TextStyle::Callout,
            highlight_code: true,
            link_base: None,
            inline_classes: BTreeMap::new(),
        }
    }
}

impl Config {
    pub fn load_from_path<P: AsRef<Path>>(config_path: P) -> Result<Option<Self>, ConfigError> {
        let config_path = config_path.as_ref();
        if !config_path.exists() {
            return Ok(None);
        }

        let content = std::fs::read_to_string(config_path).map_err(|source| {
            ConfigError::ConfigReadError {
                config_path: config_path.to_path_buf(),
                source,
            }
        })?;

        let mut config: Config =
            toml::from_str(&content).map_err(|source| ConfigError::ConfigParseError {
                config_path: config_path.to_path_buf(),
                source,
            })?;

        // Expand shell variables and tilde in the link base
        config.link_base = config
            .link_base
            .map(|path| Self::expand_path(&path).unwrap_or(path));

        Ok(Some(config))
    }

    pub fn load() -> Result<Option<Self>, ConfigError> {
        let config_path = Self::config_path();
        Self::load_from_path(&config_path)
    }

    pub fn save_to_path<P: AsRef<Path>>(&self, config_path: P) -> anyhow::Result<()> {
        let config_path = config_path.as_ref();
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(config_path, content)?;
        Ok(())
    }

    pub fn config_path() -> PathBuf {
        let config_dir = shellexpand::tilde("~/.config/markdown-view");
        PathBuf::from(config_dir.as_ref()).join("config.toml")
    }

    /// The built-in theme with configured colors applied.
    pub fn theme(&self) -> Theme {
        let defaults = Theme::default();
        Theme {
            code_background: self.theme.code_background.unwrap_or(defaults.code_background),
            symbol_link_background: self
                .theme
                .symbol_link_background
                .unwrap_or(defaults.symbol_link_background),
            highlight_background: self
                .theme
                .highlight_background
                .unwrap_or(defaults.highlight_background),
            highlight_foreground: self
                .theme
                .highlight_foreground
                .unwrap_or(defaults.highlight_foreground),
        }
    }

    pub fn class_resolver(&self) -> ClassResolver {
        ClassResolver::new(self.inline_classes.clone())
    }

    /// `link_base` as a directory URL, if it is an absolute path.
    pub fn link_base_url(&self) -> Option<Url> {
        let path = self.link_base.as_ref()?;
        match Url::from_directory_path(path) {
            Ok(url) => Some(url),
            Err(()) => {
                log::warn!("Ignoring link_base {}: not an absolute path", path.display());
                None
            }
        }
    }

    /// A render context carrying every configured setting.
    pub fn render_context(&self) -> RenderContext {
        let ctx = RenderContext::new()
            .with_theme(self.theme())
            .with_code_style(self.code_block_style)
            .with_highlight_code(self.highlight_code);
        let ctx = match self.link_base_url() {
            Some(url) => ctx.with_base_url(url),
            None => ctx,
        };
        let resolver = self.class_resolver();
        if resolver.is_empty() {
            ctx
        } else {
            ctx.with_resolver(resolver)
        }
    }

    fn expand_path(path: &Path) -> Option<PathBuf> {
        let path_str = path.to_string_lossy();
        match shellexpand::full(&path_str) {
            Ok(expanded) => Some(PathBuf::from(expanded.as_ref())),
            Err(_) => None,
        }
    }
}
