//! Loader for `leadlens.yaml` with environment overlays.
//!
//! Sources are merged in order: an optional YAML file, inline YAML (tests and
//! tooling), then `LEADLENS_`-prefixed environment variables with `__` as the
//! nesting separator (`LEADLENS_BROWSER__HEADLESS=false`). After merging,
//! `${VAR}` placeholders in string values are expanded, recursively up to a
//! fixed depth, and the result is deserialized into [`LeadlensConfig`].
//!
//! Every section has defaults, so an empty configuration is a working one.
use config::{Config, ConfigError, Environment, File};
use leadlens_drivers::browser::driver::{BrowserEngine, BrowserOptions};
use leadlens_drivers::browser::stealth::StealthProfile;
use leadlens_extract::{ListingSource, SelectorSet};
use leadlens_web::fetcher::RenderPlan;
use leadlens_web::search::{default_engines, LocationSearch, SearchEngine};
use leadlens_web::sink::{DEFAULT_HTML_PATH, DEFAULT_LISTINGS_PATH};
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub use leadlens_llm::LlmConfig;

const MAXIMUM_ENV_EXPANSION_DEPTH: usize = 8;
pub const DEFAULT_CONFIG_FILE: &str = "leadlens.yaml";

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LeadlensConfig {
    #[serde(default, deserialize_with = "lenient_version")]
    pub version: Option<String>,
    #[serde(default)]
    pub browser: BrowserConfig,
    #[serde(default)]
    pub llm: LlmConfig,
    #[serde(default)]
    pub search: SearchConfig,
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct BrowserConfig {
    pub engine: BrowserEngine,
    pub headless: bool,
    pub stealth: StealthProfile,
    /// Defaults to the engine's usual chromedriver/geckodriver port.
    pub webdriver_url: Option<String>,
    pub user_agent: Option<String>,
    pub page_load_timeout_secs: Option<u64>,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            engine: BrowserEngine::Chromium,
            headless: true,
            stealth: StealthProfile::Balanced,
            webdriver_url: None,
            user_agent: None,
            page_load_timeout_secs: None,
        }
    }
}

impl BrowserConfig {
    pub fn to_options(&self) -> BrowserOptions {
        BrowserOptions {
            engine: self.engine,
            headless: self.headless,
            stealth: self.stealth,
            webdriver_url: self.webdriver_url.clone(),
            user_agent: self.user_agent.clone(),
            page_load_timeout: self.page_load_timeout_secs.map(Duration::from_secs),
        }
    }
}

/// Per-source replacements for the built-in listing selectors.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SelectorOverrides {
    pub yelp: Option<SelectorSet>,
    pub google: Option<SelectorSet>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Rendered in order; each `url_template` carries a `{location}` placeholder.
    pub engines: Vec<SearchEngine>,
    pub dedupe: bool,
    pub network_idle_timeout_secs: u64,
    pub settle_ms: u64,
    pub scroll_cycles: u32,
    pub scroll_pause_ms: u64,
    pub selectors: SelectorOverrides,
}

impl Default for SearchConfig {
    fn default() -> Self {
        let plan = RenderPlan::lazy_scroll();
        Self {
            engines: default_engines(),
            dedupe: false,
            network_idle_timeout_secs: plan
                .network_idle_timeout
                .map(|t| t.as_secs())
                .unwrap_or(30),
            settle_ms: plan.settle.as_millis() as u64,
            scroll_cycles: plan.scroll_cycles,
            scroll_pause_ms: plan.scroll_pause.as_millis() as u64,
            selectors: SelectorOverrides::default(),
        }
    }
}

impl SearchConfig {
    pub fn render_plan(&self) -> RenderPlan {
        RenderPlan {
            network_idle_timeout: Some(Duration::from_secs(self.network_idle_timeout_secs)),
            settle: Duration::from_millis(self.settle_ms),
            scroll_cycles: self.scroll_cycles,
            scroll_pause: Duration::from_millis(self.scroll_pause_ms),
        }
    }

    /// Build the search, compiling any selector overrides.
    pub fn build_search(&self) -> leadlens_common::Result<LocationSearch> {
        let mut search = LocationSearch::new(self.engines.clone())
            .with_plan(self.render_plan())
            .with_dedupe(self.dedupe);
        if let Some(set) = &self.selectors.yelp {
            search = search.with_selectors(ListingSource::Yelp, set)?;
        }
        if let Some(set) = &self.selectors.google {
            search = search.with_selectors(ListingSource::Google, set)?;
        }
        Ok(search)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub html_path: PathBuf,
    pub listings_path: PathBuf,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            html_path: PathBuf::from(DEFAULT_HTML_PATH),
            listings_path: PathBuf::from(DEFAULT_LISTINGS_PATH),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// `EnvFilter` directive used when `RUST_LOG` is unset.
    pub level: String,
    /// `text` or `json`.
    pub format: String,
    pub dir: Option<PathBuf>,
    pub stderr: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".into(),
            format: "text".into(),
            dir: None,
            stderr: false,
        }
    }
}

fn lenient_version<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => None,
        Some(Value::String(s)) => Some(s),
        Some(other) => Some(other.to_string()),
    })
}

fn expand_env_in_value(v: &mut Value) {
    match v {
        Value::String(s) => {
            if s.contains('$') {
                let mut cur = std::mem::take(s);
                for _ in 0..MAXIMUM_ENV_EXPANSION_DEPTH {
                    let expanded = match shellexpand::env(&cur) {
                        Ok(cow) => cow.into_owned(),
                        Err(_) => cur.clone(),
                    };
                    if expanded == cur {
                        break;
                    }
                    cur = expanded;
                }
                *s = cur;
            }
        }
        Value::Array(arr) => arr.iter_mut().for_each(expand_env_in_value),
        Value::Object(obj) => obj.values_mut().for_each(expand_env_in_value),
        _ => {}
    }
}

/// Where to read configuration from when no path was given explicitly:
/// `./leadlens.yaml`, then `<config dir>/leadlens/leadlens.yaml`.
pub fn discover_config_file() -> Option<PathBuf> {
    let local = PathBuf::from(DEFAULT_CONFIG_FILE);
    if local.is_file() {
        return Some(local);
    }
    dirs::config_dir()
        .map(|dir| dir.join("leadlens").join(DEFAULT_CONFIG_FILE))
        .filter(|path| path.is_file())
}

/// Builder hides the `config` crate wiring (YAML + env overrides).
pub struct LeadlensConfigLoader {
    builder: config::ConfigBuilder<config::builder::DefaultState>,
}

impl Default for LeadlensConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl LeadlensConfigLoader {
    /// Start from defaults plus `LEADLENS_` env overrides.
    ///
    /// ```
    /// use leadlens_config::{LeadlensConfigLoader, LlmConfig};
    ///
    /// let config = LeadlensConfigLoader::new()
    ///     .with_yaml_str("version: '1'")
    ///     .load()
    ///     .expect("valid config");
    ///
    /// assert_eq!(config.version.as_deref(), Some("1"));
    /// assert_eq!(config.search.engines.len(), 2);
    /// assert!(matches!(config.llm, LlmConfig::Ollama { .. }));
    /// ```
    pub fn new() -> Self {
        Self {
            builder: Config::builder(),
        }
    }

    /// Attach a YAML/TOML/JSON file that must exist; format is inferred from the suffix.
    pub fn with_file<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.builder = self
            .builder
            .add_source(File::from(path.as_ref()).required(true));
        self
    }

    /// Attach a file that may be missing.
    pub fn with_optional_file<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.builder = self
            .builder
            .add_source(File::from(path.as_ref()).required(false));
        self
    }

    /// Merge an inline YAML snippet.
    ///
    /// ```
    /// use leadlens_config::{LeadlensConfigLoader, LlmConfig};
    ///
    /// let cfg = LeadlensConfigLoader::new()
    ///     .with_yaml_str(
    ///         r#"
    /// llm:
    ///   provider: openai
    ///   model: gpt-4o-mini
    ///   endpoint: http://localhost:8000/v1
    /// search:
    ///   dedupe: true
    /// "#,
    ///     )
    ///     .load()
    ///     .unwrap();
    ///
    /// assert!(cfg.search.dedupe);
    /// match cfg.llm {
    ///     LlmConfig::Openai { endpoint, .. } => assert_eq!(endpoint, "http://localhost:8000/v1"),
    ///     other => panic!("unexpected {other:?}"),
    /// }
    /// ```
    pub fn with_yaml_str(mut self, yaml: &str) -> Self {
        self.builder = self
            .builder
            .add_source(File::from_str(yaml, config::FileFormat::Yaml));
        self
    }

    /// Merge all sources, expand `${VAR}` placeholders and deserialize.
    pub fn load(self) -> Result<LeadlensConfig, ConfigError> {
        let cfg = self
            .builder
            .add_source(
                Environment::with_prefix("LEADLENS")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let mut v: Value = cfg.try_deserialize()?;
        if v.is_null() {
            v = Value::Object(Default::default());
        }
        expand_env_in_value(&mut v);

        serde_json::from_value(v).map_err(|e| ConfigError::Message(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn expands_simple_string() {
        temp_env::with_var("FOO", Some("bar"), || {
            let mut v = json!("prefix-${FOO}-suffix");
            expand_env_in_value(&mut v);
            assert_eq!(v, json!("prefix-bar-suffix"));
        });
    }

    #[test]
    fn expands_in_array_and_object() {
        temp_env::with_vars([("CITY", Some("Winston")), ("STATE", Some("NC"))], || {
            let mut v = json!([
                "hello-$CITY",
                { "loc": "${CITY}-${STATE}" },
                42,
                true,
                null
            ]);
            expand_env_in_value(&mut v);
            assert_eq!(
                v,
                json!(["hello-Winston", { "loc": "Winston-NC" }, 42, true, null])
            );
        });
    }

    #[test]
    fn expands_recursively_across_env_values() {
        temp_env::with_vars(
            [
                ("BAZ", Some("qux")),
                ("BAR", Some("mid-${BAZ}")),
                ("FOO", Some("start-${BAR}-end")),
            ],
            || {
                let mut v = json!("X=${FOO}");
                expand_env_in_value(&mut v);
                assert_eq!(v, json!("X=start-mid-qux-end"));
            },
        );
    }

    #[test]
    fn stops_on_cycles() {
        temp_env::with_vars([("A", Some("${B}")), ("B", Some("${A}"))], || {
            let mut v = json!("x=${A}-y");
            expand_env_in_value(&mut v);
            let s = v.as_str().unwrap();
            assert!(s.starts_with("x=") && s.ends_with("-y"));
            assert!(s.contains("${"));
        });
    }

    #[test]
    fn unknown_vars_are_left_as_is() {
        let mut v = json!("hi-${LEADLENS_DOES_NOT_EXIST}");
        expand_env_in_value(&mut v);
        assert_eq!(v, json!("hi-${LEADLENS_DOES_NOT_EXIST}"));
    }

    #[test]
    fn numeric_versions_are_kept_as_text() {
        let cfg: LeadlensConfig = serde_json::from_value(json!({ "version": 0.1 })).unwrap();
        assert_eq!(cfg.version.as_deref(), Some("0.1"));
    }

    #[test]
    fn defaults_match_the_listing_flow() {
        let cfg = LeadlensConfig::default();
        assert_eq!(cfg.search.render_plan(), RenderPlan::lazy_scroll());
        assert_eq!(cfg.output.html_path, PathBuf::from("scraped_content.html"));
        assert_eq!(
            cfg.output.listings_path,
            PathBuf::from("spirits_locations.json")
        );
        assert!(cfg.browser.headless);
        assert_eq!(
            cfg.browser.to_options().endpoint(),
            "http://localhost:9515"
        );
    }

    #[test]
    fn selector_overrides_compile_into_the_search() {
        let cfg: LeadlensConfig = serde_json::from_value(json!({
            "search": {
                "selectors": {
                    "google": {
                        "listing": "li.shop",
                        "name": { "match": "element", "selector": "h2" },
                        "address": { "match": "element", "selector": "address" },
                        "phone": { "match": "any_text", "pattern": "\\d{3}-\\d{4}" }
                    }
                }
            }
        }))
        .unwrap();
        assert!(cfg.search.selectors.google.is_some());
        assert!(cfg.search.build_search().is_ok());

        let broken: LeadlensConfig = serde_json::from_value(json!({
            "search": {
                "selectors": {
                    "yelp": {
                        "listing": "div[[",
                        "name": { "match": "element", "selector": "a" },
                        "address": { "match": "element", "selector": "address" },
                        "phone": { "match": "any_text", "pattern": "x" }
                    }
                }
            }
        }))
        .unwrap();
        assert!(broken.search.build_search().is_err());
    }
}
