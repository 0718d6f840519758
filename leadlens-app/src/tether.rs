use anyhow::{Context, Result};
use leadlens_config::{
    BrowserConfig, LeadlensConfig, LeadlensConfigLoader, LoggingConfig, discover_config_file,
};
use leadlens_common::observability::{LogConfig, LogFormat};
use leadlens_llm::{LlmConfig, ensure_llm_ready, traits::LlmClient};
use leadlens_web::fetcher::BrowserFetcher;
use leadlens_web::search::LocationSearch;
use std::path::Path;
use std::sync::Arc;

/// Load configuration. An explicit path must exist; otherwise the usual
/// locations are tried and defaults apply when none is found.
pub fn load_config(explicit: Option<&Path>) -> Result<LeadlensConfig> {
    let loader = LeadlensConfigLoader::new();
    let loader = match explicit.map(Path::to_path_buf).or_else(discover_config_file) {
        Some(path) => loader.with_file(path),
        None => loader,
    };
    loader.load().context("failed to load leadlens configuration")
}

pub fn log_config(logging: &LoggingConfig) -> LogConfig {
    LogConfig {
        app_name: "leadlens",
        log_dir: logging.dir.clone(),
        emit_stderr: logging.stderr,
        format: LogFormat::from_name(&logging.format),
        default_filter: logging.level.clone(),
    }
}

pub async fn build_llm_client(cfg: &LlmConfig) -> Result<Arc<dyn LlmClient + Send + Sync>> {
    let client = ensure_llm_ready(cfg)
        .await
        .context("chat backend is not ready")?;
    tracing::info!(target: "llm.client", model = client.model_name(), "chat backend ready");
    Ok(client)
}

/// A fetcher for one flow. `headless` overrides the configured mode.
pub fn browser_fetcher(browser: &BrowserConfig, headless: Option<bool>) -> BrowserFetcher {
    let mut options = browser.to_options();
    if let Some(headless) = headless {
        options.headless = headless;
    }
    BrowserFetcher::new(options)
}

/// The configured location search; `--dedupe` can only turn deduplication on.
pub fn location_search(cfg: &LeadlensConfig, force_dedupe: bool) -> Result<LocationSearch> {
    let search = cfg
        .search
        .build_search()
        .context("invalid listing selectors in configuration")?;
    Ok(search.with_dedupe(cfg.search.dedupe || force_dedupe))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dedupe_flag_only_turns_dedupe_on() {
        let cfg = LeadlensConfig::default();
        assert!(!location_search(&cfg, false).unwrap().dedupes());
        assert!(location_search(&cfg, true).unwrap().dedupes());

        let mut cfg = LeadlensConfig::default();
        cfg.search.dedupe = true;
        assert!(location_search(&cfg, false).unwrap().dedupes());
    }

    #[test]
    fn log_settings_follow_config() {
        let logging = LoggingConfig {
            level: "debug,leadlens_web=trace".into(),
            format: "JSON".into(),
            dir: None,
            stderr: true,
        };
        let log = log_config(&logging);
        assert_eq!(log.format, LogFormat::Json);
        assert_eq!(log.default_filter, "debug,leadlens_web=trace");
        assert!(log.emit_stderr);
    }

    #[test]
    fn explicit_missing_config_is_an_error() {
        let tmp = tempfile::TempDir::new().unwrap();
        assert!(load_config(Some(&tmp.path().join("nope.yaml"))).is_err());
    }
}
