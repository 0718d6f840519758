use crate::browser::{
    behavioral::BehavioralEngine,
    fingerprint::{UserAgentManager, UserAgentProfile},
    page::LeadlensPage,
    stealth::{chromium_arguments, firefox_options, StealthProfile},
};
use anyhow::{Context, Result};
use fantoccini::wd::TimeoutConfiguration;
use fantoccini::{Client, ClientBuilder};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::time::Duration;
use webdriver::capabilities::Capabilities;

/// Which browser the WebDriver endpoint drives.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BrowserEngine {
    #[default]
    Chromium,
    Firefox,
}

impl BrowserEngine {
    /// Where chromedriver / geckodriver listen by default.
    pub fn default_webdriver_url(self) -> &'static str {
        match self {
            Self::Chromium => "http://localhost:9515",
            Self::Firefox => "http://localhost:4444",
        }
    }
}

/// Everything needed to start one browser session.
#[derive(Debug, Clone)]
pub struct BrowserOptions {
    pub engine: BrowserEngine,
    pub headless: bool,
    pub stealth: StealthProfile,
    /// Overrides [`BrowserEngine::default_webdriver_url`].
    pub webdriver_url: Option<String>,
    /// Pin the session user agent instead of picking from the built-in pool.
    pub user_agent: Option<String>,
    pub page_load_timeout: Option<Duration>,
}

impl Default for BrowserOptions {
    fn default() -> Self {
        Self {
            engine: BrowserEngine::Chromium,
            headless: true,
            stealth: StealthProfile::Balanced,
            webdriver_url: None,
            user_agent: None,
            page_load_timeout: None,
        }
    }
}

impl BrowserOptions {
    pub fn endpoint(&self) -> &str {
        self.webdriver_url
            .as_deref()
            .unwrap_or_else(|| self.engine.default_webdriver_url())
    }
}

/// Build the W3C capabilities for a session.
pub fn build_capabilities(options: &BrowserOptions, profile: &UserAgentProfile) -> Capabilities {
    let mut caps = Capabilities::new();
    match options.engine {
        BrowserEngine::Chromium => {
            caps.insert("browserName".to_string(), json!("chrome"));
            let args = chromium_arguments(options.stealth, profile, options.headless);
            caps.insert("goog:chromeOptions".to_string(), json!({ "args": args }));
        }
        BrowserEngine::Firefox => {
            caps.insert("browserName".to_string(), json!("firefox"));
            caps.insert(
                "moz:firefoxOptions".to_string(),
                firefox_options(options.stealth, profile, options.headless),
            );
        }
    }
    caps
}

/// Thin wrapper around a `fantoccini` WebDriver client with stealth and
/// behavioral helpers.
pub struct LeadlensDriver {
    pub client: Client,
    pub behavioral_engine: BehavioralEngine,
    pub user_agent_manager: UserAgentManager,
    pub stealth_profile: StealthProfile,
}

impl LeadlensDriver {
    /// Open a session on a running WebDriver service.
    pub async fn launch(options: &BrowserOptions) -> Result<Self> {
        let mut user_agent_manager = match &options.user_agent {
            Some(ua) => UserAgentManager::with_user_agent(options.engine, ua.clone()),
            None => UserAgentManager::new(options.engine),
        };
        let caps = build_capabilities(options, user_agent_manager.session_profile());

        tracing::info!(
            target: "browser.session",
            endpoint = options.endpoint(),
            engine = ?options.engine,
            headless = options.headless,
            stealth = ?options.stealth,
            "launching browser session"
        );

        let client = ClientBuilder::native()
            .capabilities(caps)
            .connect(options.endpoint())
            .await
            .with_context(|| format!("failed to start browser via {}", options.endpoint()))?;

        if let Some(timeout) = options.page_load_timeout {
            client
                .update_timeouts(TimeoutConfiguration::new(None, Some(timeout), None))
                .await
                .context("failed to set page load timeout")?;
        }

        Ok(Self {
            client,
            behavioral_engine: BehavioralEngine::new(),
            user_agent_manager,
            stealth_profile: options.stealth,
        })
    }

    /// Navigate to `url` and return a [`LeadlensPage`] with stealth/fingerprint
    /// scripts applied.
    pub async fn goto(&mut self, url: &str) -> Result<LeadlensPage> {
        let mut page = LeadlensPage::new(
            self.client.clone(),
            self.stealth_profile,
            self.user_agent_manager.clone(),
            self.behavioral_engine.clone(),
        );
        page.goto(url).await?;
        Ok(page)
    }

    /// Close the underlying browser session.
    pub async fn close(self) -> Result<()> {
        tracing::debug!(target: "browser.session", "closing browser session");
        self.client.close().await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile() -> UserAgentProfile {
        UserAgentManager::with_user_agent(BrowserEngine::Chromium, "UA/2.0")
            .session_profile()
            .clone()
    }

    #[test]
    fn chromium_capabilities_use_chrome_options() {
        let options = BrowserOptions {
            headless: false,
            ..BrowserOptions::default()
        };
        let caps = build_capabilities(&options, &profile());
        let args = caps["goog:chromeOptions"]["args"].as_array().unwrap();
        assert!(args.iter().any(|a| a == "--user-agent=UA/2.0"));
        assert!(!args.iter().any(|a| a == "--headless=new"));
        assert!(!caps.contains_key("moz:firefoxOptions"));
    }

    #[test]
    fn firefox_capabilities_use_firefox_options() {
        let options = BrowserOptions {
            engine: BrowserEngine::Firefox,
            ..BrowserOptions::default()
        };
        let caps = build_capabilities(&options, &profile());
        assert_eq!(caps["browserName"], "firefox");
        assert_eq!(
            caps["moz:firefoxOptions"]["prefs"]["general.useragent.override"],
            "UA/2.0"
        );
    }

    #[test]
    fn endpoint_falls_back_per_engine() {
        let mut options = BrowserOptions {
            engine: BrowserEngine::Firefox,
            ..BrowserOptions::default()
        };
        assert_eq!(options.endpoint(), "http://localhost:4444");
        options.webdriver_url = Some("http://grid:4444/wd/hub".into());
        assert_eq!(options.endpoint(), "http://grid:4444/wd/hub");
    }
}
