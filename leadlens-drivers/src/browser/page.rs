use crate::browser::{
    behavioral::BehavioralEngine,
    fingerprint::UserAgentManager,
    stealth::{StealthProfile, StealthScripts},
};
use anyhow::{Context, Result};
use fantoccini::Client;
use std::time::{Duration, Instant};

/// How long the resource count must hold still before the page counts as idle.
pub const NETWORK_QUIET_WINDOW: Duration = Duration::from_millis(500);
const NETWORK_POLL_INTERVAL: Duration = Duration::from_millis(100);

const NETWORK_PROBE: &str = r#"
    return [
        document.readyState === 'complete',
        performance.getEntriesByType('resource').length
    ];
"#;

const SCROLL_TO_BOTTOM: &str = "window.scrollTo(0, document.body.scrollHeight);";

/// Decides when a page has gone network-idle from periodic probes.
#[derive(Debug)]
pub struct IdleTracker {
    quiet_window: Duration,
    last_count: Option<u64>,
    stable_since: Option<Instant>,
}

impl IdleTracker {
    pub fn new(quiet_window: Duration) -> Self {
        Self {
            quiet_window,
            last_count: None,
            stable_since: None,
        }
    }

    /// Record one probe. Returns `true` once the document has loaded and no
    /// new resource entries have appeared for the quiet window.
    pub fn observe(&mut self, loaded: bool, resource_count: u64, now: Instant) -> bool {
        if !loaded {
            self.last_count = None;
            self.stable_since = None;
            return false;
        }
        if self.last_count != Some(resource_count) {
            self.last_count = Some(resource_count);
            self.stable_since = Some(now);
            return false;
        }
        self.stable_since
            .is_some_and(|since| now.duration_since(since) >= self.quiet_window)
    }
}

/// One navigated tab of a [`crate::browser::driver::LeadlensDriver`] session.
pub struct LeadlensPage {
    client: Client,
    stealth_profile: StealthProfile,
    user_agent_manager: UserAgentManager,
    behavioral_engine: BehavioralEngine,
}

impl LeadlensPage {
    pub fn new(
        client: Client,
        stealth_profile: StealthProfile,
        user_agent_manager: UserAgentManager,
        behavioral_engine: BehavioralEngine,
    ) -> Self {
        Self {
            client,
            stealth_profile,
            user_agent_manager,
            behavioral_engine,
        }
    }

    /// Navigate to `url` and apply stealth/fingerprint scripts.
    pub async fn goto(&mut self, url: &str) -> Result<()> {
        self.behavioral_engine.random_delay(300, 1200).await;
        self.client
            .goto(url)
            .await
            .with_context(|| format!("navigation to {url} failed"))?;
        self.apply_stealth().await
    }

    async fn apply_stealth(&mut self) -> Result<()> {
        for script in StealthScripts::for_profile(self.stealth_profile) {
            self.client.execute(script, vec![]).await?;
        }
        if self.stealth_profile == StealthProfile::Maximum {
            let platform = self.user_agent_manager.session_profile().platform.clone();
            self.client
                .execute(&StealthScripts::platform_override(&platform), vec![])
                .await?;
        }
        Ok(())
    }

    /// Full serialized DOM of the current document.
    pub async fn get_content(&self) -> Result<String> {
        self.client.source().await.map_err(anyhow::Error::from)
    }

    /// Scroll the window to the bottom of the document body.
    pub async fn scroll_to_bottom(&self) -> Result<()> {
        self.client.execute(SCROLL_TO_BOTTOM, vec![]).await?;
        Ok(())
    }

    /// Wait until the page stops requesting resources, or `timeout` passes.
    ///
    /// Returns `false` on timeout; a page that never settles is still usable.
    pub async fn wait_for_network_idle(&self, timeout: Duration) -> Result<bool> {
        let deadline = Instant::now() + timeout;
        let mut tracker = IdleTracker::new(NETWORK_QUIET_WINDOW);
        loop {
            let probe = self.client.execute(NETWORK_PROBE, vec![]).await?;
            let loaded = probe[0].as_bool().unwrap_or(false);
            let count = probe[1].as_u64().unwrap_or(0);
            let now = Instant::now();
            if tracker.observe(loaded, count, now) {
                return Ok(true);
            }
            if now >= deadline {
                tracing::debug!(target: "browser.page", ?timeout, "network never went idle");
                return Ok(false);
            }
            tokio::time::sleep(NETWORK_POLL_INTERVAL).await;
        }
    }

    /// Fixed pause, e.g. to let client-side rendering finish.
    pub async fn pause(&self, duration: Duration) {
        self.behavioral_engine.pause(duration).await;
    }
}
