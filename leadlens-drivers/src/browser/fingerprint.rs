use crate::browser::driver::BrowserEngine;
use rand::prelude::SliceRandom;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
/// Snapshot of user agent, viewport, and locale characteristics.
pub struct UserAgentProfile {
    pub user_agent: String,
    pub viewport: (u32, u32),
    pub platform: String,
    pub languages: Vec<String>,
}

impl UserAgentProfile {
    fn desktop(user_agent: &str, viewport: (u32, u32), platform: &str) -> Self {
        Self {
            user_agent: user_agent.to_string(),
            viewport,
            platform: platform.to_string(),
            languages: vec!["en-US".to_string(), "en".to_string()],
        }
    }

    /// Built-in desktop profiles whose user agent matches `engine`; the
    /// Windows profile comes first.
    fn pool(engine: BrowserEngine) -> Vec<Self> {
        match engine {
            BrowserEngine::Chromium => vec![
                Self::desktop(
                    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36",
                    (1920, 1080),
                    "Win32",
                ),
                Self::desktop(
                    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36",
                    (1440, 900),
                    "MacIntel",
                ),
            ],
            BrowserEngine::Firefox => vec![
                Self::desktop(
                    "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:133.0) Gecko/20100101 Firefox/133.0",
                    (1920, 1080),
                    "Win32",
                ),
                Self::desktop(
                    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10.15; rv:133.0) Gecko/20100101 Firefox/133.0",
                    (1440, 900),
                    "MacIntel",
                ),
            ],
        }
    }
}

#[derive(Debug, Clone)]
/// Picks one plausible desktop profile per browser session.
pub struct UserAgentManager {
    desktop_profiles: Vec<UserAgentProfile>,
    current_session_profile: Option<UserAgentProfile>,
}

impl UserAgentManager {
    /// Manager drawing from the profiles that fit `engine`.
    pub fn new(engine: BrowserEngine) -> Self {
        Self {
            desktop_profiles: UserAgentProfile::pool(engine),
            current_session_profile: None,
        }
    }

    /// Pin the session to the engine's Windows profile, carrying `user_agent`.
    pub fn with_user_agent(engine: BrowserEngine, user_agent: impl Into<String>) -> Self {
        let mut manager = Self::new(engine);
        let mut pinned = manager.desktop_profiles[0].clone();
        pinned.user_agent = user_agent.into();
        manager.current_session_profile = Some(pinned);
        manager
    }

    /// Get (or lazily select) the current session profile.
    pub fn session_profile(&mut self) -> &UserAgentProfile {
        let pool = &self.desktop_profiles;
        self.current_session_profile.get_or_insert_with(|| {
            pool.choose(&mut rand::thread_rng())
                .cloned()
                .unwrap_or_else(|| UserAgentProfile::pool(BrowserEngine::Chromium).remove(0))
        })
    }
}
