use super::fingerprint::UserAgentProfile;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
/// Levels of stealth applied to the browser session.
pub enum StealthProfile {
    Lightweight,
    #[default]
    Balanced,
    Maximum,
}

/// Chrome command-line arguments for a stealth profile and fingerprint.
pub fn chromium_arguments(
    profile: StealthProfile,
    user_profile: &UserAgentProfile,
    headless: bool,
) -> Vec<String> {
    let mut args = vec![
        "--disable-blink-features=AutomationControlled".to_string(),
        "--disable-infobars".to_string(),
        "--disable-dev-shm-usage".to_string(),
        "--no-sandbox".to_string(),
        "--disable-gpu".to_string(),
        "--disable-extensions".to_string(),
        format!("--user-agent={}", user_profile.user_agent),
        format!(
            "--window-size={},{}",
            user_profile.viewport.0, user_profile.viewport.1
        ),
        format!("--lang={}", user_profile.languages.join(",")),
    ];
    if profile == StealthProfile::Maximum {
        args.push("--disable-plugins-discovery".to_string());
        args.push("--disable-features=IsolateOrigins,site-per-process".to_string());
    }
    if headless {
        args.push("--headless=new".to_string());
    }
    args
}

/// `moz:firefoxOptions` payload for a stealth profile and fingerprint.
pub fn firefox_options(
    profile: StealthProfile,
    user_profile: &UserAgentProfile,
    headless: bool,
) -> Value {
    let mut args = vec![
        format!("--width={}", user_profile.viewport.0),
        format!("--height={}", user_profile.viewport.1),
    ];
    if headless {
        args.push("-headless".to_string());
    }
    let mut prefs = json!({
        "general.useragent.override": user_profile.user_agent,
        "intl.accept_languages": user_profile.languages.join(", "),
        "dom.webdriver.enabled": false,
    });
    if profile == StealthProfile::Maximum {
        prefs["privacy.resistFingerprinting"] = json!(true);
    }
    json!({ "args": args, "prefs": prefs })
}

/// JavaScript evasions applied after each navigation.
pub struct StealthScripts;

impl StealthScripts {
    pub fn core_evasions() -> &'static str {
        r#"
            Object.defineProperty(navigator, 'webdriver', { get: () => undefined });
            Object.defineProperty(navigator, 'plugins', { get: () => [1, 2, 3, 4, 5] });
            Object.defineProperty(navigator, 'languages', { get: () => ['en-US', 'en'] });
            if (!window.chrome) window.chrome = { runtime: {} };
            const query = window.navigator.permissions && window.navigator.permissions.query;
            if (query) {
                window.navigator.permissions.query = (parameters) =>
                    parameters.name === 'notifications'
                        ? Promise.resolve({ state: Notification.permission })
                        : query(parameters);
            }
        "#
    }

    pub fn webgl_evasions() -> &'static str {
        r#"
            const getParameter = WebGLRenderingContext.prototype.getParameter;
            WebGLRenderingContext.prototype.getParameter = function(parameter) {
                if (parameter === 37445) return 'Intel Inc.';
                if (parameter === 37446) return 'Intel Iris OpenGL Engine';
                return getParameter.call(this, parameter);
            };
        "#
    }

    pub fn canvas_evasions() -> &'static str {
        r#"
            const toDataURL = HTMLCanvasElement.prototype.toDataURL;
            HTMLCanvasElement.prototype.toDataURL = function(...args) {
                const ctx = this.getContext('2d');
                if (ctx && this.width && this.height) {
                    const img = ctx.getImageData(0, 0, this.width, this.height);
                    for (let i = 0; i < img.data.length; i += 4) {
                        if (Math.random() < 0.001) img.data[i] += Math.random() < 0.5 ? -1 : 1;
                    }
                    ctx.putImageData(img, 0, 0);
                }
                return toDataURL.apply(this, args);
            };
        "#
    }

    /// Scripts to run for `profile`, core evasions first.
    pub fn for_profile(profile: StealthProfile) -> Vec<&'static str> {
        match profile {
            StealthProfile::Lightweight => vec![Self::core_evasions()],
            StealthProfile::Balanced => vec![Self::core_evasions(), Self::canvas_evasions()],
            StealthProfile::Maximum => vec![
                Self::core_evasions(),
                Self::canvas_evasions(),
                Self::webgl_evasions(),
            ],
        }
    }

    /// Override `navigator.platform` to match the session fingerprint.
    pub fn platform_override(platform: &str) -> String {
        format!(
            "Object.defineProperty(navigator, 'platform', {{ get: () => {} }});",
            json!(platform)
        )
    }
}
