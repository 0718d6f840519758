use std::sync::OnceLock;

use leadlens_common::observability::{LogConfig, LogFormat};

static INIT_PATH: OnceLock<std::path::PathBuf> = OnceLock::new();

#[allow(dead_code)]
pub fn init_test_tracing() {
    let _ = INIT_PATH.get_or_init(|| {
        let log_dir = tempfile::tempdir()
            .map(|dir| dir.keep())
            .unwrap_or_else(|_| std::env::temp_dir());
        let config = LogConfig {
            app_name: "leadlens-tests",
            log_dir: Some(log_dir),
            emit_stderr: true,
            format: if std::env::var("LEADLENS_LOG_FORMAT")
                .map(|raw| raw.trim().eq_ignore_ascii_case("json"))
                .unwrap_or(false)
            {
                LogFormat::Json
            } else {
                LogFormat::Text
            },
            default_filter: "debug".to_string(),
        };

        leadlens_common::observability::init_logging(config).unwrap_or_default()
    });
}
