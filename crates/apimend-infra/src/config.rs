//! Loads the engine's `config.toml` (retry budget, loop iteration cap).
//!
//! Deserializes into [`EngineConfig`], falling back to the built-in
//! defaults whenever the file is missing, unreadable, or malformed.

use std::path::Path;

use apimend_types::config::EngineConfig;

/// Load the engine defaults from `{data_dir}/config.toml`.
///
/// The file is optional. A missing file yields [`EngineConfig::default()`]
/// silently; an unreadable or malformed file yields the defaults with a
/// warning, so a bad config can never keep the engine from starting.
pub async fn load_engine_config(data_dir: &Path) -> EngineConfig {
    let config_path = data_dir.join("config.toml");

    let content = match tokio::fs::read_to_string(&config_path).await {
        Ok(content) => content,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            tracing::debug!(
                path = %config_path.display(),
                "no engine config file, running on defaults"
            );
            return EngineConfig::default();
        }
        Err(err) => {
            tracing::warn!(
                path = %config_path.display(),
                error = %err,
                "engine config unreadable, running on defaults"
            );
            return EngineConfig::default();
        }
    };

    match toml::from_str::<EngineConfig>(&content) {
        Ok(config) => config,
        Err(err) => {
            tracing::warn!(
                path = %config_path.display(),
                error = %err,
                "engine config malformed, running on defaults"
            );
            EngineConfig::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn missing_file_returns_default() {
        let tmp = TempDir::new().unwrap();
        let config = load_engine_config(tmp.path()).await;
        assert_eq!(config.default_retries, 8);
        assert_eq!(config.default_loop_max_iters, 1000);
    }

    #[tokio::test]
    async fn valid_toml_returns_parsed() {
        let tmp = TempDir::new().unwrap();
        tokio::fs::write(
            tmp.path().join("config.toml"),
            "default_retries = 3\ndefault_loop_max_iters = 25\n",
        )
        .await
        .unwrap();

        let config = load_engine_config(tmp.path()).await;
        assert_eq!(config.default_retries, 3);
        assert_eq!(config.default_loop_max_iters, 25);
    }

    #[tokio::test]
    async fn malformed_toml_returns_default() {
        let tmp = TempDir::new().unwrap();
        tokio::fs::write(tmp.path().join("config.toml"), "default_retries = [[[")
            .await
            .unwrap();

        let config = load_engine_config(tmp.path()).await;
        assert_eq!(config.default_retries, 8);
    }
}
