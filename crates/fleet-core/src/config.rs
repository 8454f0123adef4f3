use reqwest::Url;
use thiserror::Error;

pub const DEFAULT_API_BASE: &str = "http://127.0.0.1:5000";
pub const API_BASE_ENV: &str = "FLEET_API_BASE_URL";
pub const SNAPSHOT_PATH: &str = "/api/show";

/// Value baked in at compile time, if the build set `FLEET_API_BASE_URL`.
pub const BUILD_TIME_API_BASE: Option<&str> = option_env!("FLEET_API_BASE_URL");

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid API base '{value}': {reason}")]
    InvalidApiBase { value: String, reason: String },
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|value| !value.is_empty())
}

/// Picks the API base in priority order: build-time value, runtime value,
/// then `default`. Blank candidates are skipped.
pub fn resolve_api_base(
    build_time: Option<&str>,
    runtime: Option<&str>,
    default: &str,
) -> Result<Url, ConfigError> {
    let chosen = non_empty(build_time)
        .or_else(|| non_empty(runtime))
        .unwrap_or(default)
        .trim_end_matches('/');
    let url = Url::parse(chosen).map_err(|err| ConfigError::InvalidApiBase {
        value: chosen.to_string(),
        reason: err.to_string(),
    })?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::InvalidApiBase {
            value: chosen.to_string(),
            reason: format!("unsupported scheme '{}'", url.scheme()),
        });
    }
    Ok(url)
}

pub fn snapshot_url(api_base: &Url) -> String {
    format!("{}{}", api_base.as_str().trim_end_matches('/'), SNAPSHOT_PATH)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn build_time_value_wins() {
        let url = resolve_api_base(
            Some("http://build.example:9000"),
            Some("http://runtime.example"),
            DEFAULT_API_BASE,
        )
        .expect("url");
        assert_eq!(url.host_str(), Some("build.example"));
    }

    #[test]
    fn runtime_then_default() {
        let runtime = resolve_api_base(None, Some("http://runtime.example/"), DEFAULT_API_BASE)
            .expect("runtime");
        assert_eq!(snapshot_url(&runtime), "http://runtime.example/api/show");

        let fallback = resolve_api_base(Some("  "), None, DEFAULT_API_BASE).expect("default");
        assert_eq!(snapshot_url(&fallback), "http://127.0.0.1:5000/api/show");
    }

    #[test]
    fn base_path_is_kept() {
        let url = resolve_api_base(None, Some("https://ops.example/fleet/"), DEFAULT_API_BASE)
            .expect("url");
        assert_eq!(snapshot_url(&url), "https://ops.example/fleet/api/show");
    }

    #[test]
    fn rejects_garbage() {
        assert!(matches!(
            resolve_api_base(None, Some("not a url"), DEFAULT_API_BASE),
            Err(ConfigError::InvalidApiBase { .. })
        ));
        assert!(resolve_api_base(None, Some("ftp://host"), DEFAULT_API_BASE).is_err());
    }
}
