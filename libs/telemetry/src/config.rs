use std::env;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Json,
    Text,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TelemetryConfig {
    pub service_name: String,
    pub service_version: String,
    pub environment: String,
    pub log_format: LogFormat,
    /// Filter directives; `None` falls back to `RUST_LOG` and then `info`.
    pub filter: Option<String>,
}

impl TelemetryConfig {
    pub fn from_env(default_service_name: &str, default_service_version: &str) -> Self {
        Self::from_lookup(
            |key| env::var(key).ok(),
            default_service_name,
            default_service_version,
        )
    }

    pub fn from_lookup<F>(
        lookup: F,
        default_service_name: &str,
        default_service_version: &str,
    ) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let service_name =
            lookup("OTEL_SERVICE_NAME").unwrap_or_else(|| default_service_name.to_string());
        let service_version = lookup("OTEL_SERVICE_VERSION")
            .unwrap_or_else(|| default_service_version.to_string());
        let environment = lookup("OTEL_RESOURCE_ATTRIBUTES")
            .and_then(parse_environment_from_resource)
            .or_else(|| lookup("DEPLOYMENT_ENV"))
            .unwrap_or_else(|| "dev".into());
        let log_format = lookup("LOG_FORMAT")
            .map(|v| match v.to_lowercase().as_str() {
                "text" | "pretty" | "plain" => LogFormat::Text,
                _ => LogFormat::Json,
            })
            .unwrap_or(LogFormat::Json);
        let filter = lookup("RUST_LOG").filter(|v| !v.trim().is_empty());

        Self {
            service_name,
            service_version,
            environment,
            log_format,
            filter,
        }
    }
}

fn parse_environment_from_resource(value: String) -> Option<String> {
    value.split(',').find_map(|kv| {
        let (key, val) = kv.split_once('=')?;
        (key.trim() == "deployment.environment").then(|| val.trim().to_string())
    })
}
