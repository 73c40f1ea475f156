/// How the process-wide subscriber is set up.
#[derive(Debug, Clone)]
pub struct TracingConfig {
    /// Label attached to the startup line.
    pub environment: String,
    pub json_format: bool,
    /// `EnvFilter` directive used when `RUST_LOG` is unset.
    pub filter: String,
}

impl TracingConfig {
    pub const DEFAULT_FILTER: &'static str = "info,medassist=debug,tower_http=debug,sqlx=warn";
    pub const FALLBACK_FILTER: &'static str = "info";

    pub fn new(environment: impl Into<String>, json_format: bool, filter: impl Into<String>) -> Self {
        let filter = filter.into();
        Self {
            environment: environment.into(),
            json_format,
            filter: if filter.trim().is_empty() {
                Self::DEFAULT_FILTER.to_string()
            } else {
                filter
            },
        }
    }
}

impl Default for TracingConfig {
    fn default() -> Self {
        Self::new("local", false, Self::DEFAULT_FILTER)
    }
}
