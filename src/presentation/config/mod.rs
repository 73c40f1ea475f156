mod environment;
mod settings;

pub use environment::{ENVIRONMENT_VAR, Environment};
pub use settings::{
    AuthSettings, ChatSettings, DatabaseBackend, DatabaseSettings, IdentitySettings, LlmSettings,
    LoggingSettings, RetrySettings, ServerSettings, Settings, TranscriptionSettings,
};
