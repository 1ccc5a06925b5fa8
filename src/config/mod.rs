mod settings;

pub use settings::{
    CaptureConfig, Config, ConfigError, ConfigWarning, EventConfig, LoggingConfig,
    ENV_CAPTURE_LOCALS, EXAMPLE_CONFIG,
};
