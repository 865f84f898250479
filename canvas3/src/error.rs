use thiserror::Error;

/// Reason why a canvas or driver failed to open.
#[derive(Error, Debug)]
pub enum CanvasError {
    #[error("No suitable pixel format found after trying {attempts} candidates")]
    NoSuitablePixelFormat { attempts: usize },
    #[error("The platform failed to create the window for canvas {name}")]
    WindowCreation { name: String },
    #[error("The driver must be initialized before it is opened")]
    NotInitialized,
}

/// Reason why configuration data could not be loaded.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read configuration file")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse configuration file")]
    Toml(#[from] toml::de::Error),
    #[error("Configuration value of {key} is neither a scalar nor a list of scalars")]
    UnsupportedValue { key: String },
}

/// Reason why a driver database could not be loaded.
#[derive(Error, Debug)]
pub enum DriverDatabaseError {
    #[error("Failed to parse driver database")]
    Json(#[from] serde_json::Error),
}
