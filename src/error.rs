//! Error types for Gati

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// Gati error types
///
/// None of these are fatal. Drive primitives halt the drivetrain before
/// returning an error, and setters leave the previous value in place.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Parameter outside its validated bounds
    #[error("Invalid parameter: {name}={value} outside [{min}, {max}]")]
    OutOfRange {
        /// Parameter name
        name: &'static str,
        /// Rejected value
        value: f32,
        /// Inclusive lower bound
        min: f32,
        /// Inclusive upper bound
        max: f32,
    },

    /// Motion whose duration cannot be computed (e.g. zero speed over a distance)
    #[error("Degenerate motion: {0}")]
    DegenerateMotion(String),

    /// Configuration rejected at load/construction time
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Gyro bias calibration could not complete
    #[error("Calibration failed: {0}")]
    Calibration(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// TOML parse error
    #[error("Config parse error: {0}")]
    TomlDe(#[from] toml::de::Error),

    /// TOML serialization error
    #[error("Config serialization error: {0}")]
    TomlSer(#[from] toml::ser::Error),
}

impl Error {
    /// True for rejected caller input (as opposed to configuration or I/O problems)
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::OutOfRange { .. } | Self::DegenerateMotion(_))
    }
}
