use std::fmt;

#[derive(Debug)]
pub enum SynthError {
    Curve(CurveError),
    Config(ConfigError),
}

/// Reasons a drawn curve was ignored. The tables are left untouched in
/// every case.
#[derive(Debug, Clone, PartialEq)]
pub enum CurveError {
    TooFewPoints { count: usize },
    ZeroLength,
}

#[derive(Debug)]
pub enum ConfigError {
    Json(serde_json::Error),
    OutOfRange { field: &'static str, value: f64 },
}

impl fmt::Display for SynthError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SynthError::Curve(e) => write!(f, "Curve error: {e}"),
            SynthError::Config(e) => write!(f, "Config error: {e}"),
        }
    }
}

impl std::error::Error for SynthError {}

impl fmt::Display for CurveError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CurveError::TooFewPoints { count } => {
                write!(f, "Curve needs at least 2 points, got {count}")
            }
            CurveError::ZeroLength => write!(f, "Curve has zero arclength"),
        }
    }
}

impl std::error::Error for CurveError {}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Json(e) => write!(f, "Invalid config JSON: {e}"),
            ConfigError::OutOfRange { field, value } => {
                write!(f, "Config field '{field}' out of range: {value}")
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Json(e) => Some(e),
            ConfigError::OutOfRange { .. } => None,
        }
    }
}

impl From<CurveError> for SynthError {
    fn from(e: CurveError) -> Self {
        SynthError::Curve(e)
    }
}

impl From<ConfigError> for SynthError {
    fn from(e: ConfigError) -> Self {
        SynthError::Config(e)
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(e: serde_json::Error) -> Self {
        ConfigError::Json(e)
    }
}
