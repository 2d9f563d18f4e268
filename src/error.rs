use std::fmt;

#[derive(Debug)]
pub enum LayoutError {
    NoActionBound,
    Geometry(String),
    InvalidConfiguration(String),
    Action(String),
    Io(std::io::Error),
}

impl fmt::Display for LayoutError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LayoutError::NoActionBound => write!(f, "no action bound to deferred region"),
            LayoutError::Geometry(message) => write!(f, "invalid region geometry: {}", message),
            LayoutError::InvalidConfiguration(message) => {
                write!(f, "invalid configuration: {}", message)
            }
            LayoutError::Action(message) => write!(f, "region action failed: {}", message),
            LayoutError::Io(err) => write!(f, "io error: {}", err),
        }
    }
}

impl std::error::Error for LayoutError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            LayoutError::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for LayoutError {
    fn from(value: std::io::Error) -> Self {
        LayoutError::Io(value)
    }
}
