use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PbrtErrorKind {
    Io,
    InvalidFormat,
    InvalidParameter,
    Warning,
    Other,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PbrtError {
    pub kind: PbrtErrorKind,
    pub msg: String,
}

impl PbrtError {
    pub fn new(kind: PbrtErrorKind, msg: &str) -> Self {
        PbrtError {
            kind,
            msg: String::from(msg),
        }
    }

    pub fn error(msg: &str) -> Self {
        return Self::new(PbrtErrorKind::Other, msg);
    }

    pub fn warning(msg: &str) -> Self {
        return Self::new(PbrtErrorKind::Warning, msg);
    }

    pub fn invalid_format(msg: &str) -> Self {
        return Self::new(PbrtErrorKind::InvalidFormat, msg);
    }

    pub fn invalid_parameter(msg: &str) -> Self {
        return Self::new(PbrtErrorKind::InvalidParameter, msg);
    }

    pub fn kind(&self) -> PbrtErrorKind {
        return self.kind;
    }
}

impl fmt::Display for PbrtError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let prefix = match self.kind {
            PbrtErrorKind::Io => "I/O error",
            PbrtErrorKind::InvalidFormat => "invalid format",
            PbrtErrorKind::InvalidParameter => "invalid parameter",
            PbrtErrorKind::Warning => "warning",
            PbrtErrorKind::Other => "error",
        };
        write!(f, "{}: {}", prefix, self.msg)
    }
}

impl std::error::Error for PbrtError {}

impl From<std::io::Error> for PbrtError {
    fn from(e: std::io::Error) -> Self {
        let kind = if e.kind() == std::io::ErrorKind::UnexpectedEof {
            PbrtErrorKind::InvalidFormat
        } else {
            PbrtErrorKind::Io
        };
        return PbrtError::new(kind, &e.to_string());
    }
}

impl From<serde_json::Error> for PbrtError {
    fn from(e: serde_json::Error) -> Self {
        return PbrtError::invalid_format(&e.to_string());
    }
}

impl From<&str> for PbrtError {
    fn from(msg: &str) -> Self {
        return PbrtError::error(msg);
    }
}

impl From<String> for PbrtError {
    fn from(msg: String) -> Self {
        return PbrtError::error(&msg);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_001() {
        let e = PbrtError::invalid_format("bad magic");
        assert_eq!(e.kind(), PbrtErrorKind::InvalidFormat);
        assert_eq!(e.to_string(), "invalid format: bad magic");
    }

    #[test]
    fn test_002() {
        let io = std::io::Error::new(std::io::ErrorKind::UnexpectedEof, "short read");
        assert_eq!(PbrtError::from(io).kind(), PbrtErrorKind::InvalidFormat);
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        assert_eq!(PbrtError::from(io).kind(), PbrtErrorKind::Io);
    }
}
