/// Broad failure category.
///
/// The kind decides both the process exit code (CLI) and the status class a
/// request handler reports (client error vs computation failure).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Caller-supplied data is unusable (lengths, counts, non-finite values).
    InvalidInput,
    /// Unknown route or resource.
    NotFound,
    /// Missing or malformed environment settings.
    Config,
    /// File or (de)serialization failure.
    Io,
    /// The aerodynamic solver could not be reached or answered badly.
    Solver,
    Internal,
}

impl ErrorKind {
    pub fn exit_code(self) -> u8 {
        match self {
            ErrorKind::InvalidInput | ErrorKind::NotFound | ErrorKind::Config | ErrorKind::Io => 2,
            ErrorKind::Solver | ErrorKind::Internal => 4,
        }
    }

    pub fn status_code(self) -> u16 {
        match self {
            ErrorKind::InvalidInput => 400,
            ErrorKind::NotFound => 404,
            ErrorKind::Solver => 502,
            ErrorKind::Config | ErrorKind::Io | ErrorKind::Internal => 500,
        }
    }
}

#[derive(Clone)]
pub struct AppError {
    kind: ErrorKind,
    message: String,
}

impl AppError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::InvalidInput, message)
    }

    pub fn io(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Io, message)
    }

    pub fn config(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Config, message)
    }

    pub fn solver(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Solver, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Internal, message)
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn exit_code(&self) -> u8 {
        self.kind.exit_code()
    }

    pub fn status_code(&self) -> u16 {
        self.kind.status_code()
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::fmt::Debug for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppError")
            .field("kind", &self.kind)
            .field("message", &self.message)
            .finish()
    }
}

impl std::error::Error for AppError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds_map_to_client_and_server_status() {
        assert_eq!(AppError::invalid_input("x").status_code(), 400);
        assert_eq!(AppError::internal("x").status_code(), 500);
        assert_eq!(AppError::solver("x").status_code(), 502);
        assert_eq!(AppError::invalid_input("x").exit_code(), 2);
        assert_eq!(AppError::solver("x").exit_code(), 4);
    }
}
