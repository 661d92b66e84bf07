/// Error categories surfaced by the pipeline.
///
/// Every failure is detected at the point of violation and reported with the
/// offending region/period in the message; nothing is silently defaulted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// An out-of-domain argument (e.g. a month offset before the epoch).
    InvalidArgument,
    /// An input table is missing required columns or is otherwise malformed.
    Schema,
    /// A filesystem or network operation failed.
    Io,
    /// A region name absent from the registry or the id table where one was required.
    UnknownRegion,
    /// Mean imputation attempted over a region with zero non-missing values.
    EmptyGroup,
    /// Too few (or degenerate) observations to fit a regression.
    InsufficientData,
    /// Predictor and response row counts differ.
    ShapeMismatch,
}

impl ErrorKind {
    /// Process exit code for this kind of failure.
    ///
    /// 2 = usage/schema/IO, 3 = data problems, 4 = computation problems.
    pub fn exit_code(self) -> u8 {
        match self {
            ErrorKind::InvalidArgument | ErrorKind::Schema | ErrorKind::Io => 2,
            ErrorKind::UnknownRegion | ErrorKind::EmptyGroup | ErrorKind::InsufficientData => 3,
            ErrorKind::ShapeMismatch => 4,
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

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn exit_code(&self) -> u8 {
        self.kind.exit_code()
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
