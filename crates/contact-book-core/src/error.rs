#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("contact index {index} is out of range (expected 1..={len})")]
    OutOfRange { index: usize, len: usize },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<csv::Error> for CoreError {
    /// CSV-layer failures are surfaced as I/O errors; anything that is not
    /// already an `io::Error` becomes `InvalidData`.
    fn from(err: csv::Error) -> Self {
        match err.into_kind() {
            csv::ErrorKind::Io(io) => Self::Io(io),
            other => Self::Io(std::io::Error::new(
                std::io::ErrorKind::InvalidData,
                format!("csv error: {other:?}"),
            )),
        }
    }
}
