use thiserror::Error;

/// Top-level error taxonomy. Parse-time failures are *not* represented
/// here — they are local `Result`s inside each codec module and are
/// dropped by the listener that produced them; they never escape to
/// this type.
#[derive(Debug, Error)]
pub enum DiscoverError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("link socket I/O error: {0}")]
    LinkIo(#[from] std::io::Error),

    /// Transient failure on an auxiliary UDP probe socket (NBNS probes,
    /// mostly). Never fatal — probers log it and move on.
    #[error("auxiliary I/O error: {0}")]
    AuxIo(std::io::Error),
}

pub type Result<T> = std::result::Result<T, DiscoverError>;
