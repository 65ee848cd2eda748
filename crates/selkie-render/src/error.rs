pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Normalization could not produce renderable code. Raised before any engine call; engine
    /// failures are never raised, they become an in-place diagnostic instead.
    #[error("Diagram transformation failed: {message}")]
    Transform { message: String },
}
