/// All errors a `CheckStore` implementation can return.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// No row for the given entity/id pair.
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    /// A write carried a version the store has already moved past.
    #[error("stale write on {entity} {id}")]
    Conflict { entity: &'static str, id: String },

    /// A backend-specific storage error (connection, serialization, etc.).
    #[error("storage backend error: {0}")]
    Backend(String),
}
