/// Failures surfaced by the document store.
///
/// Uniqueness violations are typed variants so callers never have to
/// inspect backend error codes.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Order number already exists")]
    DuplicateOrderNumber,

    #[error("Email already exists")]
    DuplicateEmail,

    #[error("Store backend failure: {0}")]
    Backend(String),
}
