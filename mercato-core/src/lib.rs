pub mod error;
pub mod identity;
pub mod payment;

pub use error::StoreError;
pub use identity::{User, UserRepository};
pub use payment::{PaymentGateway, PaymentOutcome};
