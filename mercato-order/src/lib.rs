pub mod engine;
pub mod models;
pub mod notify;
pub mod number;
pub mod repository;

pub use engine::{OrderError, OrderReceipt, OrderWorkflow};
pub use models::{Customer, Order, OrderLine, OrderLineRequest, OrderStatus, VariantChoice};
pub use notify::{NotificationError, NotificationSink};
pub use number::{OrderNumberGenerator, TimestampOrderNumbers};
pub use repository::{CheckoutStore, CheckoutTransaction, OrderRepository};
