pub mod mock;
pub mod smtp;

pub use mock::MockSink;
pub use smtp::{SmtpConfig, SmtpSink};
