pub mod backend;
pub mod channel;
pub mod config;
pub mod smtp;

pub use backend::{EmailBackend, EmailMessage, EmailResult};
pub use channel::EmailChannel;
pub use config::{EmailConfig, SmtpConfig};
