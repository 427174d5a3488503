pub mod channel;
pub mod error;
pub mod message;
pub mod registry;

#[cfg(feature = "push")]
pub mod push;

pub use channel::{Channel, DynChannel};
pub use error::ChannelError;
pub use message::{ChannelResponse, RenderedMessage, SendStatus};
pub use registry::ChannelRegistry;

#[cfg(feature = "push")]
pub use push::PushChannel;
