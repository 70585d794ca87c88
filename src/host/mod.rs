pub mod channel;
pub mod controller;
pub mod message;

pub use channel::{HostChannel, RecordingChannel};
pub use controller::ActivityController;
pub use message::{ButtonUpdate, HostMessage, HostRequest, NavButton};
