//! Domain models for the dispatcher.

mod channel;
mod notification;
mod recipient;
mod request;

pub use channel::Channel;
pub use notification::{Action, Mode, Notification, NotificationBuilder};
pub use recipient::Recipient;
pub use request::{Audience, ChannelReport, DeliveryFailure, NotifyRequest};
