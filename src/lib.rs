//! courier-rs: multi-channel notification dispatcher.
//!
//! One call fans a notification out over email, sms, push, whatsapp and
//! telegram. Each channel resolves a configured gateway (with an optional
//! per-request override), renders a per-receiver body from a template
//! directory, and reports delivery outcomes without aborting its sibling
//! channels.
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use courier_rs::config::ConfigLoader;
//! use courier_rs::directory::MemoryDirectory;
//! use courier_rs::render::DirTemplates;
//! use courier_rs::store::MemoryStore;
//! use courier_rs::{Channel, Notifier, NotifyRequest, Recipient};
//!
//! # async fn demo() -> anyhow::Result<()> {
//! let settings = ConfigLoader::new()?.load()?;
//! let templates = DirTemplates::new(settings.notifier.templates_dir.clone());
//! let notifier = Notifier::new(
//!     settings,
//!     Arc::new(MemoryDirectory::default()),
//!     Arc::new(templates),
//!     Arc::new(MemoryStore::new()),
//! );
//!
//! let request = NotifyRequest::new(vec![Channel::Email, Channel::Sms], "Welcome")
//!     .template("welcome")
//!     .to(vec![Recipient::new("alice").with_email("alice@example.com")]);
//! let outcome = notifier.notify(request).await?;
//! for (channel, report) in outcome.join().await {
//!     println!("{}: {:?}", channel, report.map(|r| r.delivered));
//! }
//! # Ok(())
//! # }
//! ```

pub mod cli;
pub mod clients;
pub mod config;
pub mod directory;
pub mod dispatch;
pub mod error;
pub mod external;
pub mod gateway;
pub mod logger;
pub mod models;
pub mod render;
pub mod store;

pub use dispatch::{ChannelDispatch, Dispatch, Notifier, NotifyOutcome};
pub use error::{AppError, AppResult};
pub use models::{
    Audience, Channel, ChannelReport, DeliveryFailure, Notification, NotificationBuilder,
    NotifyRequest, Recipient,
};
