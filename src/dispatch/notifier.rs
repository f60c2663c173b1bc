//! The notifier facade.
//!
//! Validates a request, expands symbolic receivers through the user
//! directory, then runs each requested channel through its dispatcher.
//! Channels are isolated: one channel's failure never aborts its siblings,
//! and every outcome is observable in the returned [`NotifyOutcome`].

use std::sync::Arc;

use tokio::task::JoinHandle;
use tracing::{error, info, warn};

use crate::config::Settings;
use crate::directory::UserDirectory;
use crate::dispatch::{send_emails, send_pushes, send_sms, send_telegrams, send_whatsapps};
use crate::error::{AppError, AppResult};
use crate::gateway::GatewayRegistry;
use crate::models::{Audience, Channel, ChannelReport, NotifyRequest, Recipient};
use crate::render::TemplateEngine;
use crate::store::NotificationStore;

/// How one channel's dispatch ran.
#[derive(Debug)]
pub enum Dispatch {
    /// The dispatch ran inline and has finished.
    Completed(AppResult<ChannelReport>),
    /// The dispatch runs on a detached task; await the handle for its
    /// report.
    Background(JoinHandle<AppResult<ChannelReport>>),
}

#[derive(Debug)]
pub struct ChannelDispatch {
    pub channel: Channel,
    pub dispatch: Dispatch,
}

/// Per-channel outcomes of one notify call, in request channel order.
#[derive(Debug)]
pub struct NotifyOutcome {
    pub dispatches: Vec<ChannelDispatch>,
}

impl NotifyOutcome {
    /// Waits for background dispatches and collects every channel's result,
    /// in request channel order.
    pub async fn join(self) -> Vec<(Channel, AppResult<ChannelReport>)> {
        futures::future::join_all(self.dispatches.into_iter().map(|entry| async move {
            let result = match entry.dispatch {
                Dispatch::Completed(result) => result,
                Dispatch::Background(handle) => match handle.await {
                    Ok(result) => result,
                    Err(err) => Err(AppError::Internal {
                        source: anyhow::anyhow!("channel dispatch task failed: {}", err),
                    }),
                },
            };
            (entry.channel, result)
        }))
        .await
    }
}

async fn dispatch_channel(
    channel: Channel,
    registry: GatewayRegistry,
    templates: Arc<dyn TemplateEngine>,
    store: Arc<dyn NotificationStore>,
    request: Arc<NotifyRequest>,
    receivers: Arc<Vec<Recipient>>,
) -> AppResult<ChannelReport> {
    let report = match channel {
        Channel::Email => {
            send_emails(&registry, templates.as_ref(), &request, &receivers).await?
        }
        Channel::Sms => send_sms(&registry, templates.as_ref(), &request, &receivers).await?,
        Channel::Push => {
            send_pushes(
                &registry,
                templates.as_ref(),
                store.as_ref(),
                &request,
                &receivers,
            )
            .await?
        }
        Channel::Whatsapp => {
            send_whatsapps(&registry, templates.as_ref(), &request, &receivers).await?
        }
        Channel::Telegram => {
            send_telegrams(&registry, templates.as_ref(), &request, &receivers).await?
        }
    };
    info!(
        channel = %channel,
        gateway = %report.gateway,
        attempted = report.attempted,
        delivered = report.delivered,
        skipped = report.skipped,
        failed = report.failures.len(),
        "channel dispatch finished"
    );
    Ok(report)
}

/// Multi-channel notification dispatcher.
///
/// Holds the immutable configuration plus the three external
/// collaborators: the user directory, the template engine and the
/// notification store.
pub struct Notifier {
    settings: Arc<Settings>,
    registry: GatewayRegistry,
    directory: Arc<dyn UserDirectory>,
    templates: Arc<dyn TemplateEngine>,
    store: Arc<dyn NotificationStore>,
}

impl Notifier {
    pub fn new(
        settings: Settings,
        directory: Arc<dyn UserDirectory>,
        templates: Arc<dyn TemplateEngine>,
        store: Arc<dyn NotificationStore>,
    ) -> Self {
        let registry = GatewayRegistry::new(settings.notifier.channels.clone());
        Self {
            settings: Arc::new(settings),
            registry,
            directory,
            templates,
            store,
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// The notification store backing push dispatch and read-state updates.
    pub fn store(&self) -> &Arc<dyn NotificationStore> {
        &self.store
    }

    /// Dispatches one request across its channels.
    ///
    /// Returns an error only for invalid input; once dispatch starts, every
    /// per-channel outcome (including gateway resolution failures) lands in
    /// the [`NotifyOutcome`].
    pub async fn notify(&self, request: NotifyRequest) -> AppResult<NotifyOutcome> {
        Self::validate(&request)?;

        let receivers = self.expand(&request.receivers).await?;
        if receivers.is_empty() {
            warn!(subject = %request.subject, "notify called with no receivers");
        }

        let threaded = request.threaded.unwrap_or(self.settings.notifier.threaded);
        let channels = request.channels.clone();
        let request = Arc::new(request);
        let receivers = Arc::new(receivers);

        let mut dispatches = Vec::with_capacity(channels.len());
        for channel in channels {
            if threaded {
                let handle = tokio::spawn(dispatch_channel(
                    channel,
                    self.registry.clone(),
                    Arc::clone(&self.templates),
                    Arc::clone(&self.store),
                    Arc::clone(&request),
                    Arc::clone(&receivers),
                ));
                dispatches.push(ChannelDispatch {
                    channel,
                    dispatch: Dispatch::Background(handle),
                });
            } else {
                let result = dispatch_channel(
                    channel,
                    self.registry.clone(),
                    Arc::clone(&self.templates),
                    Arc::clone(&self.store),
                    Arc::clone(&request),
                    Arc::clone(&receivers),
                )
                .await;
                if let Err(err) = &result {
                    error!(channel = %channel, error = %err, "channel dispatch failed");
                }
                dispatches.push(ChannelDispatch {
                    channel,
                    dispatch: Dispatch::Completed(result),
                });
            }
        }

        Ok(NotifyOutcome { dispatches })
    }

    fn validate(request: &NotifyRequest) -> AppResult<()> {
        if request.subject.trim().is_empty() {
            return Err(AppError::validation("subject", "subject must not be empty"));
        }
        if request.channels.is_empty() {
            return Err(AppError::validation(
                "channels",
                "at least one channel is required",
            ));
        }
        match (&request.template, &request.final_message) {
            (Some(template), None) if template.trim().is_empty() => Err(AppError::validation(
                "template",
                "template name must not be empty",
            )),
            (Some(_), None) | (None, Some(_)) => Ok(()),
            _ => Err(AppError::validation(
                "template",
                "exactly one of template and final_message must be set",
            )),
        }
    }

    async fn expand(&self, audience: &Audience) -> AppResult<Vec<Recipient>> {
        match audience {
            Audience::Explicit(receivers) => Ok(receivers.clone()),
            Audience::Group(group) => self.directory.expand(*group).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::directory::MemoryDirectory;
    use crate::render::MapTemplates;
    use crate::store::MemoryStore;

    fn console_settings() -> Settings {
        let mut settings = Settings::default();
        settings.notifier.channels = toml::from_str(
            r#"
            [email]
            default_gateway = "console"

            [email.gateways.console]
            client = "console"
            from = "noreply@example.com"

            [sms]
            default_gateway = "console"

            [sms.gateways.console]
            client = "console"
        "#,
        )
        .unwrap();
        settings
    }

    fn notifier(settings: Settings, users: Vec<Recipient>, templates: MapTemplates) -> Notifier {
        Notifier::new(
            settings,
            Arc::new(MemoryDirectory::new(users)),
            Arc::new(templates),
            Arc::new(MemoryStore::new()),
        )
    }

    fn alice() -> Recipient {
        Recipient::new("alice")
            .with_email("alice@example.com")
            .with_phone("+237600000001")
    }

    #[tokio::test]
    async fn test_rejects_empty_subject() {
        let notifier = notifier(console_settings(), vec![], MapTemplates::new());
        let request = NotifyRequest::new(vec![Channel::Email], "  ").final_message("hi");
        let err = notifier.notify(request).await.unwrap_err();
        assert!(matches!(err, AppError::Validation { .. }));
    }

    #[tokio::test]
    async fn test_rejects_template_and_final_message_together() {
        let notifier = notifier(console_settings(), vec![], MapTemplates::new());
        let request = NotifyRequest::new(vec![Channel::Email], "Hello")
            .template("welcome")
            .final_message("hi");
        let err = notifier.notify(request).await.unwrap_err();
        assert!(matches!(err, AppError::Validation { .. }));
    }

    #[tokio::test]
    async fn test_rejects_neither_template_nor_final_message() {
        let notifier = notifier(console_settings(), vec![], MapTemplates::new());
        let request = NotifyRequest::new(vec![Channel::Email], "Hello");
        let err = notifier.notify(request).await.unwrap_err();
        assert!(matches!(err, AppError::Validation { .. }));
    }

    #[tokio::test]
    async fn test_console_email_dispatch() {
        let notifier = notifier(console_settings(), vec![], MapTemplates::new());
        let request = NotifyRequest::new(vec![Channel::Email], "Hello")
            .final_message("hi there")
            .to(vec![alice()]);

        let results = notifier.notify(request).await.unwrap().join().await;
        assert_eq!(results.len(), 1);
        let report = results[0].1.as_ref().unwrap();
        assert_eq!(report.attempted, 1);
        assert_eq!(report.delivered, 1);
        assert!(report.is_complete());
    }

    #[tokio::test]
    async fn test_unconfigured_channel_is_isolated() {
        let notifier = notifier(console_settings(), vec![], MapTemplates::new());
        let request = NotifyRequest::new(vec![Channel::Telegram, Channel::Email], "Hello")
            .final_message("hi")
            .to(vec![alice()]);

        let results = notifier.notify(request).await.unwrap().join().await;
        assert!(matches!(
            results[0].1,
            Err(AppError::Configuration { .. })
        ));
        assert_eq!(results[1].1.as_ref().unwrap().delivered, 1);
    }

    #[tokio::test]
    async fn test_threaded_dispatch_returns_handles() {
        let notifier = notifier(console_settings(), vec![], MapTemplates::new());
        let request = NotifyRequest::new(vec![Channel::Sms], "Hello")
            .final_message("hi")
            .to(vec![alice()])
            .threaded(true);

        let outcome = notifier.notify(request).await.unwrap();
        assert!(matches!(
            outcome.dispatches[0].dispatch,
            Dispatch::Background(_)
        ));
        let results = outcome.join().await;
        assert_eq!(results[0].1.as_ref().unwrap().delivered, 1);
    }

    #[tokio::test]
    async fn test_symbolic_group_expansion() {
        let users = vec![
            Recipient::new("a").with_phone("+1").staff(),
            Recipient::new("b").with_phone("+2"),
            Recipient::new("c").with_phone("+3").staff(),
        ];
        let notifier = notifier(console_settings(), users, MapTemplates::new());
        let request = NotifyRequest::new(vec![Channel::Sms], "Hello")
            .final_message("hi")
            .to(crate::directory::SymbolicGroup::Staff);

        let results = notifier.notify(request).await.unwrap().join().await;
        assert_eq!(results[0].1.as_ref().unwrap().attempted, 2);
    }
}
