//! Command line interface.

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};

use crate::config::{ConfigLoader, Settings};
use crate::directory::MemoryDirectory;
use crate::dispatch::Notifier;
use crate::logger::init_logger;
use crate::models::{Channel, NotifyRequest, Recipient};
use crate::render::DirTemplates;
use crate::store::MemoryStore;

/// Custom validation functions for CLI arguments
mod validation {
    use std::path::PathBuf;

    /// Validate that a file path exists and is readable
    pub fn validate_config_file_path(path_str: &str) -> Result<PathBuf, String> {
        let path = PathBuf::from(path_str);

        if !path.exists() {
            return Err(format!("Configuration file does not exist: '{}'", path_str));
        }
        if !path.is_file() {
            return Err(format!("Configuration path is not a file: '{}'", path_str));
        }
        match std::fs::File::open(&path) {
            Ok(_) => Ok(path),
            Err(e) => Err(format!(
                "Cannot read configuration file '{}': {}",
                path_str, e
            )),
        }
    }

    /// Validate an email address has a local part and a domain
    pub fn validate_email_address(address: &str) -> Result<String, String> {
        let address = address.trim();
        match address.split_once('@') {
            Some((local, domain)) if !local.is_empty() && domain.contains('.') => {
                Ok(address.to_string())
            }
            _ => Err(format!("Invalid email address: '{}'", address)),
        }
    }
}

/// Multi-channel notification dispatcher
#[derive(Parser, Debug)]
#[command(name = "courier")]
#[command(about = "Multi-channel notification dispatcher")]
#[command(long_about = "
Courier dispatches notifications over email, sms, push, whatsapp and
telegram through configurable gateways.

EXAMPLES:
    # Validate the configuration and list configured gateways
    courier check-config

    # Use a specific configuration file
    courier --config /etc/courier/production.toml check-config

    # Render the 'welcome' template and email it to one address
    courier test-email welcome someone@example.com

    # Same, through a named gateway instead of the default
    courier test-email welcome someone@example.com --gateway backup
")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Configuration file path
    ///
    /// Use a single TOML file instead of the layered `config/` directory.
    #[arg(short, long, value_name = "FILE", value_parser = validation::validate_config_file_path)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    ///
    /// Raises log output to debug level. Cannot be used with --quiet.
    #[arg(short, long)]
    pub verbose: bool,

    /// Suppress non-error output
    ///
    /// Reduces log output to error level only. Cannot be used with
    /// --verbose.
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Validate configuration and exit
    ///
    /// Loads and validates the configuration, then prints the configured
    /// gateways per channel. Returns exit code 0 if valid.
    CheckConfig,

    /// Send a rendered template to a single email address
    ///
    /// Renders `{template}/email.txt` (plus `email.html` when present)
    /// against an empty context and sends it through the email channel.
    TestEmail {
        /// Template directory name under the configured templates root
        template: String,

        /// Destination email address
        #[arg(value_parser = validation::validate_email_address)]
        address: String,

        /// Subject line of the test email
        #[arg(short, long, default_value = "Test email")]
        subject: String,

        /// Gateway to send through instead of the configured default
        #[arg(short, long)]
        gateway: Option<String>,
    },
}

impl Cli {
    /// Load settings honoring `--config` and the global verbosity flags.
    pub fn load_settings(&self) -> anyhow::Result<Settings> {
        let loader = match &self.config {
            Some(path) => ConfigLoader::from_file(path),
            None => ConfigLoader::new()?,
        };
        let mut settings = loader.load()?;

        if self.verbose {
            settings.logger.level = "debug".to_string();
        } else if self.quiet {
            settings.logger.level = "error".to_string();
        }

        Ok(settings)
    }
}

/// Entry point invoked by the binary.
pub async fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let settings = cli.load_settings()?;
    init_logger(&settings.logger)?;

    match cli.command {
        Commands::CheckConfig => check_config(&settings),
        Commands::TestEmail {
            template,
            address,
            subject,
            gateway,
        } => test_email(settings, template, address, subject, gateway).await,
    }
}

fn check_config(settings: &Settings) -> anyhow::Result<()> {
    let channels = &settings.notifier.channels;
    println!("Configuration is valid.");
    println!("  threaded: {}", settings.notifier.threaded);
    println!(
        "  templates: {}",
        settings.notifier.templates_dir.display()
    );

    print_channel(Channel::Email, channels.email.as_ref().map(summary));
    print_channel(Channel::Sms, channels.sms.as_ref().map(summary));
    print_channel(Channel::Push, channels.push.as_ref().map(summary));
    print_channel(Channel::Whatsapp, channels.whatsapp.as_ref().map(summary));
    print_channel(Channel::Telegram, channels.telegram.as_ref().map(summary));
    Ok(())
}

fn summary<G>(channel: &crate::config::ChannelConfig<G>) -> String {
    let mut gateways: Vec<&str> = channel.gateways.keys().map(String::as_str).collect();
    gateways.sort_unstable();
    let mut line = format!(
        "default={}, gateways=[{}]",
        channel.default_gateway,
        gateways.join(", ")
    );
    if !channel.fallbacks.is_empty() {
        line.push_str(&format!(", fallbacks=[{}]", channel.fallbacks.join(", ")));
    }
    line
}

fn print_channel(channel: Channel, summary: Option<String>) {
    match summary {
        Some(summary) => println!("  {}: {}", channel, summary),
        None => println!("  {}: not configured", channel),
    }
}

async fn test_email(
    settings: Settings,
    template: String,
    address: String,
    subject: String,
    gateway: Option<String>,
) -> anyhow::Result<()> {
    let templates = DirTemplates::new(settings.notifier.templates_dir.clone());
    let notifier = Notifier::new(
        settings,
        Arc::new(MemoryDirectory::default()),
        Arc::new(templates),
        Arc::new(MemoryStore::new()),
    );

    let receiver = Recipient::new("test").with_email(&address);
    let mut request = NotifyRequest::new(vec![Channel::Email], subject)
        .template(template)
        .to(vec![receiver])
        .threaded(false);
    if let Some(gateway) = gateway {
        request = request.gateway(Channel::Email, gateway);
    }

    let results = notifier.notify(request).await?.join().await;
    for (channel, result) in results {
        let report = result?;
        if report.is_complete() {
            println!(
                "{}: delivered {} message(s) via '{}'",
                channel, report.delivered, report.gateway
            );
        } else {
            for failure in &report.failures {
                eprintln!("{}: {} -> {}", channel, failure.recipient, failure.error);
            }
            anyhow::bail!("test email failed via '{}'", report.gateway);
        }
    }
    Ok(())
}
