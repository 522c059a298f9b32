use std::{path::PathBuf, sync::Arc, time::Duration};

use alertgate::{
    config::AppConfig, http_client::HttpClientPool, initialization::InitializationService,
    models::Alert,
};
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Directory holding `app.yaml` and its profile overlays.
    #[arg(long, global = true)]
    config_dir: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Raises a single alert through the configured channels.
    Notify(NotifyArgs),
    /// Loads the configuration and reports what would be used.
    CheckConfig,
}

#[derive(Args)]
struct NotifyArgs {
    /// Alert message.
    message: String,

    /// Only send the email, skip ticket targets.
    #[arg(long)]
    no_ticket: bool,

    /// Alert level.
    #[arg(long, default_value_t = 1)]
    level: i32,

    /// Alert subject. Defaults to `{name}-{version}-[{profile}]`.
    #[arg(long)]
    subject: Option<String>,

    /// Files attached to the alert.
    #[arg(long = "attach")]
    attachments: Vec<PathBuf>,

    /// How long to wait for deliveries before exiting, in seconds.
    #[arg(long, default_value_t = 30)]
    drain_timeout: u64,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let subscriber =
        FmtSubscriber::builder().with_env_filter(EnvFilter::from_default_env()).finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let cli = Cli::parse();

    tracing::debug!("Loading application configuration...");
    let config = AppConfig::new(cli.config_dir.as_deref())?;
    tracing::debug!(
        app = %config.app.full_name(),
        profile = %config.profile,
        "Configuration loaded."
    );

    match cli.command {
        Commands::Notify(args) => notify(config, args).await?,
        Commands::CheckConfig => check_config(&config),
    }

    Ok(())
}

async fn notify(config: AppConfig, args: NotifyArgs) -> Result<(), Box<dyn std::error::Error>> {
    let subject = args.subject.unwrap_or_else(|| config.alert_subject());
    let alerting =
        InitializationService::new(config, Arc::new(HttpClientPool::new())).run().await?;

    let mut alert = Alert::new(args.message, subject);
    alert.level = args.level;
    alert.by_ticket = !args.no_ticket;
    alert.attachments = args.attachments;

    alerting.dispatcher.send_alert(&mut alert);
    tracing::info!(
        subject = %alert.subject,
        deliveries = alerting.dispatcher.pending_deliveries(),
        "Alert dispatched."
    );

    if !alerting.dispatcher.drain(Duration::from_secs(args.drain_timeout)).await {
        return Err("alert deliveries did not finish in time".into());
    }

    Ok(())
}

fn check_config(config: &AppConfig) {
    println!("subject:      {}", config.alert_subject());
    println!("template:     {}", config.email_template_path().display());
    println!("dedup window: {:?}", config.alerts.dedup_window);
    match &config.email {
        Some(email) => println!(
            "email:        {} via {}:{} -> {:?}",
            email.from,
            email.host,
            email.port,
            config.alert_recipients()
        ),
        None => println!("email:        disabled"),
    }
    for target in &config.ticket_targets {
        println!(
            "ticket:       {} at {} (min level {}, developers {:?})",
            target.name, target.url, target.min_level, target.developer_ids
        );
    }
    if !config.email_template_path().is_file() {
        tracing::warn!(
            path = %config.email_template_path().display(),
            "Email template not found, alert emails will be sent as plain text."
        );
    }
}
