use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use mailroom_core::{
    config::Config,
    telemetry, EmailAttachment, EmailRequest, EmailServiceRegistry,
};
use std::path::PathBuf;
use tracing::info;

#[derive(Parser)]
#[command(name = "mailroom", version, about = "Send email through named SMTP accounts")]
struct Cli {
    /// Config file; falls back to MAILROOM_CONFIG, then mailroom.toml
    #[arg(short, long)]
    config: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List registered service keys
    List,
    /// Send one email through a registered service
    Send {
        /// Service key to send through
        #[arg(short, long)]
        service: String,
        #[arg(long, required = true)]
        to: Vec<String>,
        #[arg(long)]
        cc: Vec<String>,
        #[arg(long)]
        bcc: Vec<String>,
        #[arg(long)]
        subject: String,
        #[arg(long)]
        html: Option<String>,
        #[arg(long)]
        text: Option<String>,
        /// Files to attach
        #[arg(long)]
        attach: Vec<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => Config::load(path)?,
        None => Config::from_env()?,
    };

    telemetry::init(&config.telemetry);

    let mut registry = EmailServiceRegistry::with_lettre();
    registry.register(&config.email_services);
    info!(services = registry.len(), "Email services registered");

    match cli.command {
        Command::List => {
            for key in registry.keys() {
                println!("{}", key);
            }
        }
        Command::Send {
            service,
            to,
            cc,
            bcc,
            subject,
            html,
            text,
            attach,
        } => {
            let email_service = registry.resolve(&service)?;

            let mut request = EmailRequest::new(to, subject).with_cc(cc).with_bcc(bcc);
            request.html_body = html;
            request.text_body = text;
            for path in attach {
                request = request.with_attachment(EmailAttachment::from_path(path));
            }

            email_service
                .send(&mut request)
                .await
                .with_context(|| format!("Failed to send email through '{}'", service))?;

            info!(service_key = %service, "Email delivered");
        }
    }

    Ok(())
}
