//! `serialmail` - convert mail messages to and from JSON records.

#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serialmail::{ConvertConfig, Converter, MessageRecord};
use serialmail_mime::{
    Attachment, ContentType, Encoding, MailAddress, MailMessage, PickupDirectory, Transport,
};
use tracing::{debug, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "serialmail", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Code page recorded for display names without an explicit encoding
    #[arg(long, global = true, env = "SERIALMAIL_DEFAULT_CODE_PAGE", value_name = "CODE_PAGE")]
    default_code_page: Option<i32>,

    /// JSON file with conversion settings
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Verbose logging (-v debug, -vv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Print a sample message record as JSON
    Sample {
        /// Indent the output
        #[arg(long)]
        pretty: bool,
    },
    /// Rebuild a message from a JSON record and render it as RFC 5322
    Render {
        /// JSON record to read
        #[arg(value_name = "FILE")]
        path: PathBuf,
        /// Drop the rendered message into this directory instead of stdout
        #[arg(long, value_name = "DIR")]
        pickup_dir: Option<PathBuf>,
    },
    /// Read a JSON record and print a summary
    Inspect {
        /// JSON record to read
        #[arg(value_name = "FILE")]
        path: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = load_config(cli.config.as_deref(), cli.default_code_page)?;
    let converter = Converter::new(config);
    debug!(
        default_code_page = config.default_display_name_code_page,
        "Loaded configuration"
    );

    match cli.command {
        Commands::Sample { pretty } => sample(&converter, pretty),
        Commands::Render { path, pickup_dir } => render(&converter, &path, pickup_dir),
        Commands::Inspect { path } => inspect(&path),
    }
}

fn init_logging(verbose: u8) {
    let default = match verbose {
        0 => "serialmail=info",
        1 => "serialmail=debug,serialmail_mime=debug",
        _ => "serialmail=trace,serialmail_mime=trace",
    };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();
}

fn load_config(path: Option<&Path>, default_code_page: Option<i32>) -> Result<ConvertConfig> {
    let mut config = match path {
        Some(path) => {
            let text = fs::read_to_string(path)
                .with_context(|| format!("Failed to read config {}", path.display()))?;
            serde_json::from_str(&text)
                .with_context(|| format!("Invalid config {}", path.display()))?
        }
        None => ConvertConfig::default(),
    };
    if let Some(code_page) = default_code_page {
        config.default_display_name_code_page = code_page;
    }
    Ok(config)
}

fn read_record(path: &Path) -> Result<MessageRecord> {
    let json = fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    MessageRecord::from_json(&json).with_context(|| format!("Invalid record {}", path.display()))
}

fn sample_message() -> Result<MailMessage> {
    let mut message = MailMessage::with_content(
        "\"Serial Mail\" <sender@example.com>",
        "first@example.com, \"Second\" <second@example.com>",
        "Sample message",
        "Hello from serialmail.",
    )?;
    message.from = Some(MailAddress::with_encoding(
        "sender@example.com",
        "Serial Mail",
        Encoding::ASCII,
    )?);
    message.body_encoding = Some(Encoding::UTF8);
    message.headers.set("X-Sample", "true");

    let mut content_type = ContentType::with_media_type("application/octet-stream")?;
    content_type.set_name(Some("data.bin"));
    message
        .attachments
        .push(Attachment::from_bytes((0u8..33).collect(), content_type));
    message
        .attachments
        .push(Attachment::from_string("notes", Some("notes.txt"))?);
    Ok(message)
}

fn sample(converter: &Converter, pretty: bool) -> Result<()> {
    let mut message = sample_message().context("Failed to build sample message")?;
    let record = converter.message_to_record(&mut message)?;
    let json = if pretty {
        record.to_json_pretty()?
    } else {
        record.to_json()?
    };
    println!("{json}");
    Ok(())
}

fn render(converter: &Converter, path: &Path, pickup_dir: Option<PathBuf>) -> Result<()> {
    let record = read_record(path)?;
    let message = converter
        .message_to_live(&record)
        .context("Failed to rebuild message")?;

    if let Some(dir) = pickup_dir {
        fs::create_dir_all(&dir)
            .with_context(|| format!("Failed to create {}", dir.display()))?;
        let mut pickup = PickupDirectory::new(dir);
        pickup.send(message).context("Failed to deliver message")?;
        info!(dir = %pickup.path().display(), "Message written to pickup directory");
        return Ok(());
    }

    let bytes = message.render().context("Failed to render message")?;
    io::stdout().write_all(&bytes)?;
    Ok(())
}

fn inspect(path: &Path) -> Result<()> {
    let record = read_record(path)?;
    let from = record
        .from
        .as_ref()
        .map_or_else(|| "(none)".to_string(), ToString::to_string);
    println!("From:        {from}");
    println!("To:          {}", record.to);
    if !record.cc.is_empty() {
        println!("Cc:          {}", record.cc);
    }
    if !record.bcc.is_empty() {
        println!("Bcc:         {}", record.bcc);
    }
    println!("Subject:     {}", record.subject());
    println!("Headers:     {}", record.headers.len());
    for attachment in &record.attachments {
        println!(
            "Attachment:  {} ({}, {} bytes)",
            attachment.name.as_deref().unwrap_or("(unnamed)"),
            attachment.content_type,
            attachment.content_bytes.len()
        );
    }
    Ok(())
}
