use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context};
use clap::Parser;
use serde::{Deserialize, Serialize};
use tokio::io::{AsyncBufReadExt, BufReader};

use jelly_wobbles::platform::{Notification, Notifier, Platform, Severity};
use jelly_wobbles::{Composer, ComposerConfig, ExportOutcome, DEFAULT_TOP_IMAGE_URL};

/// Compose a "jelly with wobbles" phone screenshot and save it as a PNG.
#[derive(Parser, Debug)]
#[command(name = "jelly-wobbles", version, about)]
struct Cli {
    /// Image for the bottom panel
    #[arg(long)]
    image: Option<PathBuf>,

    /// Handle shown over your image (an `@` is added if missing)
    #[arg(long, default_value = "")]
    handle: String,

    /// Directory the PNG is saved into
    #[arg(long, default_value = ".")]
    out_dir: PathBuf,

    /// Image for the top panel
    #[arg(long, default_value = DEFAULT_TOP_IMAGE_URL)]
    top_image: String,

    /// Do not fetch remote images; the top panel stays blank
    #[arg(long)]
    offline: bool,

    /// Timeout for fetching remote images, in milliseconds
    #[arg(long, default_value_t = 30000)]
    timeout_ms: u64,

    /// Read JSON commands from stdin, one per line, and answer on stdout
    #[arg(long)]
    interactive: bool,
}

impl Cli {
    fn config(&self) -> ComposerConfig {
        ComposerConfig {
            top_image_url: self.top_image.clone(),
            download_dir: self.out_dir.clone(),
            timeout_ms: self.timeout_ms,
            fetch_remote: !self.offline,
            ..Default::default()
        }
    }
}

/// Prints notifications to stderr so stdout stays machine-readable.
struct ConsoleNotifier;

impl Notifier for ConsoleNotifier {
    fn notify(&self, n: Notification) {
        let tag = match n.severity {
            Severity::Info => "info",
            Severity::Success => "success",
            Severity::Error => "error",
        };
        eprintln!("[{}] {}", tag, n.message);
    }
}

#[derive(Deserialize)]
#[serde(tag = "op", rename_all = "lowercase")]
enum Command {
    /// A missing path is a dismissed picker
    Upload { path: Option<PathBuf> },
    Handle { text: String },
    Export,
    Status,
    Quit,
}

#[derive(Serialize)]
#[serde(tag = "reply", rename_all = "lowercase")]
enum Reply {
    Upload {
        stored: bool,
    },
    Handle {
        display: Option<String>,
    },
    Export {
        outcome: &'static str,
        path: Option<String>,
    },
    Status {
        has_image: bool,
        handle: String,
        display: Option<String>,
        mounted: bool,
    },
    Bye,
}

fn export_reply(outcome: ExportOutcome) -> Reply {
    match outcome {
        ExportOutcome::Skipped => Reply::Export { outcome: "skipped", path: None },
        ExportOutcome::Downloaded(path) => Reply::Export {
            outcome: "downloaded",
            path: Some(path.display().to_string()),
        },
        ExportOutcome::Failed => Reply::Export { outcome: "failed", path: None },
    }
}

async fn handle_command(composer: &mut Composer, cmd: Command) -> Reply {
    match cmd {
        Command::Upload { path } => Reply::Upload {
            stored: composer.upload_image(path.as_deref()).await,
        },
        Command::Handle { text } => {
            composer.set_handle(text);
            Reply::Handle {
                display: composer.state().display_handle(),
            }
        }
        Command::Export => export_reply(composer.export().await),
        Command::Status => Reply::Status {
            has_image: composer.state().has_image(),
            handle: composer.state().handle.clone(),
            display: composer.state().display_handle(),
            mounted: composer.is_mounted(),
        },
        Command::Quit => Reply::Bye,
    }
}

async fn session(mut composer: Composer) -> anyhow::Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let stdout = io::stdout();

    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }
        let cmd = match serde_json::from_str::<Command>(&line) {
            Ok(cmd) => cmd,
            Err(e) => {
                log::debug!("Ignoring malformed command {:?}: {}", line, e);
                continue;
            }
        };
        let quit = matches!(cmd, Command::Quit);
        let reply = handle_command(&mut composer, cmd).await;

        let mut out = stdout.lock();
        writeln!(out, "{}", serde_json::to_string(&reply)?)?;
        out.flush()?;
        if quit {
            break;
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();
    let config = cli.config();
    let platform = Platform::defaults(&config).with_notifier(Arc::new(ConsoleNotifier));
    let mut composer = Composer::new(config, platform).context("invalid configuration")?;

    if cli.interactive {
        return session(composer).await;
    }

    if cli.image.is_some() && !composer.upload_image(cli.image.as_deref()).await {
        log::warn!("Continuing without the selected image");
    }
    composer.set_handle(cli.handle.clone());

    match composer.export().await {
        ExportOutcome::Downloaded(path) => {
            println!("{}", path.display());
            Ok(())
        }
        ExportOutcome::Failed => bail!("export failed"),
        ExportOutcome::Skipped => bail!("nothing to export"),
    }
}
