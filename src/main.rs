use std::io::Write as _;
use std::time::Duration;

use clap::{Parser, Subcommand, ValueEnum};

use screenclick::config::{self, AppConfig};
use screenclick::errors::ScreenClickResult;
use screenclick::input::{self, Action};
use screenclick::screen::{capture, topology};
use screenclick::{describe_screen, resolve_and_act};

#[derive(Parser)]
#[command(name = "screenclick")]
#[command(about = "Point a local vision model at your screen and click things")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a natural-language command against the screen, e.g. "click the close button"
    Run {
        /// What to find and act on
        instruction: String,
        /// Monitor index to capture and act on
        #[arg(short, long, default_value_t = 0)]
        monitor: usize,
        /// Number of VLM predictions to average
        #[arg(short = 'n', long, default_value_t = 3)]
        samples: usize,
        /// Action to perform at the resolved coordinate
        #[arg(long, value_enum, default_value = "left")]
        action: CliAction,
    },
    /// Ask the VLM a question about the current screen
    Chat {
        /// Question to ask
        #[arg(default_value = "What do you see on this screen?")]
        prompt: String,
        #[arg(short, long, default_value_t = 0)]
        monitor: usize,
    },
    /// Click at monitor-relative coordinates
    Click {
        x: u32,
        y: u32,
        #[arg(short, long, default_value_t = 0)]
        monitor: usize,
        /// Right-click instead of left-click
        #[arg(long)]
        right: bool,
    },
    /// Move the cursor to monitor-relative coordinates
    Move {
        x: u32,
        y: u32,
        #[arg(short, long, default_value_t = 0)]
        monitor: usize,
    },
    /// Type a text string at the current focus
    Type { text: String },
    /// Capture a screenshot as PNG
    Screenshot {
        /// Monitor index; captures the whole virtual screen if omitted
        #[arg(short, long)]
        monitor: Option<usize>,
        /// Output path; writes PNG to stdout if omitted
        #[arg(short, long)]
        output: Option<String>,
    },
    /// List the active monitors
    Monitors,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum CliAction {
    Left,
    Right,
    Move,
}

impl From<CliAction> for Action {
    fn from(action: CliAction) -> Self {
        match action {
            CliAction::Left => Action::ClickLeft,
            CliAction::Right => Action::ClickRight,
            CliAction::Move => Action::Move,
        }
    }
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    // Load .env file if present (ignore error if not found)
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    let config = match config::load_config() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!(error = %e, "failed to load config");
            std::process::exit(1);
        }
    };

    if let Err(e) = dispatch(cli.command, &config).await {
        tracing::error!(error = %e, "command failed");
        std::process::exit(1);
    }
}

async fn dispatch(command: Commands, config: &AppConfig) -> ScreenClickResult<()> {
    match command {
        Commands::Run {
            instruction,
            monitor,
            samples,
            action,
        } => {
            let target =
                resolve_and_act(config, &instruction, monitor, samples, action.into()).await?;
            println!("({}, {})", target.x, target.y);
        }
        Commands::Chat { prompt, monitor } => {
            let answer = describe_screen(config, &prompt, monitor).await?;
            println!("{answer}");
        }
        Commands::Click {
            x,
            y,
            monitor,
            right,
        } => {
            let action = if right {
                Action::ClickRight
            } else {
                Action::ClickLeft
            };
            act_at(config, x, y, monitor, action).await?;
        }
        Commands::Move { x, y, monitor } => {
            act_at(config, x, y, monitor, Action::Move).await?;
        }
        Commands::Type { text } => {
            input::type_text(&text, Duration::from_secs(config.input.timeout_secs)).await?;
        }
        Commands::Screenshot { monitor, output } => {
            let timeout = Duration::from_secs(config.capture.timeout_secs);
            let image = match monitor {
                Some(index) => capture::capture_monitor(index, timeout).await?.0,
                None => capture::capture_all(timeout).await?,
            };
            match output {
                Some(path) => {
                    std::fs::write(&path, &image.png)?;
                    tracing::info!(path = %path, width = image.width, height = image.height, "saved");
                }
                None => std::io::stdout().write_all(&image.png)?,
            }
        }
        Commands::Monitors => {
            for (index, m) in topology::list_monitors().await.iter().enumerate() {
                println!(
                    "{index}: {} {}x{}+{}+{}{}",
                    m.name,
                    m.width,
                    m.height,
                    m.x,
                    m.y,
                    if m.primary { " (primary)" } else { "" }
                );
            }
        }
    }
    Ok(())
}

/// Map a monitor-relative point to global coordinates and act there. Uses the
/// same transform as the resolver so direct clicks and resolved clicks agree.
async fn act_at(
    config: &AppConfig,
    x: u32,
    y: u32,
    monitor_index: usize,
    action: Action,
) -> ScreenClickResult<()> {
    let monitors = topology::list_monitors().await;
    let monitor = topology::select_monitor(&monitors, monitor_index);
    let (gx, gy) = monitor.to_global(x, y);
    tracing::info!(monitor = %monitor.name, x = gx, y = gy, ?action, "injecting input");
    input::inject(action, gx, gy, Duration::from_secs(config.input.timeout_secs)).await
}
