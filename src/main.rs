use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;

use switchboard::config::{Profile, discover};
use switchboard::consts::{DEFAULT_OUTPUT_TAIL_CHARS, install_dir};
use switchboard::dispatch::Dispatcher;
use switchboard::dispatch::channel::ChannelTransport;
use switchboard::dispatch::hub::SessionHub;
use switchboard::dispatch::subprocess::SubprocessTransport;
use switchboard::logging;
use switchboard::orchestrator::Orchestrator;
use switchboard::task::Task;

#[derive(Parser)]
#[command(
    name = "switchboard",
    version,
    about = "Routes a task to the right specialist and reports back."
)]
struct Cli {
    /// Task to route (words are joined with spaces). Omit to list specialists.
    #[arg(value_name = "TASK", conflicts_with = "task_flag")]
    task: Vec<String>,

    /// Task to route, as a single argument
    #[arg(long = "task", visible_alias = "request", value_name = "TASK")]
    task_flag: Option<String>,

    /// Profile JSON (default: switchboard.json next to the binary, then ~/.switchboard/)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Directory specialist binaries are resolved against (default: the binary's directory)
    #[arg(long)]
    base_dir: Option<PathBuf>,

    /// Characters of specialist output to keep
    #[arg(long, default_value_t = DEFAULT_OUTPUT_TAIL_CHARS)]
    tail_chars: usize,
}

impl Cli {
    fn task(&self) -> Option<Task> {
        let raw = match &self.task_flag {
            Some(task) => task.clone(),
            None => self.task.join(" "),
        };
        let raw = raw.trim();
        (!raw.is_empty()).then(|| Task::new(raw))
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    logging::init_from_env();
    let cli = Cli::parse();

    let base_dir = cli.base_dir.clone().unwrap_or_else(install_dir);
    let config_path = discover(cli.config.as_deref(), &base_dir);
    let profile = Profile::load_or_default(config_path.as_deref());

    // Channel specialists need a worker session registered under their
    // label; a one-shot CLI run has none, so they report a transport failure.
    let hub = Arc::new(SessionHub::new());
    let dispatcher = Dispatcher::new(Arc::new(
        SubprocessTransport::new(base_dir).with_tail_chars(cli.tail_chars),
    ))
    .with_channel(Arc::new(
        ChannelTransport::new(hub).with_tail_chars(cli.tail_chars),
    ));

    let orchestrator = Orchestrator::new(profile, dispatcher);

    match cli.task() {
        Some(task) => {
            let response = orchestrator.handle(&task).await;
            println!("{}", response.text);
        }
        None => print!("{}", orchestrator.capabilities()),
    }
    Ok(())
}
