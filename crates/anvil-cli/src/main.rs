use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::{ArgAction, Parser, Subcommand};
use colored::Colorize;

use anvil_host::OpenSandbox;
use anvil_logger as logger;
use anvil_python::{Bridge, HostContext};

mod host;

#[derive(Parser)]
#[command(name = "anvil")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(
    about = "Interactive analysis shell with Python scripting",
    long_about = "Anvil embeds a Python interpreter; scripts drive the tool through\nthe `anvil` module and can register assembler/disassembler plugins."
)]
struct Cli {
    /// Increase verbosity (-v debug, -vv trace)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    /// Echo script-side diagnostics to the console
    #[arg(long, global = true)]
    log_script: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a Python script file
    Run {
        /// Path to the script
        script: PathBuf,
    },
    /// Execute an inline Python fragment
    Exec {
        /// Code to execute
        #[arg(short = 'c', long = "code")]
        code: String,
    },
    /// Enter an interactive Python shell (requires IPython)
    Shell,
    /// List plugins installed by scripts this run
    Plugins {
        /// Script to run before listing
        #[arg(long)]
        script: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    if let Err(e) = logger::init_with_verbosity(cli.verbose, cli.log_script) {
        eprintln!("{} {}", "warning:".yellow().bold(), e);
    }

    let demo = host::DemoHost::new();
    let ctx = Arc::new(HostContext {
        commands: Arc::new(host::DemoExecutor),
        fs: Arc::new(OpenSandbox),
        plugins: demo.plugins.clone(),
    });

    let bridge = Bridge::initialize(ctx).context("failed to activate the scripting bridge")?;
    bridge
        .prepare_environment(&host::definitions())
        .context("failed to prepare the script environment")?;

    match cli.command {
        Commands::Run { script } => {
            if !bridge.execute_file(&script) {
                bail!("cannot open script: {}", script.display());
            }
        }
        Commands::Exec { code } => {
            bridge.execute_inline(&code)?;
        }
        Commands::Shell => {
            if !bridge.interactive_prompt() {
                bail!("interactive shell unavailable (is IPython installed?)");
            }
        }
        Commands::Plugins { script } => {
            if let Some(script) = script {
                if !bridge.execute_file(&script) {
                    bail!("cannot open script: {}", script.display());
                }
            }
            let count = demo.plugins.installed_count();
            println!("{} plugin(s) installed by scripts", count);
            if let Some(plugin) = demo.plugins.last() {
                println!(
                    "  {} ({}, {} bits) from {}",
                    plugin.record.name.bold(),
                    plugin.record.arch,
                    plugin.record.bits,
                    plugin.source
                );
            }
        }
    }

    bridge.shutdown_hint();
    Ok(())
}
