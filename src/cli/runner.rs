//! CLI runner - executes commands

use crate::cli::commands::{Cli, Commands, OutputFormat};
use crate::cli::server::serve;
use crate::config::Config;
use crate::error::Result;
use crate::tools::{dispatch, ToolContext, TOOLS};
use crate::types::JsonValue;
use tokio_util::sync::CancellationToken;
use tracing::warn;

/// CLI runner
pub struct Runner {
    cli: Cli,
}

impl Runner {
    /// Create a new runner
    pub fn new(cli: Cli) -> Self {
        Self { cli }
    }

    /// Run the CLI command
    pub async fn run(&self) -> Result<()> {
        match &self.cli.command {
            Commands::Tools => self.output(&serde_json::to_value(TOOLS)?),
            Commands::Serve { port } => serve(self.context()?, *port).await,
            command => {
                let Some((name, args)) = command.tool_call()? else {
                    return Ok(());
                };
                let ctx = self.context()?;
                let value = run_cancellable(&ctx, name, args).await?;
                self.output(&value)
            }
        }
    }

    fn context(&self) -> Result<ToolContext> {
        ToolContext::from_config(Config::from_env()?)
    }

    fn output(&self, value: &JsonValue) -> Result<()> {
        let text = match self.cli.format {
            OutputFormat::Json => serde_json::to_string(value)?,
            OutputFormat::Pretty => serde_json::to_string_pretty(value)?,
        };
        println!("{text}");
        Ok(())
    }
}

/// Run a tool, cancelling outstanding work on Ctrl-C
async fn run_cancellable(ctx: &ToolContext, name: &str, args: JsonValue) -> Result<JsonValue> {
    let token = CancellationToken::new();
    let trigger = token.clone();
    let watcher = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupted, cancelling pending requests");
            trigger.cancel();
        }
    });

    let result = dispatch(ctx, name, args, Some(&token)).await;
    watcher.abort();
    result
}
