use std::process::ExitCode;

use clap::Parser;

use netsnake::cli::Cli;
use netsnake::{Console, ConsolePrompt, JunosProvider, Runner};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let default_filter = if cli.global.debug_log { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter)).init();

    let settings = cli.global.settings();
    let console = Console::stdout(!cli.global.no_color);
    let mut runner = Runner::new(
        JunosProvider::new(settings.clone()),
        ConsolePrompt::new(),
        console,
        settings,
    );

    match runner.execute(cli.target.target(), &cli.command).await {
        Ok(summary) => {
            runner.report(&summary);
            ExitCode::from(summary.exit_code())
        }
        Err(e) => {
            runner.console_mut().error(&e);
            ExitCode::from(e.exit_code())
        }
    }
}
