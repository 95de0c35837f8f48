use anyhow::Result;

use gitcmd::cli::commands::{render_dry_run, RunCommand};
use gitcmd::cli::Cli;
use gitcmd::config::GitCmdConfig;
use gitcmd::telemetry::init_telemetry;
use gitcmd::{Git, ProcessCommandExecutor};

fn main() -> Result<()> {
    let cli = Cli::parse_args();
    let code = tokio::runtime::Runtime::new()?.block_on(run(cli))?;
    std::process::exit(code);
}

async fn run(cli: Cli) -> Result<i32> {
    GitCmdConfig::load_env_file()?;
    let mut config = GitCmdConfig::load(cli.config.as_deref())?;
    if cli.verbose {
        config.observability.log_level = "debug".to_string();
    }
    init_telemetry(&config.observability)?;

    let dir = match cli.dir.clone().or_else(|| config.git.working_dir.clone()) {
        Some(dir) => dir,
        None => std::env::current_dir()?,
    };
    let git = Git::from_settings(dir, &config.git);
    let command = cli.operation.build(&git);

    if cli.dry_run {
        println!("{}", render_dry_run(&command, cli.json)?);
        return Ok(0);
    }

    let executor = match config.execution.timeout() {
        Some(timeout) => ProcessCommandExecutor::with_timeout(timeout),
        None => ProcessCommandExecutor::new(),
    };
    RunCommand::new(executor)
        .execute(&command, &mut std::io::stdout(), &mut std::io::stderr())
        .await
}
