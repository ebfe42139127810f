use anyhow::{bail, Context};
use pickwise::api::{self, AppState};
use pickwise::cli::commands::{run_features, run_pick, run_rank, simulated_provider};
use pickwise::cli::output::print_error;
use pickwise::cli::{Cli, Commands};
use pickwise::config::AppConfig;
use pickwise::scoring::CandidateScorer;
use std::net::SocketAddr;
use tracing::{info, warn};

fn load_config(cli: &Cli) -> anyhow::Result<AppConfig> {
    let config = AppConfig::load_from(&cli.config)
        .with_context(|| format!("loading configuration from {}", cli.config.display()))?;
    if let Err(errors) = config.validate() {
        for e in &errors {
            print_error(e);
        }
        bail!("invalid configuration ({} problems)", errors.len());
    }
    Ok(config)
}

pub(crate) async fn run(cli: &Cli) -> anyhow::Result<()> {
    let config = load_config(cli)?;

    match &cli.command {
        Commands::Pick(args) => {
            crate::main_runtime::init_logging_simple();
            run_pick(&config, args)?;
        }
        Commands::Rank(args) => {
            crate::main_runtime::init_logging_simple();
            run_rank(&config, args)?;
        }
        Commands::Features(args) => {
            crate::main_runtime::init_logging_simple();
            run_features(&config, args)?;
        }
        Commands::Serve { port, simulated } => {
            crate::main_runtime::init_logging(&config.logging);
            run_serve(config, *port, *simulated).await?;
        }
    }

    Ok(())
}

async fn run_serve(config: AppConfig, port: Option<u16>, simulated: bool) -> anyhow::Result<()> {
    let port = port.unwrap_or(config.api.port);
    let addr: SocketAddr = format!("{}:{}", config.api.host, port)
        .parse()
        .with_context(|| format!("invalid listen address {}:{}", config.api.host, port))?;

    let scorer = CandidateScorer::from_config(&config.scoring);
    if !scorer.is_ready() {
        warn!("Serving with degraded scorer ({})", scorer.model_version());
    }
    let provider = simulated.then(|| simulated_provider(&config, None));
    info!(
        "Scoring strategy {} ({}), provider {}",
        scorer.strategy_name(),
        scorer.model_version(),
        if simulated { "simulated" } else { "none" }
    );

    let state = AppState::new(config, scorer, provider);
    api::serve(state, addr).await?;
    Ok(())
}
