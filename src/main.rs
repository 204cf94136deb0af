//! Thomas Raw — AI travel planner entry point.
//!
//! Startup sequence:
//!   1. Load .env (if present)
//!   2. Parse CLI flags
//!   3. Init logger at the bootstrap level
//!   4. Load config, re-level the logger (CLI `-v` flags > config)
//!   5. Resolve the API credential once for the selected mode
//!   6. Build the LLM provider, templates and session
//!   7. Spawn Ctrl-C → shutdown signal watcher
//!   8. Run the console until quit / EOF / Ctrl-C

use thomas_raw::agents::TravelAgent;
use thomas_raw::error::AppError;
use thomas_raw::llm::providers;
use thomas_raw::prompt::Templates;
use thomas_raw::session::Session;
use thomas_raw::{cli, config, console, credential, logger};
use tokio_util::sync::CancellationToken;
use tracing::info;

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), AppError> {
    // Load .env if present — ignore errors (file is optional).
    let _ = dotenvy::dotenv();

    let env_mode = std::env::var(credential::MODE_ENV_VAR).ok();
    let args = cli::parse(std::env::args().skip(1), env_mode.as_deref())?;
    if args.help {
        println!("{}", cli::USAGE);
        return Ok(());
    }

    let log = logger::init(logger::BOOTSTRAP_LEVEL)?;

    let config = config::load(&args.config_path)?;
    // CLI -v flags beat RUST_LOG; the config level does not.
    logger::reload(&log, args.log_level.unwrap_or(config.log_level.as_str()), args.log_level.is_some())?;

    let mode = args.mode.unwrap_or_default();
    info!(
        app = %config.app_name,
        %mode,
        provider = %config.llm.provider,
        model = %config.llm.gemini.model,
        export_dir = %config.export_dir.display(),
        "config loaded"
    );

    let credential = credential::resolve(mode, &config.credentials)?;
    let provider = providers::build(&config.llm, credential)?;
    let templates = Templates::load(&config.prompts_dir);
    let session = Session::new(config.session.max_turns);
    let mut agent = TravelAgent::new(provider, templates, session, config.llm.gemini.budget_temperature);

    let shutdown = CancellationToken::new();
    let ctrlc_token = shutdown.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("ctrl-c received — initiating shutdown");
            ctrlc_token.cancel();
        }
    });

    console::run(&mut agent, &config.app_name, config.export_dir.clone(), shutdown).await?;

    info!(session_id = %agent.session().id(), turns = agent.session().len(), "session ended");
    Ok(())
}
