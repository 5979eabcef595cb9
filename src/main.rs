use std::{process::ExitCode, sync::Arc};

use clap::Parser;
use log::{error, info};

use halpnotes::{
    App, BackgroundSaver, Cli, Config, JsonFileAdapter, NoteStore, PersistenceAdapter, Result,
};

pub fn initialize_logger(verbose: bool) {
    let default_filter = if verbose { "info" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .format_timestamp_secs()
        .format_module_path(true)
        .init();

    info!("Logger initialized");
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    initialize_logger(cli.verbose);

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<()> {
    let mut config = Config::load(cli.config.as_deref())?;
    if let Some(dir) = cli.data_dir {
        config.data_dir = dir;
    }

    let adapter = Arc::new(JsonFileAdapter::new(&config.data_dir, &config.storage_key));
    info!("Notes slot at {}", adapter.path().display());

    let saver = if config.background_save {
        Some(BackgroundSaver::start(adapter.clone())?)
    } else {
        None
    };
    let persistence: Box<dyn PersistenceAdapter> = match &saver {
        Some(saver) => Box::new(saver.clone()),
        None => Box::new(adapter),
    };

    let store = NoteStore::open(&config, persistence);
    let mut app = App::new(store, config, cli.config, cli.verbose);
    let outcome = app.run(cli.command);

    let closed = app.into_store().shutdown();
    if let Some(saver) = saver {
        saver.shutdown().await?;
    }

    outcome.and(closed)
}
