use cashbook::args::{Args, Command};
use cashbook::confirm::confirmer;
use cashbook::error::{ErrorType, IntoResult};
use cashbook::{commands, Config, Result};
use clap::Parser;
use std::process::ExitCode;
use tracing::{debug, error, trace};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();
    let log_level = args.common().log_level();
    init_logger(log_level);
    debug!("Log level set to {}", log_level.to_string().to_lowercase());

    match main_inner(args).await {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            error!("Exiting with error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

pub async fn main_inner(args: Args) -> Result<()> {
    trace!("{args:?}");
    let home = args.common().cashbook_home().path();

    // Every command other than init needs an existing data directory.
    let load = move || async move { Config::load(home).await.pub_result(ErrorType::Config) };

    // Route to appropriate command handler
    let _: () = match args.command() {
        Command::Init(init_args) => commands::init(home, init_args).await?.print(),

        Command::Add(add_args) => commands::add(load().await?, add_args.clone()).await?.print(),

        Command::Update(update_args) => commands::update(load().await?, update_args.clone())
            .await?
            .print(),

        Command::Delete(delete_args) => {
            let mut confirm = confirmer(delete_args.yes());
            commands::delete(load().await?, delete_args.clone(), confirm.as_mut())
                .await?
                .print()
        }

        Command::List(list_args) => commands::list(load().await?, list_args.clone())
            .await?
            .print_data(),

        Command::Summary(filter_args) => commands::summary(load().await?, filter_args.clone())
            .await?
            .print(),

        Command::Chart(chart_args) => commands::chart(load().await?, chart_args.clone())
            .await?
            .print_data(),

        Command::Recent(recent_args) => commands::recent(load().await?, recent_args.clone())
            .await?
            .print_data(),

        Command::Categories => commands::categories(load().await?).await?.print_data(),

        Command::Prefs(prefs_args) => commands::prefs(load().await?, prefs_args.clone())
            .await?
            .print(),

        Command::Export(export_args) => commands::export(load().await?, export_args.clone())
            .await?
            .print(),

        Command::Import(import_args) => {
            let mut confirm = confirmer(import_args.yes());
            commands::import(load().await?, import_args.clone(), confirm.as_mut())
                .await?
                .print()
        }

        Command::Report(report_args) => commands::report(load().await?, report_args.clone())
            .await?
            .print_data(),
    };
    Ok(())
}

/// Initializes the tracing subscriber.
pub fn init_logger(level: LevelFilter) {
    let filter = match std::env::var("RUST_LOG").ok() {
        Some(_) => {
            // RUST_LOG exists; use it.
            EnvFilter::from_default_env()
        }
        None => {
            // RUST_LOG does not exist; use default log level for this crate only.
            EnvFilter::new(format!(
                "{}={},{}={}",
                env!("CARGO_CRATE_NAME"),
                level,
                env!("CARGO_BIN_NAME"),
                level
            ))
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
