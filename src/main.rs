use std::env;
use std::path::PathBuf;
use std::process;

use tracing::warn;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use custom_recognition::credentials::JsonFileStore;
use custom_recognition::metadata::{ProviderSettings, TmdbClient};
use custom_recognition::pipeline;
use custom_recognition::prompt::{ConsolePrompt, wait_for_keypress};

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "custom_recognition=warn".into()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    println!("Custom Recognition Rule Generator");
    println!("=================================");

    // Optional first argument answers the directory question
    let directory = env::args().nth(1).map(PathBuf::from);

    let mut prompt = ConsolePrompt::new();
    let store = JsonFileStore::in_working_dir();
    let provider = TmdbClient::new(ProviderSettings::default())?;

    let report = match pipeline::run(&mut prompt, &store, &provider, directory).await {
        Ok(report) => report,
        Err(err) => {
            eprintln!("Error: {}, exiting", err);
            process::exit(1);
        }
    };

    println!();
    print!("{}", report);

    if let Err(err) = wait_for_keypress("\nPress any key to exit...") {
        warn!(error = %err, "could not wait for a keypress");
    }
    Ok(())
}
