use anyhow::Result;
use clap::Parser;
use populace_core::init_logging;
use populace_lib::app::App;
use populace_lib::model::config::AppConfig;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Custom config file path
    #[arg(short, long, default_value = "config.toml")]
    config: String,

    /// Number of ticks to simulate
    #[arg(short, long, default_value_t = 1200)]
    ticks: u64,

    /// Overrides the seed from the config file
    #[arg(short, long)]
    seed: Option<u64>,
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging();

    let mut config = AppConfig::load(&args.config)?;
    if let Some(seed) = args.seed {
        config.simulation.seed = seed;
    }

    let mut app = App::new(config)?;
    let summary = app.run(args.ticks);
    tracing::info!(
        ticks = summary.ticks,
        alive = summary.entities_alive,
        "Run finished"
    );
    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}
