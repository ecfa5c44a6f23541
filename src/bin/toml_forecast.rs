use clap::Parser;
use league_forecast::core::backtest::format_backtest;
use league_forecast::core::predict::format_table;
use league_forecast::core::ConfigProvider;
use league_forecast::utils::validation::{is_remote_source, Validate};
use league_forecast::utils::logger;
use league_forecast::{ForecastEngine, ForecastPipeline, LocalStorage, TomlConfig};

#[derive(Parser)]
#[command(name = "toml-forecast")]
#[command(about = "League forecast driven by a TOML configuration file")]
struct Args {
    /// Path to TOML configuration file
    #[arg(short, long, default_value = "forecast.toml")]
    config: String,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Override monitoring setting from config
    #[arg(long)]
    monitor: Option<bool>,

    /// Override the backtest setting from config
    #[arg(long)]
    backtest: Option<bool>,

    /// Show what would be processed without executing
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let mut config = match TomlConfig::from_file(&args.config) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ Failed to load config file '{}': {}", args.config, e);
            eprintln!("💡 Make sure the file exists and is valid TOML format");
            std::process::exit(1);
        }
    };

    logger::init(args.verbose, config.json_logs());
    tracing::info!("🚀 Starting TOML-based forecast");
    tracing::info!("📁 Loaded configuration from: {}", args.config);

    if let Some(backtest) = args.backtest {
        config.forecast.backtest = Some(backtest);
        tracing::info!("🔧 Backtest overridden to: {}", backtest);
    }

    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(e.exit_code());
    }

    display_config_summary(&config, &args);

    if args.dry_run {
        tracing::info!("🔍 DRY RUN MODE - No actual processing will occur");
        perform_dry_run(&config);
        return Ok(());
    }

    let monitor_enabled = args.monitor.unwrap_or_else(|| config.monitoring_enabled());
    if monitor_enabled {
        tracing::info!("🔍 System monitoring enabled");
    }

    let storage = LocalStorage::new(config.output.output_path.clone());
    let pipeline = ForecastPipeline::new(storage, config);
    let engine = ForecastEngine::new_with_monitoring(pipeline, monitor_enabled);

    match engine.run().await {
        Ok(run) => {
            println!("Predicted table (1 = champion):");
            println!("{}", format_table(&run.result.predictions));
            if let Some(backtest) = &run.result.backtest {
                println!("{}", format_backtest(backtest));
            }
            println!("📁 Output saved to: {}", run.output_path);
        }
        Err(e) => {
            tracing::error!(
                "❌ Forecast failed: {} (Category: {:?}, Severity: {:?})",
                e,
                e.category(),
                e.severity()
            );
            tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());
            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 {}", e.recovery_suggestion());

            let exit_code = e.exit_code();
            if exit_code > 0 {
                std::process::exit(exit_code);
            }
        }
    }

    Ok(())
}

fn display_config_summary(config: &TomlConfig, args: &Args) {
    println!("📋 Configuration Summary:");
    println!("  Forecast: {}", config.forecast.name);
    if let Some(description) = &config.forecast.description {
        println!("  Description: {}", description);
    }
    println!("  Seasons: {}", config.seasons().len());
    println!("  Table size: {}", config.table_size());
    println!(
        "  Output: {}/{}",
        config.output_path(),
        config.bundle_name()
    );

    if args.dry_run {
        println!("  🔍 DRY RUN MODE ENABLED");
    }

    println!();
}

fn perform_dry_run(config: &TomlConfig) {
    println!("🔍 Dry Run Analysis:");
    println!();

    println!("📡 Season Sources (oldest first):");
    for source in config.seasons() {
        let kind = if is_remote_source(source) { "http" } else { "file" };
        println!("  [{}] {}", kind, source);
    }

    println!();
    println!("🔄 League Changes:");
    if config.promoted().is_empty() && config.relegated().is_empty() {
        println!("  none configured; the last season's teams are forecast as-is");
    }
    for team in config.promoted() {
        println!("  ⬆️ {}", team);
    }
    for team in config.relegated() {
        println!("  ⬇️ {}", team);
    }

    let model = config.model();
    println!();
    println!("🌲 Model:");
    println!("  Trees: {}", model.n_estimators);
    println!("  Max depth: {}", model.max_depth);
    println!("  Random state: {}", model.random_state);
    println!(
        "  Class weight: {}",
        if model.balanced_class_weight { "balanced" } else { "none" }
    );
    println!("  Backtest: {}", config.backtest());

    println!();
    println!("✅ Dry run analysis complete. Use --verbose for more details during actual run.");
}
