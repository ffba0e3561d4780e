use clap::Parser;
use helix_quality::config::toml_config::{LogFormat, SourceType};
use helix_quality::domain::ports::{ConfigProvider, RecordSource};
use helix_quality::utils::cache::TtlCache;
use helix_quality::utils::error::ErrorSeverity;
use helix_quality::utils::{logger, validation::Validate};
use helix_quality::{
    EtlEngine, FileRecordSource, HttpRecordSource, LocalStorage, QualityPipeline, TomlConfig,
};
use std::sync::Arc;
use std::time::Duration;

#[derive(Parser)]
#[command(name = "toml-quality")]
#[command(about = "Regulatory data quality run driven by a TOML configuration")]
struct Args {
    /// Path to TOML configuration file
    #[arg(short, long, default_value = "quality-config.toml")]
    config: String,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Override monitoring setting from config
    #[arg(long)]
    monitor: Option<bool>,

    /// Override ZIP output setting from config
    #[arg(long)]
    zip: Option<bool>,

    /// Show the resolved configuration without fetching anything
    #[arg(long)]
    dry_run: bool,
}

fn build_source(config: &TomlConfig) -> Result<Box<dyn RecordSource>, reqwest::Error> {
    let source = &config.source;
    match source.r#type {
        SourceType::File => Ok(Box::new(FileRecordSource::new(
            LocalStorage::new(".".to_string()),
            source.path.clone().unwrap_or_default(),
        ))),
        SourceType::Api => {
            let mut client = reqwest::Client::builder();
            if let Some(timeout) = source.timeout_seconds {
                client = client.timeout(Duration::from_secs(timeout));
            }
            let cache = Arc::new(TtlCache::new(
                Duration::from_secs(config.cache_ttl_seconds()),
                config.cache_max_entries(),
            ));
            Ok(Box::new(
                HttpRecordSource::with_client(
                    client.build()?,
                    source.endpoint.clone().unwrap_or_default(),
                )
                .with_cache(cache),
            ))
        }
    }
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

    match config.log_format() {
        LogFormat::Json => logger::init_json_logger(),
        LogFormat::Compact => logger::init_cli_logger(args.verbose),
    }

    tracing::info!("🚀 Starting TOML-based quality run");
    tracing::info!("📁 Loaded configuration from: {}", args.config);

    if let Some(zip) = args.zip {
        config.output.zip = zip;
        tracing::info!("🔧 ZIP output overridden to: {}", zip);
    }

    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(1);
    }

    tracing::info!("✅ Configuration loaded and validated successfully");
    display_config_summary(&config, &args);

    if args.dry_run {
        tracing::info!("🔍 DRY RUN MODE - No records will be fetched");
        return Ok(());
    }

    let monitor_enabled = args.monitor.unwrap_or_else(|| config.monitoring_enabled());
    if monitor_enabled {
        tracing::info!("🔍 System monitoring enabled");
    }

    let source = build_source(&config)?;
    let storage = LocalStorage::new(config.output_path().to_string());
    let pipeline = QualityPipeline::new(storage, config, source);

    let engine = EtlEngine::new_with_monitoring(pipeline, monitor_enabled);

    match engine.run().await {
        Ok(output_path) => {
            tracing::info!("✅ Quality run completed successfully!");
            println!("✅ Quality run completed successfully!");
            println!("📁 Output saved to: {}", output_path);
        }
        Err(e) => {
            tracing::error!(
                "❌ Quality run failed: {} (Category: {:?}, Severity: {:?})",
                e,
                e.category(),
                e.severity()
            );
            tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 Suggestion: {}", e.recovery_suggestion());

            let exit_code = match e.severity() {
                ErrorSeverity::Low => 0,
                ErrorSeverity::Medium => 2,
                ErrorSeverity::High => 1,
                ErrorSeverity::Critical => 3,
            };

            if exit_code > 0 {
                std::process::exit(exit_code);
            }
        }
    }

    Ok(())
}

fn display_config_summary(config: &TomlConfig, args: &Args) {
    println!("📋 Configuration Summary:");
    println!("  Report: {}", config.report.name);
    if let Some(description) = &config.report.description {
        println!("  Description: {}", description);
    }

    match config.source.r#type {
        SourceType::Api => println!(
            "  Source: API {} (cache TTL {}s, {} entries)",
            config.source.endpoint.as_deref().unwrap_or_default(),
            config.cache_ttl_seconds(),
            config.cache_max_entries()
        ),
        SourceType::File => println!(
            "  Source: file {}",
            config.source.path.as_deref().unwrap_or_default()
        ),
    }
    println!("  Sample fallback: {}", config.fallback_to_sample());

    println!(
        "  Thresholds: title {:.2}, content {:.2}, mapping {:.2}, clinical {:.2}",
        config.title_threshold(),
        config.content_threshold(),
        config.mapping_confidence(),
        config.clinical_similarity()
    );

    println!("  Output: {}", config.output_path());
    println!("  ZIP: {}", config.zip_output());

    if args.dry_run {
        println!("  🔍 DRY RUN MODE ENABLED");
    }

    println!();
}
