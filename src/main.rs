use clap::Parser;
use helix_quality::domain::ports::RecordSource;
use helix_quality::utils::cache::TtlCache;
use helix_quality::utils::error::ErrorSeverity;
use helix_quality::utils::{logger, validation::Validate};
use helix_quality::{
    CliConfig, EtlEngine, FileRecordSource, HttpRecordSource, LocalStorage, QualityPipeline,
};
use std::sync::Arc;
use std::time::Duration;

// One entry per endpoint is all a single run needs.
const CACHE_MAX_ENTRIES: usize = 8;

fn build_source(config: &CliConfig) -> Box<dyn RecordSource> {
    match (&config.input, &config.api_endpoint) {
        (Some(input), _) => Box::new(FileRecordSource::new(
            LocalStorage::new(".".to_string()),
            input.clone(),
        )),
        (None, endpoint) => {
            let cache = Arc::new(TtlCache::new(
                Duration::from_secs(config.cache_ttl_secs),
                CACHE_MAX_ENTRIES,
            ));
            Box::new(HttpRecordSource::new(endpoint.clone().unwrap_or_default()).with_cache(cache))
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = CliConfig::parse();

    logger::init_cli_logger(config.verbose);

    tracing::info!("Starting helix-quality CLI");
    if config.verbose {
        tracing::debug!("CLI config: {:?}", config);
    }

    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(1);
    }

    let monitor_enabled = config.monitor;
    if monitor_enabled {
        tracing::info!("🔍 System monitoring enabled");
    }

    let source = build_source(&config);
    let storage = LocalStorage::new(config.output_path.clone());
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
