use crate::domain::ports::Pipeline;
use crate::utils::error::Result;
use crate::utils::monitor::SystemMonitor;

/// Drives a [`Pipeline`] through extract, transform and load.
pub struct EtlEngine<P: Pipeline> {
    pipeline: P,
    monitor: SystemMonitor,
}

impl<P: Pipeline> EtlEngine<P> {
    pub fn new(pipeline: P) -> Self {
        Self::new_with_monitoring(pipeline, false)
    }

    pub fn new_with_monitoring(pipeline: P, monitor_enabled: bool) -> Self {
        Self {
            pipeline,
            monitor: SystemMonitor::new(monitor_enabled),
        }
    }

    pub async fn run(&self) -> Result<String> {
        tracing::info!("🚀 Starting quality run");
        self.monitor.log_phase("Start");

        tracing::info!("📥 Extracting records...");
        let extraction = self.pipeline.extract().await?;
        tracing::info!("📥 Extracted {} records", extraction.records.len());
        self.monitor.log_phase("Extract");

        tracing::info!("🔄 Running quality checks...");
        let result = self.pipeline.transform(extraction).await?;
        tracing::info!(
            "🔄 {} records kept after de-duplication, {} cross references",
            result.cleaned_records.len(),
            result.report.cross_references.len()
        );
        self.monitor.log_phase("Transform");

        tracing::info!("💾 Writing report...");
        let output_path = self.pipeline.load(result).await?;
        tracing::info!("💾 Output saved to: {}", output_path);
        self.monitor.log_phase("Load");

        self.monitor.log_final();
        Ok(output_path)
    }
}
