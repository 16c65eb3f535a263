use indicatif::{ProgressBar, ProgressStyle};
use kcor_core::pipeline::{PipelineStage, ProgressReporter};

/// Progress bar over the observations of a batch.
pub struct BarReporter {
    bar: ProgressBar,
}

impl BarReporter {
    pub fn new() -> anyhow::Result<Self> {
        let bar = ProgressBar::new(0);
        bar.set_style(
            ProgressStyle::default_bar()
                .template("{msg:40} [{bar:40}] {pos}/{len}")?
                .progress_chars("=> "),
        );
        Ok(Self { bar })
    }
}

impl ProgressReporter for BarReporter {
    fn begin_batch(&self, total: usize) {
        self.bar.set_length(total as u64);
    }

    fn stage(&self, timestamp: &str, stage: PipelineStage) {
        self.bar.set_message(format!("{timestamp} {stage}"));
    }

    fn finish_observation(&self, _timestamp: &str, _ok: bool) {
        self.bar.inc(1);
    }

    fn finish_batch(&self) {
        self.bar.finish_with_message("Done");
    }
}
