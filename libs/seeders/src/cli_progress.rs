use std::collections::HashMap;

use anyhow::Result;
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use tokio::sync::mpsc;

use crate::{
    progress::{ProgressEvent, ProgressUpdate},
    report::Stage,
};

/// Renders `ProgressTracker` events as one bar per stage.
pub struct CliProgress {
    multi_progress: MultiProgress,
    progress_bars: HashMap<Stage, ProgressBar>,
    style: ProgressStyle,
}

impl CliProgress {
    pub fn new() -> Result<Self> {
        let style = ProgressStyle::default_bar()
            .template(
                "{prefix:.bold} [{bar:40.cyan/blue}] {pos:>5}/{len:5} \
                 ({percent}%) {msg}",
            )?
            .progress_chars("=>-");

        Ok(Self {
            multi_progress: MultiProgress::new(),
            progress_bars: HashMap::new(),
            style,
        })
    }

    pub async fn run(
        &mut self, mut progress_rx: mpsc::UnboundedReceiver<ProgressEvent>,
    ) {
        while let Some(event) = progress_rx.recv().await {
            match event {
                ProgressEvent::Update(update) => self.handle_update(update),
                ProgressEvent::Complete(stage) => {
                    self.finish(stage, "COMPLETE".to_string())
                }
                ProgressEvent::Error(stage, error) => {
                    self.finish(stage, format!("ERROR: {error}"))
                }
                ProgressEvent::Finish => break,
            }
        }
    }

    fn handle_update(&mut self, update: ProgressUpdate) {
        let pb = self.progress_bars.entry(update.stage).or_insert_with(|| {
            let pb = self
                .multi_progress
                .add(ProgressBar::new(update.total as u64));
            pb.set_style(self.style.clone());
            pb.set_prefix(format!("{:22}", update.stage.to_string()));
            pb
        });

        pb.set_length(update.total as u64);
        pb.set_position(update.current as u64);
        pb.set_message(update.message);
    }

    fn finish(&mut self, stage: Stage, message: String) {
        if let Some(pb) = self.progress_bars.get(&stage) {
            pb.finish_with_message(message);
        }
    }
}
