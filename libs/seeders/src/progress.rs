use tokio::sync::mpsc;

use crate::report::Stage;

#[derive(Debug, Clone)]
pub struct ProgressUpdate {
    pub stage: Stage,
    pub current: usize,
    pub total: usize,
    pub message: String,
}

#[derive(Debug, Clone)]
pub enum ProgressEvent {
    Update(ProgressUpdate),
    Complete(Stage),
    Error(Stage, String),
    Finish,
}

#[derive(Debug, Clone)]
pub struct ProgressTracker {
    tx: mpsc::UnboundedSender<ProgressEvent>,
}

impl ProgressTracker {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<ProgressEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }

    pub fn update(
        &self, stage: Stage, current: usize, total: usize,
        message: impl Into<String>,
    ) {
        let _ = self.tx.send(ProgressEvent::Update(ProgressUpdate {
            stage,
            current,
            total,
            message: message.into(),
        }));
    }

    pub fn complete(&self, stage: Stage) {
        let _ = self.tx.send(ProgressEvent::Complete(stage));
    }

    pub fn error(&self, stage: Stage, error: String) {
        let _ = self.tx.send(ProgressEvent::Error(stage, error));
    }

    pub fn finish(&self) { let _ = self.tx.send(ProgressEvent::Finish); }
}
