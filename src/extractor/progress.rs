use tracing::info;

/// Discrete points reached by an extraction, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Checkpoint {
    Probing,
    Retrieving,
    Parsing,
    Synthesizing,
}

impl Checkpoint {
    /// Rough completion percentage for progress bars.
    pub fn percent(&self) -> u8 {
        match self {
            Self::Probing => 20,
            Self::Retrieving => 40,
            Self::Parsing => 70,
            Self::Synthesizing => 90,
        }
    }
}

/// Receives checkpoints while an extraction runs. Optional for callers.
#[cfg_attr(test, mockall::automock)]
pub trait ProgressObserver: Send + Sync {
    fn on_checkpoint(&self, checkpoint: Checkpoint);
}

impl<F> ProgressObserver for F
where
    F: Fn(Checkpoint) + Send + Sync,
{
    fn on_checkpoint(&self, checkpoint: Checkpoint) {
        self(checkpoint)
    }
}

/// Logs every checkpoint at info level.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogProgress;

impl ProgressObserver for LogProgress {
    fn on_checkpoint(&self, checkpoint: Checkpoint) {
        info!(
            checkpoint = ?checkpoint,
            percent = checkpoint.percent(),
            "Extraction progress"
        );
    }
}
