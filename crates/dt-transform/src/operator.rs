//! Streaming stage running the transform over incoming frame batches

use std::borrow::Cow;
use std::sync::Arc;
use parking_lot::RwLock;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use dt_core::DataFrame;

use crate::calculate_to_row::{calculate_to_row, CalculateToRowOptions};

/// Default capacity of the stage's output channel
const DEFAULT_BUFFER: usize = 16;

/// Shared, replaceable options of a running stage
#[derive(Debug, Clone, Default)]
pub struct OptionsHandle {
    inner: Arc<RwLock<CalculateToRowOptions>>,
}

impl OptionsHandle {
    pub fn new(options: CalculateToRowOptions) -> Self {
        Self {
            inner: Arc::new(RwLock::new(options)),
        }
    }

    /// Snapshot of the current options
    pub fn get(&self) -> CalculateToRowOptions {
        self.inner.read().clone()
    }

    /// Replace the options; applies from the next received batch
    pub fn set(&self, options: CalculateToRowOptions) {
        *self.inner.write() = options;
    }

    /// Run `frames` through the transform with the current options
    pub fn apply(&self, frames: Vec<DataFrame>) -> Vec<DataFrame> {
        let changed = {
            let options = self.inner.read();
            match calculate_to_row(&frames, &options.reducers) {
                Cow::Borrowed(_) => None,
                Cow::Owned(out) => Some(out),
            }
        };
        changed.unwrap_or(frames)
    }
}

/// Pipeline stage appending summary rows to every batch it receives
#[derive(Debug, Clone)]
pub struct TransformStage {
    options: OptionsHandle,
    buffer: usize,
}

impl TransformStage {
    pub fn new(options: CalculateToRowOptions) -> Self {
        Self {
            options: OptionsHandle::new(options),
            buffer: DEFAULT_BUFFER,
        }
    }

    /// Handle for editing the options while the stage runs
    pub fn options(&self) -> OptionsHandle {
        self.options.clone()
    }

    /// Spawn the stage on the current tokio runtime.
    ///
    /// The stage ends when `input` closes or the returned receiver is dropped.
    pub fn spawn(self, mut input: mpsc::Receiver<Vec<DataFrame>>) -> (mpsc::Receiver<Vec<DataFrame>>, JoinHandle<usize>) {
        let (tx, rx) = mpsc::channel(self.buffer);
        let options = self.options;

        let handle = tokio::spawn(async move {
            let mut batches = 0usize;
            while let Some(frames) = input.recv().await {
                let out = options.apply(frames);
                batches += 1;
                if tx.send(out).await.is_err() {
                    debug!("Transform stage output closed after {} batch(es)", batches);
                    break;
                }
            }
            info!("Transform stage finished: {} batch(es)", batches);
            batches
        });

        (rx, handle)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dt_core::{Field, Value};

    fn batch(values: &[f64]) -> Vec<DataFrame> {
        vec![DataFrame::new(vec![Field::numbers("value", values.iter().copied())])]
    }

    #[tokio::test]
    async fn test_stage_transforms_each_batch() {
        let stage = TransformStage::new(CalculateToRowOptions::default().with_reducers("value", ["max"]));
        let (tx, rx) = mpsc::channel(4);
        let (mut out, handle) = stage.spawn(rx);

        tx.send(batch(&[1.0, 4.0])).await.unwrap();
        tx.send(batch(&[7.0])).await.unwrap();
        drop(tx);

        let first = out.recv().await.unwrap();
        assert_eq!(first[0].fields[0].values[2], Value::from(4.0));
        let second = out.recv().await.unwrap();
        assert_eq!(second[0].fields[0].values[1], Value::from(7.0));
        assert!(out.recv().await.is_none());
        assert_eq!(handle.await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_options_update_applies_to_next_batch() {
        let stage = TransformStage::new(CalculateToRowOptions::default());
        let options = stage.options();
        let (tx, rx) = mpsc::channel(1);
        let (mut out, _handle) = stage.spawn(rx);

        tx.send(batch(&[1.0, 2.0])).await.unwrap();
        let passthrough = out.recv().await.unwrap();
        assert_eq!(passthrough[0].length, 2);

        options.set(CalculateToRowOptions::default().with_reducers("value", ["sum"]));
        tx.send(batch(&[1.0, 2.0])).await.unwrap();
        let reduced = out.recv().await.unwrap();
        assert_eq!(reduced[0].length, 3);
        assert_eq!(reduced[0].fields[0].values[2], Value::from(3.0));
    }

    #[test]
    fn test_apply_passes_inactive_batches_through() {
        let handle = OptionsHandle::default();
        let frames = batch(&[1.0]);
        let out = handle.apply(frames.clone());
        assert_eq!(out, frames);
    }
}
