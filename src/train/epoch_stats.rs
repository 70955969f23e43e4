use serde::{Serialize, Deserialize};

/// Losses and accuracies of one training-loop iteration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EpochRecord {
    /// 0-based epoch index.
    pub epoch: usize,
    /// `0.5 * (d_loss_real + d_loss_fake)`.
    pub d_loss: f64,
    /// `0.5 * (d_acc_real + d_acc_fake)`, a fraction in [0, 1].
    pub d_acc: f64,
    pub g_loss: f64,
    pub d_loss_real: f64,
    pub d_loss_fake: f64,
    pub d_acc_real: f64,
    pub d_acc_fake: f64,
}

impl EpochRecord {
    pub fn is_finite(&self) -> bool {
        self.d_loss.is_finite() && self.g_loss.is_finite()
    }
}

/// Append-only record of every epoch, in training order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LossHistory {
    records: Vec<EpochRecord>,
}

impl LossHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, record: EpochRecord) {
        self.records.push(record);
    }

    pub fn records(&self) -> &[EpochRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn last(&self) -> Option<&EpochRecord> {
        self.records.last()
    }

    pub fn d_losses(&self) -> Vec<f64> {
        self.records.iter().map(|r| r.d_loss).collect()
    }

    pub fn g_losses(&self) -> Vec<f64> {
        self.records.iter().map(|r| r.g_loss).collect()
    }
}
