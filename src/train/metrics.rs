//! Classification and discriminator metrics

/// Precision, recall and F1 of a binary prediction
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct BinaryScores {
    pub precision: f32,
    pub recall: f32,
    pub f1: f32,
}

const EPS: f32 = 1e-8;

/// Precision, recall and F1 of binary `predictions` against `labels`
///
/// Positive class is 1. ε = 1e-8 keeps every ratio finite, so an all-negative
/// input yields zeros rather than NaN.
///
/// # Example
///
/// ```
/// use layoutgan::train::precision_recall_f1;
///
/// let scores = precision_recall_f1(&[1, 0, 1, 1], &[1, 0, 0, 1]);
/// assert!((scores.precision - 2.0 / 3.0).abs() < 1e-6);
/// assert!((scores.recall - 1.0).abs() < 1e-6);
/// ```
pub fn precision_recall_f1(predictions: &[usize], labels: &[usize]) -> BinaryScores {
    assert_eq!(
        predictions.len(),
        labels.len(),
        "Predictions and labels must have same length"
    );
    let (mut tp, mut fp, mut fn_) = (0.0f32, 0.0f32, 0.0f32);
    for (&p, &l) in predictions.iter().zip(labels) {
        let (p, l) = ((p == 1) as u8 as f32, (l == 1) as u8 as f32);
        tp += p * l;
        fp += p * (1.0 - l);
        fn_ += (1.0 - p) * l;
    }
    let precision = tp / (tp + fp + EPS);
    let recall = tp / (tp + fn_ + EPS);
    let f1 = 2.0 * precision * recall / (precision + recall + EPS);
    BinaryScores {
        precision,
        recall,
        f1,
    }
}

/// Row-wise argmax of a `[rows, cols]` matrix; ties go to the lowest index
pub fn argmax_rows(values: &[f32], rows: usize, cols: usize) -> Vec<usize> {
    assert_eq!(
        values.len(),
        rows * cols,
        "argmax_rows: expected {rows}x{cols}"
    );
    values
        .chunks(cols.max(1))
        .take(rows)
        .map(|row| {
            let mut best = (0, f32::NEG_INFINITY);
            for (i, &v) in row.iter().enumerate() {
                if v > best.1 {
                    best = (i, v);
                }
            }
            best.0
        })
        .collect()
}

/// Correct count of the median-threshold discriminator proxy
///
/// The threshold is the lower median of all real and fake scores. A real
/// score above it and a fake score at or below it count as correct. Returns
/// `(correct, total)`.
pub fn discriminator_hits(real_scores: &[f32], fake_scores: &[f32]) -> (usize, usize) {
    let mut all: Vec<f32> = real_scores.iter().chain(fake_scores).copied().collect();
    if all.is_empty() {
        return (0, 0);
    }
    all.sort_by(f32::total_cmp);
    let threshold = all[(all.len() - 1) / 2];
    let correct = real_scores.iter().filter(|&&s| s > threshold).count()
        + fake_scores.iter().filter(|&&s| s <= threshold).count();
    (correct, all.len())
}

/// Running accuracy and per-batch F1 over one pass
#[derive(Debug, Clone, Default)]
pub struct ClassificationTally {
    correct: usize,
    total: usize,
    f1_sum: f32,
    batches: usize,
}

impl ClassificationTally {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one batch of predictions
    pub fn record(&mut self, predictions: &[usize], labels: &[usize]) {
        self.correct += predictions
            .iter()
            .zip(labels)
            .filter(|(p, l)| p == l)
            .count();
        self.total += labels.len();
        self.f1_sum += precision_recall_f1(predictions, labels).f1;
        self.batches += 1;
    }

    /// Accuracy in percent, 0 when nothing was recorded
    pub fn accuracy(&self) -> f32 {
        if self.total == 0 {
            0.0
        } else {
            100.0 * self.correct as f32 / self.total as f32
        }
    }

    /// Mean of per-batch F1, 0 when nothing was recorded
    pub fn mean_f1(&self) -> f32 {
        if self.batches == 0 {
            0.0
        } else {
            self.f1_sum / self.batches as f32
        }
    }
}
