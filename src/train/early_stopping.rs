//! Patience-based early stopping

/// Whether a smaller or a larger monitored value is better
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Minimize,
    Maximize,
}

/// Stops a loop after `patience` consecutive epochs without improvement
///
/// # Example
///
/// ```rust
/// use layoutgan::train::EarlyStopping;
///
/// let mut stop = EarlyStopping::minimize(2);
/// assert!(stop.update(1.0));
/// assert!(!stop.update(1.5));
/// assert!(!stop.update(2.0));
/// assert!(stop.should_stop());
/// ```
#[derive(Clone, Debug)]
pub struct EarlyStopping {
    /// Number of epochs to wait for improvement
    patience: usize,
    /// Minimum improvement to reset patience
    min_delta: f32,
    mode: Mode,
    best: f32,
    epochs_without_improvement: usize,
}

impl EarlyStopping {
    pub fn new(patience: usize, mode: Mode) -> Self {
        let best = match mode {
            Mode::Minimize => f32::INFINITY,
            Mode::Maximize => f32::NEG_INFINITY,
        };
        Self {
            patience,
            min_delta: 0.0,
            mode,
            best,
            epochs_without_improvement: 0,
        }
    }

    pub fn minimize(patience: usize) -> Self {
        Self::new(patience, Mode::Minimize)
    }

    pub fn maximize(patience: usize) -> Self {
        Self::new(patience, Mode::Maximize)
    }

    /// Start from a known best value instead of ±∞
    pub fn with_best(mut self, best: f32) -> Self {
        self.best = best;
        self
    }

    pub fn with_min_delta(mut self, min_delta: f32) -> Self {
        self.min_delta = min_delta;
        self
    }

    /// Record one epoch; returns true when `value` strictly improves on the best
    pub fn update(&mut self, value: f32) -> bool {
        let improved = match self.mode {
            Mode::Minimize => value < self.best - self.min_delta,
            Mode::Maximize => value > self.best + self.min_delta,
        };
        if improved {
            self.best = value;
            self.epochs_without_improvement = 0;
        } else {
            self.epochs_without_improvement += 1;
        }
        improved
    }

    pub fn should_stop(&self) -> bool {
        self.epochs_without_improvement >= self.patience
    }

    pub fn best(&self) -> f32 {
        self.best
    }

    pub fn epochs_without_improvement(&self) -> usize {
        self.epochs_without_improvement
    }

    pub fn patience(&self) -> usize {
        self.patience
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_increasing_loss_stops_at_patience_plus_one() {
        let patience = 4;
        let mut es = EarlyStopping::minimize(patience);
        let mut stopped_at = None;
        for epoch in 1..=10 {
            es.update(epoch as f32);
            if es.should_stop() {
                stopped_at = Some(epoch);
                break;
            }
        }
        assert_eq!(stopped_at, Some(patience + 1));
    }

    #[test]
    fn test_improvement_resets_counter() {
        let mut es = EarlyStopping::minimize(3);
        es.update(1.0);
        es.update(2.0);
        es.update(3.0);
        assert_eq!(es.epochs_without_improvement(), 2);
        assert!(es.update(0.5));
        assert_eq!(es.epochs_without_improvement(), 0);
        assert!(!es.should_stop());
    }

    #[test]
    fn test_maximize_from_zero_requires_strict_gain() {
        let mut es = EarlyStopping::maximize(2).with_best(0.0);
        assert!(!es.update(0.0));
        assert!(es.update(10.0));
        assert!(!es.update(10.0));
        assert!(!es.should_stop());
        assert!(!es.update(5.0));
        assert!(es.should_stop());
        assert_eq!(es.best(), 10.0);
    }

    #[test]
    fn test_min_delta() {
        let mut es = EarlyStopping::minimize(5).with_min_delta(0.1);
        es.update(1.0);
        assert!(!es.update(0.95));
        assert!(es.update(0.8));
    }

    #[test]
    fn test_nan_never_improves() {
        let mut es = EarlyStopping::minimize(1);
        assert!(!es.update(f32::NAN));
        assert!(es.should_stop());
    }
}
