/// Aggregated view of session progress, useful for UI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionProgress {
    pub total: usize,
    pub answered: usize,
    pub current_index: usize,
    pub is_complete: bool,
}

impl SessionProgress {
    /// Progress-bar fill for the current position, in percent.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn fill_percent(&self) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        (self.current_index + 1) as f64 / self.total as f64 * 100.0
    }
}
