//! Cumulative connectivity statistics

/// Counters kept across the device lifetime
///
/// `total_tx == success_tx + failed_tx` holds after every uplink attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Statistics {
    /// Uplinks handed to the radio
    pub total_tx: u32,
    /// Uplinks the radio reported as sent
    pub success_tx: u32,
    /// Uplinks the radio reported as failed
    pub failed_tx: u32,
    /// Join requests handed to the radio (not persisted)
    pub join_attempts: u32,
}

impl Statistics {
    /// Successful uplinks as a percentage of attempts (0 when none)
    pub fn success_rate(&self) -> f32 {
        if self.total_tx == 0 {
            return 0.0;
        }
        self.success_tx as f32 / self.total_tx as f32 * 100.0
    }

    pub(crate) fn record_success(&mut self) {
        self.total_tx = self.total_tx.saturating_add(1);
        self.success_tx = self.success_tx.saturating_add(1);
    }

    pub(crate) fn record_failure(&mut self) {
        self.total_tx = self.total_tx.saturating_add(1);
        self.failed_tx = self.failed_tx.saturating_add(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_success_rate() {
        let mut stats = Statistics::default();
        assert_eq!(stats.success_rate(), 0.0);

        stats.record_success();
        stats.record_success();
        stats.record_success();
        stats.record_failure();
        assert_eq!(stats.total_tx, 4);
        assert!((stats.success_rate() - 75.0).abs() < 1e-4);
    }
}
