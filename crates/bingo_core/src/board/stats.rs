//! Completion statistics.

use serde::Serialize;

/// Completed/total counts over the displayed cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CompletionStats {
    pub completed: usize,
    pub total: usize,
    /// `round(100 * completed / total)`, or 0 for an empty board.
    pub percentage: u32,
}

impl CompletionStats {
    pub fn new(completed: usize, total: usize) -> Self {
        let percentage = if total == 0 {
            0
        } else {
            // Integer round-half-up of 100 * completed / total.
            ((200 * completed + total) / (2 * total)) as u32
        };
        Self {
            completed,
            total,
            percentage,
        }
    }

    pub fn is_complete(&self) -> bool {
        self.total > 0 && self.completed == self.total
    }
}

#[cfg(test)]
mod tests {
    use super::CompletionStats;

    #[test]
    fn empty_board_is_zero_percent() {
        let stats = CompletionStats::new(0, 0);
        assert_eq!(stats.percentage, 0);
        assert!(!stats.is_complete());
    }

    #[test]
    fn percentage_rounds_half_up() {
        assert_eq!(CompletionStats::new(1, 3).percentage, 33);
        assert_eq!(CompletionStats::new(2, 3).percentage, 67);
        assert_eq!(CompletionStats::new(1, 8).percentage, 13);
        assert_eq!(CompletionStats::new(3, 9).percentage, 33);
        assert_eq!(CompletionStats::new(16, 16).percentage, 100);
        assert!(CompletionStats::new(16, 16).is_complete());
    }
}
