//! Best-effort system memory readout for the sidebar.

use sysinfo::System;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MemorySnapshot {
    pub used_mb: u64,
    pub total_mb: u64,
}

impl MemorySnapshot {
    pub fn percent_used(&self) -> f32 {
        if self.total_mb == 0 {
            return 0.0;
        }
        self.used_mb as f32 / self.total_mb as f32 * 100.0
    }
}

/// Reads current memory utilization. Returns `None` when the platform
/// reports nothing usable; callers degrade to a warning, never a crash.
pub fn read_memory() -> Option<MemorySnapshot> {
    let mut sys = System::new();
    sys.refresh_memory();

    let total = sys.total_memory();
    if total == 0 {
        log::warn!("Platform reported no total memory; hiding memory stats");
        return None;
    }

    // sysinfo reports bytes
    Some(MemorySnapshot {
        used_mb: sys.used_memory() / (1024 * 1024),
        total_mb: total / (1024 * 1024),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_percent_used_is_bounded() {
        let snapshot = MemorySnapshot { used_mb: 512, total_mb: 2048 };
        assert!((snapshot.percent_used() - 25.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_zero_total_does_not_divide_by_zero() {
        let snapshot = MemorySnapshot { used_mb: 0, total_mb: 0 };
        assert_eq!(snapshot.percent_used(), 0.0);
    }
}
