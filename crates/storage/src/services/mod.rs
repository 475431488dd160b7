pub mod eligibility;
pub mod resolution;
pub mod retry;
pub mod standings;
pub mod submission;

/// Policy knobs for the pick engine.
#[derive(Debug, Clone)]
pub struct EngineSettings {
    /// Lets a participant replace a still-pending pick before its game locks.
    pub allow_pending_override: bool,
    /// Honours a submission's `ignore_lock` flag.
    pub allow_lock_override: bool,
    /// Extra attempts for idempotent reads that fail transiently.
    pub read_retries: u32,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            allow_pending_override: false,
            allow_lock_override: false,
            read_retries: 2,
        }
    }
}
