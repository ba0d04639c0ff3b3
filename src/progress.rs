//! Upload progress events.

use tracing::{info, warn};

/// Progress is reported each time this share of the file has been sent.
pub const PROGRESS_STEP_PERCENT: u8 = 5;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadEvent {
    Started { file_name: String, total_bytes: u64 },
    Progress { percent: u8 },
    Finished,
    Failed(String),
}

/// Receives events while a package is being uploaded.
pub trait UploadObserver: Send + Sync {
    fn on_event(&self, event: &UploadEvent);
}

/// Writes upload events to the log.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogObserver;

impl UploadObserver for LogObserver {
    fn on_event(&self, event: &UploadEvent) {
        match event {
            UploadEvent::Started {
                file_name,
                total_bytes,
            } => info!("uploading {} ({} bytes)", file_name, total_bytes),
            UploadEvent::Progress { percent } => info!("upload progress: {} %", percent),
            UploadEvent::Finished => info!("upload finished"),
            UploadEvent::Failed(reason) => warn!("upload exception: {}", reason),
        }
    }
}

/// Turns a running byte count into coarse percentage steps.
#[derive(Debug, Clone)]
pub struct ProgressStepper {
    total: u64,
    sent: u64,
    step: u8,
    next: u8,
}

impl ProgressStepper {
    pub fn new(total: u64, step: u8) -> Self {
        let step = step.clamp(1, 100);
        Self {
            total,
            sent: 0,
            step,
            next: step,
        }
    }

    pub fn sent(&self) -> u64 {
        self.sent
    }

    /// Records `bytes` more and returns the percentage if a step boundary was crossed.
    pub fn advance(&mut self, bytes: u64) -> Option<u8> {
        self.sent = self.sent.saturating_add(bytes);
        if self.next > 100 {
            return None;
        }
        let percent = self.percent();
        if percent < self.next {
            return None;
        }
        self.next = match (percent / self.step).checked_add(1) {
            Some(n) => n.saturating_mul(self.step).max(percent.saturating_add(1)),
            None => u8::MAX,
        };
        Some(percent)
    }

    fn percent(&self) -> u8 {
        if self.total == 0 {
            return 100;
        }
        let p = self.sent.min(self.total).saturating_mul(100) / self.total;
        u8::try_from(p).unwrap_or(100)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reports_every_five_percent() {
        let mut stepper = ProgressStepper::new(1000, PROGRESS_STEP_PERCENT);
        let reported: Vec<u8> = (0..100).filter_map(|_| stepper.advance(10)).collect();
        let expected: Vec<u8> = (1..=20).map(|i| i * 5).collect();
        assert_eq!(reported, expected);
        assert_eq!(stepper.sent(), 1000);
    }

    #[test]
    fn large_chunks_skip_intermediate_steps() {
        let mut stepper = ProgressStepper::new(100, PROGRESS_STEP_PERCENT);
        assert_eq!(stepper.advance(3), None);
        assert_eq!(stepper.advance(40), Some(43));
        assert_eq!(stepper.advance(1), None);
        assert_eq!(stepper.advance(2), Some(46));
        assert_eq!(stepper.advance(54), Some(100));
        assert_eq!(stepper.advance(10), None);
    }

    #[test]
    fn empty_file_completes_immediately() {
        let mut stepper = ProgressStepper::new(0, PROGRESS_STEP_PERCENT);
        assert_eq!(stepper.advance(0), Some(100));
        assert_eq!(stepper.advance(0), None);
    }
}
