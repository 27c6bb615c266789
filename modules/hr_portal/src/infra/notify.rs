use parking_lot::Mutex;

use crate::domain::ports::{Notice, Notifier};

/// Collects notices in arrival order until the host drains them.
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    notices: Mutex<Vec<Notice>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Remove and return everything recorded so far.
    pub fn drain(&self) -> Vec<Notice> {
        std::mem::take(&mut *self.notices.lock())
    }

    pub fn snapshot(&self) -> Vec<Notice> {
        self.notices.lock().clone()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, notice: Notice) {
        tracing::debug!(level = ?notice.level, message = %notice.message, "notice");
        self.notices.lock().push(notice);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ports::NoticeLevel;

    #[test]
    fn drain_empties_the_buffer() {
        let n = RecordingNotifier::new();
        n.notify(Notice::warning("a"));
        n.notify(Notice::danger("b"));

        assert_eq!(n.snapshot().len(), 2);
        let drained = n.drain();
        assert_eq!(drained[0].level, NoticeLevel::Warning);
        assert_eq!(drained[1].message, "b");
        assert!(n.snapshot().is_empty());
    }
}
