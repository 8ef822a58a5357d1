use tokio::task::JoinHandle;

/// Pending question timeout for a room.
///
/// The timer task is aborted when the handle is cancelled or dropped, so a
/// room that is deleted can never leave its timer running.
#[derive(Debug)]
pub struct QuestionTimer {
    question_seq: u64,
    handle: Option<JoinHandle<()>>,
}

impl QuestionTimer {
    pub fn new(question_seq: u64, handle: JoinHandle<()>) -> Self {
        Self {
            question_seq,
            handle: Some(handle),
        }
    }

    /// Sequence number of the question this timer was armed for
    pub fn question_seq(&self) -> u64 {
        self.question_seq
    }

    pub fn cancel(mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }

    /// Detaches the task without aborting it. The expiry path calls this on
    /// its own timer, since aborting would cancel the running callback.
    pub fn disarm(mut self) {
        self.handle.take();
    }
}

impl Drop for QuestionTimer {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    fn spawn_flag_task(fired: Arc<AtomicBool>) -> JoinHandle<()> {
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_secs(1)).await;
            fired.store(true, Ordering::SeqCst);
        })
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_stops_pending_task() {
        let fired = Arc::new(AtomicBool::new(false));
        let timer = QuestionTimer::new(1, spawn_flag_task(fired.clone()));

        timer.cancel();
        tokio::time::sleep(Duration::from_secs(2)).await;

        assert!(!fired.load(Ordering::SeqCst));
    }

    #[tokio::test(start_paused = true)]
    async fn test_drop_stops_pending_task() {
        let fired = Arc::new(AtomicBool::new(false));
        {
            let _timer = QuestionTimer::new(1, spawn_flag_task(fired.clone()));
        }
        tokio::time::sleep(Duration::from_secs(2)).await;

        assert!(!fired.load(Ordering::SeqCst));
    }

    #[tokio::test(start_paused = true)]
    async fn test_disarm_lets_task_finish() {
        let fired = Arc::new(AtomicBool::new(false));
        let timer = QuestionTimer::new(3, spawn_flag_task(fired.clone()));
        assert_eq!(timer.question_seq(), 3);

        timer.disarm();
        tokio::time::sleep(Duration::from_secs(2)).await;

        assert!(fired.load(Ordering::SeqCst));
    }
}
