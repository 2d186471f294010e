use std::sync::Arc;

use tokio::sync::{Mutex, Notify};

/// Tracks a dynamic number of outstanding tasks; `wait` returns once all of them called `done`.
#[derive(Debug, Clone, Default)]
pub struct WaitGroup {
  count: Arc<Mutex<usize>>,
  notify: Arc<Notify>,
}

impl WaitGroup {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn with_count(count: usize) -> Self {
    Self {
      count: Arc::new(Mutex::new(count)),
      notify: Arc::new(Notify::new()),
    }
  }

  pub async fn add(&self, n: usize) {
    *self.count.lock().await += n;
  }

  pub async fn done(&self) {
    let mut count = self.count.lock().await;
    *count = count.saturating_sub(1);
    if *count == 0 {
      self.notify.notify_waiters();
    }
  }

  pub async fn wait(&self) {
    loop {
      let notified = self.notify.notified();
      tokio::pin!(notified);
      notified.as_mut().enable();
      if *self.count.lock().await == 0 {
        return;
      }
      notified.await;
    }
  }
}
