use std::sync::Arc;

use tokio::sync::{Mutex, Notify};

/// Releases every waiter once `count` tasks have reached the barrier.
#[derive(Debug, Clone)]
pub struct AsyncBarrier {
  notify: Arc<Notify>,
  count: Arc<Mutex<usize>>,
}

impl AsyncBarrier {
  pub fn new(count: usize) -> Self {
    AsyncBarrier {
      notify: Arc::new(Notify::new()),
      count: Arc::new(Mutex::new(count)),
    }
  }

  pub async fn wait(&self) {
    let mut count = self.count.lock().await;
    *count = count.saturating_sub(1);
    if *count == 0 {
      self.notify.notify_waiters();
    } else {
      // Register interest before releasing the lock so the last arrival cannot be missed.
      let notified = self.notify.notified();
      tokio::pin!(notified);
      notified.as_mut().enable();
      drop(count);
      notified.await;
    }
  }
}
