#[cfg(test)]
mod tests {
  use std::sync::atomic::{AtomicUsize, Ordering};
  use std::sync::Arc;

  use crate::concurrent::{AsyncBarrier, WaitGroup};

  #[tokio::test]
  async fn test_barrier_releases_all_parties() {
    let barrier = AsyncBarrier::new(3);
    let passed = Arc::new(AtomicUsize::new(0));

    let mut handles = Vec::new();
    for _ in 0..2 {
      let barrier = barrier.clone();
      let passed = passed.clone();
      handles.push(tokio::spawn(async move {
        barrier.wait().await;
        passed.fetch_add(1, Ordering::SeqCst);
      }));
    }
    tokio::task::yield_now().await;
    assert_eq!(passed.load(Ordering::SeqCst), 0);

    barrier.wait().await;
    for handle in handles {
      handle.await.unwrap();
    }
    assert_eq!(passed.load(Ordering::SeqCst), 2);
  }

  #[tokio::test]
  async fn test_wait_group_waits_for_done() {
    let wg = WaitGroup::new();
    wg.add(2).await;

    for _ in 0..2 {
      let wg = wg.clone();
      tokio::spawn(async move {
        tokio::task::yield_now().await;
        wg.done().await;
      });
    }

    wg.wait().await;
  }

  #[tokio::test]
  async fn test_wait_group_without_tasks_returns_immediately() {
    WaitGroup::new().wait().await;
  }
}
