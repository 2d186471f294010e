#[cfg(test)]
mod tests {
  use std::time::Duration;

  use crate::concurrent::CountDownLatch;

  #[tokio::test]
  async fn test_count_down_latch() {
    let latch = CountDownLatch::new(2);

    let cloned = latch.clone();
    tokio::spawn(async move {
      tokio::time::sleep(Duration::from_millis(10)).await;
      cloned.count_down().await;
      cloned.count_down().await;
    });

    latch.wait().await;
    assert_eq!(latch.count().await, 0);
  }

  #[tokio::test]
  async fn test_count_down_below_zero_is_ignored() {
    let latch = CountDownLatch::new(1);
    latch.count_down().await;
    latch.count_down().await;
    assert_eq!(latch.count().await, 0);
    latch.wait().await;
  }
}
