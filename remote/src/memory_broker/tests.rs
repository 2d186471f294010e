use std::time::Duration;

use courier_actor_core_rs::actor::TransportError;
use tokio::time::timeout;

use super::{MemoryBroker, DESTINATION_CAPACITY};

#[tokio::test]
async fn test_frames_published_before_subscribe_are_kept_in_order() {
  let broker = MemoryBroker::new();
  broker.publish("inbox", b"first".to_vec()).await.unwrap();
  broker.publish("inbox", b"second".to_vec()).await.unwrap();

  let mut receiver = broker.subscribe("inbox").await.unwrap();

  assert_eq!(receiver.recv().await.unwrap(), b"first".to_vec());
  assert_eq!(receiver.recv().await.unwrap(), b"second".to_vec());
}

#[tokio::test]
async fn test_single_consumer_per_destination() {
  let broker = MemoryBroker::new();
  let _receiver = broker.subscribe("inbox").await.unwrap();

  assert!(matches!(
    broker.subscribe("inbox").await,
    Err(TransportError::Failure(_))
  ));
}

#[tokio::test]
async fn test_release_drops_the_queue() {
  let broker = MemoryBroker::new();
  broker.publish("inbox", b"stale".to_vec()).await.unwrap();
  assert!(broker.contains("inbox"));

  broker.release("inbox");
  assert!(!broker.contains("inbox"));

  let mut receiver = broker.subscribe("inbox").await.unwrap();
  assert!(broker.contains("inbox"));
  broker.publish("inbox", b"fresh".to_vec()).await.unwrap();
  assert_eq!(receiver.recv().await.unwrap(), b"fresh".to_vec());
}

#[tokio::test]
async fn test_publish_after_release_fails_instead_of_queueing() {
  let broker = MemoryBroker::new();
  drop(broker.subscribe("inbox").await.unwrap());
  broker.release("inbox");

  for _ in 0..DESTINATION_CAPACITY + 1 {
    let result = timeout(Duration::from_millis(100), broker.publish("inbox", b"lost".to_vec()))
      .await
      .expect("publish to a released destination must not block");
    assert!(matches!(result, Err(TransportError::Failure(_))));
  }
  assert!(!broker.contains("inbox"));
}

#[tokio::test]
async fn test_publish_fails_once_the_consumer_is_gone() {
  let broker = MemoryBroker::new();
  drop(broker.subscribe("inbox").await.unwrap());

  assert!(broker.publish("inbox", b"lost".to_vec()).await.is_err());
}
