use std::env;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use courier_actor_core_rs::actor::actor_system::ActorSystem;
use courier_actor_core_rs::actor::core::{Actor, ActorOptions};
use courier_actor_core_rs::actor::message::{Context, Payload, CHILD_CLOSED};
use courier_actor_core_rs::actor::ActorError;
use courier_actor_utils_rs::concurrent::{AsyncBarrier, CountDownLatch, WaitGroup};
use tracing_subscriber::EnvFilter;

type TestResult<T> = Result<T, Box<dyn std::error::Error>>;

fn init_tracing() {
  let _ = env::set_var("RUST_LOG", "info");
  let _ = tracing_subscriber::fmt()
    .with_env_filter(EnvFilter::from_default_env())
    .try_init();
}

#[tokio::test]
async fn test_request_reply_round_trip() -> TestResult<()> {
  init_tracing();
  let system = ActorSystem::new().await?;
  let echoer = Actor::new().react("ping", |ctx: Context| async move {
    let reply = format!("pong:{}", ctx.data_as::<String>().cloned().unwrap_or_default());
    ctx.sender().tell("pong", Some(Payload::new(reply)), ctx.self_ref()).await
  });
  let echoer = system.register_actor("echoer", echoer, ActorOptions::new()).await?;

  let reply = echoer
    .ask("ping", Some(Payload::new("hi".to_string())), Duration::from_secs(1))
    .await?;

  assert_eq!(
    reply.as_ref().and_then(|p| p.downcast_ref::<String>()).map(String::as_str),
    Some("pong:hi")
  );
  system.shutdown().await?;
  Ok(())
}

#[tokio::test]
async fn test_child_asks_parent_for_help_then_closes() -> TestResult<()> {
  init_tracing();
  let system = ActorSystem::new().await?;
  let latch = CountDownLatch::new(2);
  let closed_child = Arc::new(tokio::sync::Mutex::new(None::<String>));

  let parent = Actor::new()
    .react("help", {
      let latch = latch.clone();
      move |ctx: Context| {
        let latch = latch.clone();
        async move {
          ctx.self_ref().log_info(format!("{} needs help", ctx.sender()));
          latch.count_down().await;
          Ok(())
        }
      }
    })
    .react(CHILD_CLOSED, {
      let latch = latch.clone();
      let closed_child = closed_child.clone();
      move |ctx: Context| {
        let latch = latch.clone();
        let closed_child = closed_child.clone();
        async move {
          *closed_child.lock().await = ctx.data_as::<String>().cloned();
          latch.count_down().await;
          Ok(())
        }
      }
    });
  let parent = system.register_actor("parent", parent, ActorOptions::new()).await?;

  let child = Actor::new().react("task", |ctx: Context| async move {
    let parent = ctx.self_ref().parent().await?;
    parent.tell("help", None, ctx.self_ref()).await?;
    ctx.self_ref().close().await;
    Ok(())
  });
  let child = system.spawn_actor(&parent, "child", child, ActorOptions::new()).await?;
  child.tell("task", None, &system.root()).await?;

  tokio::time::timeout(Duration::from_secs(1), latch.wait()).await?;
  assert_eq!(closed_child.lock().await.as_deref(), Some("child"));
  assert!(matches!(
    system.actor_of("child").await,
    Err(ActorError::NotRegistered(_))
  ));
  Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_many_senders_reach_one_actor() -> TestResult<()> {
  let system = ActorSystem::new().await?;
  let received = Arc::new(AtomicUsize::new(0));
  let wg = WaitGroup::with_count(40);

  let counter = Actor::new().react("inc", {
    let received = received.clone();
    let wg = wg.clone();
    move |_| {
      let received = received.clone();
      let wg = wg.clone();
      async move {
        received.fetch_add(1, Ordering::SeqCst);
        wg.done().await;
        Ok(())
      }
    }
  });
  let counter = system
    .register_actor("counter", counter, ActorOptions::new().with_buffer_size(2))
    .await?;

  let barrier = AsyncBarrier::new(4);
  let mut senders = Vec::new();
  for _ in 0..4 {
    let counter = counter.clone();
    let root = system.root();
    let barrier = barrier.clone();
    senders.push(tokio::spawn(async move {
      barrier.wait().await;
      for _ in 0..10 {
        counter.tell("inc", None, &root).await?;
      }
      Ok::<(), ActorError>(())
    }));
  }
  for sender in senders {
    sender.await??;
  }

  tokio::time::timeout(Duration::from_secs(2), wg.wait()).await?;
  assert_eq!(received.load(Ordering::SeqCst), 40);
  Ok(())
}

#[tokio::test]
async fn test_independent_systems_do_not_share_actors() -> TestResult<()> {
  let first = ActorSystem::new().await?;
  let second = ActorSystem::new().await?;

  first.register_actor("only-here", Actor::new(), ActorOptions::new()).await?;
  second.register_actor("only-here", Actor::new(), ActorOptions::new()).await?;

  first.shutdown().await?;
  assert!(first.actor_of("only-here").await.is_err());
  assert!(second.actor_of("only-here").await.is_ok());
  Ok(())
}
