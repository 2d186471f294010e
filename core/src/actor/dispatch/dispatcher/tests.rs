use std::env;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::{sleep, Instant};
use tracing_subscriber::EnvFilter;

use crate::actor::actor_system::ActorSystem;
use crate::actor::core::{Actor, ActorOptions, ActorState};
use crate::actor::dispatch::{dispatch, Route};
use crate::actor::message::{Context, Envelope, Payload};
use crate::actor::{ActorError, TransportError};

fn init_tracing() {
  let _ = env::set_var("RUST_LOG", "debug");
  let _ = tracing_subscriber::fmt()
    .with_env_filter(EnvFilter::from_default_env())
    .try_init();
}

#[tokio::test]
async fn test_messages_from_one_sender_are_handled_in_order() {
  init_tracing();
  let system = ActorSystem::new().await.unwrap();
  let (tx, mut rx) = mpsc::unbounded_channel::<u32>();
  let actor = Actor::new().react("n", move |ctx: Context| {
    let tx = tx.clone();
    async move {
      let n = ctx
        .data_as::<u32>()
        .copied()
        .ok_or_else(|| ActorError::reaction_failed("missing number"))?;
      tx.send(n).map_err(|e| ActorError::reaction_failed(e.to_string()))
    }
  });
  let counter = system
    .register_actor("counter", actor, ActorOptions::new().with_buffer_size(8))
    .await
    .unwrap();

  for n in 0..100u32 {
    counter.tell("n", Some(Payload::new(n)), &system.root()).await.unwrap();
  }

  let mut received = Vec::new();
  for _ in 0..100 {
    received.push(rx.recv().await.unwrap());
  }
  assert_eq!(received, (0..100).collect::<Vec<_>>());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_reactions_never_overlap() {
  let system = ActorSystem::new().await.unwrap();
  let in_flight = Arc::new(AtomicBool::new(false));
  let overlaps = Arc::new(AtomicUsize::new(0));
  let handled = Arc::new(AtomicUsize::new(0));

  let actor = Actor::new().react("work", {
    let in_flight = in_flight.clone();
    let overlaps = overlaps.clone();
    let handled = handled.clone();
    move |_| {
      let in_flight = in_flight.clone();
      let overlaps = overlaps.clone();
      let handled = handled.clone();
      async move {
        if in_flight.swap(true, Ordering::SeqCst) {
          overlaps.fetch_add(1, Ordering::SeqCst);
        }
        tokio::task::yield_now().await;
        in_flight.store(false, Ordering::SeqCst);
        handled.fetch_add(1, Ordering::SeqCst);
        Ok(())
      }
    }
  });
  let worker = system.register_actor("worker", actor, ActorOptions::new()).await.unwrap();

  let mut senders = Vec::new();
  for _ in 0..4 {
    let worker = worker.clone();
    let root = system.root();
    senders.push(tokio::spawn(async move {
      for _ in 0..25 {
        worker.tell("work", None, &root).await.unwrap();
      }
    }));
  }
  for sender in senders {
    sender.await.unwrap();
  }

  for _ in 0..200 {
    if handled.load(Ordering::SeqCst) == 100 {
      break;
    }
    sleep(Duration::from_millis(10)).await;
  }
  assert_eq!(handled.load(Ordering::SeqCst), 100);
  assert_eq!(overlaps.load(Ordering::SeqCst), 0);
}

#[tokio::test(start_paused = true)]
async fn test_full_mailbox_blocks_the_sender() {
  let system = ActorSystem::new().await.unwrap();
  let actor = Actor::new().react("work", |_| async {
    sleep(Duration::from_millis(100)).await;
    Ok(())
  });
  let worker = system
    .register_actor("slow", actor, ActorOptions::new().with_buffer_size(1))
    .await
    .unwrap();

  let started = Instant::now();
  for _ in 0..3 {
    worker.tell("work", None, &system.root()).await.unwrap();
  }
  assert!(started.elapsed() >= Duration::from_millis(100));
}

#[tokio::test]
async fn test_panicking_reaction_does_not_stop_the_actor() {
  init_tracing();
  let system = ActorSystem::new().await.unwrap();
  let (tx, mut rx) = mpsc::unbounded_channel::<String>();
  let actor = Actor::new().react_any(move |ctx: Context| {
    let tx = tx.clone();
    async move {
      if ctx.message_type() == "boom" {
        panic!("reaction exploded");
      }
      tx.send(ctx.message_type().to_string())
        .map_err(|e| ActorError::reaction_failed(e.to_string()))
    }
  });
  let fragile = system.register_actor("fragile", actor, ActorOptions::new()).await.unwrap();

  fragile.tell("boom", None, &system.root()).await.unwrap();
  fragile.tell("still-alive", None, &system.root()).await.unwrap();

  assert_eq!(rx.recv().await.unwrap(), "still-alive");
  assert_eq!(system.actor_state("fragile").await.unwrap(), ActorState::Active);
}

#[tokio::test]
async fn test_unhandled_message_is_dropped() {
  let system = ActorSystem::new().await.unwrap();
  let (tx, mut rx) = mpsc::unbounded_channel::<()>();
  let actor = Actor::new().react("known", move |_| {
    let tx = tx.clone();
    async move { tx.send(()).map_err(|e| ActorError::reaction_failed(e.to_string())) }
  });
  let picky = system.register_actor("picky", actor, ActorOptions::new()).await.unwrap();

  picky.tell("unknown", None, &system.root()).await.unwrap();
  picky.tell("known", None, &system.root()).await.unwrap();

  rx.recv().await.unwrap();
  assert!(rx.try_recv().is_err());
}

#[tokio::test]
async fn test_closed_actor_is_no_longer_reachable() {
  let system = ActorSystem::new().await.unwrap();
  let worker = system.register_actor("gone", Actor::new(), ActorOptions::new()).await.unwrap();

  worker.close().await;

  assert_eq!(
    worker.tell("work", None, &system.root()).await,
    Err(ActorError::NotRegistered("gone".to_string()))
  );
}

#[tokio::test]
async fn test_dispatch_to_dropped_mailbox_fails() {
  let system = ActorSystem::new().await.unwrap();
  let (tx, rx) = mpsc::channel(1);
  drop(rx);
  let route = Route::new("ghost", ActorOptions::new(), Some(tx), None);
  let envelope = Envelope::new("any", None, system.root(), system.root());

  assert_eq!(
    dispatch(&route, envelope).await,
    Err(ActorError::MailboxClosed("ghost".to_string()))
  );
}

#[tokio::test]
async fn test_dispatch_to_remote_without_connection_fails() {
  let system = ActorSystem::new().await.unwrap();
  let route = Route::new("far", ActorOptions::new().with_remote(true), None, None);
  let envelope = Envelope::new("any", None, system.root(), system.root());

  assert_eq!(route.name(), "far");
  assert_eq!(
    dispatch(&route, envelope).await,
    Err(ActorError::Transport(TransportError::NotConnected("far".to_string())))
  );
}
