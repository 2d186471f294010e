use std::env;
use std::time::Duration;

use courier_actor_core_rs::actor::actor_system::ActorSystem;
use courier_actor_core_rs::actor::core::{Actor, ActorOptions, Reaction};
use courier_actor_core_rs::actor::message::Context;
use courier_actor_core_rs::actor::ActorError;
use tokio::time::sleep;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), ActorError> {
  let _ = env::set_var("RUST_LOG", "courier_actor_core_rs=info");
  let _ = tracing_subscriber::fmt()
    .with_env_filter(EnvFilter::from_default_env())
    .try_init();

  let system = ActorSystem::new().await?;

  let angry = Reaction::new(|ctx: Context| async move {
    ctx.self_ref().log_info("I am angry, calming down");
    ctx.self_ref().unbecome_reaction("hello").await
  });
  let moody = Actor::new().react("hello", move |ctx: Context| {
    let angry = angry.clone();
    async move {
      ctx.self_ref().log_info("I am happy, getting angry");
      ctx.self_ref().become_reaction("hello", angry).await
    }
  });
  let moody = system.register_actor("moody", moody, ActorOptions::new()).await?;

  for _ in 0..4 {
    moody.tell("hello", None, &system.root()).await?;
  }
  sleep(Duration::from_millis(100)).await;

  system.shutdown().await
}
