use std::env;
use std::time::Duration;

use courier_actor_core_rs::actor::actor_system::ActorSystem;
use courier_actor_core_rs::actor::core::{Actor, ActorOptions};
use courier_actor_core_rs::actor::message::{Context, CHILD_CLOSED, HEARTBEAT_REPLY};
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

  let parent = Actor::new()
    .react("help", |ctx: Context| async move {
      ctx.self_ref().log_info(format!("{} asked for help", ctx.sender()));
      Ok(())
    })
    .react(CHILD_CLOSED, |ctx: Context| async move {
      let child = ctx.data_as::<String>().cloned().unwrap_or_default();
      ctx.self_ref().log_info(format!("child {} closed", child));
      Ok(())
    });
  let parent = system.register_actor("parent", parent, ActorOptions::new()).await?;

  let child = Actor::new()
    .react("work", |ctx: Context| async move {
      ctx.sender().tell("help", None, ctx.self_ref()).await?;
      ctx.self_ref().close().await;
      Ok(())
    })
    .react(HEARTBEAT_REPLY, |ctx: Context| async move {
      ctx.self_ref().log_info("parent is alive");
      Ok(())
    });
  let child = system
    .spawn_actor(
      &parent,
      "child",
      child,
      ActorOptions::new().with_heartbeat_interval(Duration::from_millis(100)),
    )
    .await?;

  sleep(Duration::from_millis(350)).await;
  child.tell("work", None, &parent).await?;
  sleep(Duration::from_millis(100)).await;

  system.shutdown().await
}
