use std::env;
use std::time::Duration;

use courier_actor_core_rs::actor::actor_system::ActorSystem;
use courier_actor_core_rs::actor::core::{Actor, ActorOptions};
use courier_actor_core_rs::actor::message::{Context, Payload};
use courier_actor_core_rs::actor::ActorError;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), ActorError> {
  let _ = env::set_var("RUST_LOG", "actor_request_response=info,courier_actor_core_rs=info");
  let _ = tracing_subscriber::fmt()
    .with_env_filter(EnvFilter::from_default_env())
    .try_init();

  let system = ActorSystem::new().await?;
  let echoer = Actor::new().react("ping", |ctx: Context| async move {
    let text = ctx.data_as::<String>().cloned().unwrap_or_default();
    ctx.self_ref().log_info(format!("received ping: {}", text));
    ctx
      .sender()
      .tell("pong", Some(Payload::new(text.to_uppercase())), ctx.self_ref())
      .await
  });
  let echoer = system.register_actor("echoer", echoer, ActorOptions::new()).await?;

  for word in ["hello", "world"] {
    let reply = echoer
      .ask("ping", Some(Payload::new(word.to_string())), Duration::from_secs(1))
      .await?;
    tracing::info!("reply = {:?}", reply);
  }

  system.shutdown().await
}
