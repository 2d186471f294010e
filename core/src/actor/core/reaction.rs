use std::fmt::{Debug, Formatter};
use std::future::Future;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use futures::future::BoxFuture;

use crate::actor::message::Context;
use crate::actor::ActorError;

/// Handler bound to a message type.
#[derive(Clone)]
pub struct Reaction(Arc<dyn Fn(Context) -> BoxFuture<'static, Result<(), ActorError>> + Send + Sync + 'static>);

impl Debug for Reaction {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    write!(f, "Reaction")
  }
}

impl PartialEq for Reaction {
  fn eq(&self, other: &Self) -> bool {
    Arc::ptr_eq(&self.0, &other.0)
  }
}

impl Eq for Reaction {}

impl Hash for Reaction {
  fn hash<H: Hasher>(&self, state: &mut H) {
    (self.0.as_ref() as *const dyn Fn(Context) -> BoxFuture<'static, Result<(), ActorError>>).hash(state);
  }
}

impl Reaction {
  pub fn new<F, Fut>(f: F) -> Self
  where
    F: Fn(Context) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<(), ActorError>> + Send + 'static, {
    Reaction(Arc::new(move |ctx| Box::pin(f(ctx))))
  }

  pub async fn run(&self, ctx: Context) -> Result<(), ActorError> {
    (self.0)(ctx).await
  }
}

static_assertions::assert_impl_all!(Reaction: Send, Sync);
