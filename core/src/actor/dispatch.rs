mod dispatcher;

pub(crate) use self::dispatcher::*;
