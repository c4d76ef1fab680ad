//! Request-scoped state threaded through service and panel calls.

use crate::model::actor::Actor;
use crate::notice::Notices;
use crate::session::SessionStore;
use crate::throttle::Clock;

/// Everything one request needs besides the persisted records.
pub struct RequestContext<'a> {
    pub actor: Actor,
    pub session: &'a mut dyn SessionStore,
    pub clock: &'a dyn Clock,
    pub notices: Notices,
}

impl<'a> RequestContext<'a> {
    pub fn new(actor: Actor, session: &'a mut dyn SessionStore, clock: &'a dyn Clock) -> Self {
        Self {
            actor,
            session,
            clock,
            notices: Notices::new(),
        }
    }

    pub fn now(&self) -> i64 {
        self.clock.now_secs()
    }
}
