use crate::delegate::ClickstreamDelegate;
use crate::registry::SessionRegistry;
use crate::session::TrackingSession;
use crate::state_cell::AtomicStateCell;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::{Arc, Weak};

#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ConnectionState {
    Connecting,
    Connected,
    Closing,
    #[default]
    Closed,
    Failed,
}

impl ConnectionState {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Connecting => "connecting",
            Self::Connected => "connected",
            Self::Closing => "closing",
            Self::Closed => "closed",
            Self::Failed => "failed",
        }
    }
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Connection-state register shared with the transport.
///
/// Any legal transition is accepted; the transport owns the state machine.
/// Every committed state is relayed to the delegate of whatever session is
/// live at delivery time, in commit order. The `Closed` committed while a
/// session is torn down goes to that session's delegate instead.
pub struct ConnectionStateController {
    cell: AtomicStateCell<Transition>,
}

#[derive(Clone)]
struct Transition {
    state: ConnectionState,
    recipient: Recipient,
}

#[derive(Clone)]
enum Recipient {
    LiveSession,
    Released(Option<Weak<dyn ClickstreamDelegate>>),
}

impl ConnectionStateController {
    pub(crate) fn new(registry: Weak<SessionRegistry<TrackingSession>>) -> Self {
        let initial = Transition { state: ConnectionState::Closed, recipient: Recipient::LiveSession };
        let cell = AtomicStateCell::new(initial, move |transition: &Transition| {
            relay(&registry, transition);
        });
        Self { cell }
    }

    /// Commits `state` and notifies the live session's delegate.
    pub fn set_state(&self, state: ConnectionState) {
        log::debug!("connection: state -> {state}");
        self.cell.write(Transition { state, recipient: Recipient::LiveSession });
    }

    pub fn current_state(&self) -> ConnectionState {
        self.cell.read().state
    }

    pub fn is_connected(&self) -> bool {
        self.current_state() == ConnectionState::Connected
    }

    /// Commits `Closed` on behalf of a session being released, without
    /// delivering it. The notification is addressed to `session`'s delegate
    /// even if another session is live by the time it is delivered; call
    /// [`ConnectionStateController::flush`] once no core lock is held.
    pub(crate) fn close_for_released(&self, session: &TrackingSession) {
        if self.current_state() == ConnectionState::Closed {
            return;
        }
        let delegate = session
            .relays_connection_status()
            .then(|| session.delegate())
            .flatten()
            .map(|delegate| Arc::downgrade(&delegate));
        log::debug!("connection: state -> closed (session released)");
        self.cell.commit(Transition {
            state: ConnectionState::Closed,
            recipient: Recipient::Released(delegate),
        });
    }

    pub(crate) fn flush(&self) {
        self.cell.flush();
    }
}

impl fmt::Debug for ConnectionStateController {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionStateController").field("state", &self.current_state()).finish()
    }
}

fn relay(registry: &Weak<SessionRegistry<TrackingSession>>, transition: &Transition) {
    let state = transition.state;
    let delegate = match &transition.recipient {
        Recipient::Released(delegate) => delegate.as_ref().and_then(Weak::upgrade),
        Recipient::LiveSession => {
            let Some(session) = registry.upgrade().and_then(|registry| registry.get()) else {
                return;
            };
            if !session.relays_connection_status() {
                return;
            }
            session.delegate()
        }
    };
    match delegate {
        Some(delegate) => delegate.on_connection_state_changed(state),
        None => log::trace!("connection: no delegate for state {state}"),
    }
}
