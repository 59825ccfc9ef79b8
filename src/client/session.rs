use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::{Mutex, MutexGuard, watch};

/// Token pair as returned by login, register and refresh.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub access_token: String,
    pub refresh_token: String,
    pub expires_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEvent {
    Anonymous,
    LoggedIn,
    Refreshed,
    /// The session is gone; the UI should send the user to the login page.
    LoggedOut,
}

/// The one place the client keeps its tokens. Holding the lock across a
/// refresh is what makes concurrent 401s collapse into a single refresh.
pub struct SessionStore {
    session: Mutex<Option<Session>>,
    events: watch::Sender<SessionEvent>,
}

impl SessionStore {
    pub fn new() -> Self {
        let (events, _) = watch::channel(SessionEvent::Anonymous);
        Self {
            session: Mutex::new(None),
            events,
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<SessionEvent> {
        self.events.subscribe()
    }

    pub async fn current(&self) -> Option<Session> {
        self.session.lock().await.clone()
    }

    pub async fn access_token(&self) -> Option<String> {
        self.session
            .lock()
            .await
            .as_ref()
            .map(|session| session.access_token.clone())
    }

    pub async fn replace(&self, session: Session, event: SessionEvent) {
        *self.session.lock().await = Some(session);
        self.publish(event);
    }

    pub async fn take(&self, event: SessionEvent) -> Option<Session> {
        let taken = self.session.lock().await.take();
        self.publish(event);
        taken
    }

    pub(super) async fn lock(&self) -> MutexGuard<'_, Option<Session>> {
        self.session.lock().await
    }

    pub(super) fn publish(&self, event: SessionEvent) {
        self.events.send_replace(event);
    }
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new()
    }
}
