use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{Duration, Instant};

use interviewloop_logging::{LogEvent, Logger};
use tokio::task::JoinHandle;
use tracing::{debug, info};
use uuid::Uuid;

use crate::transcript::Transcript;
use crate::{Coordinator, InterviewError};

/// Exclusive handle to one session's coordinator
pub type SessionHandle = Arc<tokio::sync::Mutex<Coordinator>>;

struct Session {
    coordinator: SessionHandle,
    last_active: Instant,
}

/// Live interview sessions keyed by id.
///
/// Each coordinator sits behind its own async mutex, so a session handles one
/// turn at a time while distinct sessions proceed independently.
pub struct SessionRegistry {
    sessions: Mutex<HashMap<Uuid, Session>>,
    idle_timeout: Duration,
    logger: Option<Arc<Logger>>,
}

impl SessionRegistry {
    pub fn new(idle_timeout: Duration) -> Self {
        Self {
            sessions: Mutex::new(HashMap::new()),
            idle_timeout,
            logger: None,
        }
    }

    pub fn with_logger(mut self, logger: Arc<Logger>) -> Self {
        self.logger = Some(logger);
        self
    }

    pub fn idle_timeout(&self) -> Duration {
        self.idle_timeout
    }

    /// Register a coordinator and return its session id
    pub fn create(&self, coordinator: Coordinator) -> Uuid {
        let id = Uuid::new_v4();
        self.lock().insert(
            id,
            Session {
                coordinator: Arc::new(tokio::sync::Mutex::new(coordinator)),
                last_active: Instant::now(),
            },
        );
        info!(session = %id, "Session created");
        id
    }

    /// Fetch a session and mark it active
    pub fn get(&self, id: Uuid) -> Result<SessionHandle, InterviewError> {
        let mut sessions = self.lock();
        let session = sessions
            .get_mut(&id)
            .ok_or(InterviewError::UnknownSession(id))?;
        session.last_active = Instant::now();
        Ok(session.coordinator.clone())
    }

    pub fn contains(&self, id: Uuid) -> bool {
        self.lock().contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Remove a session and run its cleanup. Returns its notes.
    pub async fn remove(&self, id: Uuid) -> Result<Transcript, InterviewError> {
        let session = self
            .lock()
            .remove(&id)
            .ok_or(InterviewError::UnknownSession(id))?;
        Ok(self.close(id, session, "removed").await)
    }

    /// Clean up every session idle for at least the idle timeout
    pub async fn sweep_idle(&self) -> Vec<Uuid> {
        let expired: Vec<(Uuid, Session)> = {
            let mut sessions = self.lock();
            let ids: Vec<Uuid> = sessions
                .iter()
                .filter(|(_, s)| s.last_active.elapsed() >= self.idle_timeout)
                .map(|(id, _)| *id)
                .collect();
            ids.into_iter()
                .filter_map(|id| sessions.remove(&id).map(|s| (id, s)))
                .collect()
        };

        let mut swept = Vec::with_capacity(expired.len());
        for (id, session) in expired {
            self.close(id, session, "idle").await;
            swept.push(id);
        }
        if !swept.is_empty() {
            info!(count = swept.len(), "Swept idle sessions");
        }
        swept
    }

    /// Sweep idle sessions every `period` until the task is aborted
    pub fn spawn_sweeper(self: Arc<Self>, period: Duration) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            loop {
                ticker.tick().await;
                self.sweep_idle().await;
            }
        })
    }

    async fn close(&self, id: Uuid, session: Session, reason: &str) -> Transcript {
        debug!(session = %id, reason, "Closing session");
        let transcript = session.coordinator.lock().await.cleanup().await;
        if let Some(ref logger) = self.logger {
            logger.log(&LogEvent::SessionClosed {
                session_id: id.to_string(),
                reason: reason.to_string(),
            });
        }
        transcript
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<Uuid, Session>> {
        self.sessions
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
