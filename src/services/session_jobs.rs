use photo_tone::CancelToken;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;

type JobMap = HashMap<String, (u64, CancelToken)>;

/// Registration of one in-flight job.
///
/// Dropping the guard cancels the job and forgets it, whether the request
/// completed or its future was dropped (client disconnect).
pub struct JobGuard {
    id: u64,
    session: String,
    token: CancelToken,
    jobs: Arc<RwLock<JobMap>>,
}

impl JobGuard {
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Cancelled when a newer job starts for the same session
    pub fn token(&self) -> &CancelToken {
        &self.token
    }
}

impl Drop for JobGuard {
    fn drop(&mut self) {
        self.token.cancel();

        if let Ok(mut jobs) = self.jobs.try_write() {
            remove_if_current(&mut jobs, &self.session, self.id);
            return;
        }

        // Lock is busy; finish the removal on the runtime
        if let Ok(handle) = tokio::runtime::Handle::try_current() {
            let jobs = self.jobs.clone();
            let session = std::mem::take(&mut self.session);
            let id = self.id;
            handle.spawn(async move {
                remove_if_current(&mut *jobs.write().await, &session, id);
            });
        } else {
            tracing::warn!(session = %self.session, job = self.id, "No runtime to release job");
        }
    }
}

fn remove_if_current(jobs: &mut JobMap, session: &str, id: u64) {
    if jobs.get(session).is_some_and(|(current, _)| *current == id) {
        jobs.remove(session);
    }
}

/// Tracks the latest job per client session.
///
/// Starting a job cancels whatever the same session had in flight, so a
/// client dragging a slider only ever waits for its most recent settings.
pub struct SessionJobs {
    jobs: Arc<RwLock<JobMap>>,
    next_id: AtomicU64,
}

impl SessionJobs {
    pub fn new() -> Self {
        Self {
            jobs: Arc::new(RwLock::new(HashMap::new())),
            next_id: AtomicU64::new(1),
        }
    }

    /// Register a new job for `session`, cancelling the previous one.
    pub async fn begin(&self, session: &str) -> JobGuard {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let token = CancelToken::new();

        let mut jobs = self.jobs.write().await;
        if let Some((previous, previous_token)) =
            jobs.insert(session.to_string(), (id, token.clone()))
        {
            previous_token.cancel();
            tracing::debug!(
                session = %session,
                superseded = previous,
                job = id,
                "Cancelled superseded job"
            );
        }

        JobGuard {
            id,
            session: session.to_string(),
            token,
            jobs: self.jobs.clone(),
        }
    }

    /// Number of sessions with a job in flight.
    pub async fn active(&self) -> usize {
        self.jobs.read().await.len()
    }
}

impl Default for SessionJobs {
    fn default() -> Self {
        Self::new()
    }
}
