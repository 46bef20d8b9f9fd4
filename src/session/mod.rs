//! Session registry: one entry per caller-visible session, each owning an
//! exclusively-held browser through its actor task.
//!
//! `create` registers a `launching` entry and returns before the browser
//! exists; callers poll status until the snapshot flips to `active` or
//! `error`. Sessions die only by explicit close.

mod actor;

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::{mpsc, oneshot, RwLock};
use tokio::task::JoinHandle;
use uuid::Uuid;

use crate::browser::BrowserLauncher;
use crate::config::{Config, ExecutorSettings};
use crate::error::{RangepilotError, Result};
use crate::filters::FilterSelection;
use crate::range::RangeReport;
use actor::{SessionActor, SessionCommand};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionStatus {
    Launching,
    Active,
    Error,
}

impl fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SessionStatus::Launching => "launching",
            SessionStatus::Active => "active",
            SessionStatus::Error => "error",
        };
        f.write_str(s)
    }
}

/// Caller-visible snapshot of one session
#[derive(Debug, Clone, Serialize)]
pub struct SessionInfo {
    pub session_id: String,
    pub status: SessionStatus,
    pub url: String,
    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Status half shared between the actor (writer) and status queries
/// (readers); queries never enter the actor's command queue.
#[derive(Debug)]
pub(crate) struct SessionShared {
    pub(crate) status: SessionStatus,
    pub(crate) error: Option<String>,
}

struct SessionHandle {
    url: String,
    created_at: DateTime<Utc>,
    shared: Arc<RwLock<SessionShared>>,
    commands: mpsc::Sender<SessionCommand>,
    /// Handle to the actor task; kept so an abandoned actor can be aborted
    task: JoinHandle<()>,
}

pub struct SessionRegistry {
    sessions: RwLock<HashMap<String, SessionHandle>>,
    launcher: Arc<BrowserLauncher>,
    target_url: String,
    executor: ExecutorSettings,
}

impl SessionRegistry {
    pub fn new(config: &Config) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            launcher: Arc::new(BrowserLauncher::new(config.browser.clone())),
            target_url: config.target.url.clone(),
            executor: config.executor.clone(),
        }
    }

    /// Register a `launching` session and start browser acquisition in the
    /// background. Returns before the browser exists.
    pub async fn create(&self) -> SessionInfo {
        let session_id = Uuid::new_v4().to_string();
        let created_at = Utc::now();
        let shared = Arc::new(RwLock::new(SessionShared {
            status: SessionStatus::Launching,
            error: None,
        }));
        let (commands, rx) = mpsc::channel(8);

        let actor = SessionActor::new(
            session_id.clone(),
            self.target_url.clone(),
            Arc::clone(&shared),
            Arc::clone(&self.launcher),
            self.executor.clone(),
            rx,
        );
        let task = tokio::spawn(actor.run());

        let handle = SessionHandle {
            url: self.target_url.clone(),
            created_at,
            shared,
            commands,
            task,
        };

        let info = SessionInfo {
            session_id: session_id.clone(),
            status: SessionStatus::Launching,
            url: handle.url.clone(),
            created_at,
            error: None,
        };

        self.sessions.write().await.insert(session_id, handle);
        info
    }

    pub async fn get(&self, id: &str) -> Option<SessionInfo> {
        let sessions = self.sessions.read().await;
        let handle = sessions.get(id)?;
        Some(snapshot(id, handle).await)
    }

    /// Snapshot of every live session, oldest first
    pub async fn list(&self) -> Vec<SessionInfo> {
        let sessions = self.sessions.read().await;
        let mut out = Vec::with_capacity(sessions.len());
        for (id, handle) in sessions.iter() {
            out.push(snapshot(id, handle).await);
        }
        drop(sessions);
        out.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        out
    }

    /// Run the filter sequence on the session's page. The command goes
    /// through the session's actor, so overlapping calls serialize.
    pub async fn apply_filters(&self, id: &str, selection: FilterSelection) -> Result<RangeReport> {
        let (commands, shared) = {
            let sessions = self.sessions.read().await;
            let handle = sessions
                .get(id)
                .ok_or_else(|| RangepilotError::SessionNotFound(id.to_string()))?;
            (handle.commands.clone(), Arc::clone(&handle.shared))
        };

        if shared.read().await.status != SessionStatus::Active {
            return Err(RangepilotError::SessionNotActive(id.to_string()));
        }

        let (reply, rx) = oneshot::channel();
        commands
            .send(SessionCommand::ApplyFilters { selection, reply })
            .await
            .map_err(|_| RangepilotError::SessionClosing(id.to_string()))?;

        rx.await
            .map_err(|_| RangepilotError::SessionClosing(id.to_string()))?
    }

    /// Remove the session and tear down whatever handles exist. The entry
    /// disappears immediately, so a second close reports not found; a close
    /// issued mid-launch queues behind the launch.
    pub async fn close(&self, id: &str) -> Result<()> {
        let handle = self
            .sessions
            .write()
            .await
            .remove(id)
            .ok_or_else(|| RangepilotError::SessionNotFound(id.to_string()))?;

        let (reply, rx) = oneshot::channel();
        if handle
            .commands
            .send(SessionCommand::Close { reply })
            .await
            .is_err()
        {
            // Actor already gone; nothing left to release
            handle.task.abort();
            return Ok(());
        }
        let _ = rx.await;

        tracing::info!(session_id = id, "closed browser session");
        Ok(())
    }
}

async fn snapshot(id: &str, handle: &SessionHandle) -> SessionInfo {
    let shared = handle.shared.read().await;
    SessionInfo {
        session_id: id.to_string(),
        status: shared.status,
        url: handle.url.clone(),
        created_at: handle.created_at,
        error: shared.error.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    /// Registry whose launches always fail fast: the executable does not
    /// exist, so sessions go `launching` -> `error` without a browser.
    fn test_registry() -> SessionRegistry {
        let mut config = Config::default();
        config.browser.headless = true;
        config.browser.executable = Some("/nonexistent/rangepilot-test-browser".to_string());
        SessionRegistry::new(&config)
    }

    async fn wait_for_error(registry: &SessionRegistry, id: &str) -> SessionInfo {
        for _ in 0..100 {
            let info = registry.get(id).await.expect("session should exist");
            if info.status == SessionStatus::Error {
                return info;
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
        panic!("session never reached error status");
    }

    #[tokio::test]
    async fn create_reports_launching_immediately() {
        let registry = test_registry();
        let info = registry.create().await;

        assert_eq!(info.status, SessionStatus::Launching);
        assert!(Uuid::parse_str(&info.session_id).is_ok());
        assert!(info.url.contains("range-builder"));
        assert!(info.error.is_none());
    }

    #[tokio::test]
    async fn ids_are_unique_across_sessions() {
        let registry = test_registry();
        let a = registry.create().await;
        let b = registry.create().await;

        assert_ne!(a.session_id, b.session_id);
        assert_eq!(registry.list().await.len(), 2);
    }

    #[tokio::test]
    async fn get_unknown_session_is_none() {
        let registry = test_registry();
        assert!(registry.get("missing").await.is_none());
    }

    #[tokio::test]
    async fn launch_failure_flips_status_to_error_with_message() {
        let registry = test_registry();
        let created = registry.create().await;

        let info = wait_for_error(&registry, &created.session_id).await;
        assert!(info.error.is_some());
    }

    #[tokio::test]
    async fn apply_filters_rejects_unknown_session() {
        let registry = test_registry();
        let err = registry
            .apply_filters("missing", FilterSelection::default())
            .await
            .unwrap_err();

        assert!(matches!(err, RangepilotError::SessionNotFound(_)));
    }

    #[tokio::test]
    async fn apply_filters_rejects_sessions_that_are_not_active() {
        let registry = test_registry();
        let created = registry.create().await;

        let err = registry
            .apply_filters(&created.session_id, FilterSelection::default())
            .await
            .unwrap_err();

        assert!(matches!(err, RangepilotError::SessionNotActive(_)));
    }

    #[tokio::test]
    async fn close_removes_the_entry_exactly_once() {
        let registry = test_registry();
        let created = registry.create().await;

        registry.close(&created.session_id).await.unwrap();
        assert!(registry.get(&created.session_id).await.is_none());

        let err = registry.close(&created.session_id).await.unwrap_err();
        assert!(matches!(err, RangepilotError::SessionNotFound(_)));
    }

    #[tokio::test]
    async fn close_works_while_the_session_is_still_launching() {
        let registry = test_registry();
        let created = registry.create().await;

        // No waiting: the close queues behind the (failing) launch
        registry.close(&created.session_id).await.unwrap();
        assert!(registry.list().await.is_empty());
    }
}
