use std::sync::Arc;

use tokio::sync::{mpsc, oneshot, RwLock};

use crate::browser::{BrowserHandles, BrowserLauncher};
use crate::config::ExecutorSettings;
use crate::error::{RangepilotError, Result};
use crate::filters::FilterSelection;
use crate::range::{RangeExecutor, RangeReport};

use super::{SessionShared, SessionStatus};

pub(crate) enum SessionCommand {
    ApplyFilters {
        selection: FilterSelection,
        reply: oneshot::Sender<Result<RangeReport>>,
    },
    Close {
        reply: oneshot::Sender<()>,
    },
}

/// Task owning one session's browser handles. Exactly one actor runs per
/// session, so requests against the same session serialize here instead of
/// relying on caller discipline.
pub(crate) struct SessionActor {
    id: String,
    url: String,
    shared: Arc<RwLock<SessionShared>>,
    launcher: Arc<BrowserLauncher>,
    executor: ExecutorSettings,
    commands: mpsc::Receiver<SessionCommand>,
}

impl SessionActor {
    pub(crate) fn new(
        id: String,
        url: String,
        shared: Arc<RwLock<SessionShared>>,
        launcher: Arc<BrowserLauncher>,
        executor: ExecutorSettings,
        commands: mpsc::Receiver<SessionCommand>,
    ) -> Self {
        Self {
            id,
            url,
            shared,
            launcher,
            executor,
            commands,
        }
    }

    /// Acquire the browser, flip the status snapshot, then serve commands
    /// until the session closes. Launch failure keeps the actor alive so a
    /// close can still drain the queue; there is no automatic retry.
    pub(crate) async fn run(mut self) {
        let mut handles = match self.launcher.launch(&self.url).await {
            Ok(handles) => {
                self.shared.write().await.status = SessionStatus::Active;
                tracing::info!(session_id = %self.id, "browser session is now active");
                Some(handles)
            }
            Err(e) => {
                tracing::error!(session_id = %self.id, error = %e, "browser launch failed");
                let mut shared = self.shared.write().await;
                shared.status = SessionStatus::Error;
                shared.error = Some(e.to_string());
                None
            }
        };

        while let Some(command) = self.commands.recv().await {
            match command {
                SessionCommand::ApplyFilters { selection, reply } => {
                    let result = match handles.as_ref() {
                        Some(handles) => Ok(RangeExecutor::new(&handles.page, &self.executor)
                            .run(&selection)
                            .await),
                        None => Err(RangepilotError::SessionNotActive(self.id.clone())),
                    };
                    let _ = reply.send(result);
                }
                SessionCommand::Close { reply } => {
                    if let Some(handles) = handles.take() {
                        release(&self.id, handles).await;
                    }
                    let _ = reply.send(());
                    return;
                }
            }
        }

        // Registry dropped the sender without an explicit close; still
        // release the browser.
        if let Some(handles) = handles.take() {
            release(&self.id, handles).await;
        }
    }
}

/// Release in reverse acquisition order - page, then browser, then the
/// event task - tolerating each step failing on its own.
async fn release(id: &str, handles: BrowserHandles) {
    let BrowserHandles {
        mut browser,
        page,
        event_task,
    } = handles;

    if let Err(e) = page.close().await {
        tracing::warn!(session_id = id, error = %e, "page close failed");
    }
    if let Err(e) = browser.close().await {
        tracing::warn!(session_id = id, error = %e, "browser close failed");
    }
    event_task.abort();

    tracing::debug!(session_id = id, "browser handles released");
}
