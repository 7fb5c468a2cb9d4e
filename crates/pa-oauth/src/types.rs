//! Flow identifiers, statuses, and the pending-flow handle

use pa_types::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use tokio::sync::oneshot;
use uuid::Uuid;

/// Unique identifier for a popup authorization flow
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FlowId(Uuid);

impl FlowId {
    /// Create a new random flow id
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for FlowId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for FlowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Status of a popup authorization flow
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum FlowStatus {
    /// Still polling the popup for a same-origin redirect
    Pending,

    /// Redirect observed with a token fragment; popup closed
    Success {
        /// Fragment from the redirect URL, without the leading `#`
        fragment: String,
    },

    /// Popup reached the host origin without a fragment. Polling stopped,
    /// popup left open; `cancel_flow` is the way out.
    Stalled,

    /// Cancelled by the caller
    Cancelled,
}

/// Handle to an in-flight popup authorization flow
///
/// Returned by `PopupFlowManager::start_flow`. Either await [`wait`] for the
/// redirect fragment, or keep `flow_id` and poll the manager for status.
///
/// [`wait`]: PendingFlow::wait
#[derive(Debug)]
pub struct PendingFlow {
    /// Flow identifier for status polling and cancellation
    pub flow_id: FlowId,

    /// Authorization URL the popup was opened at
    pub auth_url: String,

    pub(crate) receiver: oneshot::Receiver<AppResult<String>>,
}

impl PendingFlow {
    /// Wait for the flow to settle with the redirect fragment
    ///
    /// Resolves at most once per flow; the sending side is consumed on first
    /// delivery. A flow whose manager side goes away before delivering
    /// resolves with [`AppError::Cancelled`]. A flow that never redirects
    /// never resolves: no timeout is imposed here, the host applies its own.
    pub async fn wait(self) -> AppResult<String> {
        self.receiver
            .await
            .unwrap_or_else(|_| Err(AppError::Cancelled))
    }
}
