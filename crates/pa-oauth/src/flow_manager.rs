//! Popup flow manager - orchestrates popup-based implicit authorization flows

use crate::config::BridgeConfig;
use crate::fragment::extract_fragment;
use crate::popup::{PopupController, PopupWindow};
use crate::scheduler::Scheduler;
use crate::types::{FlowId, FlowStatus, PendingFlow};
use chrono::{DateTime, Utc};
use pa_types::{AppError, AppResult};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::oneshot;
use tracing::{debug, info, trace, warn};

/// State of one in-flight flow
struct FlowEntry {
    auth_url: String,
    started_at: DateTime<Utc>,
    status: FlowStatus,
    /// Popup handle; held until success or cancellation
    popup: Option<Box<dyn PopupWindow>>,
    /// One-shot result channel; consumed on first delivery
    sender: Option<oneshot::Sender<AppResult<String>>>,
}

/// Popup flow manager
///
/// Opens a popup at an authorization URL and polls its location on a fixed
/// interval until the provider redirects back to the host origin with a
/// token fragment. Manages multiple concurrent flows; each flow owns its
/// own popup and its own tick chain, and two flows for the same URL open
/// two popups.
pub struct PopupFlowManager {
    /// Active flows
    flows: Arc<RwLock<HashMap<FlowId, FlowEntry>>>,

    /// Windowing capability
    popups: Arc<dyn PopupController>,

    /// Timer capability
    scheduler: Arc<dyn Scheduler>,

    /// Interval between location checks
    poll_interval: Duration,
}

impl PopupFlowManager {
    /// Create a manager over the given windowing and timer capabilities
    pub fn new(
        popups: Arc<dyn PopupController>,
        scheduler: Arc<dyn Scheduler>,
        config: BridgeConfig,
    ) -> Self {
        Self {
            flows: Arc::new(RwLock::new(HashMap::new())),
            popups,
            scheduler,
            poll_interval: config.poll_interval(),
        }
    }

    /// Start a popup authorization flow
    ///
    /// Opens a popup at `auth_url` and schedules the polling loop. The URL
    /// is passed through untouched; building a correct one is the caller's
    /// job (see `build_authorization_url`). The first location check happens
    /// one poll interval after the popup opens.
    ///
    /// # Errors
    /// Fails with [`AppError::PopupBlocked`] when the browser refuses to
    /// create the window. No flow is registered and no polling starts.
    pub fn start_flow(&self, auth_url: &str) -> AppResult<PendingFlow> {
        let popup = self.popups.open(auth_url).ok_or_else(|| {
            AppError::PopupBlocked(format!("Browser refused popup for {}", auth_url))
        })?;

        let flow_id = FlowId::new();
        info!("Starting popup flow {} for {}", flow_id, auth_url);

        let (sender, receiver) = oneshot::channel();
        let entry = FlowEntry {
            auth_url: auth_url.to_string(),
            started_at: Utc::now(),
            status: FlowStatus::Pending,
            popup: Some(popup),
            sender: Some(sender),
        };
        self.flows.write().insert(flow_id, entry);

        Self::schedule_tick(
            Arc::clone(&self.flows),
            Arc::clone(&self.scheduler),
            self.poll_interval,
            flow_id,
        );

        Ok(PendingFlow {
            flow_id,
            auth_url: auth_url.to_string(),
            receiver,
        })
    }

    fn schedule_tick(
        flows: Arc<RwLock<HashMap<FlowId, FlowEntry>>>,
        scheduler: Arc<dyn Scheduler>,
        interval: Duration,
        flow_id: FlowId,
    ) {
        let tick_scheduler = Arc::clone(&scheduler);
        scheduler.schedule_after(
            interval,
            Box::new(move || Self::poll_tick(flows, tick_scheduler, interval, flow_id)),
        );
    }

    /// One polling tick: read the popup location, then settle or reschedule
    fn poll_tick(
        flows: Arc<RwLock<HashMap<FlowId, FlowEntry>>>,
        scheduler: Arc<dyn Scheduler>,
        interval: Duration,
        flow_id: FlowId,
    ) {
        let mut guard = flows.write();
        let Some(flow) = guard.get_mut(&flow_id) else {
            debug!("Flow {} gone, stopping poll loop", flow_id);
            return;
        };

        // Cancellation check before touching the popup. Holding the lock
        // through the reschedule below keeps this atomic with cancel_flow.
        if !matches!(flow.status, FlowStatus::Pending) {
            debug!("Flow {} no longer pending, stopping poll loop", flow_id);
            return;
        }

        let read = match flow.popup.as_ref() {
            Some(popup) => popup.read_location(),
            None => return,
        };

        match read {
            Err(_) => {
                // Still on the provider's domain; check again next tick.
                trace!("Flow {} location read denied, rescheduling", flow_id);
                Self::schedule_tick(Arc::clone(&flows), scheduler, interval, flow_id);
            }
            Ok(location) => {
                let fragment = extract_fragment(&location);
                if fragment.is_empty() {
                    // Same origin but no token material. Polling stops and
                    // the popup stays open; cancel_flow is the way out.
                    warn!(
                        "Flow {} reached host origin without a fragment, stalling",
                        flow_id
                    );
                    flow.status = FlowStatus::Stalled;
                    return;
                }

                info!("Flow {} resolved with redirect fragment", flow_id);
                flow.status = FlowStatus::Success {
                    fragment: fragment.to_string(),
                };
                if let Some(popup) = flow.popup.take() {
                    popup.close();
                }
                if let Some(sender) = flow.sender.take() {
                    // Receiver may already be dropped; the status still
                    // records the outcome for poll_status.
                    let _ = sender.send(Ok(fragment.to_string()));
                }
            }
        }
    }

    /// Poll flow status
    ///
    /// # Arguments
    /// * `flow_id` - Flow identifier from start_flow()
    pub fn poll_status(&self, flow_id: FlowId) -> AppResult<FlowStatus> {
        let flows = self.flows.read();
        let flow = flows
            .get(&flow_id)
            .ok_or_else(|| AppError::Flow(format!("Flow {} not found", flow_id)))?;
        Ok(flow.status.clone())
    }

    /// Cancel a flow
    ///
    /// Closes the popup if it is still held and resolves the pending result
    /// with [`AppError::Cancelled`]. A tick already scheduled for this flow
    /// observes the cancelled status and stops without reading the location
    /// or rescheduling. Works on pending and stalled flows alike.
    pub fn cancel_flow(&self, flow_id: FlowId) -> AppResult<()> {
        let mut flows = self.flows.write();
        let flow = flows
            .get_mut(&flow_id)
            .ok_or_else(|| AppError::Flow(format!("Flow {} not found", flow_id)))?;

        info!("Cancelling flow {} for {}", flow_id, flow.auth_url);

        flow.status = FlowStatus::Cancelled;
        if let Some(popup) = flow.popup.take() {
            popup.close();
        }
        if let Some(sender) = flow.sender.take() {
            let _ = sender.send(Err(AppError::Cancelled));
        }

        Ok(())
    }

    /// Remove old settled flows
    ///
    /// Keeps flows that are still pending or stalled (those hold the popup
    /// handle) and anything that started within the last hour.
    pub fn cleanup_flows(&self) {
        let cutoff = Utc::now() - chrono::Duration::hours(1);
        let mut flows = self.flows.write();

        let before_count = flows.len();
        flows.retain(|_, flow| {
            matches!(flow.status, FlowStatus::Pending | FlowStatus::Stalled)
                || flow.started_at > cutoff
        });

        let removed = before_count - flows.len();
        if removed > 0 {
            debug!("Cleaned up {} old flows", removed);
        }
    }

    /// Count of flows currently tracked
    pub fn active_flow_count(&self) -> usize {
        self.flows.read().len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::popup::MockPopupController;
    use crate::scheduler::ManualScheduler;

    fn test_manager() -> PopupFlowManager {
        PopupFlowManager::new(
            Arc::new(MockPopupController::with_script(vec![])),
            Arc::new(ManualScheduler::new()),
            BridgeConfig::default(),
        )
    }

    fn settled_entry(started_at: DateTime<Utc>, status: FlowStatus) -> FlowEntry {
        FlowEntry {
            auth_url: "https://provider.example.com/authorize".to_string(),
            started_at,
            status,
            popup: None,
            sender: None,
        }
    }

    #[test]
    fn test_manager_creation() {
        let manager = test_manager();
        assert_eq!(manager.active_flow_count(), 0);
    }

    #[test]
    fn test_poll_status_unknown_flow() {
        let manager = test_manager();
        let err = manager.poll_status(FlowId::new()).unwrap_err();
        assert!(matches!(err, AppError::Flow(_)));
    }

    #[test]
    fn test_cancel_unknown_flow() {
        let manager = test_manager();
        let err = manager.cancel_flow(FlowId::new()).unwrap_err();
        assert!(matches!(err, AppError::Flow(_)));
    }

    #[test]
    fn test_cleanup_flows_drops_old_settled() {
        let manager = test_manager();
        let old = Utc::now() - chrono::Duration::hours(2);

        manager.flows.write().insert(
            FlowId::new(),
            settled_entry(
                old,
                FlowStatus::Success {
                    fragment: "access_token=abc".to_string(),
                },
            ),
        );
        manager
            .flows
            .write()
            .insert(FlowId::new(), settled_entry(old, FlowStatus::Cancelled));
        assert_eq!(manager.active_flow_count(), 2);

        manager.cleanup_flows();
        assert_eq!(manager.active_flow_count(), 0);
    }

    #[test]
    fn test_cleanup_flows_keeps_pending_and_stalled() {
        let manager = test_manager();
        let old = Utc::now() - chrono::Duration::hours(2);

        manager
            .flows
            .write()
            .insert(FlowId::new(), settled_entry(old, FlowStatus::Pending));
        manager
            .flows
            .write()
            .insert(FlowId::new(), settled_entry(old, FlowStatus::Stalled));

        manager.cleanup_flows();
        assert_eq!(manager.active_flow_count(), 2);
    }

    #[test]
    fn test_cleanup_flows_keeps_recent_settled() {
        let manager = test_manager();

        manager
            .flows
            .write()
            .insert(FlowId::new(), settled_entry(Utc::now(), FlowStatus::Cancelled));

        manager.cleanup_flows();
        assert_eq!(manager.active_flow_count(), 1);
    }
}
