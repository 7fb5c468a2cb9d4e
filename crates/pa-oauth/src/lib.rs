//! Popup-based OAuth 2.0 implicit authorization flow
//!
//! Opens a browser popup at an authorization URL and polls the popup's
//! location on a fixed interval until the provider redirects back to the
//! host origin with a token fragment, then delivers the fragment exactly
//! once and closes the popup.
//!
//! The browser is never touched directly: hosts inject a windowing
//! capability ([`PopupController`]) and a timer capability ([`Scheduler`]),
//! which keeps the bridge host-agnostic and makes every flow deterministic
//! to test with the bundled mock implementations.
//!
//! # Features
//! - Fixed-interval location polling, with cross-origin denial treated as
//!   "still on the provider domain"
//! - One-shot result delivery over a channel that cannot fire twice
//! - Flow cancellation and stale-flow cleanup
//! - Implicit-grant fragment parsing and authorization URL construction
//!
//! # Usage Example
//! ```no_run
//! use std::sync::Arc;
//! use pa_oauth::{BridgeConfig, MockPopupController, PopupFlowManager, TokioScheduler};
//!
//! # async fn demo() -> pa_types::AppResult<()> {
//! let manager = PopupFlowManager::new(
//!     Arc::new(MockPopupController::default()),
//!     Arc::new(TokioScheduler),
//!     BridgeConfig::default(),
//! );
//!
//! let pending = manager.start_flow("https://provider.example.com/authorize?...")?;
//! let fragment = pending.wait().await?;
//! # let _ = fragment;
//! # Ok(())
//! # }
//! ```

mod auth_url;
mod config;
mod flow_manager;
mod fragment;
mod popup;
mod scheduler;
mod types;

// Re-export public API
pub use auth_url::{build_authorization_url, AuthUrlConfig};
pub use config::{load_config, save_config, BridgeConfig};
pub use flow_manager::PopupFlowManager;
pub use fragment::{extract_fragment, parse_fragment, ImplicitGrant};
pub use popup::{
    CrossOriginDenied, LocationRead, MockPopupController, PopupController, PopupWindow,
};
pub use scheduler::{ManualScheduler, Scheduler, TokioScheduler};
pub use types::{FlowId, FlowStatus, PendingFlow};
