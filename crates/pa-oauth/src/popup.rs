//! Popup window capability traits
//!
//! The bridge never touches a browser directly. Hosts supply a
//! [`PopupController`] that opens popup windows and reports their current
//! location; embedding it in a webview shell or browser extension is the
//! host's concern. [`MockPopupController`] replays scripted location reads
//! for deterministic tests.

use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use thiserror::Error;

/// Same-origin policy denied reading the popup's location
///
/// Expected transient condition while the popup still shows the provider's
/// domain. The poller converts it into "check again next tick"; it is never
/// surfaced to callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("cross-origin access to popup location denied")]
pub struct CrossOriginDenied;

/// Windowing capability: open popup windows
pub trait PopupController: Send + Sync {
    /// Open a popup navigated to `url`
    ///
    /// Returns `None` when the browser refuses to create the window
    /// (popup blocker).
    fn open(&self, url: &str) -> Option<Box<dyn PopupWindow>>;
}

/// An open popup window
pub trait PopupWindow: Send + Sync {
    /// Read the popup's current location
    ///
    /// Fails with [`CrossOriginDenied`] while the popup shows a different
    /// origin than the host page. A popup the user already closed keeps
    /// failing the same way; the two cases are indistinguishable here.
    fn read_location(&self) -> Result<String, CrossOriginDenied>;

    /// Close the popup
    fn close(&self);
}

/// One scripted outcome for a location read
#[derive(Debug, Clone)]
pub enum LocationRead {
    /// Same-origin policy denies the read
    Denied,

    /// Read succeeds with the given location
    Location(String),
}

/// Mock popup controller with scripted location reads
///
/// Windows opened by this controller replay a shared script of read
/// outcomes, one entry per `read_location` call. An exhausted script keeps
/// reporting [`LocationRead::Denied`], which matches a user who never
/// finishes the provider's login form. Opened URLs and close calls are
/// recorded for assertions.
#[derive(Clone, Default)]
pub struct MockPopupController {
    blocked: bool,
    script: Arc<Mutex<VecDeque<LocationRead>>>,
    opened: Arc<Mutex<Vec<String>>>,
    closes: Arc<AtomicUsize>,
}

impl MockPopupController {
    /// Controller whose popups replay `script`
    pub fn with_script(script: Vec<LocationRead>) -> Self {
        Self {
            script: Arc::new(Mutex::new(script.into())),
            ..Self::default()
        }
    }

    /// Controller that refuses to open any popup
    pub fn blocked() -> Self {
        Self {
            blocked: true,
            ..Self::default()
        }
    }

    /// Append further read outcomes to the script
    pub fn push_reads(&self, reads: impl IntoIterator<Item = LocationRead>) {
        self.script.lock().extend(reads);
    }

    /// URLs passed to `open` so far
    pub fn opened_urls(&self) -> Vec<String> {
        self.opened.lock().clone()
    }

    /// Number of `close` calls across all windows opened by this controller
    pub fn close_count(&self) -> usize {
        self.closes.load(Ordering::SeqCst)
    }
}

impl PopupController for MockPopupController {
    fn open(&self, url: &str) -> Option<Box<dyn PopupWindow>> {
        if self.blocked {
            return None;
        }
        self.opened.lock().push(url.to_string());
        Some(Box::new(MockPopupWindow {
            script: Arc::clone(&self.script),
            closes: Arc::clone(&self.closes),
        }))
    }
}

struct MockPopupWindow {
    script: Arc<Mutex<VecDeque<LocationRead>>>,
    closes: Arc<AtomicUsize>,
}

impl PopupWindow for MockPopupWindow {
    fn read_location(&self) -> Result<String, CrossOriginDenied> {
        match self.script.lock().pop_front() {
            Some(LocationRead::Location(location)) => Ok(location),
            Some(LocationRead::Denied) | None => Err(CrossOriginDenied),
        }
    }

    fn close(&self) {
        self.closes.fetch_add(1, Ordering::SeqCst);
    }
}
