//! Status messages shown to the user during a ceremony.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

/// How long an ordinary status message stays visible
pub const DEFAULT_KEEP: Duration = Duration::from_millis(3000);

/// How long the "enter a username" prompt stays visible
pub const PROMPT_KEEP: Duration = Duration::from_millis(2000);

pub const INCOMPATIBLE_NOTICE: &str =
    "This platform does not support passkeys. Try a different browser or device.";

/// Where ceremony outcomes are reported
pub trait Announcer: Send + Sync {
    /// Show `message`, dismissing it after `keep`
    fn announce(&self, message: &str, keep: Duration);

    /// Show the persistent notice that passkeys are unavailable
    fn show_incompatible(&self);
}

/// In-memory auto-dismissing status banner
///
/// Cloning shares the banner. Dismissal runs on a spawned tokio task, so
/// `announce` must be called from within a runtime. A newer message is
/// never cleared by the timer of an older one.
#[derive(Clone, Default)]
pub struct StatusLine {
    inner: Arc<Mutex<Banner>>,
}

#[derive(Default)]
struct Banner {
    message: Option<String>,
    generation: u64,
    incompatible: bool,
}

impl StatusLine {
    pub fn new() -> Self {
        Self::default()
    }

    /// The message currently on display, if any
    pub fn current(&self) -> Option<String> {
        lock(&self.inner).message.clone()
    }

    pub fn is_incompatible(&self) -> bool {
        lock(&self.inner).incompatible
    }
}

impl Announcer for StatusLine {
    fn announce(&self, message: &str, keep: Duration) {
        let generation = {
            let mut banner = lock(&self.inner);
            banner.generation += 1;
            banner.message = Some(message.to_owned());
            banner.generation
        };

        let inner = Arc::clone(&self.inner);
        tokio::spawn(async move {
            tokio::time::sleep(keep).await;
            let mut banner = lock(&inner);
            if banner.generation == generation {
                banner.message = None;
            }
        });
    }

    fn show_incompatible(&self) {
        lock(&self.inner).incompatible = true;
    }
}

fn lock(inner: &Mutex<Banner>) -> MutexGuard<'_, Banner> {
    inner.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Prints messages to the terminal; `keep` has no meaning there
#[derive(Debug, Clone, Copy, Default)]
pub struct TerminalAnnouncer;

impl Announcer for TerminalAnnouncer {
    fn announce(&self, message: &str, _keep: Duration) {
        println!("» {message}");
    }

    fn show_incompatible(&self) {
        eprintln!("{INCOMPATIBLE_NOTICE}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn message_dismisses_itself() {
        let status = StatusLine::new();
        status.announce("Registration failed", DEFAULT_KEEP);
        assert_eq!(status.current().as_deref(), Some("Registration failed"));

        tokio::time::sleep(DEFAULT_KEEP + Duration::from_millis(1)).await;
        assert_eq!(status.current(), None);
    }

    #[tokio::test(start_paused = true)]
    async fn older_timer_leaves_newer_message() {
        let status = StatusLine::new();
        status.announce("Please enter a username", PROMPT_KEEP);
        tokio::time::sleep(Duration::from_millis(1500)).await;
        status.announce("Success! You're authenticated", DEFAULT_KEEP);

        // First timer fires here
        tokio::time::sleep(Duration::from_millis(1000)).await;
        assert_eq!(
            status.current().as_deref(),
            Some("Success! You're authenticated")
        );

        tokio::time::sleep(DEFAULT_KEEP).await;
        assert_eq!(status.current(), None);
    }

    #[test]
    fn incompatible_notice_is_sticky() {
        let status = StatusLine::new();
        assert!(!status.is_incompatible());
        status.show_incompatible();
        assert!(status.is_incompatible());
    }
}
