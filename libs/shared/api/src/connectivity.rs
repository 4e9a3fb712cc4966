use std::sync::atomic::{AtomicBool, Ordering};

/// Boolean "is online" observable.
///
/// The host shell owns the real signal (platform network events); the sync
/// layer only reads it to decide whether an opportunistic cache pass runs.
pub trait ConnectivitySignal: Send + Sync {
    fn is_online(&self) -> bool;
}

/// Signal that always reports online. Default for hosts without a
/// connectivity feed.
pub struct AlwaysOnline;

impl ConnectivitySignal for AlwaysOnline {
    fn is_online(&self) -> bool {
        true
    }
}

/// Flag-backed signal the host flips from its network event handlers.
pub struct ConnectivityFlag {
    online: AtomicBool,
}

impl ConnectivityFlag {
    pub fn new(online: bool) -> Self {
        Self {
            online: AtomicBool::new(online),
        }
    }

    pub fn set_online(&self, online: bool) {
        self.online.store(online, Ordering::Relaxed);
    }
}

impl ConnectivitySignal for ConnectivityFlag {
    fn is_online(&self) -> bool {
        self.online.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flag_signal_tracks_host_updates() {
        let flag = ConnectivityFlag::new(true);
        assert!(flag.is_online());

        flag.set_online(false);
        assert!(!flag.is_online());
    }
}
