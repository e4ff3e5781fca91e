//! Voice commands: keyword scan, fire queue, listener thread
//!
//! Speech fragments arrive from a recognition backend; every token containing
//! a fire keyword becomes one timestamped fire request. Requests then wait in
//! the queue until they are at least a cooldown old, rate-limiting the cannon
//! no matter how fast the player talks.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

/// Tokens that count as a fire command when contained in a spoken word
///
/// Recognition engines routinely mishear "pew"; the extra entries catch the
/// usual transcriptions.
pub const FIRE_KEYWORDS: [&str; 4] = ["pew", "pure", "pum", "boom"];

/// How long the listener sleeps when the source has nothing pending
const IDLE_POLL: Duration = Duration::from_millis(5);

/// Count fire commands in a transcript fragment
///
/// Case-insensitive. Each whitespace token matches at most once, however many
/// keywords it contains.
pub fn fire_word_count(fragment: &str) -> usize {
    fragment
        .split_whitespace()
        .filter(|token| {
            let token = token.to_lowercase();
            FIRE_KEYWORDS.iter().any(|k| token.contains(k))
        })
        .count()
}

/// Lock a mutex, recovering the guard if a panicking thread poisoned it
fn lock_recovering<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(|e| e.into_inner())
}

/// Pending fire requests, oldest first
///
/// Producers enqueue from the voice thread; the simulation thread pops ready
/// requests once per tick. Arrival order is preserved and the drain stops at
/// the first request younger than the cooldown.
#[derive(Debug, Default)]
pub struct FireQueue {
    pending: Mutex<VecDeque<Instant>>,
}

impl FireQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Enqueue one fire request stamped `at`
    pub fn enqueue(&self, at: Instant) {
        lock_recovering(&self.pending).push_back(at);
    }

    pub fn len(&self) -> usize {
        lock_recovering(&self.pending).len()
    }

    pub fn is_empty(&self) -> bool {
        lock_recovering(&self.pending).is_empty()
    }

    /// Pop every request at least `cooldown` old at `now`
    ///
    /// Stops at the first younger request; everything behind it stays queued
    /// regardless of age. Returns the number popped.
    pub fn pop_ready(&self, now: Instant, cooldown: Duration) -> usize {
        let mut pending = lock_recovering(&self.pending);
        let mut popped = 0;
        while let Some(&front) = pending.front() {
            if now.duration_since(front) >= cooldown {
                pending.pop_front();
                popped += 1;
            } else {
                break;
            }
        }
        popped
    }
}

/// Recognition backend failures
#[derive(Debug)]
pub enum VoiceError {
    /// Heard something but matched no words; listen again
    NoMatch,
    /// Nothing heard before the backend deadline; listen again
    Timeout,
    /// Connectivity problem; re-listening will not help
    Network(String),
    /// Any other backend failure
    Backend(String),
}

impl std::fmt::Display for VoiceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            VoiceError::NoMatch => write!(f, "no speech match"),
            VoiceError::Timeout => write!(f, "speech timeout"),
            VoiceError::Network(msg) => write!(f, "speech network error: {msg}"),
            VoiceError::Backend(msg) => write!(f, "speech backend error: {msg}"),
        }
    }
}

impl std::error::Error for VoiceError {}

/// A speech-recognition backend
///
/// `next_fragment` yields the next recognized transcript fragment, `Ok(None)`
/// when nothing is pending right now, or a backend error. Implementations may
/// block briefly but must eventually return so the listener can observe
/// cancellation.
pub trait VoiceCommandSource: Send {
    fn next_fragment(&mut self) -> Result<Option<String>, VoiceError>;
}

/// Background listener wiring a [`VoiceCommandSource`] to a [`FireQueue`]
///
/// Recoverable errors (`NoMatch`, `Timeout`) restart listening; fatal ones
/// (`Network`, `Backend`) record a user-visible status message and end the
/// thread. Dropping the listener cancels and joins it.
pub struct VoiceListener {
    queue: Arc<FireQueue>,
    transcript: Arc<Mutex<Option<String>>>,
    status: Arc<Mutex<Option<String>>>,
    cancel: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

impl VoiceListener {
    /// Start listening on a background thread
    pub fn spawn(mut source: impl VoiceCommandSource + 'static, queue: Arc<FireQueue>) -> Self {
        let transcript = Arc::new(Mutex::new(None));
        let status = Arc::new(Mutex::new(None));
        let cancel = Arc::new(AtomicBool::new(false));

        let handle = {
            let queue = Arc::clone(&queue);
            let transcript = Arc::clone(&transcript);
            let status = Arc::clone(&status);
            let cancel = Arc::clone(&cancel);
            thread::spawn(move || {
                log::info!("voice listener started");
                while !cancel.load(Ordering::Relaxed) {
                    match source.next_fragment() {
                        Ok(Some(fragment)) => {
                            let requests = fire_word_count(&fragment);
                            let now = Instant::now();
                            for _ in 0..requests {
                                queue.enqueue(now);
                            }
                            if requests > 0 {
                                log::debug!("queued {requests} fire request(s) from {fragment:?}");
                            }
                            *lock_recovering(&transcript) = Some(fragment);
                        }
                        Ok(None) => thread::sleep(IDLE_POLL),
                        Err(e @ (VoiceError::NoMatch | VoiceError::Timeout)) => {
                            log::debug!("listening again after: {e}");
                        }
                        Err(e) => {
                            log::error!("voice recognition stopped: {e}");
                            *lock_recovering(&status) = Some(e.to_string());
                            break;
                        }
                    }
                }
                log::info!("voice listener stopped");
            })
        };

        Self {
            queue,
            transcript,
            status,
            cancel,
            handle: Some(handle),
        }
    }

    /// Shared fire queue handle
    pub fn queue(&self) -> &Arc<FireQueue> {
        &self.queue
    }

    /// Latest transcript fragment since the last call, for the word overlay
    pub fn take_transcript(&self) -> Option<String> {
        lock_recovering(&self.transcript).take()
    }

    /// Fatal-error message, if recognition died
    pub fn status(&self) -> Option<String> {
        lock_recovering(&self.status).clone()
    }

    /// Ask the listener to stop after its current fragment
    pub fn cancel(&self) {
        self.cancel.store(true, Ordering::Relaxed);
    }
}

impl Drop for VoiceListener {
    fn drop(&mut self) {
        self.cancel();
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wait_until(ms: u64, mut cond: impl FnMut() -> bool) -> bool {
        let deadline = Instant::now() + Duration::from_millis(ms);
        while Instant::now() < deadline {
            if cond() {
                return true;
            }
            thread::sleep(Duration::from_millis(2));
        }
        cond()
    }

    #[test]
    fn keyword_scan_counts_matching_tokens() {
        assert_eq!(fire_word_count("Pew pew!"), 2);
        assert_eq!(fire_word_count("a PURE boom please"), 2);
        // "pumpkin" contains "pum"
        assert_eq!(fire_word_count("pumpkin"), 1);
        assert_eq!(fire_word_count("hello world"), 0);
        assert_eq!(fire_word_count(""), 0);
        // One token, two keywords: still a single request
        assert_eq!(fire_word_count("pewboom"), 1);
    }

    #[test]
    fn pop_ready_drains_only_aged_requests_in_order() {
        let q = FireQueue::new();
        let now = Instant::now();
        q.enqueue(now - Duration::from_millis(400));
        q.enqueue(now - Duration::from_millis(300));
        q.enqueue(now - Duration::from_millis(100));

        assert_eq!(q.pop_ready(now, Duration::from_millis(250)), 2);
        assert_eq!(q.len(), 1);
        assert_eq!(q.pop_ready(now, Duration::from_millis(250)), 0);
    }

    #[test]
    fn a_young_request_blocks_everything_behind_it() {
        let q = FireQueue::new();
        let now = Instant::now();
        // Arrival order rules: the old request sits behind the young one
        q.enqueue(now - Duration::from_millis(100));
        q.enqueue(now - Duration::from_millis(300));

        assert_eq!(q.pop_ready(now, Duration::from_millis(250)), 0);
        assert_eq!(q.len(), 2);
    }

    #[test]
    fn exact_cooldown_age_is_ready() {
        let q = FireQueue::new();
        let now = Instant::now();
        q.enqueue(now - Duration::from_millis(250));
        assert_eq!(q.pop_ready(now, Duration::from_millis(250)), 1);
        assert!(q.is_empty());
    }

    struct Scripted(VecDeque<Result<Option<String>, VoiceError>>);

    impl VoiceCommandSource for Scripted {
        fn next_fragment(&mut self) -> Result<Option<String>, VoiceError> {
            self.0.pop_front().unwrap_or(Ok(None))
        }
    }

    #[test]
    fn listener_queues_requests_and_keeps_transcript() {
        let script = VecDeque::from([
            Ok(Some("pew pew boom".to_string())),
            Err(VoiceError::NoMatch),
            Ok(Some("nothing here".to_string())),
        ]);
        let queue = Arc::new(FireQueue::new());
        let listener = VoiceListener::spawn(Scripted(script), Arc::clone(&queue));

        assert!(wait_until(1000, || queue.len() == 3));
        assert!(wait_until(1000, || {
            listener.take_transcript().as_deref() == Some("nothing here")
        }));
        assert!(listener.status().is_none());
    }

    #[test]
    fn fatal_error_stops_listening_with_status() {
        let script = VecDeque::from([
            Err(VoiceError::Network("dns failure".to_string())),
            Ok(Some("pew after death".to_string())),
        ]);
        let queue = Arc::new(FireQueue::new());
        let listener = VoiceListener::spawn(Scripted(script), Arc::clone(&queue));

        assert!(wait_until(1000, || listener.status().is_some()));
        assert!(listener.status().unwrap().contains("dns failure"));
        // The fragment after the fatal error was never read
        assert!(queue.is_empty());
    }
}
