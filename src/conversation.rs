use crate::model::{MatchResult, Message};
use crate::resolver::IntentResolver;
use moka::notification::RemovalCause;
use moka::policy::EvictionPolicy;
use moka::sync::Cache;
use parking_lot::Mutex;
use rand::Rng;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use uuid::Uuid;

pub const OPENING_LINE: &str = "Hello! How can I help you today? 👋";

/// How long the bot "thinks" before answering, drawn uniformly from `[min, max]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ThinkingDelay {
    min: Duration,
    max: Duration,
}

impl ThinkingDelay {
    pub fn new(min: Duration, max: Duration) -> Self {
        if min <= max {
            Self { min, max }
        } else {
            Self { min: max, max: min }
        }
    }

    pub fn fixed(delay: Duration) -> Self {
        Self::new(delay, delay)
    }

    pub fn sample(&self) -> Duration {
        if self.min == self.max {
            self.min
        } else {
            rand::thread_rng().gen_range(self.min..=self.max)
        }
    }
}

impl Default for ThinkingDelay {
    fn default() -> Self {
        Self::new(Duration::from_millis(300), Duration::from_millis(500))
    }
}

#[derive(Debug)]
struct Transcript {
    messages: Vec<Message>,
    closed: bool,
}

struct Job {
    text: String,
    reply: oneshot::Sender<MatchResult>,
}

/// Reply to one post. Resolves to `None` if the session was closed first.
#[derive(Debug)]
pub struct PendingReply {
    rx: oneshot::Receiver<MatchResult>,
}

impl PendingReply {
    pub async fn wait(self) -> Option<MatchResult> {
        self.rx.await.ok()
    }
}

/// One visitor's chat: an append-only transcript plus a worker that answers
/// posts one at a time, in the order they were made.
///
/// Dropping or closing the conversation cancels any reply still "thinking".
pub struct Conversation {
    id: Uuid,
    transcript: Arc<Mutex<Transcript>>,
    jobs: mpsc::UnboundedSender<Job>,
    worker: JoinHandle<()>,
}

impl Conversation {
    /// Must be called from within a Tokio runtime.
    pub fn start(resolver: Arc<IntentResolver>, delay: ThinkingDelay) -> Self {
        let transcript = Arc::new(Mutex::new(Transcript {
            messages: vec![Message::bot(OPENING_LINE)],
            closed: false,
        }));
        let (jobs, rx) = mpsc::unbounded_channel();
        let worker = tokio::spawn(reply_worker(resolver, delay, transcript.clone(), rx));
        Self {
            id: Uuid::new_v4(),
            transcript,
            jobs,
            worker,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Appends the user's message and queues it for an answer.
    ///
    /// Blank input is ignored, as is anything posted after `close`.
    pub fn post(&self, text: &str) -> Option<PendingReply> {
        if text.trim().is_empty() {
            return None;
        }
        let mut transcript = self.transcript.lock();
        if transcript.closed {
            return None;
        }
        let (reply, rx) = oneshot::channel();
        // Queue while holding the lock so replies follow the order of user messages.
        self.jobs
            .send(Job {
                text: text.to_string(),
                reply,
            })
            .ok()?;
        transcript.messages.push(Message::user(text));
        Some(PendingReply { rx })
    }

    /// Same as typing the suggested question verbatim.
    pub fn select_suggestion(&self, question: &str) -> Option<PendingReply> {
        self.post(question)
    }

    pub fn transcript(&self) -> Vec<Message> {
        self.transcript.lock().messages.clone()
    }

    pub fn is_closed(&self) -> bool {
        self.transcript.lock().closed
    }

    pub fn close(&self) {
        self.transcript.lock().closed = true;
        self.worker.abort();
    }
}

impl Drop for Conversation {
    fn drop(&mut self) {
        self.close();
    }
}

async fn reply_worker(
    resolver: Arc<IntentResolver>,
    delay: ThinkingDelay,
    transcript: Arc<Mutex<Transcript>>,
    mut jobs: mpsc::UnboundedReceiver<Job>,
) {
    while let Some(job) = jobs.recv().await {
        tokio::time::sleep(delay.sample()).await;
        let result = resolver.resolve(&job.text);
        {
            let mut transcript = transcript.lock();
            if transcript.closed {
                return;
            }
            transcript.messages.push(Message::bot(result.answer.as_str()));
        }
        let _ = job.reply.send(result);
    }
}

// --- Session Registry ---

/// Bounds on the session registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionLimits {
    pub max_sessions: u64,
    /// A session nobody has touched for this long is evicted and closed.
    pub idle_timeout: Duration,
}

impl Default for SessionLimits {
    fn default() -> Self {
        Self {
            max_sessions: 10_000,
            idle_timeout: Duration::from_secs(30 * 60),
        }
    }
}

/// Live conversations keyed by id, for callers that address sessions remotely.
///
/// Sessions that go idle or overflow `max_sessions` (least recently used
/// first) are evicted, and eviction closes them like an explicit `close`.
pub struct SessionStore {
    resolver: Arc<IntentResolver>,
    delay: ThinkingDelay,
    sessions: Cache<Uuid, Arc<Conversation>>,
}

impl SessionStore {
    pub fn new(resolver: Arc<IntentResolver>, delay: ThinkingDelay) -> Self {
        Self::with_limits(resolver, delay, SessionLimits::default())
    }

    pub fn with_limits(resolver: Arc<IntentResolver>, delay: ThinkingDelay, limits: SessionLimits) -> Self {
        let sessions = Cache::builder()
            .max_capacity(limits.max_sessions)
            .time_to_idle(limits.idle_timeout)
            .eviction_policy(EvictionPolicy::lru())
            .eviction_listener(|id: Arc<Uuid>, conversation: Arc<Conversation>, cause: RemovalCause| {
                conversation.close();
                match cause {
                    RemovalCause::Explicit => log::info!("Closed session {}", id),
                    _ => log::info!("Evicted session {} ({:?})", id, cause),
                }
            })
            .build();
        Self {
            resolver,
            delay,
            sessions,
        }
    }

    pub fn resolver(&self) -> &Arc<IntentResolver> {
        &self.resolver
    }

    pub fn open(&self) -> Arc<Conversation> {
        let conversation = Arc::new(Conversation::start(self.resolver.clone(), self.delay));
        self.sessions.insert(conversation.id(), conversation.clone());
        log::info!("Opened session {}", conversation.id());
        conversation
    }

    /// Looks the session up and resets its idle timer.
    pub fn get(&self, id: &Uuid) -> Option<Arc<Conversation>> {
        self.sessions.get(id)
    }

    /// Removes the session and cancels its pending replies. Returns false for unknown ids.
    pub fn close(&self, id: &Uuid) -> bool {
        let removed = self.sessions.remove(id);
        self.sessions.run_pending_tasks();
        removed.is_some()
    }

    /// Applies pending evictions, closing every session that expired or overflowed.
    pub fn evict_expired(&self) {
        self.sessions.run_pending_tasks();
    }

    pub fn len(&self) -> usize {
        self.evict_expired();
        self.sessions.entry_count() as usize
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
