use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

use sha2::{Digest, Sha256};
use tokio::sync::RwLock;
use tracing::debug;

use farm_common::language::Language;
use farm_common::openai::Message;

use crate::error::AppError;

static SESSION_COUNTER: AtomicU64 = AtomicU64::new(0);

pub type SessionId = String;

/// One chat conversation: its language and the ordered message log, greeting first.
#[derive(Debug, Clone)]
pub struct ChatSession {
    id: SessionId,
    language: Language,
    log: Vec<Message>,
    last_active: Instant,
}

impl ChatSession {
    pub fn new(id: SessionId, language: Language) -> Self {
        Self {
            id,
            language,
            log: vec![Message::assistant(language.greeting())],
            last_active: Instant::now(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn language(&self) -> Language {
        self.language
    }

    pub fn messages(&self) -> &[Message] {
        &self.log
    }

    /// Append a completed exchange. Both messages land together or not at all.
    pub fn record_turn(&mut self, question: &str, reply: &str) {
        self.log.push(Message::user(question));
        self.log.push(Message::assistant(reply));
        self.last_active = Instant::now();
    }

    fn is_expired(&self, ttl: Duration) -> bool {
        self.last_active.elapsed() >= ttl
    }
}

/// In-memory chat sessions, keyed by ID.
///
/// A session expires once `ttl` passes without a recorded turn; expired sessions are
/// dropped on the next store access and then behave as unknown.
#[derive(Clone)]
pub struct ChatStore {
    sessions: Arc<RwLock<HashMap<SessionId, ChatSession>>>,
    ttl: Duration,
}

impl ChatStore {
    pub fn new(ttl: Duration) -> Self {
        Self {
            sessions: Arc::default(),
            ttl,
        }
    }

    pub async fn start(&self, language: Language) -> ChatSession {
        let session = ChatSession::new(new_session_id(), language);
        let mut sessions = self.sessions.write().await;
        self.prune(&mut sessions);
        sessions.insert(session.id.clone(), session.clone());
        session
    }

    pub async fn get(&self, session_id: &str) -> Option<ChatSession> {
        let mut sessions = self.sessions.write().await;
        self.prune(&mut sessions);
        sessions.get(session_id).cloned()
    }

    /// Append a question/reply pair and return the updated log.
    pub async fn record_turn(
        &self,
        session_id: &str,
        question: &str,
        reply: &str,
    ) -> Result<Vec<Message>, AppError> {
        let mut sessions = self.sessions.write().await;
        self.prune(&mut sessions);
        let session = sessions
            .get_mut(session_id)
            .ok_or_else(|| AppError::UnknownSession(session_id.to_string()))?;
        session.record_turn(question, reply);
        Ok(session.log.clone())
    }

    /// Returns `true` if the session existed.
    pub async fn end(&self, session_id: &str) -> bool {
        self.sessions.write().await.remove(session_id).is_some()
    }

    fn prune(&self, sessions: &mut HashMap<SessionId, ChatSession>) {
        let before = sessions.len();
        sessions.retain(|_, s| !s.is_expired(self.ttl));
        let expired = before - sessions.len();
        if expired > 0 {
            debug!(expired, "dropped expired chat sessions");
        }
    }
}

fn new_session_id() -> SessionId {
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_else(|_| Duration::from_secs(0));
    let counter = SESSION_COUNTER.fetch_add(1, Ordering::Relaxed);
    let pid = std::process::id();

    let mut h = Sha256::new();
    h.update(now.as_nanos().to_le_bytes());
    h.update(pid.to_le_bytes());
    h.update(counter.to_le_bytes());
    let digest = h.finalize();
    hex_lower(&digest[..16])
}

fn hex_lower(bytes: &[u8]) -> String {
    const HEX: &[u8; 16] = b"0123456789abcdef";
    let mut out = String::with_capacity(bytes.len() * 2);
    for &b in bytes {
        out.push(HEX[(b >> 4) as usize] as char);
        out.push(HEX[(b & 0x0f) as usize] as char);
    }
    out
}
