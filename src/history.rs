use std::sync::Mutex;

/// Soft ceiling on the shared transcript length.
pub const HISTORY_CEILING: usize = 20;
/// How many of the oldest turns are dropped when the ceiling is exceeded.
pub const TRIM_BATCH: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    User,
    Assistant,
}

/// One exchange unit. Immutable once created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Turn {
    pub role: Role,
    pub text: String,
}

impl Turn {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            text: text.into(),
        }
    }

    pub fn assistant(text: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            text: text.into(),
        }
    }
}

/// The process-wide conversation transcript, shared by every user and channel.
///
/// There is deliberately no per-user or per-channel isolation: concurrent
/// handlers interleave their trim/snapshot/record steps on the same buffer.
/// The lock is held only for the duration of each individual operation, never
/// across an await point.
#[derive(Debug, Default)]
pub struct History {
    turns: Mutex<Vec<Turn>>,
}

impl History {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drops the oldest [`TRIM_BATCH`] turns when the transcript has grown
    /// past [`HISTORY_CEILING`]. Called before each provider request, not
    /// after recording, so the two turns of the current exchange always
    /// survive.
    pub fn trim_if_needed(&self) {
        let mut turns = self.turns.lock().expect("history lock poisoned");
        if turns.len() > HISTORY_CEILING {
            turns.drain(..TRIM_BATCH);
        }
    }

    pub fn snapshot(&self) -> Vec<Turn> {
        self.turns.lock().expect("history lock poisoned").clone()
    }

    /// Appends the completed exchange, user turn first.
    pub fn record(&self, user_text: &str, assistant_text: &str) {
        let mut turns = self.turns.lock().expect("history lock poisoned");
        turns.push(Turn::user(user_text));
        turns.push(Turn::assistant(assistant_text));
    }

    pub fn len(&self) -> usize {
        self.turns.lock().expect("history lock poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
