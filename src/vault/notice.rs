use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeTone {
    Success,
    Warning,
    Error,
}

/// User-facing outcome of a vault operation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notice {
    pub tone: NoticeTone,
    pub message: String,
}

impl Notice {
    pub fn success(message: impl Into<String>) -> Self {
        Self::new(NoticeTone::Success, message)
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self::new(NoticeTone::Warning, message)
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::new(NoticeTone::Error, message)
    }

    fn new(tone: NoticeTone, message: impl Into<String>) -> Self {
        Self {
            tone,
            message: message.into(),
        }
    }

    pub fn is_error(&self) -> bool {
        self.tone == NoticeTone::Error
    }
}

/// Event name notices are broadcast under.
pub const NOTICE_EVENT: &str = "notice";

#[cfg(feature = "emitter")]
pub(crate) use broadcast::NoticeBroadcaster;

#[cfg(feature = "emitter")]
mod broadcast {
    use std::sync::{Mutex, PoisonError};

    use event_emitter_rs::EventEmitter;
    use tracing::warn;

    use super::{Notice, NOTICE_EVENT};

    /// Fans notices out to subscribers as JSON on the `"notice"` event.
    ///
    /// Listeners run on the emitter's own threads, so delivery is
    /// asynchronous with respect to the vault operation.
    pub(crate) struct NoticeBroadcaster {
        emitter: Mutex<EventEmitter>,
    }

    impl NoticeBroadcaster {
        pub(crate) fn new() -> Self {
            Self {
                emitter: Mutex::new(EventEmitter::new()),
            }
        }

        pub(crate) fn subscribe<F>(&self, listener: F) -> String
        where
            F: Fn(Notice) + Send + Sync + 'static,
        {
            let mut emitter = self.emitter.lock().unwrap_or_else(PoisonError::into_inner);
            emitter.on(NOTICE_EVENT, move |json: String| {
                match serde_json::from_str::<Notice>(&json) {
                    Ok(notice) => listener(notice),
                    Err(err) => warn!(error = %err, "dropping undecodable notice"),
                }
            })
        }

        pub(crate) fn publish(&self, notice: &Notice) {
            let json = match serde_json::to_string(notice) {
                Ok(json) => json,
                Err(err) => {
                    warn!(error = %err, "failed to encode notice");
                    return;
                }
            };
            let mut emitter = self.emitter.lock().unwrap_or_else(PoisonError::into_inner);
            emitter.emit(NOTICE_EVENT, json);
        }
    }
}
