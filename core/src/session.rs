//! Bearer-token session storage and the session-invalidated signal.
//!
//! # Design
//! The pipeline receives its `TokenStore` at construction instead of reading
//! process-wide state, so tests can substitute a double. Tearing a session
//! down never navigates anywhere by itself: the pipeline emits a
//! `SessionInvalidated` event and whatever hosts the client decides what to
//! do with it. `RedirectToLogin` is the stock listener for hosts that have a
//! `Navigator`.
//!
//! `clear` must be idempotent. Two requests that both come back 401 will
//! both clear the store and both signal listeners.

use std::path::{Path, PathBuf};
use std::sync::RwLock;
use std::time::{SystemTime, UNIX_EPOCH};

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use serde::{Deserialize, Serialize};

use crate::types::UserInfo;

/// A bearer token plus the user it belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub token: String,
    #[serde(default)]
    pub user: Option<UserInfo>,
}

/// Storage for the current session. Reads may happen concurrently from
/// several in-flight requests.
pub trait TokenStore: Send + Sync {
    /// The current token, if one is stored and non-empty.
    fn token(&self) -> Option<String>;

    fn user_info(&self) -> Option<UserInfo>;

    fn set(&self, token: &str, user: Option<UserInfo>);

    /// Removes token and user info. Clearing an empty store is a no-op.
    fn clear(&self);
}

/// In-process token store.
#[derive(Debug, Default)]
pub struct MemoryTokenStore {
    session: RwLock<Option<Session>>,
}

impl MemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_token(token: &str) -> Self {
        Self {
            session: RwLock::new(Some(Session {
                token: token.to_string(),
                user: None,
            })),
        }
    }
}

impl TokenStore for MemoryTokenStore {
    fn token(&self) -> Option<String> {
        let session = self.session.read().unwrap_or_else(|e| e.into_inner());
        session
            .as_ref()
            .map(|s| s.token.clone())
            .filter(|t| !t.is_empty())
    }

    fn user_info(&self) -> Option<UserInfo> {
        let session = self.session.read().unwrap_or_else(|e| e.into_inner());
        session.as_ref().and_then(|s| s.user.clone())
    }

    fn set(&self, token: &str, user: Option<UserInfo>) {
        let mut session = self.session.write().unwrap_or_else(|e| e.into_inner());
        *session = Some(Session {
            token: token.to_string(),
            user,
        });
    }

    fn clear(&self) {
        let mut session = self.session.write().unwrap_or_else(|e| e.into_inner());
        *session = None;
    }
}

/// Token store persisted as a JSON file, so a session survives restarts.
///
/// A missing or unreadable file reads as "no session". Write failures are
/// logged and otherwise ignored: the in-flight request still proceeds and
/// the server stays the authority on whether the caller is signed in.
#[derive(Debug, Clone)]
pub struct FileTokenStore {
    path: PathBuf,
}

impl FileTokenStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// `<config dir>/trackerpro/session.json`.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|c| c.join("trackerpro").join("session.json"))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> Option<Session> {
        let contents = std::fs::read_to_string(&self.path).ok()?;
        match serde_json::from_str(&contents) {
            Ok(session) => Some(session),
            Err(err) => {
                tracing::warn!(path = %self.path.display(), error = %err, "ignoring corrupt session file");
                None
            }
        }
    }

    fn save(&self, session: &Session) -> std::io::Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents = serde_json::to_string_pretty(session)?;
        std::fs::write(&self.path, contents)?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            std::fs::set_permissions(&self.path, std::fs::Permissions::from_mode(0o600))?;
        }

        Ok(())
    }
}

impl TokenStore for FileTokenStore {
    fn token(&self) -> Option<String> {
        self.load().map(|s| s.token).filter(|t| !t.is_empty())
    }

    fn user_info(&self) -> Option<UserInfo> {
        self.load().and_then(|s| s.user)
    }

    fn set(&self, token: &str, user: Option<UserInfo>) {
        let session = Session {
            token: token.to_string(),
            user,
        };
        if let Err(err) = self.save(&session) {
            tracing::warn!(path = %self.path.display(), error = %err, "failed to persist session");
        }
    }

    fn clear(&self) {
        match std::fs::remove_file(&self.path) {
            Ok(()) => {}
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {}
            Err(err) => {
                tracing::warn!(path = %self.path.display(), error = %err, "failed to remove session file");
            }
        }
    }
}

/// Why a session was torn down.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionInvalidated {
    /// The server answered 401 or 403.
    Rejected { status: u16 },
    /// A local check found no token.
    MissingToken,
    /// A local check found a malformed or expired token.
    ExpiredToken,
}

/// Receives session teardown notifications. Must tolerate repeated calls.
pub trait SessionListener: Send + Sync {
    fn session_invalidated(&self, event: SessionInvalidated);
}

/// Sends the user to the login surface.
pub trait Navigator: Send + Sync {
    fn redirect_to_login(&self);
}

/// Listener that redirects to login on every invalidation.
#[derive(Debug, Clone)]
pub struct RedirectToLogin<N>(pub N);

impl<N: Navigator> SessionListener for RedirectToLogin<N> {
    fn session_invalidated(&self, _event: SessionInvalidated) {
        self.0.redirect_to_login();
    }
}

/// Navigator for hosts without a page to navigate: it logs where the user
/// should sign in again.
#[derive(Debug, Clone)]
pub struct LogNavigator {
    login_url: String,
}

impl LogNavigator {
    pub fn new(login_url: impl Into<String>) -> Self {
        Self {
            login_url: login_url.into(),
        }
    }
}

impl Navigator for LogNavigator {
    fn redirect_to_login(&self) {
        tracing::warn!(login_url = %self.login_url, "session ended, sign in again");
    }
}

/// Whether `token` should be treated as expired at `now_secs` (Unix time).
///
/// Anything that is not a three-part JWT with a base64url JSON payload
/// counts as expired. A payload without an `exp` claim never expires.
pub fn token_expired(token: &str, now_secs: u64) -> bool {
    let parts: Vec<&str> = token.split('.').collect();
    if parts.len() != 3 {
        return true;
    }
    let Ok(raw) = URL_SAFE_NO_PAD.decode(parts[1].trim_end_matches('=')) else {
        return true;
    };
    let Ok(payload) = serde_json::from_slice::<serde_json::Value>(&raw) else {
        return true;
    };
    match payload.get("exp").and_then(serde_json::Value::as_f64) {
        Some(exp) => exp < now_secs as f64,
        None => false,
    }
}

pub(crate) fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}
