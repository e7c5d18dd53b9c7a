//! # Note credentials
//!
//! Password protection for individual notes.
//!
//! - `generate_salt()`, `hash_password()`, `prepare()`: derive a stored credential
//! - `verify()`: check a password against the hashed or legacy scheme
//! - `validate_strength()`: the password policy for new note passwords
//! - `check_access()`: the asynchronous password challenge in front of a
//!   protected note
//!
//! The digest is SHA-256 over `password || salt`. It is fast and is kept
//! for compatibility with notes already stored that way; account passwords
//! use Argon2id in the backend instead.

use crate::models::{Credential, Note};
use async_trait::async_trait;
use rand_core::{OsRng, RngCore};
use serde::Serialize;
use sha2::{Digest, Sha256};
use std::sync::Mutex;
use tokio::sync::{mpsc, oneshot};

pub const MIN_PASSWORD_LENGTH: usize = 8;

const ACCESS_DENIED_TITLE: &str = "Access Denied";
const ACCESS_DENIED_MESSAGE: &str = "Incorrect password for this note";

/// 16 lowercase hex characters from the OS random source.
pub fn generate_salt() -> String {
    format!("{:016x}", OsRng.next_u64())
}

/// Lowercase hex SHA-256 of `password` followed by `salt`.
pub fn hash_password(password: &str, salt: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(password.as_bytes());
    hasher.update(salt.as_bytes());
    format!("{:x}", hasher.finalize())
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HashedPassword {
    pub hash: String,
    pub salt: String,
}

impl From<HashedPassword> for Credential {
    fn from(hashed: HashedPassword) -> Self {
        Credential::Hashed {
            hash: hashed.hash,
            salt: hashed.salt,
        }
    }
}

/// Fresh salt plus hash, for protecting a note for the first time or
/// replacing its password.
pub fn prepare(password: &str) -> HashedPassword {
    let salt = generate_salt();
    HashedPassword {
        hash: hash_password(password, &salt),
        salt,
    }
}

/// Checks `password` against a note credential.
///
/// An empty password never verifies, and an unprotected credential has
/// nothing to verify against.
pub fn verify(credential: &Credential, password: &str) -> bool {
    if password.is_empty() {
        return false;
    }
    match credential {
        Credential::Hashed { hash, salt } => hash_password(password, salt) == *hash,
        Credential::LegacyPlaintext(stored) => password == stored,
        Credential::Unprotected => false,
    }
}

/// One requirement of the password policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Requirement {
    MinLength,
    Uppercase,
    Lowercase,
    Digit,
    Symbol,
}

impl Requirement {
    pub fn describe(self) -> String {
        match self {
            Requirement::MinLength => format!("at least {} characters", MIN_PASSWORD_LENGTH),
            Requirement::Uppercase => "an uppercase letter".to_string(),
            Requirement::Lowercase => "a lowercase letter".to_string(),
            Requirement::Digit => "a number".to_string(),
            Requirement::Symbol => "a special character".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StrengthReport {
    pub valid: bool,
    pub message: String,
    pub missing: Vec<Requirement>,
}

pub fn validate_strength(password: &str) -> StrengthReport {
    let mut missing = Vec::new();
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        missing.push(Requirement::MinLength);
    }
    if !password.chars().any(char::is_uppercase) {
        missing.push(Requirement::Uppercase);
    }
    if !password.chars().any(char::is_lowercase) {
        missing.push(Requirement::Lowercase);
    }
    if !password.chars().any(|c| c.is_ascii_digit()) {
        missing.push(Requirement::Digit);
    }
    if !password.chars().any(|c| !c.is_alphanumeric()) {
        missing.push(Requirement::Symbol);
    }

    if missing.is_empty() {
        return StrengthReport {
            valid: true,
            message: "Password is strong".to_string(),
            missing,
        };
    }

    let list: Vec<String> = missing.iter().map(|r| r.describe()).collect();
    StrengthReport {
        valid: false,
        message: format!("Password must contain {}", list.join(", ")),
        missing,
    }
}

// ── Access challenge ──

/// What the user is asked to unlock.
#[derive(Debug, Clone)]
pub struct PasswordChallenge {
    pub note_id: String,
    pub note_title: String,
}

impl PasswordChallenge {
    pub fn for_note(note: &Note) -> Self {
        Self {
            note_id: note.id.clone(),
            note_title: note.title.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PromptOutcome {
    Entered(String),
    Cancelled,
}

/// Asks the user for a note password without blocking the caller's thread.
#[async_trait]
pub trait PasswordPrompt: Send + Sync {
    async fn request_password(&self, challenge: &PasswordChallenge) -> PromptOutcome;
}

/// A password that arrived together with the request.
#[derive(Debug, Clone)]
pub struct SuppliedPassword(pub Option<String>);

#[async_trait]
impl PasswordPrompt for SuppliedPassword {
    async fn request_password(&self, _challenge: &PasswordChallenge) -> PromptOutcome {
        match &self.0 {
            Some(password) => PromptOutcome::Entered(password.clone()),
            None => PromptOutcome::Cancelled,
        }
    }
}

/// A pending challenge handed to whoever drives the dialog.
/// Dropping `respond` without answering cancels the challenge.
#[derive(Debug)]
pub struct PasswordRequest {
    pub challenge: PasswordChallenge,
    pub respond: oneshot::Sender<Option<String>>,
}

/// Forwards challenges over a channel and waits for the answer.
#[derive(Debug, Clone)]
pub struct ChannelPrompt {
    tx: mpsc::Sender<PasswordRequest>,
}

impl ChannelPrompt {
    pub fn new(buffer: usize) -> (Self, mpsc::Receiver<PasswordRequest>) {
        let (tx, rx) = mpsc::channel(buffer);
        (Self { tx }, rx)
    }
}

#[async_trait]
impl PasswordPrompt for ChannelPrompt {
    async fn request_password(&self, challenge: &PasswordChallenge) -> PromptOutcome {
        let (respond, answer) = oneshot::channel();
        let request = PasswordRequest {
            challenge: challenge.clone(),
            respond,
        };
        if self.tx.send(request).await.is_err() {
            return PromptOutcome::Cancelled;
        }
        match answer.await {
            Ok(Some(password)) => PromptOutcome::Entered(password),
            Ok(None) | Err(_) => PromptOutcome::Cancelled,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notification {
    pub title: String,
    pub description: String,
}

impl Notification {
    pub fn access_denied() -> Self {
        Self {
            title: ACCESS_DENIED_TITLE.to_string(),
            description: ACCESS_DENIED_MESSAGE.to_string(),
        }
    }
}

/// Receives user-visible notices.
pub trait Notifier: Send + Sync {
    fn notify(&self, notification: Notification);
}

/// Writes notices to the log.
#[derive(Debug, Default)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, notification: Notification) {
        tracing::warn!(title = %notification.title, "{}", notification.description);
    }
}

/// Keeps every notice so the caller can report it.
#[derive(Debug, Default)]
pub struct NotificationLog {
    entries: Mutex<Vec<Notification>>,
}

impl NotificationLog {
    pub fn take(&self) -> Vec<Notification> {
        match self.entries.lock() {
            Ok(mut entries) => std::mem::take(&mut *entries),
            Err(poisoned) => std::mem::take(&mut *poisoned.into_inner()),
        }
    }
}

impl Notifier for NotificationLog {
    fn notify(&self, notification: Notification) {
        tracing::warn!(title = %notification.title, "{}", notification.description);
        match self.entries.lock() {
            Ok(mut entries) => entries.push(notification),
            Err(poisoned) => poisoned.into_inner().push(notification),
        }
    }
}

/// Gate in front of a protected note.
///
/// Unprotected notes pass without a prompt. For protected notes, a
/// cancelled prompt, an empty password or a wrong password all deny access
/// and raise exactly one notification.
pub async fn check_access<P, N>(note: &Note, prompt: &P, notifier: &N) -> bool
where
    P: PasswordPrompt + ?Sized,
    N: Notifier + ?Sized,
{
    if !note.is_password_protected() {
        return true;
    }

    let granted = match prompt.request_password(&PasswordChallenge::for_note(note)).await {
        PromptOutcome::Entered(password) => verify(&note.credential, &password),
        PromptOutcome::Cancelled => false,
    };

    if !granted {
        tracing::debug!(note_id = %note.id, "note access denied");
        notifier.notify(Notification::access_denied());
    }
    granted
}
