use std::any::Any;
use std::panic::{self, AssertUnwindSafe};

use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};

/// Gravity of a [`Status`], ordered from harmless to fatal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Severity {
    Ok,
    Info,
    Warning,
    Failure,
    Error,
    /// A call that asked to be skipped. Counts as a failure but never forces
    /// the owning agent to be killed.
    Cancel,
    /// The owning kernel is unreachable.
    Fatal,
}

impl Severity {
    pub fn is_success(self) -> bool {
        matches!(self, Severity::Ok | Severity::Info | Severity::Warning)
    }

    pub fn is_failure(self) -> bool {
        !self.is_success()
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Severity::Ok => "OK",
            Severity::Info => "INFO",
            Severity::Warning => "WARNING",
            Severity::Failure => "FAILURE",
            Severity::Error => "ERROR",
            Severity::Cancel => "CANCEL",
            Severity::Fatal => "FATAL",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StatusCode {
    Ok,
    NoKernel,
    AgentNotFound,
    AgentIsDead,
    KillForbidden,
    AlreadyLaunched,
    UnexpectedStateDuringActivation,
    UnexpectedStateDuringDestruction,
    NoTerminationWatchdog,
    InvalidParameters,
    Panicked,
    Rejected,
    Custom(u32),
}

#[derive(Debug, Clone, PartialEq)]
struct SingleStatus {
    severity: Severity,
    code: StatusCode,
    provider: Option<String>,
    message: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
enum Repr {
    Single(SingleStatus),
    /// Sorted gravest first; never empty.
    Multiple(Vec<Status>),
}

/// Outcome of a life-cycle call or of a batch of them.
///
/// A composite status takes the severity, code, provider and message of its
/// gravest member, so it is a success only when every member is.
#[derive(Debug, Clone, PartialEq)]
pub struct Status {
    repr: Repr,
}

impl Status {
    pub fn new(severity: Severity, code: StatusCode) -> Self {
        Self {
            repr: Repr::Single(SingleStatus {
                severity,
                code,
                provider: None,
                message: None,
            }),
        }
    }

    pub fn ok() -> Self {
        Self::new(Severity::Ok, StatusCode::Ok)
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self::new(Severity::Info, StatusCode::Ok).with_message(message)
    }

    pub fn warning(code: StatusCode) -> Self {
        Self::new(Severity::Warning, code)
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self::new(Severity::Failure, StatusCode::Custom(0)).with_message(message)
    }

    pub fn error(code: StatusCode) -> Self {
        Self::new(Severity::Error, code)
    }

    pub fn cancel() -> Self {
        Self::new(Severity::Cancel, StatusCode::Ok)
    }

    pub fn fatal(code: StatusCode) -> Self {
        Self::new(Severity::Fatal, code)
    }

    pub fn from_panic(payload: &(dyn Any + Send)) -> Self {
        Self::new(Severity::Failure, StatusCode::Panicked).with_message(panic_message(payload))
    }

    /// Sets the provider on a single status. A composite keeps the providers
    /// of its members.
    pub fn with_provider(mut self, provider: impl Into<String>) -> Self {
        if let Repr::Single(ref mut single) = self.repr {
            single.provider = Some(provider.into());
        }
        self
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        if let Repr::Single(ref mut single) = self.repr {
            single.message = Some(message.into());
        }
        self
    }

    /// Packs two statuses into one, as [`MultipleStatus::pack`] does.
    pub fn merge(self, other: Status, provider: impl Into<String>) -> Self {
        let mut ms = MultipleStatus::new();
        ms.push(self);
        ms.push(other);
        ms.pack(provider)
    }

    fn head(&self) -> &SingleStatus {
        match &self.repr {
            Repr::Single(single) => single,
            Repr::Multiple(children) => children[0].head(),
        }
    }

    pub fn severity(&self) -> Severity {
        self.head().severity
    }

    pub fn code(&self) -> StatusCode {
        self.head().code
    }

    pub fn provider(&self) -> Option<&str> {
        self.head().provider.as_deref()
    }

    pub fn message(&self) -> Option<&str> {
        self.head().message.as_deref()
    }

    pub fn is_success(&self) -> bool {
        self.severity().is_success()
    }

    pub fn is_failure(&self) -> bool {
        self.severity().is_failure()
    }

    pub fn is_composite(&self) -> bool {
        matches!(self.repr, Repr::Multiple(_))
    }

    /// Members of a composite, or the status itself.
    pub fn members(&self) -> &[Status] {
        match &self.repr {
            Repr::Single(_) => std::slice::from_ref(self),
            Repr::Multiple(children) => children,
        }
    }

    /// True when this status or any member has the given severity.
    pub fn matches(&self, severity: Severity) -> bool {
        match &self.repr {
            Repr::Single(single) => single.severity == severity,
            Repr::Multiple(children) => children.iter().any(|c| c.matches(severity)),
        }
    }

    pub fn is_loggable(&self) -> bool {
        self.severity() != Severity::Ok
    }

    /// Emits this status through `tracing` at the level matching its severity.
    pub fn log(&self) {
        match &self.repr {
            Repr::Multiple(children) => children.iter().for_each(Status::log),
            Repr::Single(single) => {
                let provider = single.provider.as_deref().unwrap_or("-");
                let message = single.message.as_deref().unwrap_or("");
                match single.severity {
                    Severity::Ok => {}
                    Severity::Info => info!(provider, code = ?single.code, "{}", message),
                    Severity::Warning => warn!(provider, code = ?single.code, "{}", message),
                    severity => error!(
                        provider,
                        code = ?single.code,
                        severity = %severity,
                        "{}",
                        message
                    ),
                }
            }
        }
    }
}

impl Default for Status {
    fn default() -> Self {
        Self::ok()
    }
}

impl std::fmt::Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.repr {
            Repr::Single(single) => {
                write!(f, "[{}] {:?}", single.severity, single.code)?;
                if let Some(provider) = &single.provider {
                    write!(f, " from {}", provider)?;
                }
                if let Some(message) = &single.message {
                    write!(f, ": {}", message)?;
                }
                Ok(())
            }
            Repr::Multiple(children) => {
                for (i, child) in children.iter().enumerate() {
                    if i > 0 {
                        writeln!(f)?;
                    }
                    write!(f, "{}", child)?;
                }
                Ok(())
            }
        }
    }
}

/// Accumulates statuses of a batch of calls.
#[derive(Debug, Clone, Default)]
pub struct MultipleStatus {
    children: Vec<Status>,
}

impl MultipleStatus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, status: Status) {
        self.children.push(status);
    }

    pub fn len(&self) -> usize {
        self.children.len()
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    /// Collapses the batch: successes are dropped when something went wrong,
    /// a single success is kept otherwise, and an empty batch is OK.
    pub fn pack(self, provider: impl Into<String>) -> Status {
        let mut success: Option<Status> = None;
        let mut kept: Vec<Status> = Vec::with_capacity(self.children.len());

        for child in self.children {
            let child = match child.repr {
                Repr::Multiple(grand) => MultipleStatus { children: grand }.pack(String::new()),
                Repr::Single(_) => child,
            };
            if child.is_composite() {
                kept.extend(child.members().iter().cloned());
            } else if matches!(child.severity(), Severity::Ok | Severity::Info) {
                if success.is_none() {
                    success = Some(child);
                }
            } else {
                kept.push(child);
            }
        }

        if kept.is_empty() {
            if let Some(s) = success {
                kept.push(s);
            }
        }

        // stable: equal severities keep insertion order
        kept.sort_by(|a, b| b.severity().cmp(&a.severity()));

        match kept.len() {
            0 => Status::ok().with_provider(provider),
            1 => kept.remove(0),
            _ => Status {
                repr: Repr::Multiple(kept),
            },
        }
    }
}

impl Extend<Status> for MultipleStatus {
    fn extend<I: IntoIterator<Item = Status>>(&mut self, iter: I) {
        self.children.extend(iter);
    }
}

pub fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

/// Runs a life-cycle call and turns a panic into a FAILURE status.
///
/// Assertion panics (`assert!`, `assert_eq!`, ...) are re-raised: they flag
/// a broken invariant of the kernel itself.
pub fn guarded<F>(provider: &str, f: F) -> Status
where
    F: FnOnce() -> Status,
{
    match panic::catch_unwind(AssertUnwindSafe(f)) {
        Ok(status) => status,
        Err(payload) => {
            let message = panic_message(payload.as_ref());
            if message.starts_with("assertion") {
                panic::resume_unwind(payload);
            }
            Status::new(Severity::Failure, StatusCode::Panicked)
                .with_provider(provider)
                .with_message(message)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_severity_classes() {
        assert!(Severity::Ok.is_success());
        assert!(Severity::Info.is_success());
        assert!(Severity::Warning.is_success());
        assert!(Severity::Failure.is_failure());
        assert!(Severity::Error.is_failure());
        assert!(Severity::Cancel.is_failure());
        assert!(Severity::Fatal.is_failure());
    }

    #[test]
    fn test_empty_pack_is_ok() {
        let status = MultipleStatus::new().pack("batch");
        assert!(status.is_success());
        assert_eq!(status.severity(), Severity::Ok);
        assert_eq!(status.provider(), Some("batch"));
    }

    #[test]
    fn test_pack_keeps_single_success() {
        let mut ms = MultipleStatus::new();
        ms.push(Status::ok().with_provider("a"));
        ms.push(Status::ok().with_provider("b"));
        let status = ms.pack("batch");
        assert!(!status.is_composite());
        assert_eq!(status.provider(), Some("a"));
    }

    #[test]
    fn test_composite_success_only_if_all_succeed() {
        let mut ms = MultipleStatus::new();
        ms.push(Status::ok());
        ms.push(Status::warning(StatusCode::AlreadyLaunched));
        assert!(ms.pack("batch").is_success());

        let mut ms = MultipleStatus::new();
        ms.push(Status::ok());
        ms.push(Status::warning(StatusCode::AlreadyLaunched));
        ms.push(Status::failure("boom"));
        let status = ms.pack("batch");
        assert!(status.is_failure());
        assert!(status.is_composite());
        assert_eq!(status.severity(), Severity::Failure);
        assert_eq!(status.members().len(), 2);
        assert!(status.matches(Severity::Warning));
        assert!(!status.matches(Severity::Ok));
    }

    #[test]
    fn test_gravest_member_first() {
        let mut ms = MultipleStatus::new();
        ms.push(Status::warning(StatusCode::AgentIsDead));
        ms.push(Status::fatal(StatusCode::NoKernel));
        ms.push(Status::error(StatusCode::KillForbidden));
        let status = ms.pack("batch");
        assert_eq!(status.severity(), Severity::Fatal);
        assert_eq!(status.code(), StatusCode::NoKernel);
    }

    #[test]
    fn test_merge_flattens_composites() {
        let a = Status::failure("a").merge(Status::error(StatusCode::KillForbidden), "x");
        let b = a.merge(Status::warning(StatusCode::AgentIsDead), "y");
        assert_eq!(b.members().len(), 3);
        assert_eq!(b.severity(), Severity::Error);
    }

    #[test]
    fn test_guarded_converts_panics() {
        let status = guarded("agent", || panic!("exploded"));
        assert_eq!(status.severity(), Severity::Failure);
        assert_eq!(status.code(), StatusCode::Panicked);
        assert_eq!(status.message(), Some("exploded"));
        assert_eq!(status.provider(), Some("agent"));
    }

    #[test]
    fn test_guarded_passes_through() {
        let status = guarded("agent", Status::cancel);
        assert_eq!(status.severity(), Severity::Cancel);
    }

    #[test]
    #[should_panic(expected = "assertion")]
    fn test_guarded_reraises_assertions() {
        guarded("agent", || {
            assert_eq!(1, 2);
            Status::ok()
        });
    }
}
