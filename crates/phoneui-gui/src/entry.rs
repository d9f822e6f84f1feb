//! Typed backend entry points.
//!
//! A backend exports entry points under operation names. Every entry point
//! has one of a small set of [`Signature`]s; callers dispatch with matching
//! [`Args`] and a mismatch is reported instead of invoked.

use std::fmt;
use std::sync::Arc;

/// Callback a backend invokes to request application shutdown.
pub type ExitNotify = Arc<dyn Fn() + Send + Sync>;

pub type InitFn = Arc<dyn Fn(&[String], ExitNotify) + Send + Sync>;
pub type UnitFn = Arc<dyn Fn() + Send + Sync>;
pub type IntFn = Arc<dyn Fn(i32) + Send + Sync>;
pub type CallStatusFn = Arc<dyn Fn(i32, i32, &str) + Send + Sync>;
pub type NameNumberFn = Arc<dyn Fn(Option<&str>, Option<&str>) + Send + Sync>;
pub type ModeMessageFn = Arc<dyn Fn(i32, &str) + Send + Sync>;

/// Shape of an entry point.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Signature {
    /// `(args, exit_notify)`
    Init,
    /// `()`
    Unit,
    /// `(id)`, `(status)` or `(dialog_type)`
    Int,
    /// `(id, status, number)`
    CallStatus,
    /// `(name, number)`
    NameNumber,
    /// `(mode, message)`
    ModeMessage,
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Signature::Init => "fn(&[String], ExitNotify)",
            Signature::Unit => "fn()",
            Signature::Int => "fn(i32)",
            Signature::CallStatus => "fn(i32, i32, &str)",
            Signature::NameNumber => "fn(Option<&str>, Option<&str>)",
            Signature::ModeMessage => "fn(i32, &str)",
        })
    }
}

/// An entry point exported by a backend.
#[derive(Clone)]
pub enum EntryPoint {
    Init(InitFn),
    Unit(UnitFn),
    Int(IntFn),
    CallStatus(CallStatusFn),
    NameNumber(NameNumberFn),
    ModeMessage(ModeMessageFn),
}

impl EntryPoint {
    pub fn init(f: impl Fn(&[String], ExitNotify) + Send + Sync + 'static) -> Self {
        Self::Init(Arc::new(f))
    }

    pub fn unit(f: impl Fn() + Send + Sync + 'static) -> Self {
        Self::Unit(Arc::new(f))
    }

    pub fn int(f: impl Fn(i32) + Send + Sync + 'static) -> Self {
        Self::Int(Arc::new(f))
    }

    pub fn call_status(f: impl Fn(i32, i32, &str) + Send + Sync + 'static) -> Self {
        Self::CallStatus(Arc::new(f))
    }

    pub fn name_number(f: impl Fn(Option<&str>, Option<&str>) + Send + Sync + 'static) -> Self {
        Self::NameNumber(Arc::new(f))
    }

    pub fn mode_message(f: impl Fn(i32, &str) + Send + Sync + 'static) -> Self {
        Self::ModeMessage(Arc::new(f))
    }

    pub fn signature(&self) -> Signature {
        match self {
            EntryPoint::Init(_) => Signature::Init,
            EntryPoint::Unit(_) => Signature::Unit,
            EntryPoint::Int(_) => Signature::Int,
            EntryPoint::CallStatus(_) => Signature::CallStatus,
            EntryPoint::NameNumber(_) => Signature::NameNumber,
            EntryPoint::ModeMessage(_) => Signature::ModeMessage,
        }
    }

    /// Invokes the entry point if `args` matches its signature.
    ///
    /// On mismatch nothing is called and the entry point's own signature is
    /// returned.
    pub fn invoke(&self, args: Args<'_>) -> Result<(), Signature> {
        match (self, args) {
            (EntryPoint::Init(f), Args::Init(argv, exit)) => f(argv, exit),
            (EntryPoint::Unit(f), Args::Unit) => f(),
            (EntryPoint::Int(f), Args::Int(v)) => f(v),
            (EntryPoint::CallStatus(f), Args::CallStatus(id, status, number)) => {
                f(id, status, number)
            }
            (EntryPoint::NameNumber(f), Args::NameNumber(name, number)) => f(name, number),
            (EntryPoint::ModeMessage(f), Args::ModeMessage(mode, message)) => f(mode, message),
            _ => return Err(self.signature()),
        }
        Ok(())
    }
}

impl fmt::Debug for EntryPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("EntryPoint").field(&self.signature()).finish()
    }
}

/// Arguments of one dispatch.
#[derive(Clone)]
pub enum Args<'a> {
    Init(&'a [String], ExitNotify),
    Unit,
    Int(i32),
    CallStatus(i32, i32, &'a str),
    NameNumber(Option<&'a str>, Option<&'a str>),
    ModeMessage(i32, &'a str),
}

impl Args<'_> {
    pub fn signature(&self) -> Signature {
        match self {
            Args::Init(..) => Signature::Init,
            Args::Unit => Signature::Unit,
            Args::Int(_) => Signature::Int,
            Args::CallStatus(..) => Signature::CallStatus,
            Args::NameNumber(..) => Signature::NameNumber,
            Args::ModeMessage(..) => Signature::ModeMessage,
        }
    }
}
