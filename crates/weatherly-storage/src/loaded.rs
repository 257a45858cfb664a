/// Outcome of a non-critical read.
///
/// A read that failed still yields a usable value; `Degraded` carries the
/// reason so callers can report it instead of silently dropping it.
#[derive(Debug, Clone, PartialEq)]
pub enum Loaded<T> {
    Fresh(T),
    Degraded { value: T, reason: String },
}

impl<T> Loaded<T> {
    pub fn degraded(value: T, reason: impl Into<String>) -> Self {
        Loaded::Degraded {
            value,
            reason: reason.into(),
        }
    }

    pub fn value(&self) -> &T {
        match self {
            Loaded::Fresh(value) | Loaded::Degraded { value, .. } => value,
        }
    }

    pub fn into_value(self) -> T {
        match self {
            Loaded::Fresh(value) | Loaded::Degraded { value, .. } => value,
        }
    }

    pub fn is_degraded(&self) -> bool {
        matches!(self, Loaded::Degraded { .. })
    }

    pub fn reason(&self) -> Option<&str> {
        match self {
            Loaded::Fresh(_) => None,
            Loaded::Degraded { reason, .. } => Some(reason),
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Loaded<U> {
        match self {
            Loaded::Fresh(value) => Loaded::Fresh(f(value)),
            Loaded::Degraded { value, reason } => Loaded::Degraded {
                value: f(value),
                reason,
            },
        }
    }
}
