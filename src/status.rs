/// Outcome class of an HTTP status code.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum StatusClass {
    /// 1xx to 3xx.
    Success,
    /// The same request cannot succeed: 4xx, 501, 0 and anything above 599.
    NonRecoverable,
    /// Transient server failure: 5xx other than 501.
    Recoverable,
}

impl StatusClass {
    pub fn is_success(self) -> bool {
        self == Self::Success
    }

    pub fn is_recoverable(self) -> bool {
        self == Self::Recoverable
    }
}

/// Classifies a numeric HTTP status code.
///
/// Out-of-range codes (0 and above 599) are treated as corrupted signals and
/// are never retried. 501 Not Implemented is permanent.
pub fn classify_status(code: u16) -> StatusClass {
    match code {
        0 | 600.. => StatusClass::NonRecoverable,
        1..=399 => StatusClass::Success,
        400..=499 | 501 => StatusClass::NonRecoverable,
        _ => StatusClass::Recoverable,
    }
}
