use std::fmt;

/// The integer outcome of a preprocessing step.
///
/// Zero is success; any other value is the severity or failure code reported
/// to the caller, and ultimately the process exit code.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq, Hash)]
pub struct Status(i32);
impl Status {
    pub const SUCCESS: Self = Self(0);
    /// The run completed, but errors were reported along the way
    pub const FAILED: Self = Self(1);

    #[inline]
    pub const fn new(code: i32) -> Self {
        Self(code)
    }

    #[inline]
    pub const fn code(self) -> i32 {
        self.0
    }

    #[inline]
    pub const fn is_success(self) -> bool {
        self.0 == 0
    }

    /// Promotes a nominally successful result to the accumulated diagnostic state.
    ///
    /// A non-zero result is kept as-is.
    pub fn or_diagnostics(self, state: Status) -> Status {
        if self.is_success() {
            state
        } else {
            self
        }
    }
}
impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
impl From<Status> for i32 {
    fn from(status: Status) -> i32 {
        status.0
    }
}
