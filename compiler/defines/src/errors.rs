use std::collections::TryReserveError;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DefineError {
    #[error("unable to allocate storage for a definition")]
    Allocation(#[from] TryReserveError),

    #[error("macro names must not be empty")]
    EmptyName,
}

/// Copies `s` into fresh storage, reporting exhaustion instead of aborting
pub(crate) fn try_copy(s: &str) -> Result<String, DefineError> {
    let mut copy = String::new();
    copy.try_reserve_exact(s.len())?;
    copy.push_str(s);
    Ok(copy)
}
