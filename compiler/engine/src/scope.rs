use std::collections::TryReserveError;

use log::{debug, warn};
use rustc_hash::FxHashMap;

use preproc_defines::{DefineError, Definition};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ScopeError {
    #[error("macro scopes nested deeper than {limit}")]
    TooDeep { limit: usize },

    #[error("unable to allocate a macro scope")]
    Allocation(#[from] TryReserveError),
}

/// `None` marks a name undefined in this frame, shadowing outer frames
type Frame = FxHashMap<String, Option<Definition>>;

/// A stack of macro tables.
///
/// Lookups see the newest binding of a name across all frames. Popping a frame
/// discards everything defined or undefined since the matching push. The base
/// frame is never popped.
#[derive(Debug, Clone)]
pub struct MacroScopes {
    frames: Vec<Frame>,
}
impl MacroScopes {
    pub const MAX_DEPTH: usize = 256;

    pub fn new() -> Self {
        Self {
            frames: vec![Frame::default()],
        }
    }

    /// The number of save points currently pushed
    pub fn depth(&self) -> usize {
        self.frames.len() - 1
    }

    pub fn push(&mut self) -> Result<(), ScopeError> {
        if self.depth() >= Self::MAX_DEPTH {
            return Err(ScopeError::TooDeep {
                limit: Self::MAX_DEPTH,
            });
        }
        self.frames.try_reserve(1)?;
        self.frames.push(Frame::default());
        debug!("pushed macro scope, depth is now {}", self.depth());
        Ok(())
    }

    pub fn pop(&mut self) {
        if self.depth() == 0 {
            warn!("attempted to pop the base macro scope");
            return;
        }
        let frame = self.frames.pop().unwrap_or_default();
        debug!(
            "popped macro scope with {} bindings, depth is now {}",
            frame.len(),
            self.depth()
        );
    }

    fn top(&mut self) -> &mut Frame {
        let top = self.frames.len() - 1;
        &mut self.frames[top]
    }

    /// Binds `def` in the newest frame, returning the binding it hides, if any
    pub fn define(&mut self, def: Definition) -> Result<Option<Definition>, DefineError> {
        let previous = self.lookup(&def.name).cloned();
        let top = self.top();
        top.try_reserve(1)?;
        top.insert(def.name.clone(), Some(def));
        Ok(previous)
    }

    /// Makes `name` undefined from here on, returning true if it was defined
    pub fn undefine(&mut self, name: &str) -> bool {
        let was_defined = self.is_defined(name);
        let top = self.frames.len() - 1;
        let outer = self.frames[..top]
            .iter()
            .rev()
            .find_map(|frame| frame.get(name))
            .map_or(false, Option::is_some);
        if outer {
            self.frames[top].insert(name.to_string(), None);
        } else {
            self.frames[top].remove(name);
        }
        was_defined
    }

    pub fn lookup(&self, name: &str) -> Option<&Definition> {
        self.frames
            .iter()
            .rev()
            .find_map(|frame| frame.get(name))
            .and_then(Option::as_ref)
    }

    pub fn is_defined(&self, name: &str) -> bool {
        self.lookup(name).is_some()
    }
}
impl Default for MacroScopes {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn pop_discards_scope_local_bindings() {
        let mut scopes = MacroScopes::new();
        scopes.define(Definition::new("BASE", "0")).unwrap();
        scopes.push().unwrap();
        scopes.define(Definition::new("LOCAL", "1")).unwrap();
        assert!(scopes.is_defined("BASE") && scopes.is_defined("LOCAL"));

        scopes.pop();
        assert!(scopes.is_defined("BASE"));
        assert!(!scopes.is_defined("LOCAL"));
        assert_eq!(scopes.depth(), 0);
    }

    #[test]
    fn undefine_shadows_outer_frames_until_popped() {
        let mut scopes = MacroScopes::new();
        scopes.define(Definition::new("X", "outer")).unwrap();
        scopes.push().unwrap();

        assert!(scopes.undefine("X"));
        assert!(!scopes.is_defined("X"));
        assert!(!scopes.undefine("X"));

        scopes.pop();
        assert_eq!(scopes.lookup("X").map(|d| d.value.as_str()), Some("outer"));
    }

    #[test]
    fn define_reports_hidden_binding() {
        let mut scopes = MacroScopes::new();
        assert_eq!(scopes.define(Definition::new("X", "1")).unwrap(), None);
        scopes.push().unwrap();

        let hidden = scopes.define(Definition::new("X", "2")).unwrap();
        assert_eq!(hidden, Some(Definition::new("X", "1")));
        assert_eq!(scopes.lookup("X").map(|d| d.value.as_str()), Some("2"));
    }

    #[test]
    fn base_frame_is_never_popped() {
        let mut scopes = MacroScopes::new();
        scopes.define(Definition::new("X", "1")).unwrap();
        scopes.pop();

        assert!(scopes.is_defined("X"));
    }

    #[test]
    fn nesting_is_bounded() {
        let mut scopes = MacroScopes::new();
        for _ in 0..MacroScopes::MAX_DEPTH {
            scopes.push().unwrap();
        }

        assert_eq!(
            scopes.push(),
            Err(ScopeError::TooDeep {
                limit: MacroScopes::MAX_DEPTH
            })
        );
    }
}
