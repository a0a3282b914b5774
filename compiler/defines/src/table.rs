use log::debug;
use rustc_hash::FxHashMap;

use crate::errors::try_copy;
use crate::{DefineError, DefineKind, Definition};

#[derive(Debug, Clone)]
struct Entry {
    def: Definition,
    /// Set by `remove`; the name stays known but is not applied to runs
    removed: bool,
}

/// The command-line definitions of a preprocessor context.
///
/// Entries keep the position of their first registration; re-registering a
/// name only replaces its value. The table outlives individual runs.
#[derive(Debug, Default, Clone)]
pub struct DefineTable {
    entries: Vec<Entry>,
    index: FxHashMap<String, usize>,
}
impl DefineTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Binds `name` to `value`, replacing the value of an existing entry in place.
    ///
    /// On failure the table is left unchanged.
    pub fn add_or_update(&mut self, name: &str, value: &str) -> Result<(), DefineError> {
        if name.is_empty() {
            return Err(DefineError::EmptyName);
        }

        if let Some(&i) = self.index.get(name) {
            let value = try_copy(value)?;
            let entry = &mut self.entries[i];
            debug!("redefining `{}` as `{}`", name, value);
            entry.def.value = value;
            entry.removed = false;
            return Ok(());
        }

        let def = Definition::try_new(name, value, DefineKind::Ordinary)?;
        let key = try_copy(name)?;
        self.entries.try_reserve(1)?;
        self.index.try_reserve(1)?;
        debug!("defining `{}`", def);
        self.index.insert(key, self.entries.len());
        self.entries.push(Entry {
            def,
            removed: false,
        });
        Ok(())
    }

    /// Clears the value of `name`, if it was ever registered.
    ///
    /// The name remains in the table, so `lookup` reports it as defined with
    /// an empty value rather than never defined.
    pub fn remove(&mut self, name: &str) {
        if let Some(&i) = self.index.get(name) {
            debug!("undefining `{}`", name);
            let entry = &mut self.entries[i];
            entry.def.value = String::new();
            entry.removed = true;
        }
    }

    /// Registers a definition written as `NAME=VALUE` or `NAME`.
    ///
    /// The split happens at the first `=`, so values may contain `=`.
    pub fn add_cmdline(&mut self, spec: &str) -> Result<(), DefineError> {
        let (name, value) = spec.split_once('=').unwrap_or((spec, ""));
        self.add_or_update(name, value)
    }

    pub fn get(&self, name: &str) -> Option<&Definition> {
        self.index.get(name).map(|&i| &self.entries[i].def)
    }

    /// Returns the value bound to `name`, `None` if it was never registered
    pub fn lookup(&self, name: &str) -> Option<&str> {
        self.get(name).map(|def| def.value.as_str())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// Every entry, in order of first registration
    pub fn iter(&self) -> impl Iterator<Item = &Definition> + '_ {
        self.entries.iter().map(|e| &e.def)
    }

    /// The entries applied at the start of a run, in order of first registration
    pub fn active(&self) -> impl Iterator<Item = &Definition> + '_ {
        self.entries
            .iter()
            .filter(|e| !e.removed)
            .map(|e| &e.def)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> + '_ {
        self.iter().map(|def| def.name.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
