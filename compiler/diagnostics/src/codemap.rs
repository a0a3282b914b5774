use std::cmp::Ordering;
use std::ops::Range;

use super::*;

/// Identifies a source registered with a [`CodeMap`]
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SourceId(u32);
impl SourceId {
    #[inline]
    fn new(index: usize) -> Self {
        Self(index as u32)
    }

    #[inline]
    fn index(self) -> usize {
        self.0 as usize
    }
}

/// A single source seen during a run, with precomputed line offsets
#[derive(Debug, Clone)]
pub struct SourceFile {
    name: String,
    source: String,
    line_starts: Vec<usize>,
}
impl SourceFile {
    fn new(name: String, source: String) -> Self {
        let line_starts = files::line_starts(&source).collect();
        Self {
            name,
            source,
            line_starts,
        }
    }

    pub fn name(&self) -> &str {
        self.name.as_str()
    }

    pub fn source(&self) -> &str {
        self.source.as_str()
    }

    fn line_start(&self, line_index: usize) -> Result<usize, Error> {
        match line_index.cmp(&self.line_starts.len()) {
            Ordering::Less => Ok(self.line_starts[line_index]),
            Ordering::Equal => Ok(self.source.len()),
            Ordering::Greater => Err(Error::LineTooLarge {
                given: line_index,
                max: self.line_starts.len() - 1,
            }),
        }
    }

    /// Returns the byte range of the given zero-based line, including its terminator
    pub fn line_span(&self, line_index: usize) -> Result<Range<usize>, Error> {
        let start = self.line_start(line_index)?;
        let end = self.line_start(line_index + 1)?;
        Ok(start..end)
    }

    pub fn line_index(&self, byte_index: usize) -> usize {
        self.line_starts
            .binary_search(&byte_index)
            .unwrap_or_else(|next_line| next_line - 1)
    }
}

/// The set of sources read during a single run, used to render diagnostic labels
#[derive(Debug, Default, Clone)]
pub struct CodeMap {
    files: Vec<SourceFile>,
}
impl CodeMap {
    /// Creates an empty `CodeMap`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a file to the map, returning the handle that can be used to
    /// refer to it again.
    ///
    /// Files are not de-duplicated, the same path included twice is two sources.
    pub fn add(&mut self, name: impl Into<String>, source: String) -> SourceId {
        let id = SourceId::new(self.files.len());
        self.files.push(SourceFile::new(name.into(), source));
        id
    }

    /// Get the file corresponding to the given id.
    pub fn get(&self, file_id: SourceId) -> Result<&SourceFile, Error> {
        self.files.get(file_id.index()).ok_or(Error::FileMissing)
    }

    pub fn line_span(&self, file_id: SourceId, line_index: usize) -> Result<Range<usize>, Error> {
        self.get(file_id)?.line_span(line_index)
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub fn clear(&mut self) {
        self.files.clear();
    }
}
impl<'a> Files<'a> for CodeMap {
    type FileId = SourceId;
    type Name = &'a str;
    type Source = &'a str;

    fn name(&'a self, file_id: Self::FileId) -> Result<Self::Name, Error> {
        Ok(self.get(file_id)?.name())
    }

    fn source(&'a self, file_id: Self::FileId) -> Result<&'a str, Error> {
        Ok(self.get(file_id)?.source())
    }

    fn line_index(&'a self, file_id: Self::FileId, byte_index: usize) -> Result<usize, Error> {
        Ok(self.get(file_id)?.line_index(byte_index))
    }

    fn line_range(&'a self, file_id: Self::FileId, line_index: usize) -> Result<Range<usize>, Error> {
        self.line_span(file_id, line_index)
    }
}
