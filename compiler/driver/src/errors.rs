use std::io;
use std::path::PathBuf;

use preproc_defines::DefineError;
use preproc_diagnostics::Status;
use preproc_engine::ScopeError;

/// A run that could not be carried out to completion
#[derive(Debug, thiserror::Error)]
pub enum DriverError {
    #[error("failed to establish a macro scope for the run")]
    Setup(#[from] ScopeError),

    #[error("failed to register a macro definition")]
    Define(#[from] DefineError),

    #[error("could not open input file {path:?}")]
    InputOpen {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to write output")]
    Output(#[source] io::Error),

    #[error("could not create temporary output file {template:?}")]
    TempFile {
        template: String,
        #[source]
        source: io::Error,
    },
}
impl DriverError {
    pub const SETUP_CODE: i32 = 4;
    pub const IO_CODE: i32 = 2;
    pub const TEMP_FILE_CODE: i32 = 3;

    /// The status a caller should observe for this failure
    pub fn status(&self) -> Status {
        Status::new(self.exit_code())
    }

    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Setup(_) | Self::Define(_) => Self::SETUP_CODE,
            Self::InputOpen { .. } | Self::Output(_) => Self::IO_CODE,
            Self::TempFile { .. } => Self::TEMP_FILE_CODE,
        }
    }
}
