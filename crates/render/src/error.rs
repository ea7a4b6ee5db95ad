use crate::backend::{MeshHandle, ProgramHandle};
use wireorbit_common::GeometryError;

/// Errors from GPU resource management and draw submission.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RenderError {
    #[error("invalid geometry: {0}")]
    Geometry(#[from] GeometryError),
    #[error("object '{label}' rendered before initialize")]
    Uninitialized { label: String },
    #[error("object '{label}' is already initialized")]
    AlreadyInitialized { label: String },
    #[error("shader build failed:\n{log}")]
    ShaderBuild { log: String },
    #[error("unknown shader program {0:?}")]
    UnknownProgram(ProgramHandle),
    #[error("unknown mesh {0:?}")]
    UnknownMesh(MeshHandle),
    #[error("draw range {start}..{end} exceeds mesh of {available} vertices")]
    DrawOutOfRange { start: u32, end: u32, available: u32 },
    #[error("vertex layout is not supported by this backend")]
    UnsupportedLayout,
}
