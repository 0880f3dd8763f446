mod codegen;
mod error;
mod program;
mod runtime;

pub use codegen::compile;
pub use error::{CompileError, CompileResult};
pub use program::{
    DispatchProgram, PROGRAM_FORMAT_VERSION, ProgramBranch, ProgramBucket, ProgramEntry,
    ProgramLeaf, ProgramNext, ProgramNode, ProgramTest,
};
pub use runtime::{CompiledDispatcher, Resolution};
