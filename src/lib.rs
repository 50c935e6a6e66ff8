//! Backend of a small expression-language compiler: lowers linear
//! three-address IR to RISC-V assembly, allocating registers in the same
//! forward pass.

pub mod backend;
pub mod error;
pub mod ir;

pub use backend::{emit, generate, CodegenError, CodegenOptions};
pub use error::Error;

/// Parse a textual IR listing and lower it to assembly text.
pub fn compile(source: &str, options: CodegenOptions) -> Result<String, Error> {
    let instructions = ir::parser::parse(source)?;
    let program = generate(instructions, options)?;
    Ok(emit(&program))
}
