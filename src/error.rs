use thiserror::Error;

use crate::backend::CodegenError;
use crate::ir::parser::IrParseError;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("{}", render_parse_errors(.0))]
    Parse(Vec<IrParseError>),

    #[error("code generation failed: {0}")]
    Codegen(#[from] CodegenError),
}

impl From<Vec<IrParseError>> for Error {
    fn from(errors: Vec<IrParseError>) -> Self {
        Error::Parse(errors)
    }
}

fn render_parse_errors(errors: &[IrParseError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("\n")
}
