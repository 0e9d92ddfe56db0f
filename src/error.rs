//! Error type for the whole compilation pipeline.

use pixelforth_frontend::CompileError;
use pixelforth_optimizer::OptimizeError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    #[error(transparent)]
    Compile(#[from] CompileError),

    #[error(transparent)]
    Optimize(#[from] OptimizeError),
}
