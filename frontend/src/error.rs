//! Error types for the pixelforth frontend.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, CompileError>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum CompileError {
    #[error("unprintable byte 0x{byte:02x} in input")]
    UnprintableByte { byte: u8 },

    #[error("word too long: {length} characters, expecting at most 64")]
    TokenTooLong { length: usize },

    #[error("can't use number {value} as a word name")]
    NumberAsName { value: f64 },

    #[error("undefined word: \"{word}\"")]
    UndefinedWord { word: String },

    #[error("can't redefine built-in word \"{word}\"")]
    RedefinedBuiltin { word: String },

    #[error("can't redefine word \"{word}\"")]
    RedefinedWord { word: String },

    #[error("already defining a word")]
    NestedDefinition,

    #[error("';' outside of a word definition")]
    UnexpectedSemicolon,

    #[error("unmatched if/else/then in word definition")]
    UnbalancedConditional,

    #[error("'{word}' before 'if'")]
    ControlWithoutIf { word: &'static str },

    #[error("too many nested 'if' words")]
    TooManyNestedIfs,

    #[error("unterminated comment")]
    UnterminatedComment,

    #[error("word definition not finished")]
    UnfinishedDefinition,

    #[error("'if' without matching 'then' at end of input")]
    DanglingConditional,
}
