/// What went wrong, independent of the human-readable message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    // ── Lexical ───────────────────────────────────────────────────────────
    UnterminatedString,
    UnterminatedBlock,
    UnterminatedTemplate,
    UnterminatedComment,
    /// A bare `$`, or `$` followed by something other than a letter or `_`.
    MalformedVariable,
    UnexpectedCharacter,

    // ── Syntactic / semantic ──────────────────────────────────────────────
    UnknownElement,
    UnknownAttribute,
    DuplicateAttribute,
    MissingAttribute,
    /// Wrong value shape: tuple arity, slot kind, or attribute type.
    InvalidValue,
    /// The value had the right shape but a custom check rejected it.
    ValidationFailed,
    UnknownState,
    UnknownEvent,
    TextNotAllowed,
    ChildNotAllowed,
    UndefinedVariable,
    DuplicateVariable,
    /// A `vars` entry whose value is not a pure literal.
    InvalidVariableValue,
    Syntax,
}

impl ErrorKind {
    /// `true` for errors raised while tokenizing.
    pub fn is_lexical(self) -> bool {
        matches!(
            self,
            ErrorKind::UnterminatedString
                | ErrorKind::UnterminatedBlock
                | ErrorKind::UnterminatedTemplate
                | ErrorKind::UnterminatedComment
                | ErrorKind::MalformedVariable
                | ErrorKind::UnexpectedCharacter
        )
    }
}

/// A compile error from the `.sketch` DSL.
///
/// Every error is fatal: compilation stops at the first one.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("sketch error at {line}:{col}: {message}")]
pub struct CompileError {
    pub kind: ErrorKind,
    pub message: String,
    /// 1-based source line number where the error occurred.
    pub line: usize,
    /// 1-based source column number where the error occurred.
    pub col: usize,
}

impl CompileError {
    pub(crate) fn new(kind: ErrorKind, msg: impl Into<String>, line: usize, col: usize) -> Self {
        Self { kind, message: msg.into(), line, col }
    }
}

pub type Result<T> = std::result::Result<T, CompileError>;
