use std::path::PathBuf;

use quire_common::CodeKey;

/// Errors raised while parsing a source document.
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    /// The source file could not be read.
    #[error("failed to read {path}: {source}")]
    Io {
        /// The source file path.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// A section underline is shorter than its title.
    #[error("{doc}:{line}: title underline too short")]
    UnderlineTooShort {
        /// Logical document name.
        doc: String,
        /// 1-based line number of the title.
        line: usize,
    },

    /// A directive other than `include` was used.
    #[error("{doc}:{line}: unknown directive '{directive}'")]
    UnknownDirective {
        /// Logical document name.
        doc: String,
        /// 1-based line number of the directive.
        line: usize,
        /// The directive name.
        directive: String,
    },

    /// An `include` directive without a document name.
    #[error("{doc}:{line}: include directive needs a document name")]
    MissingIncludeTarget {
        /// Logical document name.
        doc: String,
        /// 1-based line number of the directive.
        line: usize,
    },
}

/// Errors raised while assembling a target from cached code.
#[derive(Debug, thiserror::Error)]
pub enum LinkError {
    /// The cache holds no dependency list for the target.
    #[error("no recorded code for target '{target}'")]
    UnknownTarget {
        /// The target name.
        target: String,
    },

    /// A piece of code the target needs is missing from the cache or unreadable.
    #[error("target '{target}': cached code {key} is missing or corrupt")]
    MissingCode {
        /// The target name.
        target: String,
        /// The missing code.
        key: CodeKey,
    },

    /// Documents include each other in a loop.
    #[error("target '{target}': include cycle {chain}")]
    IncludeCycle {
        /// The target name.
        target: String,
        /// The include chain, e.g. `a -> b -> a`.
        chain: String,
    },
}
