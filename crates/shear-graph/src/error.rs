use crate::chain::DependencyChain;
use crate::edit::EditError;
use crate::location::{ModuleLocation, ResolveError};
use crate::parser::SyntaxError;
use crate::runtime::RuntimeError;

/// Result alias used throughout shear-graph.
pub type Result<T> = std::result::Result<T, GraphError>;

/// Errors produced while building a module graph or editing its modules.
#[derive(Debug, Clone, thiserror::Error)]
pub enum GraphError {
    /// A specifier could not be turned into a canonical location.
    #[error(transparent)]
    Resolution(#[from] ResolveError),

    /// The runtime failed to produce the module's source text.
    #[error("Failed to load module '{location}': {source}")]
    Load {
        location: ModuleLocation,
        #[source]
        source: RuntimeError,
    },

    /// The module's source is not a valid ECMAScript module.
    #[error("Syntax error in '{location}': {source}")]
    Syntax {
        location: ModuleLocation,
        #[source]
        source: SyntaxError,
    },

    /// A module transitively imports itself.
    #[error("Circular dependency detected: {chain}")]
    Cycle { chain: DependencyChain },

    /// Too many modules reached from one entry.
    #[error("Too many modules: {count} exceeds maximum of {max}")]
    TooManyModules { count: usize, max: usize },

    /// A module source exceeds the configured size limit.
    #[error("File '{location}' too large: {size} bytes exceeds maximum of {max} bytes")]
    FileTooLarge {
        location: ModuleLocation,
        size: usize,
        max: usize,
    },

    #[error(transparent)]
    Edit(#[from] EditError),
}

impl GraphError {
    /// The module the error is attributed to, when there is one.
    pub fn location(&self) -> Option<&ModuleLocation> {
        match self {
            Self::Load { location, .. }
            | Self::Syntax { location, .. }
            | Self::FileTooLarge { location, .. } => Some(location),
            Self::Cycle { chain } => chain.entry_point(),
            _ => None,
        }
    }
}
