use thiserror::Error;

/// Error type adapters and fact loaders hand back; carried through the
/// engine without being swallowed or rewritten.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Debug, Error)]
pub enum PolicyError {
    /// The fact graph revisits a fact that is still being loaded.
    #[error("fact dependency cycle detected at '{0}'")]
    CycleDetected(Box<str>),

    /// A fact names a dependency that is not defined in the policy.
    #[error("fact '{fact}' depends on undeclared fact '{dependency}'")]
    UnknownDependency {
        fact: Box<str>,
        dependency: Box<str>,
    },

    /// A fact loader failed; the underlying error is kept as the source.
    #[error("fact '{fact}' failed to load")]
    FactLoad {
        fact: Box<str>,
        #[source]
        source: BoxError,
    },

    /// An adapter call outside fact loading failed.
    #[error("adapter call failed")]
    Adapter(#[source] BoxError),

    /// A value could not be encoded into the fact map.
    #[error("fact encoding failed")]
    Encoding(#[from] serde_json::Error),
}
