//! Span definitions for the hot operations: build, phrasematch, relevance, context.

/// Create a build span.
#[macro_export]
macro_rules! build_span {
    ($documents:expr, $workers:expr) => {
        tracing::info_span!("atlas.build", documents = $documents, workers = $workers)
    };
}

/// Create a phrasematch span.
#[macro_export]
macro_rules! phrasematch_span {
    ($index:expr, $query:expr) => {
        tracing::debug_span!("atlas.phrasematch", index = %$index, query = %$query)
    };
}

/// Create a relevance span.
#[macro_export]
macro_rules! relevance_span {
    ($index:expr, $terms:expr) => {
        tracing::debug_span!("atlas.relevance", index = %$index, terms = $terms)
    };
}

/// Create a context span.
#[macro_export]
macro_rules! context_span {
    ($lon:expr, $lat:expr) => {
        tracing::debug_span!("atlas.context", lon = $lon, lat = $lat)
    };
}
