//! The crate's error type.
//!
//! The teacher crate has no fallible parsing surface (bad input just becomes
//! [`crate::nodes::NodeValue::Text`]), so this is grounded instead on the
//! other pack repos that do carry a `thiserror`-derived error enum for a
//! parsing/rendering pipeline.

use thiserror::Error;

/// Failure modes for [`crate::Processor::parse`] and
/// [`crate::Processor::markdown_to_html`].
#[derive(Debug, Error)]
pub enum Error {
    /// The grammar could not account for the entire input. In practice this
    /// should never surface: every byte falls back to `SpecialText`/`Text`,
    /// but the variant exists for `Processor` callers that want a hard
    /// failure mode rather than a best-effort tree.
    #[error("failed to parse input as markdown")]
    ParseFailure,

    /// `max_parsing_time_ms` elapsed before parsing completed (§6.2).
    #[error("parsing exceeded the configured time budget")]
    Timeout,

    /// A serializer visited a node kind it has no rendering rule for. Only
    /// reachable if a [`crate::plugins::SerializerPlugin`] declares a node
    /// kind it doesn't actually handle.
    #[error("no renderer registered for node kind {kind}")]
    UnknownNode { kind: &'static str },

    /// A link destination contained percent-encoding the URL escaper could
    /// not round-trip.
    #[error("invalid percent-encoding in URL")]
    InvalidUrlEncoding,
}
