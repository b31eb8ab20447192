use thiserror::Error;

/// Convenient result alias for the railplan library.
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level library error type.
///
/// Routing failures that still yield a partial, displayable itinerary
/// (unresolvable buildings, empty seed sets, no connecting path) are *not*
/// errors; they surface as [`crate::itinerary::RouteFailure`] on a
/// `found = false` itinerary. This enum covers the cases where no sensible
/// partial result exists.
#[derive(Debug, Error)]
pub enum Error {
    /// Raised when a query start or end coordinate is not finite.
    #[error("query coordinate is not finite")]
    NonFiniteQueryPoint,

    /// Raised when a journey is planned against a graph built from an older
    /// world snapshot. The graph must be rebuilt wholesale after any data
    /// change; there is no incremental update path.
    #[error("graph generation {graph} does not match world generation {world}; rebuild the graph")]
    StaleGraph { graph: u64, world: u64 },

    /// Wrapper for JSON parsing errors from the raw-record convenience loader.
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}
