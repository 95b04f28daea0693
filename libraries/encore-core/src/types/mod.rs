//! Domain types
mod ids;
mod repeat;
mod track;

pub use ids::TrackId;
pub use repeat::RepeatMode;
pub use track::{ArtistRef, Track, UNKNOWN_ARTIST};
