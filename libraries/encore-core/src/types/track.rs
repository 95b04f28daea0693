//! Track domain type
use crate::types::TrackId;
use serde::{Deserialize, Serialize};

/// Label shown when a track carries no populated artist
pub const UNKNOWN_ARTIST: &str = "Unknown Artist";

/// Artist reference attached to a track
///
/// The catalog returns either the bare artist id or the populated artist
/// document, depending on the endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ArtistRef {
    /// Populated artist with a display name
    Named {
        /// Artist identifier
        #[serde(rename = "_id", alias = "id")]
        id: String,
        /// Artist display name
        name: String,
    },

    /// Unpopulated reference (identifier only)
    Id(String),
}

impl ArtistRef {
    /// Create a populated artist reference
    pub fn named(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self::Named {
            id: id.into(),
            name: name.into(),
        }
    }

    /// Artist identifier, populated or not
    pub fn id(&self) -> &str {
        match self {
            Self::Named { id, .. } | Self::Id(id) => id,
        }
    }

    /// Name to render, falling back to [`UNKNOWN_ARTIST`] for bare references
    pub fn display_name(&self) -> &str {
        match self {
            Self::Named { name, .. } => name,
            Self::Id(_) => UNKNOWN_ARTIST,
        }
    }
}

/// Playable catalog track
///
/// Field names follow the catalog payload so tracks can be deserialized
/// straight from API responses.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Track {
    /// Unique track identifier
    #[serde(rename = "_id", alias = "id")]
    pub id: TrackId,

    /// Track title
    pub title: String,

    /// Artist reference (absent for orphaned uploads)
    #[serde(default)]
    pub artist: Option<ArtistRef>,

    /// Cover art URL
    #[serde(default)]
    pub cover_image: Option<String>,

    /// Durable URL of the audio file on the media host
    pub audio_url: String,

    /// Nominal duration in seconds as stored in the catalog
    #[serde(default, rename = "duration")]
    pub duration_secs: Option<f64>,

    /// Lyrics text
    #[serde(default)]
    pub lyrics: Option<String>,
}

impl Track {
    /// Create a track with minimal metadata
    pub fn new(
        id: impl Into<TrackId>,
        title: impl Into<String>,
        audio_url: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            artist: None,
            cover_image: None,
            audio_url: audio_url.into(),
            duration_secs: None,
            lyrics: None,
        }
    }

    /// Attach an artist reference
    #[must_use]
    pub fn with_artist(mut self, artist: ArtistRef) -> Self {
        self.artist = Some(artist);
        self
    }

    /// Set the catalog duration in seconds
    #[must_use]
    pub fn with_duration_secs(mut self, secs: f64) -> Self {
        self.duration_secs = Some(secs);
        self
    }

    /// Set the cover art URL
    #[must_use]
    pub fn with_cover_image(mut self, url: impl Into<String>) -> Self {
        self.cover_image = Some(url.into());
        self
    }

    /// Artist name to render
    pub fn artist_name(&self) -> &str {
        self.artist
            .as_ref()
            .map_or(UNKNOWN_ARTIST, ArtistRef::display_name)
    }

    /// Cover art URL, or `placeholder` when the track has none
    pub fn cover_or<'a>(&'a self, placeholder: &'a str) -> &'a str {
        self.cover_image
            .as_deref()
            .filter(|url| !url.is_empty())
            .unwrap_or(placeholder)
    }

    /// Catalog duration in milliseconds
    ///
    /// Returns 0 when the duration is missing, negative or not finite; the
    /// output device reports the authoritative value once loaded.
    pub fn nominal_duration_millis(&self) -> u64 {
        match self.duration_secs {
            Some(secs) if secs.is_finite() && secs > 0.0 => (secs * 1000.0).round() as u64,
            _ => 0,
        }
    }
}
