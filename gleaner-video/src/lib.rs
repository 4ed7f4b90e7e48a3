//! Video platform clients used by gleaner.
//!
//! Currently only the YouTube Data API v3 pipeline is implemented:
//! channel resolution, windowed upload-playlist collection, and the
//! legacy caption dump.

pub mod youtube;
