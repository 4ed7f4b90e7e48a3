//! Caption track parsing (timedtext `fmt=json3`) and the legacy
//! plain-text dump format.

use serde::{Deserialize, Serialize};

/// One ordered caption segment; `start` and `duration` are seconds.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TranscriptSegment {
    pub text: String,
    pub start: f64,
    pub duration: f64,
}

/// Raw json3 payload. Events without `segs` (styling/window markers)
/// carry no text and are dropped during conversion.
#[derive(Debug, Deserialize)]
pub struct Json3Track {
    #[serde(default)]
    pub events: Vec<Json3Event>,
}

#[derive(Debug, Deserialize)]
pub struct Json3Event {
    #[serde(rename = "tStartMs", default)]
    pub start_ms: u64,
    #[serde(rename = "dDurationMs", default)]
    pub duration_ms: Option<u64>,
    #[serde(default)]
    pub segs: Option<Vec<Json3Seg>>,
}

#[derive(Debug, Deserialize)]
pub struct Json3Seg {
    #[serde(default)]
    pub utf8: String,
}

/// Flatten a json3 track into ordered [`TranscriptSegment`]s.
pub fn segments_from_track(track: Json3Track) -> Vec<TranscriptSegment> {
    track
        .events
        .into_iter()
        .filter_map(|event| {
            let segs = event.segs?;
            let text: String = segs.iter().map(|s| s.utf8.as_str()).collect();
            let text = text.replace('\n', " ").trim().to_string();
            if text.is_empty() {
                return None;
            }
            Some(TranscriptSegment {
                text,
                start: event.start_ms as f64 / 1000.0,
                duration: event.duration_ms.unwrap_or(0) as f64 / 1000.0,
            })
        })
        .collect()
}

/// Concatenate segment texts with single spaces; this is the entire
/// `transcript.txt` format.
pub fn transcript_text(segments: &[TranscriptSegment]) -> String {
    segments
        .iter()
        .map(|s| s.text.as_str())
        .collect::<Vec<_>>()
        .join(" ")
}
