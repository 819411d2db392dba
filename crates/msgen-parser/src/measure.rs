//! Measurement highlighting.
//!
//! Partitions text into plain and measurement segments so callers can
//! emphasise quantities (cable sizes, currents, temperatures) when
//! rendering step bodies.

use regex_lite::Regex;

use crate::result::Segment;

/// Split `text` into alternating plain/measurement segments.
///
/// Longer units come first in the alternation so `30mA` and `100mm` are
/// single tokens rather than a short unit plus trailing text.
/// Concatenating the segments in order reproduces `text` exactly.
pub fn highlight_measurements(text: &str) -> Vec<Segment> {
    let token_re = Regex::new(r"\d+(?:\.\d+)?(?:mm|kW|MΩ|mA|°C|Hz|m|A|V|W|Ω)").unwrap();

    let mut segments = Vec::new();
    let mut cursor = 0;

    for token in token_re.find_iter(text) {
        if token.start() > cursor {
            segments.push(Segment::Plain(text[cursor..token.start()].to_string()));
        }
        segments.push(Segment::Measurement(token.as_str().to_string()));
        cursor = token.end();
    }
    if cursor < text.len() {
        segments.push(Segment::Plain(text[cursor..].to_string()));
    }

    segments
}
