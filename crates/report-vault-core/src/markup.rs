//! Inline emphasis markup.
//!
//! Generated text may contain `**text**` to mark strong emphasis. A marker
//! pair must open and close on the same line. Anything that does not form a
//! pair, such as a lone `**` or a pair split by a newline, is kept as
//! literal text.

use serde::Serialize;

/// One run of text with uniform emphasis.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "text", rename_all = "lowercase")]
pub enum Segment {
    Plain(String),
    Strong(String),
}

/// Text split into emphasis segments.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct RichText(pub Vec<Segment>);

impl RichText {
    pub fn segments(&self) -> &[Segment] {
        &self.0
    }

    /// The text without markers.
    pub fn plain_text(&self) -> String {
        self.0
            .iter()
            .map(|s| match s {
                Segment::Plain(t) | Segment::Strong(t) => t.as_str(),
            })
            .collect()
    }
}

const MARKER: &str = "**";

/// Split `text` into plain and strong segments.
pub fn parse_emphasis(text: &str) -> RichText {
    let mut segments = Vec::new();
    let mut plain = String::new();
    let mut rest = text;

    while let Some(open) = rest.find(MARKER) {
        let after = &rest[open + MARKER.len()..];
        let Some(close) = after.find(MARKER) else {
            break;
        };
        let inner = &after[..close];
        if inner.contains('\n') {
            // Not a pair; keep the opener literal and retry from after it.
            plain.push_str(&rest[..open + MARKER.len()]);
            rest = after;
            continue;
        }
        plain.push_str(&rest[..open]);
        if !plain.is_empty() {
            segments.push(Segment::Plain(std::mem::take(&mut plain)));
        }
        segments.push(Segment::Strong(inner.to_string()));
        rest = &after[close + MARKER.len()..];
    }

    plain.push_str(rest);
    if !plain.is_empty() {
        segments.push(Segment::Plain(plain));
    }
    RichText(segments)
}
