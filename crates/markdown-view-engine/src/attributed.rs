//! # Attributed Text
//!
//! `StyledText` pairs a string with the attribute segments covering it and the
//! search highlight ranges layered on top.
//!
//! All ranges are byte ranges into the content and always fall on char
//! boundaries. Segments are contiguous, ascending and cover the whole content
//! (an empty string keeps a single `0..0` segment so its attributes survive).
//! Highlight ranges are ascending and pairwise disjoint.

use std::ops::Range;

use crate::attributes::AttributeContainer;

/// A byte range of a [`StyledText`] sharing one attribute set.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AttributeSegment {
    pub range: Range<usize>,
    pub attributes: AttributeContainer,
}

/// A maximal piece of a [`StyledText`] with constant attributes and highlight state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplaySpan<'a> {
    pub range: Range<usize>,
    pub text: &'a str,
    pub attributes: &'a AttributeContainer,
    pub highlighted: bool,
}

/// Text carrying per-range attributes and search highlights.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StyledText {
    content: String,
    segments: Vec<AttributeSegment>,
    highlights: Vec<Range<usize>>,
}

impl StyledText {
    /// Create a `StyledText` with a single attribute segment and no highlights.
    pub fn new(content: impl Into<String>, attributes: AttributeContainer) -> Self {
        let content = content.into();
        let segments = vec![AttributeSegment {
            range: 0..content.len(),
            attributes,
        }];
        Self {
            content,
            segments,
            highlights: Vec::new(),
        }
    }

    /// Replace the highlight ranges.
    ///
    /// Ranges must be ascending, disjoint and on char boundaries of the content,
    /// which is what [`crate::highlight::find_matches`] produces.
    pub fn with_highlights(mut self, highlights: Vec<Range<usize>>) -> Self {
        debug_assert!(
            highlights.windows(2).all(|w| w[0].end <= w[1].start),
            "highlight ranges overlap or are unordered: {highlights:?}"
        );
        debug_assert!(
            highlights.iter().all(|r| r.start < r.end
                && r.end <= self.content.len()
                && self.content.is_char_boundary(r.start)
                && self.content.is_char_boundary(r.end)),
            "highlight range out of bounds: {highlights:?}"
        );
        self.highlights = highlights;
        self
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    /// Length of the content, in bytes.
    pub fn len(&self) -> usize {
        self.content.len()
    }

    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }

    pub fn segments(&self) -> &[AttributeSegment] {
        &self.segments
    }

    pub fn highlights(&self) -> &[Range<usize>] {
        &self.highlights
    }

    /// The attribute set, if the whole content shares one.
    pub fn uniform_attributes(&self) -> Option<&AttributeContainer> {
        match self.segments.as_slice() {
            [only] => Some(&only.attributes),
            _ => None,
        }
    }

    /// Append `other`, keeping its segments and highlights as sub-ranges.
    ///
    /// Segments meeting at the seam with equal attributes are coalesced, so
    /// appending same-styled text yields a single segment.
    pub fn append(&mut self, other: StyledText) {
        if other.is_empty() {
            return;
        }
        if self.is_empty() {
            *self = other;
            return;
        }

        let offset = self.content.len();
        self.content.push_str(&other.content);

        for segment in other.segments {
            let range = segment.range.start + offset..segment.range.end + offset;
            match self.segments.last_mut() {
                Some(last) if last.range.end == range.start && last.attributes == segment.attributes => {
                    last.range.end = range.end;
                }
                _ => self.segments.push(AttributeSegment {
                    range,
                    attributes: segment.attributes,
                }),
            }
        }

        self.highlights.extend(
            other
                .highlights
                .into_iter()
                .map(|range| range.start + offset..range.end + offset),
        );
    }

    /// Split into display spans: attribute segments further cut at highlight edges.
    pub fn spans(&self) -> Vec<DisplaySpan<'_>> {
        let mut spans = Vec::new();
        let mut push = |range: Range<usize>, attributes, highlighted| {
            spans.push(DisplaySpan {
                text: &self.content[range.clone()],
                range,
                attributes,
                highlighted,
            });
        };

        for segment in &self.segments {
            let mut pos = segment.range.start;
            let overlapping = self
                .highlights
                .iter()
                .filter(|h| h.start < segment.range.end && h.end > segment.range.start);
            for highlight in overlapping {
                let start = highlight.start.max(segment.range.start);
                let end = highlight.end.min(segment.range.end);
                if pos < start {
                    push(pos..start, &segment.attributes, false);
                }
                push(start..end, &segment.attributes, true);
                pos = end;
            }
            if pos < segment.range.end {
                push(pos..segment.range.end, &segment.attributes, false);
            }
        }

        spans
    }
}
