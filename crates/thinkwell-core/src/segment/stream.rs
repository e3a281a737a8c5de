//! Streaming segmenter state machine

use super::delimiter::Probe;
use super::plan::StreamPlan;
use super::{segment_whole, Pattern, SegmentMode, SegmentResult};
use tracing::debug;

#[derive(Debug, Clone)]
enum Strategy {
    /// No pattern: every fragment is content, nothing is held
    Passthrough,
    /// Incremental classification following the pattern's delimiters
    Planned(StreamPlan),
    /// Pattern too complex to follow incrementally: hold everything and
    /// segment once the stream ends
    Buffered(Pattern),
}

/// Per-stream segmenter
///
/// Owned by exactly one stream. Feed fragments with [`push`](Self::push)
/// and call [`finish`](Self::finish) when the stream ends; each call returns
/// the text that could be classified so far.
#[derive(Debug, Clone)]
pub struct StreamSegmenter {
    strategy: Strategy,
    buffer: String,
    mode: SegmentMode,
    step: usize,
}

impl StreamSegmenter {
    /// Create a segmenter for a pattern, or a passthrough one for `None`
    #[must_use]
    pub fn new(pattern: Option<&Pattern>) -> Self {
        let strategy = match pattern {
            None => Strategy::Passthrough,
            Some(pattern) => match pattern.plan() {
                Some(plan) => Strategy::Planned(plan.clone()),
                None => {
                    debug!(pattern = %pattern, "pattern cannot stream incrementally, buffering");
                    Strategy::Buffered(pattern.clone())
                }
            },
        };

        Self {
            strategy,
            buffer: String::new(),
            mode: SegmentMode::Undetermined,
            step: 0,
        }
    }

    /// Segmenter that reports every fragment as content
    #[must_use]
    pub fn passthrough() -> Self {
        Self::new(None)
    }

    /// Current classification mode
    #[must_use]
    pub fn mode(&self) -> SegmentMode {
        self.mode
    }

    /// Text held back because it may be part of a delimiter
    #[must_use]
    pub fn pending(&self) -> &str {
        &self.buffer
    }

    /// Process one fragment
    pub fn push(&mut self, fragment: &str) -> SegmentResult {
        match self.strategy {
            Strategy::Passthrough => return SegmentResult::content_only(fragment),
            Strategy::Buffered(_) => {
                self.buffer.push_str(fragment);
                return SegmentResult::default();
            }
            Strategy::Planned(_) => {}
        }

        self.buffer.push_str(fragment);
        let mut out = SegmentResult::default();
        self.drain(&mut out, false);
        out
    }

    /// Flush everything still held, classified by the current mode
    pub fn finish(&mut self) -> SegmentResult {
        match &self.strategy {
            Strategy::Passthrough => return SegmentResult::default(),
            Strategy::Buffered(pattern) => {
                let text = std::mem::take(&mut self.buffer);
                return segment_whole(&text, std::slice::from_ref(pattern));
            }
            Strategy::Planned(_) => {}
        }

        let mut out = SegmentResult::default();
        self.drain(&mut out, true);
        if !self.buffer.is_empty() {
            let rest = std::mem::take(&mut self.buffer);
            out.push(self.mode, &rest);
        }
        out
    }

    /// Forget all state and start over
    pub fn reset(&mut self) {
        self.buffer.clear();
        self.mode = SegmentMode::Undetermined;
        self.step = 0;
    }

    fn drain(&mut self, out: &mut SegmentResult, at_end: bool) {
        let Strategy::Planned(plan) = &self.strategy else {
            return;
        };

        loop {
            let Some(step) = plan.steps.get(self.step) else {
                // past the last delimiter: everything belongs to this mode
                out.push(self.mode, &self.buffer);
                self.buffer.clear();
                return;
            };

            match step.delimiter.probe(&self.buffer, at_end) {
                Probe::Match { start, end } => {
                    out.push(self.mode, &self.buffer[..start]);
                    self.buffer.drain(..end);
                    self.mode = step.next;
                    self.step += 1;
                }
                Probe::Partial { start } => {
                    out.push(self.mode, &self.buffer[..start]);
                    self.buffer.drain(..start);
                    return;
                }
                Probe::Absent => {
                    out.push(self.mode, &self.buffer);
                    self.buffer.clear();
                    return;
                }
            }
        }
    }
}

impl Default for StreamSegmenter {
    fn default() -> Self {
        Self::passthrough()
    }
}
