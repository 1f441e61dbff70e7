use std::time::Duration;

/// Pauses between typewriter frames.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TypewriterTimings {
    pub typing: Duration,
    pub deleting: Duration,
    pub after_type: Duration,
    pub after_delete: Duration,
}

impl Default for TypewriterTimings {
    fn default() -> Self {
        Self {
            typing: Duration::from_millis(100),
            deleting: Duration::from_millis(50),
            after_type: Duration::from_millis(2000),
            after_delete: Duration::from_millis(500),
        }
    }
}

/// One visible state: the text to show and how long to hold it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    pub text: String,
    pub delay: Duration,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Typing,
    Deleting,
    Done,
}

/// Types each phrase one character at a time, holds it, erases it, then moves
/// on. Without looping the last phrase stays on screen and the sequence ends.
#[derive(Debug, Clone)]
pub struct Typewriter {
    phrases: Vec<String>,
    timings: TypewriterTimings,
    looping: bool,
    index: usize,
    shown: usize,
    phase: Phase,
}

impl Typewriter {
    pub fn new<I, S>(phrases: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let phrases: Vec<String> = phrases.into_iter().map(Into::into).collect();
        let phase = if phrases.is_empty() {
            Phase::Done
        } else {
            Phase::Typing
        };
        Self {
            phrases,
            timings: TypewriterTimings::default(),
            looping: true,
            index: 0,
            shown: 0,
            phase,
        }
    }

    pub fn with_timings(mut self, timings: TypewriterTimings) -> Self {
        self.timings = timings;
        self
    }

    pub fn looping(mut self, looping: bool) -> Self {
        self.looping = looping;
        self
    }

    pub fn phrase_index(&self) -> usize {
        self.index
    }

    fn visible(&self) -> String {
        self.phrases[self.index].chars().take(self.shown).collect()
    }

    fn phrase_len(&self) -> usize {
        self.phrases[self.index].chars().count()
    }

    fn is_last(&self) -> bool {
        self.index + 1 == self.phrases.len()
    }
}

impl Iterator for Typewriter {
    type Item = Frame;

    fn next(&mut self) -> Option<Frame> {
        let delay = match self.phase {
            Phase::Done => return None,
            Phase::Typing => {
                let len = self.phrase_len();
                self.shown = (self.shown + 1).min(len);
                if self.shown < len {
                    self.timings.typing
                } else if !self.looping && self.is_last() {
                    self.phase = Phase::Done;
                    Duration::ZERO
                } else {
                    self.phase = Phase::Deleting;
                    self.timings.after_type
                }
            }
            Phase::Deleting => {
                self.shown = self.shown.saturating_sub(1);
                if self.shown > 0 {
                    self.timings.deleting
                } else {
                    let text = self.visible();
                    self.index = (self.index + 1) % self.phrases.len();
                    self.phase = Phase::Typing;
                    return Some(Frame {
                        text,
                        delay: self.timings.after_delete,
                    });
                }
            }
        };

        Some(Frame {
            text: self.visible(),
            delay,
        })
    }
}

#[cfg(test)]
#[path = "tests/typewriter_tests.rs"]
mod tests;
