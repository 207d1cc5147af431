//! Code fence tracking for directive parsing.
//!
//! Directive syntax inside fenced code blocks is documentation about
//! directives, not a directive, and must be passed through untouched.

/// Tracks code fence state during line-by-line processing.
///
/// Fences use three or more backticks or tildes. The closing fence must use
/// the same character, be at least as long as the opening one and carry no
/// info string.
#[derive(Debug, Default)]
pub(crate) struct FenceTracker {
    /// Character and length of the open fence.
    open: Option<(char, usize)>,
}

impl FenceTracker {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Check if currently inside a fenced code block.
    pub(crate) fn in_fence(&self) -> bool {
        self.open.is_some()
    }

    /// Update fence state based on a line.
    ///
    /// Returns `true` if the line opened or closed a fence.
    pub(crate) fn update(&mut self, line: &str) -> bool {
        let trimmed = line.trim_start();
        let Some((ch, len)) = fence_run(trimmed) else {
            return false;
        };

        match self.open {
            Some((open_ch, open_len)) => {
                let closes =
                    ch == open_ch && len >= open_len && trimmed[len..].trim().is_empty();
                if closes {
                    self.open = None;
                }
                closes
            }
            None => {
                self.open = Some((ch, len));
                true
            }
        }
    }
}

/// Leading run of fence characters, if it is long enough to be a fence.
fn fence_run(trimmed: &str) -> Option<(char, usize)> {
    let first = trimmed.chars().next().filter(|c| matches!(c, '`' | '~'))?;
    let len = trimmed.chars().take_while(|&c| c == first).count();
    (len >= 3).then_some((first, len))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backtick_fence() {
        let mut tracker = FenceTracker::new();
        assert!(tracker.update("```markdown"));
        assert!(tracker.in_fence());
        assert!(!tracker.update(":::ditaa"));
        assert!(tracker.in_fence());
        assert!(tracker.update("```"));
        assert!(!tracker.in_fence());
    }

    #[test]
    fn test_closing_rules() {
        let mut tracker = FenceTracker::new();
        assert!(tracker.update("````"));
        // shorter, different char, or with info string: still open
        assert!(!tracker.update("```"));
        assert!(!tracker.update("~~~~"));
        assert!(!tracker.update("````rust"));
        assert!(tracker.in_fence());
        assert!(tracker.update("  `````  "));
        assert!(!tracker.in_fence());
    }

    #[test]
    fn test_two_backticks_not_fence() {
        let mut tracker = FenceTracker::new();
        assert!(!tracker.update("``inline code``"));
        assert!(!tracker.in_fence());
    }
}
