//! Consecutive-duplicate suppression

/// Remembers the last admitted detailed figure.
///
/// The state lives for one analysis pass and is seeded with nothing, so the first chord
/// is always admitted.
#[derive(Debug, Clone, Default)]
pub struct Deduplicator {
    enabled: bool,
    last: Option<String>,
}

impl Deduplicator {
    pub fn new(enabled: bool) -> Self {
        Self { enabled, last: None }
    }

    /// Whether `roman` should be emitted. Only admitted figures update the state.
    pub fn admit(&mut self, roman: &str) -> bool {
        if !self.enabled {
            return true;
        }
        if self.last.as_deref() == Some(roman) {
            return false;
        }
        self.last = Some(roman.to_string());
        true
    }
}
