//! Inferred cursor position inside a composition string.
//!
//! The host shows us the composition text but never where the caret sits in
//! it. `CursorModel` keeps its own offset, seeded at the end of every newly
//! observed composition and stepped by navigation keys. Offsets count
//! characters (Unicode scalar values), not bytes.

/// Opaque identity of one composition instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SessionId(pub u64);

/// The composition currently being tracked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompositionSession {
    id: SessionId,
    content: String,
    len: usize,
}

impl CompositionSession {
    fn new(id: SessionId, content: &str) -> Self {
        Self {
            id,
            content: content.to_string(),
            len: content.chars().count(),
        }
    }

    pub fn id(&self) -> SessionId {
        self.id
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    /// Length of the content in characters.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    fn char_at(&self, index: usize) -> Option<char> {
        self.content.chars().nth(index)
    }
}

/// Result of a single cursor step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MoveOutcome {
    /// Whether the offset changed
    pub moved: bool,
    /// Offset after the attempt (unchanged at a boundary)
    pub offset: usize,
}

/// Composition identity, content and inferred cursor offset.
///
/// Invariant: `offset <= session.len()` (and `offset == 0` without a session).
#[derive(Debug, Clone, Default)]
pub struct CursorModel {
    session: Option<CompositionSession>,
    offset: usize,
    /// Direction of the last step, if it succeeded
    last_step: Option<crate::Direction>,
}

impl CursorModel {
    /// Create a model with no composition.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn session(&self) -> Option<&CompositionSession> {
        self.session.as_ref()
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Length of the tracked content in characters (0 without a session).
    pub fn len(&self) -> usize {
        self.session.as_ref().map_or(0, CompositionSession::len)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Reconcile with what the host currently reports.
    ///
    /// A mismatch in either identity or content is treated as a new
    /// composition and parks the cursor after the last character. Returns
    /// `true` when the session was replaced.
    pub fn on_composition(&mut self, id: SessionId, text: &str) -> bool {
        if text.is_empty() {
            let had_session = self.session.is_some();
            self.clear();
            return had_session;
        }

        if let Some(current) = &self.session {
            if current.id == id && current.content == text {
                return false;
            }
        }

        let session = CompositionSession::new(id, text);
        self.offset = session.len();
        self.session = Some(session);
        self.last_step = None;
        tracing::debug!(
            session = id.0,
            content = text,
            offset = self.offset,
            "new composition"
        );
        true
    }

    /// Step the cursor one character in `direction`.
    ///
    /// Stepping past either end leaves the state untouched and reports
    /// `moved == false`; that is a normal outcome, not an error.
    pub fn move_cursor(&mut self, direction: crate::Direction) -> MoveOutcome {
        let candidate = self.offset.checked_add_signed(direction.delta());
        match candidate {
            Some(next) if next <= self.len() => {
                self.offset = next;
                self.last_step = Some(direction);
                MoveOutcome {
                    moved: true,
                    offset: next,
                }
            }
            _ => {
                self.last_step = None;
                MoveOutcome {
                    moved: false,
                    offset: self.offset,
                }
            }
        }
    }

    /// The character implied by the last successful step.
    ///
    /// Moving left lands the cursor before the character now under it;
    /// moving right announces the character just passed. Returns `None`
    /// unless the immediately preceding step in `direction` succeeded.
    pub fn character_for(&self, direction: crate::Direction) -> Option<char> {
        if self.last_step != Some(direction) {
            return None;
        }
        let session = self.session.as_ref()?;
        match direction {
            crate::Direction::Left => session.char_at(self.offset),
            crate::Direction::Right => session.char_at(self.offset.checked_sub(1)?),
        }
    }

    /// Forget the composition entirely.
    pub fn clear(&mut self) {
        self.session = None;
        self.offset = 0;
        self.last_step = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Direction;

    fn model_with(text: &str) -> CursorModel {
        let mut model = CursorModel::new();
        model.on_composition(SessionId(1), text);
        model
    }

    #[test]
    fn test_new_composition_parks_cursor_at_end() {
        let model = model_with("hello");
        assert_eq!(model.offset(), 5);
        assert_eq!(model.session().unwrap().content(), "hello");
    }

    #[test]
    fn test_left_from_end() {
        // "hello" with the cursor after 'o'
        let mut model = model_with("hello");
        let outcome = model.move_cursor(Direction::Left);
        assert_eq!(outcome, MoveOutcome { moved: true, offset: 4 });
        assert_eq!(model.character_for(Direction::Left), Some('o'));
    }

    #[test]
    fn test_left_boundary() {
        let mut model = model_with("hello");
        for _ in 0..5 {
            assert!(model.move_cursor(Direction::Left).moved);
        }
        let outcome = model.move_cursor(Direction::Left);
        assert_eq!(outcome, MoveOutcome { moved: false, offset: 0 });
        assert_eq!(model.character_for(Direction::Left), None);
    }

    #[test]
    fn test_right_boundary() {
        let mut model = model_with("a");
        assert_eq!(model.offset(), 1);
        let outcome = model.move_cursor(Direction::Right);
        assert_eq!(outcome, MoveOutcome { moved: false, offset: 1 });
        assert_eq!(model.character_for(Direction::Right), None);
    }

    #[test]
    fn test_right_announces_traversed_character() {
        let mut model = model_with("abc");
        model.move_cursor(Direction::Left);
        model.move_cursor(Direction::Left);
        assert_eq!(model.offset(), 1);

        let outcome = model.move_cursor(Direction::Right);
        assert_eq!(outcome.offset, 2);
        assert_eq!(model.character_for(Direction::Right), Some('b'));
        // Only the direction that just succeeded has a character
        assert_eq!(model.character_for(Direction::Left), None);
    }

    #[test]
    fn test_same_session_keeps_offset() {
        let mut model = model_with("hello");
        model.move_cursor(Direction::Left);
        model.move_cursor(Direction::Left);

        assert!(!model.on_composition(SessionId(1), "hello"));
        assert_eq!(model.offset(), 3);
    }

    #[test]
    fn test_new_identity_resets_offset() {
        let mut model = model_with("hello");
        model.move_cursor(Direction::Left);
        model.move_cursor(Direction::Left);

        assert!(model.on_composition(SessionId(2), "hello"));
        assert_eq!(model.offset(), 5);
    }

    #[test]
    fn test_changed_content_resets_offset() {
        let mut model = model_with("hel");
        model.move_cursor(Direction::Left);

        assert!(model.on_composition(SessionId(1), "help"));
        assert_eq!(model.offset(), 4);
    }

    #[test]
    fn test_empty_composition_clears() {
        let mut model = model_with("hi");
        assert!(model.on_composition(SessionId(1), ""));
        assert!(model.session().is_none());
        assert_eq!(model.offset(), 0);
    }

    #[test]
    fn test_offsets_count_characters() {
        let mut model = model_with("你好世界");
        assert_eq!(model.offset(), 4);

        model.move_cursor(Direction::Left);
        assert_eq!(model.character_for(Direction::Left), Some('界'));
        model.move_cursor(Direction::Left);
        model.move_cursor(Direction::Right);
        assert_eq!(model.character_for(Direction::Right), Some('世'));
    }

    #[test]
    fn test_no_session_never_moves() {
        let mut model = CursorModel::new();
        assert!(!model.move_cursor(Direction::Left).moved);
        assert!(!model.move_cursor(Direction::Right).moved);
        assert_eq!(model.offset(), 0);
    }

    #[test]
    fn test_successful_moves_stay_in_bounds() {
        let texts = ["x", "hello", "ab cd", "你好"];
        for text in texts {
            let mut model = model_with(text);
            let len = text.chars().count();
            // Walk to the left edge and back to the right edge
            let script = std::iter::repeat(Direction::Left)
                .take(len + 2)
                .chain(std::iter::repeat(Direction::Right).take(len + 2));
            for direction in script {
                let before = model.offset();
                let outcome = model.move_cursor(direction);
                assert!(outcome.offset <= len);
                if outcome.moved {
                    assert_eq!(before.abs_diff(outcome.offset), 1);
                } else {
                    assert_eq!(before, outcome.offset);
                }
            }
        }
    }
}
