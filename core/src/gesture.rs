//! Key gesture classification.
//!
//! Hosts describe a key event either by its virtual-key code or by a symbolic
//! main key name (or both). Only two gestures matter here: a single step left
//! and a single step right. Everything else is "other".

use serde::{Deserialize, Serialize};

/// Direction of a single cursor step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    /// One character towards the start of the composition
    Left,
    /// One character towards the end of the composition
    Right,
}

impl Direction {
    /// Signed offset change for this step.
    pub fn delta(self) -> isize {
        match self {
            Direction::Left => -1,
            Direction::Right => 1,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Direction::Left => "left",
            Direction::Right => "right",
        }
    }
}

/// What the key handler tells the host after observing an event.
///
/// The handler only ever observes; it never swallows a key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyResult {
    /// Let the host continue its normal processing
    Continue,
}

/// A raw key event as reported by the host.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeyGesture {
    /// Virtual-key code, when the host exposes one
    pub vk_code: Option<u32>,
    /// Symbolic key name (e.g. "leftArrow"), when the host exposes one
    pub main_key_name: Option<String>,
}

impl KeyGesture {
    /// Gesture carrying only a virtual-key code.
    pub fn from_vk(code: u32) -> Self {
        Self {
            vk_code: Some(code),
            main_key_name: None,
        }
    }

    /// Gesture carrying only a symbolic key name.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            vk_code: None,
            main_key_name: Some(name.into()),
        }
    }
}

/// Which keys count as single-step navigation.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct StepKeys {
    pub left_vk_code: u32,
    pub right_vk_code: u32,
    pub left_key_name: String,
    pub right_key_name: String,
}

impl Default for StepKeys {
    fn default() -> Self {
        Self {
            left_vk_code: 0x25,
            right_vk_code: 0x27,
            left_key_name: "leftArrow".to_string(),
            right_key_name: "rightArrow".to_string(),
        }
    }
}

impl StepKeys {
    /// Classify a gesture as a left step, a right step, or neither.
    ///
    /// A virtual-key code takes precedence: when one is present the key name
    /// is not consulted at all.
    pub fn classify(&self, gesture: &KeyGesture) -> Option<Direction> {
        if let Some(code) = gesture.vk_code {
            return if code == self.left_vk_code {
                Some(Direction::Left)
            } else if code == self.right_vk_code {
                Some(Direction::Right)
            } else {
                None
            };
        }

        match gesture.main_key_name.as_deref() {
            Some(name) if name == self.left_key_name => Some(Direction::Left),
            Some(name) if name == self.right_key_name => Some(Direction::Right),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_by_vk_code() {
        let keys = StepKeys::default();
        assert_eq!(keys.classify(&KeyGesture::from_vk(0x25)), Some(Direction::Left));
        assert_eq!(keys.classify(&KeyGesture::from_vk(0x27)), Some(Direction::Right));
        assert_eq!(keys.classify(&KeyGesture::from_vk(0x26)), None); // up arrow
    }

    #[test]
    fn test_classify_by_key_name() {
        let keys = StepKeys::default();
        assert_eq!(keys.classify(&KeyGesture::named("leftArrow")), Some(Direction::Left));
        assert_eq!(keys.classify(&KeyGesture::named("rightArrow")), Some(Direction::Right));
        assert_eq!(keys.classify(&KeyGesture::named("home")), None);
    }

    #[test]
    fn test_vk_code_wins_over_name() {
        let keys = StepKeys::default();
        let gesture = KeyGesture {
            vk_code: Some(0x41),
            main_key_name: Some("leftArrow".to_string()),
        };
        assert_eq!(keys.classify(&gesture), None);
    }

    #[test]
    fn test_empty_gesture_is_other() {
        assert_eq!(StepKeys::default().classify(&KeyGesture::default()), None);
    }

    #[test]
    fn test_direction_delta() {
        assert_eq!(Direction::Left.delta(), -1);
        assert_eq!(Direction::Right.delta(), 1);
    }
}
