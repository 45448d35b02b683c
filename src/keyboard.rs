use std::collections::HashMap;
use std::time::{Duration, Instant};

/// Rows of the on-screen keyboard
pub const KEYBOARD_LAYOUT: [&[&str]; 5] = [
    &["1", "2", "3", "4", "5", "6", "7", "8", "9", "0"],
    &["q", "w", "e", "r", "t", "y", "u", "i", "o", "p"],
    &["a", "s", "d", "f", "g", "h", "j", "k", "l"],
    &["z", "x", "c", "v", "b", "n", "m"],
    &["Space"],
];

/// Terminals rarely report key release, so a press lights its key for this long
pub const HIGHLIGHT: Duration = Duration::from_millis(150);

#[derive(Debug, Clone, Default)]
pub struct PressedKeys {
    pressed: HashMap<String, Instant>,
}

fn key_name(c: char) -> String {
    if c == ' ' {
        "space".to_string()
    } else {
        c.to_lowercase().collect()
    }
}

impl PressedKeys {
    pub fn press(&mut self, c: char, now: Instant) {
        self.pressed.insert(key_name(c), now);
    }

    /// Matches layout labels case-insensitively ("Space" included)
    pub fn is_pressed(&self, label: &str, now: Instant) -> bool {
        self.pressed
            .get(&label.to_lowercase())
            .is_some_and(|at| now.saturating_duration_since(*at) < HIGHLIGHT)
    }

    /// Forget presses whose highlight has run out; true if anything changed
    pub fn expire(&mut self, now: Instant) -> bool {
        let before = self.pressed.len();
        self.pressed
            .retain(|_, at| now.saturating_duration_since(*at) < HIGHLIGHT);
        before != self.pressed.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pressed.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn press_lights_key_until_highlight_runs_out() {
        let now = Instant::now();
        let mut keys = PressedKeys::default();
        keys.press('Q', now);
        assert!(keys.is_pressed("q", now));
        assert!(keys.is_pressed("q", now + Duration::from_millis(100)));
        assert!(!keys.is_pressed("q", now + HIGHLIGHT));
    }

    #[test]
    fn space_maps_to_space_key() {
        let now = Instant::now();
        let mut keys = PressedKeys::default();
        keys.press(' ', now);
        assert!(keys.is_pressed("Space", now));
    }

    #[test]
    fn expire_drops_stale_presses() {
        let now = Instant::now();
        let mut keys = PressedKeys::default();
        keys.press('a', now);
        assert!(!keys.expire(now));
        assert!(keys.expire(now + Duration::from_secs(1)));
        assert!(keys.is_empty());
    }

    #[test]
    fn layout_has_space_row_last() {
        assert_eq!(KEYBOARD_LAYOUT[4], &["Space"]);
        assert_eq!(KEYBOARD_LAYOUT.iter().map(|r| r.len()).sum::<usize>(), 37);
    }
}
