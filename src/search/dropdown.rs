// src/search/dropdown.rs
// =============================================================================
// Keyboard navigation for the suggestion dropdown.
//
// Keys:
// - Down: highlight the next row (wraps around to the first)
// - Up: highlight the previous row (wraps around to the last)
// - Enter: pick the highlighted row, if there is one
// - Escape: close the dropdown and clear the highlight
//
// The dropdown only remembers WHICH row is highlighted. The rows themselves
// come from the suggestion engine each time.
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Down,
    Up,
    Enter,
    Escape,
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Dropdown {
    open: bool,
    highlighted: Option<usize>,
}

impl Dropdown {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn highlighted(&self) -> Option<usize> {
        self.highlighted
    }

    pub fn open(&mut self) {
        self.open = true;
    }

    pub fn close(&mut self) {
        self.open = false;
        self.highlighted = None;
    }

    // Call when the list changes underneath us (new query, new selection)
    pub fn reset_highlight(&mut self) {
        self.highlighted = None;
    }

    // Whether the list should be drawn at all
    //
    // With nothing selected yet we show it even for short queries, so the
    // user sees the "type at least N characters" hint
    pub fn should_show(&self, query_valid: bool, selected_count: usize) -> bool {
        self.open && (query_valid || selected_count == 0)
    }

    // Applies a key press to a list of `len` rows
    //
    // Returns Some(index) when Enter picks a row
    pub fn handle_key(&mut self, key: Key, len: usize) -> Option<usize> {
        if key == Key::Escape {
            self.close();
            return None;
        }
        if !self.open || len == 0 {
            return None;
        }

        match key {
            Key::Down => {
                self.highlighted = match self.highlighted {
                    Some(i) if i + 1 < len => Some(i + 1),
                    _ => Some(0),
                };
                None
            }
            Key::Up => {
                self.highlighted = match self.highlighted {
                    Some(i) if i > 0 && i < len => Some(i - 1),
                    _ => Some(len - 1),
                };
                None
            }
            Key::Enter => self.highlighted.filter(|&i| i < len),
            Key::Escape => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keys_ignored_when_closed() {
        let mut dropdown = Dropdown::new();
        assert_eq!(dropdown.handle_key(Key::Down, 3), None);
        assert_eq!(dropdown.highlighted(), None);
    }

    #[test]
    fn test_down_wraps() {
        let mut dropdown = Dropdown::new();
        dropdown.open();
        dropdown.handle_key(Key::Down, 2);
        assert_eq!(dropdown.highlighted(), Some(0));
        dropdown.handle_key(Key::Down, 2);
        assert_eq!(dropdown.highlighted(), Some(1));
        dropdown.handle_key(Key::Down, 2);
        assert_eq!(dropdown.highlighted(), Some(0));
    }

    #[test]
    fn test_up_wraps_to_last() {
        let mut dropdown = Dropdown::new();
        dropdown.open();
        dropdown.handle_key(Key::Up, 3);
        assert_eq!(dropdown.highlighted(), Some(2));
        dropdown.handle_key(Key::Up, 3);
        assert_eq!(dropdown.highlighted(), Some(1));
    }

    #[test]
    fn test_enter_picks_highlighted() {
        let mut dropdown = Dropdown::new();
        dropdown.open();
        assert_eq!(dropdown.handle_key(Key::Enter, 3), None);
        dropdown.handle_key(Key::Down, 3);
        dropdown.handle_key(Key::Down, 3);
        assert_eq!(dropdown.handle_key(Key::Enter, 3), Some(1));
    }

    #[test]
    fn test_escape_closes() {
        let mut dropdown = Dropdown::new();
        dropdown.open();
        dropdown.handle_key(Key::Down, 3);
        dropdown.handle_key(Key::Escape, 3);
        assert!(!dropdown.is_open());
        assert_eq!(dropdown.highlighted(), None);
    }

    #[test]
    fn test_should_show() {
        let mut dropdown = Dropdown::new();
        assert!(!dropdown.should_show(true, 0));
        dropdown.open();
        assert!(dropdown.should_show(false, 0));
        assert!(!dropdown.should_show(false, 1));
        assert!(dropdown.should_show(true, 1));
    }
}
