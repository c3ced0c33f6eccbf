use std::time::Instant;

use ratatui::widgets::{ListState, ScrollbarState};

use crate::tui::app::Direction;

pub mod cursor {
    pub fn move_cursor_left(input: &str, char_index: &mut usize) {
        let cursor_moved_left = char_index.saturating_sub(1);
        *char_index = clamp_cursor(input, cursor_moved_left);
    }

    pub fn move_cursor_right(input: &str, char_index: &mut usize) {
        let cursor_moved_right = char_index.saturating_add(1);
        *char_index = clamp_cursor(input, cursor_moved_right);
    }

    pub fn enter_char(input: &mut String, char_index: &mut usize, new_char: char) {
        let index = byte_index(input, *char_index);
        input.insert(index, new_char);
        move_cursor_right(input, char_index);
    }

    /// Byte offset of the character at `character_index`; multi-byte
    /// characters make the two differ.
    pub fn byte_index(input: &str, character_index: usize) -> usize {
        input
            .char_indices()
            .map(|(i, _)| i)
            .nth(character_index)
            .unwrap_or(input.len())
    }

    pub fn delete_char(input: &mut String, char_index: &mut usize) {
        if *char_index == 0 {
            return;
        }

        let current_index = *char_index;
        let before = input.chars().take(current_index - 1);
        let after = input.chars().skip(current_index);
        *input = before.chain(after).collect();
        move_cursor_left(input, char_index);
    }

    pub fn clamp_cursor(input: &str, new_cursor_pos: usize) -> usize {
        new_cursor_pos.clamp(0, input.chars().count())
    }

    pub fn reset_cursor(app: &mut crate::tui::App) {
        app.ui.character_index = 0;
    }
}

/// Moves a list selection and keeps its scrollbar in sync. `gg` detection
/// lives in the key handler, this only resets the pending press.
pub fn handle_list_navigation(
    dir: Direction,
    state: &mut ListState,
    len: usize,
    scroll: Option<&mut ScrollbarState>,
    last_g_press_time: &mut Option<Instant>,
) {
    *last_g_press_time = None;
    if len == 0 {
        state.select(None);
        return;
    }

    let current = state.selected().unwrap_or(0).min(len - 1);
    let next = match dir {
        Direction::Up => current.saturating_sub(1),
        Direction::Down => (current + 1).min(len - 1),
        Direction::Top => 0,
        Direction::Bottom => len - 1,
    };
    state.select(Some(next));

    if let Some(scroll) = scroll {
        *scroll = scroll.content_length(len).position(next);
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_cursor_editing_multibyte() {
        let mut input = String::new();
        let mut index = 0;
        cursor::enter_char(&mut input, &mut index, 'é');
        cursor::enter_char(&mut input, &mut index, 'b');
        cursor::move_cursor_left(&input, &mut index);
        cursor::enter_char(&mut input, &mut index, 'a');
        assert_eq!(input, "éab");
        assert_eq!(index, 2);

        cursor::delete_char(&mut input, &mut index);
        assert_eq!(input, "éb");
        assert_eq!(index, 1);

        cursor::move_cursor_right(&input, &mut index);
        cursor::move_cursor_right(&input, &mut index);
        assert_eq!(index, 2);
    }

    #[test]
    fn test_delete_at_start_is_noop() {
        let mut input = "ab".to_string();
        let mut index = 0;
        cursor::delete_char(&mut input, &mut index);
        assert_eq!(input, "ab");
        assert_eq!(index, 0);
    }

    #[test]
    fn test_list_navigation_bounds() {
        let mut state = ListState::default();
        let mut last_g = Some(Instant::now());

        handle_list_navigation(Direction::Down, &mut state, 3, None, &mut last_g);
        assert_eq!(state.selected(), Some(1));
        assert!(last_g.is_none());

        handle_list_navigation(Direction::Bottom, &mut state, 3, None, &mut last_g);
        handle_list_navigation(Direction::Down, &mut state, 3, None, &mut last_g);
        assert_eq!(state.selected(), Some(2));

        handle_list_navigation(Direction::Top, &mut state, 3, None, &mut last_g);
        handle_list_navigation(Direction::Up, &mut state, 3, None, &mut last_g);
        assert_eq!(state.selected(), Some(0));

        handle_list_navigation(Direction::Down, &mut state, 0, None, &mut last_g);
        assert_eq!(state.selected(), None);
    }
}
