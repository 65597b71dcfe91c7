//! Keyboard navigation over the visible channel list

/// Rows moved by PageUp/PageDown
pub const PAGE_SIZE: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyAction {
    Up,
    Down,
    PageUp,
    PageDown,
    Home,
    End,
    Play,
    ToggleFavorite,
    NextCategory,
    PrevCategory,
    ToggleTheme,
    FocusSearch,
    CopyLink,
}

/// What the shell has to do after an action
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavCommand {
    None,
    Select(usize),
    Play(usize),
    ToggleFavorite(usize),
    CopyLink(usize),
    ShiftCategory(isize),
    ToggleTheme,
    FocusSearch,
}

impl KeyAction {
    pub fn from_key(key: egui::Key) -> Option<Self> {
        use egui::Key;
        Some(match key {
            Key::ArrowUp | Key::K => KeyAction::Up,
            Key::ArrowDown | Key::J => KeyAction::Down,
            Key::PageUp => KeyAction::PageUp,
            Key::PageDown => KeyAction::PageDown,
            Key::Home => KeyAction::Home,
            Key::End => KeyAction::End,
            Key::Enter | Key::Space => KeyAction::Play,
            Key::F => KeyAction::ToggleFavorite,
            Key::OpenBracket | Key::ArrowLeft => KeyAction::PrevCategory,
            Key::CloseBracket | Key::ArrowRight => KeyAction::NextCategory,
            Key::T => KeyAction::ToggleTheme,
            Key::Slash => KeyAction::FocusSearch,
            Key::C => KeyAction::CopyLink,
            _ => return None,
        })
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Navigator {
    selected: Option<usize>,
}

impl Navigator {
    pub fn selected(&self) -> Option<usize> {
        self.selected
    }

    pub fn select(&mut self, index: Option<usize>) {
        self.selected = index;
    }

    /// Keep the selection inside a list that changed length
    pub fn clamp(&mut self, len: usize) {
        self.selected = match (self.selected, len) {
            (_, 0) => None,
            (Some(idx), _) => Some(idx.min(len - 1)),
            (None, _) => None,
        };
    }

    pub fn apply(&mut self, action: KeyAction, len: usize) -> NavCommand {
        self.clamp(len);

        match action {
            KeyAction::ToggleTheme => return NavCommand::ToggleTheme,
            KeyAction::FocusSearch => return NavCommand::FocusSearch,
            KeyAction::NextCategory => return NavCommand::ShiftCategory(1),
            KeyAction::PrevCategory => return NavCommand::ShiftCategory(-1),
            _ => {}
        }

        if len == 0 {
            return NavCommand::None;
        }
        let last = len - 1;

        let moved = match (action, self.selected) {
            (KeyAction::Up, Some(idx)) => idx.saturating_sub(1),
            (KeyAction::Up, None) => last,
            (KeyAction::Down, Some(idx)) => (idx + 1).min(last),
            (KeyAction::Down, None) => 0,
            (KeyAction::PageUp, idx) => idx.unwrap_or(0).saturating_sub(PAGE_SIZE),
            (KeyAction::PageDown, idx) => idx.map_or(0, |i| i + PAGE_SIZE).min(last),
            (KeyAction::Home, _) => 0,
            (KeyAction::End, _) => last,
            (KeyAction::Play, Some(idx)) => return NavCommand::Play(idx),
            (KeyAction::ToggleFavorite, Some(idx)) => return NavCommand::ToggleFavorite(idx),
            (KeyAction::CopyLink, Some(idx)) => return NavCommand::CopyLink(idx),
            _ => return NavCommand::None,
        };

        self.selected = Some(moved);
        NavCommand::Select(moved)
    }
}

/// Index of the category `step` positions away, wrapping; 0 is the "all" entry
pub fn shift_category(current: usize, step: isize, count: usize) -> usize {
    if count == 0 {
        return 0;
    }
    (current as isize + step).rem_euclid(count as isize) as usize
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_down_from_nothing_selects_first() {
        let mut nav = Navigator::default();
        assert_eq!(nav.apply(KeyAction::Down, 3), NavCommand::Select(0));
        assert_eq!(nav.apply(KeyAction::Down, 3), NavCommand::Select(1));
        assert_eq!(nav.apply(KeyAction::Down, 3), NavCommand::Select(2));
        assert_eq!(nav.apply(KeyAction::Down, 3), NavCommand::Select(2));
    }

    #[test]
    fn test_up_clamps_at_top() {
        let mut nav = Navigator::default();
        assert_eq!(nav.apply(KeyAction::Up, 4), NavCommand::Select(3));
        nav.select(Some(0));
        assert_eq!(nav.apply(KeyAction::Up, 4), NavCommand::Select(0));
    }

    #[test]
    fn test_paging_and_ends() {
        let mut nav = Navigator::default();
        assert_eq!(nav.apply(KeyAction::PageDown, 25), NavCommand::Select(0));
        assert_eq!(nav.apply(KeyAction::PageDown, 25), NavCommand::Select(10));
        assert_eq!(nav.apply(KeyAction::PageDown, 25), NavCommand::Select(20));
        assert_eq!(nav.apply(KeyAction::PageDown, 25), NavCommand::Select(24));
        assert_eq!(nav.apply(KeyAction::PageUp, 25), NavCommand::Select(14));
        assert_eq!(nav.apply(KeyAction::Home, 25), NavCommand::Select(0));
        assert_eq!(nav.apply(KeyAction::End, 25), NavCommand::Select(24));
    }

    #[test]
    fn test_empty_list() {
        let mut nav = Navigator::default();
        nav.select(Some(5));
        assert_eq!(nav.apply(KeyAction::Down, 0), NavCommand::None);
        assert_eq!(nav.apply(KeyAction::Play, 0), NavCommand::None);
        assert_eq!(nav.selected(), None);
        assert_eq!(nav.apply(KeyAction::ToggleTheme, 0), NavCommand::ToggleTheme);
    }

    #[test]
    fn test_actions_need_selection() {
        let mut nav = Navigator::default();
        assert_eq!(nav.apply(KeyAction::Play, 3), NavCommand::None);
        nav.apply(KeyAction::Down, 3);
        assert_eq!(nav.apply(KeyAction::Play, 3), NavCommand::Play(0));
        assert_eq!(nav.apply(KeyAction::ToggleFavorite, 3), NavCommand::ToggleFavorite(0));
        assert_eq!(nav.apply(KeyAction::CopyLink, 3), NavCommand::CopyLink(0));
    }

    #[test]
    fn test_selection_clamped_when_list_shrinks() {
        let mut nav = Navigator::default();
        nav.select(Some(8));
        assert_eq!(nav.apply(KeyAction::Play, 3), NavCommand::Play(2));
    }

    #[test]
    fn test_category_shift_wraps() {
        assert_eq!(shift_category(0, -1, 4), 3);
        assert_eq!(shift_category(3, 1, 4), 0);
        assert_eq!(shift_category(1, 1, 4), 2);
        assert_eq!(shift_category(0, 1, 0), 0);
    }

    #[test]
    fn test_key_mapping() {
        assert_eq!(KeyAction::from_key(egui::Key::ArrowDown), Some(KeyAction::Down));
        assert_eq!(KeyAction::from_key(egui::Key::Enter), Some(KeyAction::Play));
        assert_eq!(KeyAction::from_key(egui::Key::OpenBracket), Some(KeyAction::PrevCategory));
        assert_eq!(KeyAction::from_key(egui::Key::Z), None);
    }
}
