//! Wrap-around highlight cursor shared by list popups.

#[derive(Debug, Default, Clone, Copy)]
pub(crate) struct ScrollState {
    pub(crate) selected_idx: Option<usize>,
}

impl ScrollState {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn move_up_wrap(&mut self, len: usize) {
        if len == 0 {
            self.selected_idx = None;
            return;
        }
        self.selected_idx = Some(match self.selected_idx {
            Some(0) | None => len - 1,
            Some(idx) => idx - 1,
        });
    }

    pub(crate) fn move_down_wrap(&mut self, len: usize) {
        if len == 0 {
            self.selected_idx = None;
            return;
        }
        self.selected_idx = Some(match self.selected_idx {
            Some(idx) if idx + 1 < len => idx + 1,
            Some(_) => 0,
            None => 0,
        });
    }

    /// Keep the highlight inside the list after the list changed.
    pub(crate) fn clamp_selection(&mut self, len: usize) {
        self.selected_idx = match self.selected_idx {
            _ if len == 0 => None,
            Some(idx) => Some(idx.min(len - 1)),
            None => None,
        };
    }

    pub(crate) fn reset(&mut self) {
        self.selected_idx = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn wraps_in_both_directions() {
        let mut state = ScrollState::new();
        state.move_down_wrap(3);
        assert_eq!(state.selected_idx, Some(0));
        state.move_up_wrap(3);
        assert_eq!(state.selected_idx, Some(2));
        state.move_down_wrap(3);
        assert_eq!(state.selected_idx, Some(0));
    }

    #[test]
    fn empty_list_clears_selection() {
        let mut state = ScrollState::new();
        state.move_down_wrap(2);
        state.move_down_wrap(0);
        assert_eq!(state.selected_idx, None);
    }

    #[test]
    fn clamp_pulls_selection_into_range() {
        let mut state = ScrollState::new();
        state.selected_idx = Some(5);
        state.clamp_selection(3);
        assert_eq!(state.selected_idx, Some(2));
        state.clamp_selection(0);
        assert_eq!(state.selected_idx, None);
    }
}
