//! Dropdown state for suggestion results: the match list, the highlight,
//! visibility, and the loading flag. Pure state; the composer decides when
//! results are fresh enough to land here.

use crate::scroll_state::ScrollState;
use chipline_core::Suggestion;

pub(crate) struct SuggestionPopup<T> {
    matches: Vec<Suggestion<T>>,
    state: ScrollState,
    visible: bool,
    loading: bool,
}

impl<T> Default for SuggestionPopup<T> {
    fn default() -> Self {
        Self {
            matches: Vec::new(),
            state: ScrollState::new(),
            visible: false,
            loading: false,
        }
    }
}

impl<T> SuggestionPopup<T> {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Replace the match list. Visibility follows non-emptiness and the
    /// highlight snaps to the first item.
    pub(crate) fn set_matches(&mut self, matches: Vec<Suggestion<T>>) {
        self.visible = !matches.is_empty();
        self.state.selected_idx = if matches.is_empty() { None } else { Some(0) };
        self.matches = matches;
    }

    pub(crate) fn matches(&self) -> &[Suggestion<T>] {
        &self.matches
    }

    pub(crate) fn is_visible(&self) -> bool {
        self.visible
    }

    pub(crate) fn is_loading(&self) -> bool {
        self.loading
    }

    pub(crate) fn set_loading(&mut self, loading: bool) {
        self.loading = loading;
    }

    pub(crate) fn move_up(&mut self) {
        self.state.move_up_wrap(self.matches.len());
    }

    pub(crate) fn move_down(&mut self) {
        self.state.move_down_wrap(self.matches.len());
    }

    pub(crate) fn highlighted_idx(&self) -> Option<usize> {
        self.state.selected_idx
    }

    /// Set the highlight directly (pointer hover).
    pub(crate) fn set_highlight(&mut self, idx: usize) {
        self.state.selected_idx = Some(idx);
        self.state.clamp_selection(self.matches.len());
    }

    pub(crate) fn highlighted(&self) -> Option<&Suggestion<T>> {
        let idx = self.state.selected_idx?;
        self.matches.get(idx)
    }

    /// Hide the dropdown but keep the match list, so reopening does not need
    /// a fresh search.
    pub(crate) fn close(&mut self) {
        self.visible = false;
        self.state.reset();
    }

    /// Drop everything: list, highlight, visibility, loading.
    pub(crate) fn clear(&mut self) {
        self.matches.clear();
        self.visible = false;
        self.loading = false;
        self.state.reset();
    }
}
