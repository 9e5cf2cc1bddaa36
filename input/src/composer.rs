//! The interaction controller: converts keyboard, paste, click, and focus
//! events into chip-store replacements.
//!
//! The composer never retains the chip sequence. Every event handler takes
//! the host's current chips as authoritative input and, when the event
//! mutates the store, returns the complete replacement sequence. The host
//! applies it through its own change callback; the composer's only owned
//! state is the pending text buffer, the insertion gap, and the suggestion
//! dropdown.
//!
//! Caret model: the live text caret sits either after the last chip
//! (`insert_position = None`) or in the gap before chip `i`
//! (`insert_position = Some(i)`). Committed chips are spliced into that gap.

use crate::buffer::InputBuffer;
use crate::config::ChipConfig;
use crate::popup::SuggestionPopup;
use chipline_core::Chip;
use chipline_core::ParsedToken;
use chipline_core::Suggestion;
use chipline_core::contains_delimiter;
use chipline_core::split_by_delimiters;
use chipline_suggest::SearchError;
use chipline_suggest::SearchProvider;
use chipline_suggest::SessionReporter;
use chipline_suggest::SuggestionSession;
use crossterm::event::KeyCode;
use crossterm::event::KeyEvent;
use crossterm::event::KeyEventKind;
use crossterm::event::KeyModifiers;
use std::sync::Arc;

/// A chip-store replacement, or `None` when the event left the store alone.
pub type ChipsUpdate<T> = Option<Vec<Chip<T>>>;

enum PopupOutcome<T> {
    Handled(ChipsUpdate<T>),
    NotConsumed,
}

pub struct ChipComposer<T = String> {
    config: ChipConfig<T>,
    buffer: InputBuffer,
    popup: SuggestionPopup<T>,
    session: Option<SuggestionSession<T>>,
    insert_position: Option<usize>,
    /// Set while a pointer gesture on a suggestion is in progress; suppresses
    /// the blur-commit that the gesture triggers before the click lands.
    selecting_suggestion: bool,
    has_focus: bool,
}

impl<T> ChipComposer<T>
where
    T: Clone + Send + 'static,
{
    pub fn new(config: ChipConfig<T>) -> Self {
        Self {
            config,
            buffer: InputBuffer::new(),
            popup: SuggestionPopup::new(),
            session: None,
            insert_position: None,
            selecting_suggestion: false,
            has_focus: false,
        }
    }

    /// Attach a debounced search pipeline. The reporter is the host's bridge
    /// back into this composer: it should forward callbacks to
    /// [`ChipComposer::on_search_started`], [`ChipComposer::on_search_result`],
    /// and [`ChipComposer::on_search_error`] on its event loop.
    pub fn with_search(
        mut self,
        provider: Arc<dyn SearchProvider<T>>,
        reporter: Arc<dyn SessionReporter<T>>,
    ) -> Self {
        self.session = Some(SuggestionSession::new(
            provider,
            reporter,
            self.config.debounce,
        ));
        self
    }

    /// Handle a key press. Returns the chip-store replacement (if the event
    /// committed or deleted chips) and whether the event was consumed; an
    /// unconsumed event should fall through to the host's default handling.
    pub async fn handle_key_event(
        &mut self,
        key_event: KeyEvent,
        chips: &[Chip<T>],
    ) -> (ChipsUpdate<T>, bool) {
        if key_event.kind == KeyEventKind::Release {
            return (None, false);
        }
        if self.popup.is_visible() && !self.popup.matches().is_empty() {
            match self.handle_key_event_with_popup(key_event, chips).await {
                PopupOutcome::Handled(update) => return (update, true),
                PopupOutcome::NotConsumed => {}
            }
        }
        self.handle_key_event_plain(key_event, chips).await
    }

    async fn handle_key_event_with_popup(
        &mut self,
        key_event: KeyEvent,
        chips: &[Chip<T>],
    ) -> PopupOutcome<T> {
        match key_event {
            KeyEvent {
                code: KeyCode::Up, ..
            } => {
                self.popup.move_up();
                PopupOutcome::Handled(None)
            }
            KeyEvent {
                code: KeyCode::Down,
                ..
            } => {
                self.popup.move_down();
                PopupOutcome::Handled(None)
            }
            KeyEvent {
                code: KeyCode::Esc, ..
            } => {
                self.popup.close();
                PopupOutcome::Handled(None)
            }
            KeyEvent {
                code: KeyCode::Enter,
                modifiers: KeyModifiers::NONE,
                ..
            } => match self.popup.highlighted().cloned() {
                Some(suggestion) => {
                    PopupOutcome::Handled(self.commit_suggestion(suggestion, chips).await)
                }
                None => PopupOutcome::NotConsumed,
            },
            KeyEvent {
                code: KeyCode::Tab, ..
            } => match self.popup.highlighted().cloned() {
                Some(suggestion) => {
                    PopupOutcome::Handled(self.commit_suggestion(suggestion, chips).await)
                }
                None => {
                    // Let Tab keep its focus-move meaning when there is
                    // nothing to select.
                    self.popup.close();
                    PopupOutcome::NotConsumed
                }
            },
            _ => PopupOutcome::NotConsumed,
        }
    }

    async fn handle_key_event_plain(
        &mut self,
        key_event: KeyEvent,
        chips: &[Chip<T>],
    ) -> (ChipsUpdate<T>, bool) {
        match key_event {
            KeyEvent {
                code: KeyCode::Enter,
                modifiers: KeyModifiers::NONE,
                ..
            }
            | KeyEvent {
                code: KeyCode::Tab, ..
            } => {
                if self.buffer.text().trim().is_empty() {
                    return (None, false);
                }
                let raw = self.buffer.take();
                (self.commit_text(&raw, chips).await, true)
            }
            KeyEvent {
                code: KeyCode::Backspace,
                ..
            } => {
                if self.buffer.backspace() {
                    self.sync_search();
                    (None, true)
                } else if self.buffer.is_empty() {
                    self.delete_before_gap(chips)
                } else {
                    (None, false)
                }
            }
            KeyEvent {
                code: KeyCode::Delete,
                ..
            } => {
                if self.buffer.delete() {
                    self.sync_search();
                    (None, true)
                } else {
                    (None, false)
                }
            }
            KeyEvent {
                code: KeyCode::Left,
                ..
            } => {
                if !self.buffer.cursor_at_start() {
                    self.buffer.move_left();
                    return (None, true);
                }
                if chips.is_empty() {
                    return (None, false);
                }
                self.insert_position = Some(match self.insert_position {
                    None => chips.len() - 1,
                    Some(i) => i.saturating_sub(1),
                });
                (None, true)
            }
            KeyEvent {
                code: KeyCode::Right,
                ..
            } => {
                if !self.buffer.cursor_at_end() {
                    self.buffer.move_right();
                    return (None, true);
                }
                match self.insert_position {
                    Some(i) if i + 1 < chips.len() => {
                        self.insert_position = Some(i + 1);
                        (None, true)
                    }
                    Some(_) => {
                        // Walked past the last gap: the caret is back at the
                        // end of the row.
                        self.insert_position = None;
                        self.has_focus = true;
                        (None, true)
                    }
                    None => (None, false),
                }
            }
            KeyEvent {
                code: KeyCode::Home,
                ..
            } => {
                self.buffer.move_home();
                (None, true)
            }
            KeyEvent {
                code: KeyCode::End, ..
            } => {
                self.buffer.move_end();
                (None, true)
            }
            KeyEvent {
                code: KeyCode::Esc, ..
            } => {
                if self.insert_position.is_some() {
                    self.insert_position = None;
                    (None, true)
                } else {
                    (None, false)
                }
            }
            KeyEvent {
                code: KeyCode::Char(c),
                modifiers,
                ..
            } if modifiers == KeyModifiers::NONE || modifiers == KeyModifiers::SHIFT => {
                self.buffer.insert_char(c);
                (self.after_edit(chips).await, true)
            }
            _ => (None, false),
        }
    }

    /// Handle pasted text. Returns the replacement (if the paste committed
    /// chips) and whether the paste was intercepted: `true` means the text
    /// was split and committed and the host must suppress its default
    /// insertion; `false` means the text went into the pending buffer.
    pub async fn handle_paste(
        &mut self,
        pasted: &str,
        chips: &[Chip<T>],
    ) -> (ChipsUpdate<T>, bool) {
        let mut delimiters = self.config.delimiters.clone();
        delimiters.push("\n".to_string());
        self.buffer.insert_str(pasted);
        if contains_delimiter(self.buffer.text(), &delimiters) {
            let raw = self.buffer.take();
            let segments = split_by_delimiters(&raw, &delimiters);
            (self.commit_segments(segments, chips).await, true)
        } else {
            self.sync_search();
            (None, false)
        }
    }

    /// Handle the text field losing focus. `focus_in_container` is true when
    /// the new focus target is still inside the control (chips, dropdown);
    /// such blurs never commit.
    pub async fn handle_blur(
        &mut self,
        focus_in_container: bool,
        chips: &[Chip<T>],
    ) -> ChipsUpdate<T> {
        if self.selecting_suggestion {
            // The blur was caused by a suggestion gesture; the click handler
            // that follows does the committing.
            self.selecting_suggestion = false;
            return None;
        }
        if focus_in_container {
            return None;
        }
        self.has_focus = false;
        let update = if self.buffer.text().trim().is_empty() {
            self.buffer.take();
            None
        } else {
            let raw = self.buffer.take();
            self.commit_text(&raw, chips).await
        };
        self.popup.close();
        update
    }

    /// Mark that a pointer gesture on a suggestion has started, so the blur
    /// it causes is not treated as leaving the control.
    pub fn begin_suggestion_selection(&mut self) {
        self.selecting_suggestion = true;
    }

    pub async fn handle_suggestion_click(
        &mut self,
        index: usize,
        chips: &[Chip<T>],
    ) -> ChipsUpdate<T> {
        self.selecting_suggestion = false;
        let Some(suggestion) = self.popup.matches().get(index).cloned() else {
            return None;
        };
        self.commit_suggestion(suggestion, chips).await
    }

    pub fn handle_suggestion_hover(&mut self, index: usize) {
        self.popup.set_highlight(index);
    }

    /// Click on chip `index`: the caret moves into the gap before that chip.
    pub fn handle_chip_click(&mut self, index: usize, chips: &[Chip<T>]) {
        self.insert_position = Some(index.min(chips.len()));
        self.has_focus = true;
    }

    /// Click on the container background: focus the field, caret after the
    /// last chip.
    pub fn handle_container_click(&mut self) {
        self.insert_position = None;
        self.has_focus = true;
    }

    pub fn handle_focus(&mut self) {
        self.has_focus = true;
    }

    /// A debounced search is now in flight for `query`.
    pub fn on_search_started(&mut self, query: &str) {
        if query == self.buffer.text().trim() {
            self.popup.set_loading(true);
        }
    }

    /// Integrate results from the asynchronous search. Results for a query
    /// the user has since edited away from are dropped.
    pub fn on_search_result(&mut self, query: &str, matches: Vec<Suggestion<T>>) {
        if query != self.buffer.text().trim() {
            return;
        }
        self.popup.set_loading(false);
        self.popup.set_matches(matches);
    }

    pub fn on_search_error(&mut self, query: &str, error: &SearchError) {
        if query != self.buffer.text().trim() {
            return;
        }
        self.popup.set_loading(false);
        if matches!(error, SearchError::Cancelled) {
            return;
        }
        self.popup.clear();
        match &self.config.on_search_error {
            Some(hook) => hook(error),
            None => tracing::debug!("suggestion search failed: {error}"),
        }
    }

    pub fn pending_text(&self) -> &str {
        self.buffer.text()
    }

    pub fn pending_cursor(&self) -> usize {
        self.buffer.cursor()
    }

    /// Display columns the live text field wants among the chips.
    pub fn desired_input_width(&self) -> usize {
        self.buffer.desired_width()
    }

    pub fn insert_position(&self) -> Option<usize> {
        self.insert_position
    }

    pub fn suggestions(&self) -> &[Suggestion<T>] {
        self.popup.matches()
    }

    pub fn highlighted_index(&self) -> Option<usize> {
        self.popup.highlighted_idx()
    }

    pub fn popup_visible(&self) -> bool {
        self.popup.is_visible()
    }

    pub fn is_loading(&self) -> bool {
        self.popup.is_loading()
    }

    pub fn has_focus(&self) -> bool {
        self.has_focus
    }

    /// Provisional validity of the pending text, for live feedback while
    /// typing. Asynchronous validators answer optimistically; the
    /// authoritative answer is computed at commit time.
    pub fn pending_is_valid(&self) -> Option<bool> {
        let token = (self.config.parser)(self.buffer.text())?;
        self.config.validator.validate_now(&token.value)
    }

    /// Display text for a chip: the label when present, else the formatted
    /// value.
    pub fn chip_text(&self, chip: &Chip<T>) -> String {
        match &chip.label {
            Some(label) => label.clone(),
            None => (self.config.format_value)(&chip.value),
        }
    }

    /// Buffer changed under a key stroke: an inline delimiter commits the
    /// whole buffer immediately, otherwise the suggestion query follows the
    /// text.
    async fn after_edit(&mut self, chips: &[Chip<T>]) -> ChipsUpdate<T> {
        if contains_delimiter(self.buffer.text(), &self.config.delimiters) {
            let raw = self.buffer.take();
            self.commit_text(&raw, chips).await
        } else {
            self.sync_search();
            None
        }
    }

    async fn commit_text(&mut self, raw: &str, chips: &[Chip<T>]) -> ChipsUpdate<T> {
        let segments = split_by_delimiters(raw, &self.config.delimiters);
        self.commit_segments(segments, chips).await
    }

    async fn commit_segments(
        &mut self,
        segments: Vec<String>,
        chips: &[Chip<T>],
    ) -> ChipsUpdate<T> {
        let tokens: Vec<ParsedToken<T>> = segments
            .iter()
            .filter_map(|segment| (self.config.parser)(segment))
            .collect();
        self.commit_tokens(tokens, chips).await
    }

    async fn commit_suggestion(
        &mut self,
        suggestion: Suggestion<T>,
        chips: &[Chip<T>],
    ) -> ChipsUpdate<T> {
        self.buffer.take();
        let mut token = ParsedToken::new(suggestion.value);
        if let Some(label) = suggestion.label {
            token = token.with_label(label);
        }
        self.commit_tokens(vec![token], chips).await
    }

    /// The single commit pipeline: dedupe each token against the store as it
    /// grows (so one paste cannot insert the same value twice), validate,
    /// splice at the gap, and advance the gap past the insertions.
    async fn commit_tokens(
        &mut self,
        tokens: Vec<ParsedToken<T>>,
        chips: &[Chip<T>],
    ) -> ChipsUpdate<T> {
        let gap = self.insert_position.map(|g| g.min(chips.len()));
        let mut next: Vec<Chip<T>> = chips.to_vec();
        let mut inserted = 0usize;
        for token in tokens {
            if self.config.duplicates.is_duplicate(&token.value, &next) {
                continue;
            }
            let is_valid = self.config.validator.validate(&token.value).await;
            let mut chip = Chip::new(token.value).with_validity(is_valid);
            if let Some(label) = token.label {
                chip = chip.with_label(label);
            }
            match gap {
                Some(g) => next.insert(g + inserted, chip),
                None => next.push(chip),
            }
            inserted += 1;
        }
        self.close_search();
        if inserted == 0 {
            return None;
        }
        if let Some(g) = gap {
            self.insert_position = Some(g + inserted);
        }
        Some(next)
    }

    fn delete_before_gap(&mut self, chips: &[Chip<T>]) -> (ChipsUpdate<T>, bool) {
        if chips.is_empty() {
            return (None, false);
        }
        let remove_idx = match self.insert_position {
            None => chips.len() - 1,
            Some(0) => return (None, false),
            Some(i) => i.min(chips.len()) - 1,
        };
        let mut next = chips.to_vec();
        next.remove(remove_idx);
        self.insert_position = match self.insert_position {
            Some(i) if !next.is_empty() => Some(i - 1),
            _ => None,
        };
        (Some(next), true)
    }

    fn sync_search(&mut self) {
        let query = self.buffer.text().trim().to_string();
        if let Some(session) = &self.session {
            session.update_query(&query);
        }
        if query.is_empty() {
            self.popup.clear();
        }
    }

    fn close_search(&mut self) {
        self.popup.clear();
        if let Some(session) = &self.session {
            session.reset();
        }
    }
}
