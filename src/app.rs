use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use std::time::{Duration, Instant};

use crate::config::AppConfig;
use crate::list::{Item, ListError, ListModel};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Section {
    Entry,   // "Add:" input field
    List,    // Item rows
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Popup {
    None,
    Category,  // Category input for the selected item
    Help,
}

pub struct App {
    pub section: Section,
    pub popup: Popup,

    // Authoritative list state, the UI only projects it
    pub list: ListModel,

    // Selection index into visible_items()
    pub selected: usize,

    // Collapse the checked list
    pub hide_checked: bool,

    // Input buffers
    pub input_buffer: String,
    pub category_buffer: String,
    pub category_target: Option<String>,  // Item the category popup edits

    // Warning from the last action, cleared before the next one
    pub warning: Option<String>,

    // Status message (auto-clears after timeout)
    pub status_message: Option<String>,
    pub status_message_time: Option<Instant>,
    status_timeout: Duration,
}

impl App {
    pub fn new(config: &AppConfig, list: ListModel) -> Self {
        Self {
            section: Section::Entry,
            popup: Popup::None,
            list,
            selected: 0,
            hide_checked: config.hide_checked,
            input_buffer: String::new(),
            category_buffer: String::new(),
            category_target: None,
            warning: None,
            status_message: None,
            status_message_time: None,
            status_timeout: Duration::from_secs(config.status_timeout_secs),
        }
    }

    /// Set a status message (auto-clears after the configured timeout)
    fn set_status(&mut self, msg: impl Into<String>) {
        self.status_message = Some(msg.into());
        self.status_message_time = Some(Instant::now());
    }

    fn clear_warning(&mut self) {
        self.warning = None;
    }

    /// Whether `q` should quit rather than be typed
    pub fn can_quit(&self) -> bool {
        self.popup == Popup::None && self.section == Section::List
    }

    /// Rows as drawn: unchecked items, then checked items unless hidden
    pub fn visible_items(&self) -> Vec<&Item> {
        let checked = self.list.checked().filter(|_| !self.hide_checked);
        self.list.unchecked().chain(checked).collect()
    }

    pub fn selected_item(&self) -> Option<&Item> {
        self.visible_items().get(self.selected).copied()
    }

    fn selected_text(&self) -> Option<String> {
        self.selected_item().map(|item| item.text.clone())
    }

    /// Keep the selection on `key` if it's visible, otherwise keep it in range
    fn follow(&mut self, key: Option<String>) {
        let (found, len) = {
            let rows = self.visible_items();
            let found = key.and_then(|k| rows.iter().position(|item| item.key() == k));
            (found, rows.len())
        };
        self.selected = found.unwrap_or_else(|| self.selected.min(len.saturating_sub(1)));
    }

    // ----- Command handlers -----

    /// Add the entry field's text to the list
    pub fn on_submit(&mut self) {
        self.clear_warning();
        let text = std::mem::take(&mut self.input_buffer);

        match self.list.add(&text, None) {
            Ok(outcome) => {
                match outcome.notice() {
                    Some(notice) => self.warning = Some(notice),
                    None => self.set_status(format!("Added {}", outcome.item().text)),
                }
                self.follow(Some(outcome.item().key()));
            }
            Err(e) => {
                tracing::debug!("Add rejected: {}", e);
                self.warning = Some(e.to_string());
            }
        }
    }

    /// Check or uncheck an item
    pub fn on_toggle(&mut self, text: &str) -> Result<()> {
        self.clear_warning();
        match self.list.toggle_checked(text) {
            Ok(_) => {
                let key = self.list.get(text).map(Item::key);
                self.follow(key);
            }
            Err(ListError::NotFound(name)) => {
                tracing::debug!("Toggle ignored, {} not on the list", name)
            }
            Err(e) => return Err(e.into()),
        }
        Ok(())
    }

    /// Delete an item
    pub fn on_delete(&mut self, text: &str) {
        self.clear_warning();
        if let Some(item) = self.list.remove(text) {
            self.set_status(format!("Deleted {}", item.text));
        }
        self.follow(None);
    }

    /// Set the category typed into the category popup
    pub fn on_category_submit(&mut self, text: &str, value: &str) -> Result<()> {
        self.clear_warning();
        self.popup = Popup::None;
        self.category_buffer.clear();
        self.category_target = None;

        match self.list.set_category(text, value) {
            Ok(()) => Ok(()),
            Err(ListError::NotFound(name)) => {
                tracing::debug!("Category ignored, {} not on the list", name);
                Ok(())
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Drop an item's category
    pub fn on_remove_category(&mut self, text: &str) -> Result<()> {
        self.clear_warning();
        match self.list.set_category(text, "") {
            Ok(()) | Err(ListError::NotFound(_)) => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    /// Show or hide the checked list
    pub fn on_toggle_hide_checked(&mut self) {
        self.clear_warning();
        if !self.list.has_checked_items() {
            return;
        }
        let key = self.selected_item().map(Item::key);
        self.hide_checked = !self.hide_checked;
        self.follow(key);
    }

    // ----- Key handling -----

    pub fn handle_key(&mut self, key: KeyEvent) -> Result<()> {
        // Handle popups first
        if self.popup != Popup::None {
            return self.handle_popup_key(key);
        }

        match self.section {
            Section::Entry => self.handle_entry_key(key),
            Section::List => self.handle_list_key(key),
        }
    }

    fn handle_entry_key(&mut self, key: KeyEvent) -> Result<()> {
        match key.code {
            KeyCode::Enter => self.on_submit(),
            KeyCode::Backspace => {
                self.input_buffer.pop();
            }
            KeyCode::Tab | KeyCode::Esc | KeyCode::Down => {
                self.section = Section::List;
            }
            KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.input_buffer.push(c);
            }
            _ => {}
        }
        Ok(())
    }

    fn handle_list_key(&mut self, key: KeyEvent) -> Result<()> {
        match key.code {
            KeyCode::Char('j') | KeyCode::Down => self.move_down(),
            KeyCode::Char('k') | KeyCode::Up => self.move_up(),

            // Back to the entry field
            KeyCode::Tab
            | KeyCode::BackTab
            | KeyCode::Esc
            | KeyCode::Char('a')
            | KeyCode::Char('i') => {
                self.section = Section::Entry;
            }

            KeyCode::Char(' ') | KeyCode::Enter => {
                if let Some(text) = self.selected_text() {
                    self.on_toggle(&text)?;
                }
            }

            KeyCode::Char('d') | KeyCode::Delete | KeyCode::Backspace => {
                if let Some(text) = self.selected_text() {
                    self.on_delete(&text);
                }
            }

            KeyCode::Char('c') => {
                if let Some(text) = self.selected_text() {
                    self.clear_warning();
                    self.category_target = Some(text);
                    self.category_buffer.clear();
                    self.popup = Popup::Category;
                }
            }

            KeyCode::Char('x') => {
                if let Some(text) = self.selected_text() {
                    self.on_remove_category(&text)?;
                }
            }

            KeyCode::Char('H') => self.on_toggle_hide_checked(),

            KeyCode::Char('?') => self.popup = Popup::Help,

            _ => {}
        }
        Ok(())
    }

    fn handle_popup_key(&mut self, key: KeyEvent) -> Result<()> {
        match self.popup {
            Popup::Category => match key.code {
                KeyCode::Esc => {
                    // Leaving the field discards it
                    self.popup = Popup::None;
                    self.category_buffer.clear();
                    self.category_target = None;
                }
                KeyCode::Enter => {
                    if let Some(text) = self.category_target.clone() {
                        let value = self.category_buffer.clone();
                        self.on_category_submit(&text, &value)?;
                    } else {
                        self.popup = Popup::None;
                    }
                }
                KeyCode::Backspace => {
                    self.category_buffer.pop();
                }
                KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
                    self.category_buffer.push(c);
                }
                _ => {}
            },
            Popup::Help => {
                if matches!(
                    key.code,
                    KeyCode::Esc | KeyCode::Char('?') | KeyCode::Enter | KeyCode::Char('q')
                ) {
                    self.popup = Popup::None;
                }
            }
            Popup::None => {}
        }
        Ok(())
    }

    fn move_down(&mut self) {
        let len = self.visible_items().len();
        if len > 0 {
            self.selected = (self.selected + 1) % len;
        }
    }

    fn move_up(&mut self) {
        let len = self.visible_items().len();
        if len > 0 {
            self.selected = self.selected.checked_sub(1).unwrap_or(len - 1);
        }
    }

    pub fn tick(&mut self) {
        if let Some(time) = self.status_message_time {
            if time.elapsed() >= self.status_timeout {
                self.status_message = None;
                self.status_message_time = None;
            }
        }
    }
}
