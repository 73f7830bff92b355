//! Customizable keybindings for the page editor.
//!
//! Mode hotkeys, zoom keys and layer toggles are configurable. Enter, Escape,
//! Delete and Backspace always keep their fixed meaning.

use pagegt_view::KeyCode;
use serde::{Deserialize, Serialize};

/// Something a key press can ask the editor to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    SelectMode,
    AddRegionMode,
    AddLineMode,
    /// Finish the shape being drawn
    Finish,
    /// Discard the shape being drawn
    Cancel,
    /// Delete the selected line or region
    Delete,
    ZoomIn,
    ZoomOut,
    /// Fit the whole page into view
    Fit,
    ToggleRegions,
    ToggleLines,
}

/// Keybinding configuration for the editor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct KeyBindings {
    /// Hotkey for select mode
    pub mode_select: KeyCode,
    /// Hotkey for region drawing
    pub mode_add_region: KeyCode,
    /// Hotkey for line drawing
    pub mode_add_line: KeyCode,
    pub zoom_in: KeyCode,
    pub zoom_out: KeyCode,
    /// Fit ("home")
    pub fit: KeyCode,
    /// Show/hide regions
    pub toggle_regions: KeyCode,
    /// Show/hide lines and baselines
    pub toggle_lines: KeyCode,
}

impl Default for KeyBindings {
    fn default() -> Self {
        Self {
            mode_select: KeyCode::S,
            mode_add_region: KeyCode::R,
            mode_add_line: KeyCode::L,
            zoom_in: KeyCode::Plus,
            zoom_out: KeyCode::Minus,
            fit: KeyCode::H,
            toggle_regions: KeyCode::Key1,
            toggle_lines: KeyCode::Key2,
        }
    }
}

impl KeyBindings {
    /// Create new keybindings with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the command that corresponds to a key press, if any.
    pub fn command_for_key(&self, key: KeyCode) -> Option<Command> {
        match key {
            KeyCode::Enter => return Some(Command::Finish),
            KeyCode::Escape => return Some(Command::Cancel),
            KeyCode::Delete | KeyCode::Backspace => return Some(Command::Delete),
            _ => {}
        }

        self.bindings()
            .into_iter()
            .find(|(bound, _)| *bound == key)
            .map(|(_, command)| command)
            // "=" shares a physical key with "+" on most layouts
            .or_else(|| {
                (key == KeyCode::Equals && self.zoom_in == KeyCode::Plus).then_some(Command::ZoomIn)
            })
    }

    /// Get the hotkey for a configurable command.
    pub fn key_for(&self, command: Command) -> Option<KeyCode> {
        self.bindings()
            .into_iter()
            .find(|(_, bound)| *bound == command)
            .map(|(key, _)| key)
    }

    /// Check if a key is already used by another binding.
    /// Returns a description of what it's used for, if anything.
    pub fn key_conflict(&self, key: KeyCode, exclude: Option<Command>) -> Option<String> {
        if matches!(
            key,
            KeyCode::Enter | KeyCode::Escape | KeyCode::Delete | KeyCode::Backspace
        ) {
            return Some(format!("reserved key {}", key_to_string(key)));
        }
        self.bindings()
            .into_iter()
            .find(|(bound, command)| *bound == key && Some(*command) != exclude)
            .map(|(_, command)| format!("{:?}", command))
    }

    fn bindings(&self) -> [(KeyCode, Command); 8] {
        [
            (self.mode_select, Command::SelectMode),
            (self.mode_add_region, Command::AddRegionMode),
            (self.mode_add_line, Command::AddLineMode),
            (self.zoom_in, Command::ZoomIn),
            (self.zoom_out, Command::ZoomOut),
            (self.fit, Command::Fit),
            (self.toggle_regions, Command::ToggleRegions),
            (self.toggle_lines, Command::ToggleLines),
        ]
    }
}

/// Convert a KeyCode to a display string.
pub fn key_to_string(key: KeyCode) -> &'static str {
    match key {
        KeyCode::A => "A",
        KeyCode::B => "B",
        KeyCode::C => "C",
        KeyCode::D => "D",
        KeyCode::E => "E",
        KeyCode::F => "F",
        KeyCode::G => "G",
        KeyCode::H => "H",
        KeyCode::I => "I",
        KeyCode::J => "J",
        KeyCode::K => "K",
        KeyCode::L => "L",
        KeyCode::M => "M",
        KeyCode::N => "N",
        KeyCode::O => "O",
        KeyCode::P => "P",
        KeyCode::Q => "Q",
        KeyCode::R => "R",
        KeyCode::S => "S",
        KeyCode::T => "T",
        KeyCode::U => "U",
        KeyCode::V => "V",
        KeyCode::W => "W",
        KeyCode::X => "X",
        KeyCode::Y => "Y",
        KeyCode::Z => "Z",
        KeyCode::Key0 => "0",
        KeyCode::Key1 => "1",
        KeyCode::Key2 => "2",
        KeyCode::Key3 => "3",
        KeyCode::Key4 => "4",
        KeyCode::Key5 => "5",
        KeyCode::Key6 => "6",
        KeyCode::Key7 => "7",
        KeyCode::Key8 => "8",
        KeyCode::Key9 => "9",
        KeyCode::Enter => "Enter",
        KeyCode::Escape => "Esc",
        KeyCode::Delete => "Del",
        KeyCode::Backspace => "Backspace",
        KeyCode::Tab => "Tab",
        KeyCode::Space => "Space",
        KeyCode::Plus => "+",
        KeyCode::Minus => "-",
        KeyCode::Equals => "=",
        KeyCode::Up => "Up",
        KeyCode::Down => "Down",
        KeyCode::Left => "Left",
        KeyCode::Right => "Right",
    }
}
