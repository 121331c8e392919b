use std::collections::HashMap;
use std::fmt;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::actions::Action;
use crate::app::Page;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyCombo {
    pub code: KeyCode,
    pub mods: KeyModifiers,
}

impl KeyCombo {
    pub fn new(code: KeyCode, mods: KeyModifiers) -> Self {
        Self { code, mods }
    }

    pub fn plain(code: KeyCode) -> Self {
        Self::new(code, KeyModifiers::NONE)
    }

    pub fn matches(&self, key: &KeyEvent) -> bool {
        // BackTab arrives with SHIFT on most terminals.
        let mods = if key.code == KeyCode::BackTab {
            key.modifiers - KeyModifiers::SHIFT
        } else {
            key.modifiers
        };
        key.code == self.code && mods == self.mods
    }

    pub fn display(&self) -> String {
        let mut parts = Vec::new();
        if self.mods.contains(KeyModifiers::CONTROL) {
            parts.push("Ctrl".to_string());
        }
        if self.mods.contains(KeyModifiers::SHIFT) {
            parts.push("Shift".to_string());
        }
        if self.mods.contains(KeyModifiers::ALT) {
            parts.push("Alt".to_string());
        }
        let code = match self.code {
            KeyCode::Char(c) => c.to_ascii_uppercase().to_string(),
            KeyCode::Tab => "Tab".to_string(),
            KeyCode::BackTab => "BackTab".to_string(),
            KeyCode::F(n) => format!("F{}", n),
            _ => format!("{:?}", self.code),
        };
        parts.push(code);
        parts.join("+")
    }
}

impl fmt::Display for KeyCombo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display())
    }
}

#[derive(Debug, Clone)]
pub struct KeyBindings {
    map: HashMap<Action, Vec<KeyCombo>>,
}

impl Default for KeyBindings {
    fn default() -> Self {
        use Action::*;
        let mut kb = Self::new();
        kb.add(
            Quit,
            KeyCombo::new(KeyCode::Char('q'), KeyModifiers::CONTROL),
        );
        kb.add(FocusNext, KeyCombo::plain(KeyCode::Tab));
        kb.add(FocusPrev, KeyCombo::plain(KeyCode::BackTab));
        for (n, page) in Page::ALL.into_iter().enumerate() {
            let n = n as u8 + 1;
            kb.add(ShowPage(page), KeyCombo::plain(KeyCode::F(n)));
            kb.add(
                ShowPage(page),
                KeyCombo::new(KeyCode::Char((b'0' + n) as char), KeyModifiers::ALT),
            );
        }
        // Function keys above F8 are often taken by the terminal, so each
        // window command also has an Alt binding.
        kb.add(ToggleMinimize, KeyCombo::plain(KeyCode::F(9)));
        kb.add(
            ToggleMinimize,
            KeyCombo::new(KeyCode::Char('m'), KeyModifiers::ALT),
        );
        kb.add(CloseWindow, KeyCombo::plain(KeyCode::F(10)));
        kb.add(
            CloseWindow,
            KeyCombo::new(KeyCode::Char('x'), KeyModifiers::ALT),
        );
        kb.add(Logout, KeyCombo::plain(KeyCode::F(11)));
        kb.add(Logout, KeyCombo::new(KeyCode::Char('l'), KeyModifiers::ALT));
        kb.add(ToggleActivityLog, KeyCombo::plain(KeyCode::F(12)));
        kb.add(
            ToggleActivityLog,
            KeyCombo::new(KeyCode::Char('d'), KeyModifiers::ALT),
        );
        kb
    }
}

impl KeyBindings {
    pub fn new() -> Self {
        Self {
            map: HashMap::new(),
        }
    }

    pub fn add(&mut self, action: Action, combo: KeyCombo) {
        self.map.entry(action).or_default().push(combo);
    }

    pub fn matches(&self, action: Action, key: &KeyEvent) -> bool {
        self.map
            .get(&action)
            .is_some_and(|list| list.iter().any(|c| c.matches(key)))
    }

    pub fn action_for_key(&self, key: &KeyEvent) -> Option<Action> {
        self.map
            .iter()
            .find(|(_, list)| list.iter().any(|c| c.matches(key)))
            .map(|(act, _)| *act)
    }

    /// Return the first `KeyCombo` mapped to `action`, if any.
    pub fn first_combo(&self, action: Action) -> Option<KeyCombo> {
        self.map.get(&action).and_then(|list| list.first().cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_quit() {
        let kb = KeyBindings::default();
        let ev = KeyEvent::new(KeyCode::Char('q'), KeyModifiers::CONTROL);
        assert!(kb.matches(Action::Quit, &ev));
        assert_eq!(kb.action_for_key(&ev), Some(Action::Quit));
    }

    #[test]
    fn pages_have_function_and_alt_keys() {
        let kb = KeyBindings::default();
        let f2 = KeyEvent::new(KeyCode::F(2), KeyModifiers::NONE);
        let alt5 = KeyEvent::new(KeyCode::Char('5'), KeyModifiers::ALT);
        assert_eq!(kb.action_for_key(&f2), Some(Action::ShowPage(Page::Rooms)));
        assert_eq!(kb.action_for_key(&alt5), Some(Action::ShowPage(Page::Login)));
    }

    #[test]
    fn backtab_with_shift_still_matches() {
        let kb = KeyBindings::default();
        let ev = KeyEvent::new(KeyCode::BackTab, KeyModifiers::SHIFT);
        assert!(kb.matches(Action::FocusPrev, &ev));
    }

    #[test]
    fn plain_letters_are_left_to_panes() {
        let kb = KeyBindings::default();
        let ev = KeyEvent::new(KeyCode::Char('m'), KeyModifiers::NONE);
        assert_eq!(kb.action_for_key(&ev), None);
        assert_eq!(
            kb.first_combo(Action::ToggleMinimize).map(|c| c.display()),
            Some("F9".to_string())
        );
    }
}
