use bracket_terminal::prelude::VirtualKeyCode;
use log::warn;
use std::{
    fs::File,
    io::{self, BufRead, BufReader},
    path::Path,
};

use crate::game::{Command, MenuKind, RunState};

const LETTERS: [VirtualKeyCode; 26] = [
    VirtualKeyCode::A,
    VirtualKeyCode::B,
    VirtualKeyCode::C,
    VirtualKeyCode::D,
    VirtualKeyCode::E,
    VirtualKeyCode::F,
    VirtualKeyCode::G,
    VirtualKeyCode::H,
    VirtualKeyCode::I,
    VirtualKeyCode::J,
    VirtualKeyCode::K,
    VirtualKeyCode::L,
    VirtualKeyCode::M,
    VirtualKeyCode::N,
    VirtualKeyCode::O,
    VirtualKeyCode::P,
    VirtualKeyCode::Q,
    VirtualKeyCode::R,
    VirtualKeyCode::S,
    VirtualKeyCode::T,
    VirtualKeyCode::U,
    VirtualKeyCode::V,
    VirtualKeyCode::W,
    VirtualKeyCode::X,
    VirtualKeyCode::Y,
    VirtualKeyCode::Z,
];

fn letter_index(key: VirtualKeyCode) -> Option<usize> {
    LETTERS.iter().position(|letter| *letter == key)
}

/// Decodes one key press for the current state. Escape quits everywhere;
/// inside menus a letter picks an entry and anything else cancels.
pub fn command_for(key: VirtualKeyCode, shift: bool, state: RunState) -> Option<Command> {
    if key == VirtualKeyCode::Escape {
        return Some(Command::Quit);
    }
    match state {
        RunState::Dead => None,
        RunState::Menu(_) | RunState::LevelUp => {
            Some(letter_index(key).map_or(Command::Cancel, Command::Choose))
        }
        RunState::Playing => playing_command(key, shift),
    }
}

fn playing_command(key: VirtualKeyCode, shift: bool) -> Option<Command> {
    let step = |dx, dy| Some(Command::Move { dx, dy });
    match key {
        VirtualKeyCode::Left | VirtualKeyCode::Numpad4 | VirtualKeyCode::H => step(-1, 0),
        VirtualKeyCode::Right | VirtualKeyCode::Numpad6 | VirtualKeyCode::L => step(1, 0),
        VirtualKeyCode::Up | VirtualKeyCode::Numpad8 | VirtualKeyCode::K => step(0, -1),
        VirtualKeyCode::Down | VirtualKeyCode::Numpad2 | VirtualKeyCode::J => step(0, 1),
        VirtualKeyCode::Numpad7 | VirtualKeyCode::Y => step(-1, -1),
        VirtualKeyCode::Numpad9 | VirtualKeyCode::U => step(1, -1),
        VirtualKeyCode::Numpad1 | VirtualKeyCode::B => step(-1, 1),
        VirtualKeyCode::Numpad3 | VirtualKeyCode::N => step(1, 1),
        VirtualKeyCode::Period if shift => Some(Command::Descend),
        VirtualKeyCode::Backslash => Some(Command::Descend),
        VirtualKeyCode::Period | VirtualKeyCode::Numpad5 | VirtualKeyCode::Tab => {
            Some(Command::Wait)
        }
        VirtualKeyCode::G | VirtualKeyCode::Comma => Some(Command::PickUp),
        VirtualKeyCode::I => Some(Command::OpenMenu(MenuKind::UseItem)),
        VirtualKeyCode::D if shift => Some(Command::OpenMenu(MenuKind::DropGear)),
        VirtualKeyCode::D => Some(Command::OpenMenu(MenuKind::DropItem)),
        VirtualKeyCode::E => Some(Command::OpenMenu(MenuKind::Equip)),
        VirtualKeyCode::C | VirtualKeyCode::Z => Some(Command::OpenMenu(MenuKind::CastSpell)),
        _ => None,
    }
}

/// Replays key presses from a text script, one character per key. Upper
/// case letters and `>` carry shift.
pub struct ScriptedInput {
    script_commands: Vec<(VirtualKeyCode, bool)>,
    current_command_index: usize,
}

impl ScriptedInput {
    pub fn from_file<P: AsRef<Path>>(path: P) -> io::Result<Self> {
        let file = File::open(path)?;
        let reader = BufReader::new(file);
        let mut script = String::new();
        for line in reader.lines() {
            let line = line?;
            let trimmed_line = line.trim();
            if trimmed_line.is_empty() || trimmed_line.starts_with('#') {
                continue;
            }
            script.push_str(trimmed_line);
        }
        Ok(Self::from_script(&script))
    }

    pub fn from_script(script: &str) -> Self {
        let mut script_commands = Vec::new();
        for char_code in script.chars() {
            match char_to_key(char_code) {
                Some(key) => script_commands.push(key),
                None => warn!("unknown key in script: {char_code:?}"),
            }
        }
        Self {
            script_commands,
            current_command_index: 0,
        }
    }

    pub fn next_key(&mut self) -> Option<(VirtualKeyCode, bool)> {
        let key = self.script_commands.get(self.current_command_index).copied()?;
        self.current_command_index += 1;
        Some(key)
    }

    pub fn is_finished(&self) -> bool {
        self.current_command_index >= self.script_commands.len()
    }
}

fn char_to_key(c: char) -> Option<(VirtualKeyCode, bool)> {
    if c.is_ascii_alphabetic() {
        let idx = (c.to_ascii_lowercase() as u8 - b'a') as usize;
        return Some((LETTERS[idx], c.is_ascii_uppercase()));
    }
    let key = match c {
        '.' => (VirtualKeyCode::Period, false),
        '>' => (VirtualKeyCode::Period, true),
        ',' => (VirtualKeyCode::Comma, false),
        '\\' => (VirtualKeyCode::Backslash, false),
        ' ' => (VirtualKeyCode::Space, false),
        '\t' => (VirtualKeyCode::Tab, false),
        '~' | '\x1B' => (VirtualKeyCode::Escape, false),
        _ => return None,
    };
    Some(key)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escape_quits_from_anywhere() {
        for state in [
            RunState::Playing,
            RunState::Menu(MenuKind::Equip),
            RunState::LevelUp,
            RunState::Dead,
        ] {
            assert_eq!(
                command_for(VirtualKeyCode::Escape, false, state),
                Some(Command::Quit)
            );
        }
    }

    #[test]
    fn letters_mean_choices_inside_menus() {
        let menu = RunState::Menu(MenuKind::UseItem);
        assert_eq!(
            command_for(VirtualKeyCode::C, false, menu),
            Some(Command::Choose(2))
        );
        assert_eq!(
            command_for(VirtualKeyCode::Up, false, menu),
            Some(Command::Cancel)
        );
        assert_eq!(
            command_for(VirtualKeyCode::Z, false, RunState::LevelUp),
            Some(Command::Choose(25))
        );
    }

    #[test]
    fn letters_mean_actions_while_playing() {
        assert_eq!(
            command_for(VirtualKeyCode::C, false, RunState::Playing),
            Some(Command::OpenMenu(MenuKind::CastSpell))
        );
        assert_eq!(
            command_for(VirtualKeyCode::D, true, RunState::Playing),
            Some(Command::OpenMenu(MenuKind::DropGear))
        );
        assert_eq!(
            command_for(VirtualKeyCode::Period, true, RunState::Playing),
            Some(Command::Descend)
        );
        assert_eq!(
            command_for(VirtualKeyCode::Y, false, RunState::Playing),
            Some(Command::Move { dx: -1, dy: -1 })
        );
    }

    #[test]
    fn the_dead_ignore_everything_else() {
        assert_eq!(command_for(VirtualKeyCode::H, false, RunState::Dead), None);
    }

    #[test]
    fn scripts_carry_shift_and_skip_unknown_chars() {
        let mut script = ScriptedInput::from_script("hD>?");
        assert_eq!(script.next_key(), Some((VirtualKeyCode::H, false)));
        assert_eq!(script.next_key(), Some((VirtualKeyCode::D, true)));
        assert_eq!(script.next_key(), Some((VirtualKeyCode::Period, true)));
        assert!(script.is_finished());
        assert_eq!(script.next_key(), None);
    }
}
