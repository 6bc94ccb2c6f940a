use std::collections::HashMap;

use gigatron_core::system::InputButton;
use sdl2::keyboard::Scancode;

/// Maps SDL scancodes to controller button bit masks.
pub struct KeyMap {
    map: HashMap<Scancode, u8>,
}

impl KeyMap {
    pub fn new() -> Self {
        Self {
            map: HashMap::new(),
        }
    }

    /// Bind a scancode to a button's bit mask.
    pub fn bind(&mut self, scancode: Scancode, bit: u8) {
        self.map.insert(scancode, bit);
    }

    /// Look up the bit mask bound to a scancode.
    pub fn get(&self, scancode: Scancode) -> Option<u8> {
        self.map.get(&scancode).copied()
    }
}

/// Build a default key map for the controller's 8 buttons.
pub fn default_key_map(buttons: &[InputButton]) -> KeyMap {
    let mut km = KeyMap::new();

    for button in buttons {
        let scancode = match button.name {
            "Up" => Some(Scancode::Up),
            "Down" => Some(Scancode::Down),
            "Left" => Some(Scancode::Left),
            "Right" => Some(Scancode::Right),
            "A" => Some(Scancode::Z),
            "B" => Some(Scancode::X),
            "Select" => Some(Scancode::RShift),
            "Start" => Some(Scancode::Return),
            _ => None,
        };

        if let Some(sc) = scancode {
            km.bind(sc, button.bit);
        }
    }

    km
}
