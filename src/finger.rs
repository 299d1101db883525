//! Touch-typing finger assignments and the static key-cap rows of the
//! keyboard diagram.
//!
//! The finger lookup is purely visual guidance and never feeds into scoring.

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// The nine touch-typing finger groups plus a neutral fallback for keys
/// outside the table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum_macros::Display)]
pub enum Finger {
    #[strum(serialize = "left pinky")]
    LeftPinky,
    #[strum(serialize = "left ring")]
    LeftRing,
    #[strum(serialize = "left middle")]
    LeftMiddle,
    #[strum(serialize = "left index")]
    LeftIndex,
    #[strum(serialize = "thumb")]
    Thumb,
    #[strum(serialize = "right index")]
    RightIndex,
    #[strum(serialize = "right middle")]
    RightMiddle,
    #[strum(serialize = "right ring")]
    RightRing,
    #[strum(serialize = "right pinky")]
    RightPinky,
    #[strum(serialize = "none")]
    Neutral,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Hand {
    Left,
    Right,
    Both,
}

impl Finger {
    pub const ALL: [Finger; 9] = [
        Finger::LeftPinky,
        Finger::LeftRing,
        Finger::LeftMiddle,
        Finger::LeftIndex,
        Finger::Thumb,
        Finger::RightIndex,
        Finger::RightMiddle,
        Finger::RightRing,
        Finger::RightPinky,
    ];

    pub fn hand(self) -> Hand {
        match self {
            Finger::LeftPinky | Finger::LeftRing | Finger::LeftMiddle | Finger::LeftIndex => {
                Hand::Left
            }
            Finger::RightIndex | Finger::RightMiddle | Finger::RightRing | Finger::RightPinky => {
                Hand::Right
            }
            Finger::Thumb | Finger::Neutral => Hand::Both,
        }
    }
}

/// Look up the finger that strikes `c`. Case-insensitive.
pub fn finger_for(c: char) -> Finger {
    let c = c.to_lowercase().next().unwrap_or(c);
    match c {
        '`' | '1' | 'q' | 'a' | 'z' | '~' | '!' => Finger::LeftPinky,
        'ё' | 'й' | 'ф' | 'я' => Finger::LeftPinky,

        '2' | 'w' | 's' | 'x' | '@' => Finger::LeftRing,
        'ц' | 'ы' | 'ч' => Finger::LeftRing,

        '3' | 'e' | 'd' | 'c' | '#' => Finger::LeftMiddle,
        'у' | 'в' | 'с' => Finger::LeftMiddle,

        '4' | '5' | 'r' | 't' | 'f' | 'g' | 'v' | 'b' | '$' | '%' => Finger::LeftIndex,
        'к' | 'е' | 'а' | 'п' | 'м' | 'и' => Finger::LeftIndex,

        ' ' => Finger::Thumb,

        '6' | '7' | 'y' | 'u' | 'h' | 'j' | 'n' | 'm' | '^' | '&' => Finger::RightIndex,
        'н' | 'г' | 'р' | 'о' | 'т' | 'ь' => Finger::RightIndex,

        '8' | 'i' | 'k' | ',' | '*' => Finger::RightMiddle,
        'ш' | 'л' | 'б' => Finger::RightMiddle,

        '9' | 'o' | 'l' | '.' | '(' => Finger::RightRing,
        'щ' | 'д' | 'ю' => Finger::RightRing,

        '0' | '-' | '=' | 'p' | '[' | ']' | '\\' | ';' | '\'' | '/' | ')' | '_' | '+' | '{'
        | '}' | '|' | ':' | '"' | '<' | '>' | '?' => Finger::RightPinky,
        'з' | 'х' | 'ъ' | 'ж' | 'э' => Finger::RightPinky,

        _ => Finger::Neutral,
    }
}

/// Which keyboard diagram is shown. Display only, never part of scoring.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Default,
    Serialize,
    Deserialize,
    ValueEnum,
    strum_macros::Display,
)]
#[serde(rename_all = "lowercase")]
pub enum Alphabet {
    #[default]
    Latin,
    Cyrillic,
}

impl Alphabet {
    pub fn toggled(self) -> Self {
        match self {
            Alphabet::Latin => Alphabet::Cyrillic,
            Alphabet::Cyrillic => Alphabet::Latin,
        }
    }
}

/// A single cap on the keyboard diagram.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyCap {
    /// Character the finger colour is looked up by.
    pub base: char,
    pub label: &'static str,
    /// Shifted character that lights the same cap.
    pub alt: Option<char>,
    /// Width in cells relative to a regular cap.
    pub span: u16,
}

impl KeyCap {
    const fn letter(base: char, label: &'static str) -> Self {
        Self {
            base,
            label,
            alt: None,
            span: 1,
        }
    }

    const fn shifted(base: char, alt: char, label: &'static str) -> Self {
        Self {
            base,
            label,
            alt: Some(alt),
            span: 1,
        }
    }

    const fn space(label: &'static str) -> Self {
        Self {
            base: ' ',
            label,
            alt: None,
            span: 6,
        }
    }

    pub fn finger(&self) -> Finger {
        finger_for(self.base)
    }

    pub fn is_pressed(&self, key: char) -> bool {
        let key = key.to_lowercase().next().unwrap_or(key);
        key == self.base || Some(key) == self.alt
    }
}

/// Row of caps and the indent (in caps) it is drawn with.
pub type KeyRow = (u16, &'static [KeyCap]);

const NUMBER_ROW_TAIL: [KeyCap; 12] = [
    KeyCap::shifted('1', '!', "!"),
    KeyCap::shifted('2', '@', "@"),
    KeyCap::shifted('3', '#', "#"),
    KeyCap::shifted('4', '$', "$"),
    KeyCap::shifted('5', '%', "%"),
    KeyCap::shifted('6', '^', "^"),
    KeyCap::shifted('7', '&', "&"),
    KeyCap::shifted('8', '*', "*"),
    KeyCap::shifted('9', '(', "("),
    KeyCap::shifted('0', ')', ")"),
    KeyCap::shifted('-', '_', "_"),
    KeyCap::shifted('=', '+', "+"),
];

const fn number_row(first: KeyCap) -> [KeyCap; 13] {
    let mut row = [first; 13];
    let mut i = 0;
    while i < NUMBER_ROW_TAIL.len() {
        row[i + 1] = NUMBER_ROW_TAIL[i];
        i += 1;
    }
    row
}

const LATIN_NUMBERS: [KeyCap; 13] = number_row(KeyCap::shifted('`', '~', "~"));
const LATIN_TOP: [KeyCap; 12] = [
    KeyCap::letter('q', "Q"),
    KeyCap::letter('w', "W"),
    KeyCap::letter('e', "E"),
    KeyCap::letter('r', "R"),
    KeyCap::letter('t', "T"),
    KeyCap::letter('y', "Y"),
    KeyCap::letter('u', "U"),
    KeyCap::letter('i', "I"),
    KeyCap::letter('o', "O"),
    KeyCap::letter('p', "P"),
    KeyCap::shifted('[', '{', "{"),
    KeyCap::shifted(']', '}', "}"),
];
const LATIN_HOME: [KeyCap; 11] = [
    KeyCap::letter('a', "A"),
    KeyCap::letter('s', "S"),
    KeyCap::letter('d', "D"),
    KeyCap::letter('f', "F"),
    KeyCap::letter('g', "G"),
    KeyCap::letter('h', "H"),
    KeyCap::letter('j', "J"),
    KeyCap::letter('k', "K"),
    KeyCap::letter('l', "L"),
    KeyCap::shifted(';', ':', ":"),
    KeyCap::shifted('\'', '"', "\""),
];
const LATIN_BOTTOM: [KeyCap; 10] = [
    KeyCap::letter('z', "Z"),
    KeyCap::letter('x', "X"),
    KeyCap::letter('c', "C"),
    KeyCap::letter('v', "V"),
    KeyCap::letter('b', "B"),
    KeyCap::letter('n', "N"),
    KeyCap::letter('m', "M"),
    KeyCap::shifted(',', '<', "<"),
    KeyCap::shifted('.', '>', ">"),
    KeyCap::shifted('/', '?', "?"),
];
const LATIN_SPACE: [KeyCap; 1] = [KeyCap::space("SPACE")];

const CYRILLIC_NUMBERS: [KeyCap; 13] = number_row(KeyCap::letter('ё', "Ё"));
const CYRILLIC_TOP: [KeyCap; 12] = [
    KeyCap::letter('й', "Й"),
    KeyCap::letter('ц', "Ц"),
    KeyCap::letter('у', "У"),
    KeyCap::letter('к', "К"),
    KeyCap::letter('е', "Е"),
    KeyCap::letter('н', "Н"),
    KeyCap::letter('г', "Г"),
    KeyCap::letter('ш', "Ш"),
    KeyCap::letter('щ', "Щ"),
    KeyCap::letter('з', "З"),
    KeyCap::letter('х', "Х"),
    KeyCap::letter('ъ', "Ъ"),
];
const CYRILLIC_HOME: [KeyCap; 11] = [
    KeyCap::letter('ф', "Ф"),
    KeyCap::letter('ы', "Ы"),
    KeyCap::letter('в', "В"),
    KeyCap::letter('а', "А"),
    KeyCap::letter('п', "П"),
    KeyCap::letter('р', "Р"),
    KeyCap::letter('о', "О"),
    KeyCap::letter('л', "Л"),
    KeyCap::letter('д', "Д"),
    KeyCap::letter('ж', "Ж"),
    KeyCap::letter('э', "Э"),
];
const CYRILLIC_BOTTOM: [KeyCap; 10] = [
    KeyCap::letter('я', "Я"),
    KeyCap::letter('ч', "Ч"),
    KeyCap::letter('с', "С"),
    KeyCap::letter('м', "М"),
    KeyCap::letter('и', "И"),
    KeyCap::letter('т', "Т"),
    KeyCap::letter('ь', "Ь"),
    KeyCap::letter('б', "Б"),
    KeyCap::letter('ю', "Ю"),
    KeyCap::shifted('.', ',', ","),
];
const CYRILLIC_SPACE: [KeyCap; 1] = [KeyCap::space("ПРОБЕЛ")];

const LATIN_ROWS: [KeyRow; 5] = [
    (0, &LATIN_NUMBERS),
    (1, &LATIN_TOP),
    (2, &LATIN_HOME),
    (3, &LATIN_BOTTOM),
    (4, &LATIN_SPACE),
];

const CYRILLIC_ROWS: [KeyRow; 5] = [
    (0, &CYRILLIC_NUMBERS),
    (1, &CYRILLIC_TOP),
    (2, &CYRILLIC_HOME),
    (3, &CYRILLIC_BOTTOM),
    (4, &CYRILLIC_SPACE),
];

pub fn keyboard_rows(alphabet: Alphabet) -> &'static [KeyRow] {
    match alphabet {
        Alphabet::Latin => &LATIN_ROWS,
        Alphabet::Cyrillic => &CYRILLIC_ROWS,
    }
}
