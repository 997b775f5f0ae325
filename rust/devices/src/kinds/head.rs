//! Head motion shared by the tape and the RAM memory cursor.
//!
//! Both media are one-way infinite with the home cell at index 0. A
//! compound operation may require the head to be home and may move it one
//! cell; `left` is impossible from home.

use std::fmt;

/// Head movement after a compound operation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Shift {
    /// Keep the head in place.
    #[default]
    Stay,
    /// Move towards the home cell.
    Left,
    /// Move away from the home cell.
    Right,
}

impl Shift {
    pub(crate) fn keyword(self) -> &'static str {
        match self {
            Self::Stay => "stay",
            Self::Left => "left",
            Self::Right => "right",
        }
    }

    pub(crate) fn from_keyword(word: &str) -> Option<Self> {
        match word {
            "stay" => Some(Self::Stay),
            "left" => Some(Self::Left),
            "right" => Some(Self::Right),
            _ => None,
        }
    }

    pub(crate) fn apply(self, head: &mut usize) {
        match self {
            Self::Stay => {}
            Self::Left => *head -= 1,
            Self::Right => *head += 1,
        }
    }
}

impl fmt::Display for Shift {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}

/// Home check plus move of a compound operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Motion {
    pub(crate) home: bool,
    pub(crate) shift: Shift,
}

impl Motion {
    /// Some head position admits the motion. `home left` never does.
    pub(crate) fn satisfiable(self) -> bool {
        !(self.home && self.shift == Shift::Left)
    }

    pub(crate) fn allows(self, head: usize) -> bool {
        (!self.home || head == 0) && (self.shift != Shift::Left || head > 0)
    }

    /// Some head position admits both motions.
    pub(crate) fn meets(self, other: Self) -> bool {
        self.satisfiable()
            && other.satisfiable()
            && !(self.home && other.shift == Shift::Left)
            && !(other.home && self.shift == Shift::Left)
    }

    /// Some position admitting the motion is the home cell.
    pub(crate) fn reaches_home(self) -> bool {
        self.satisfiable() && self.shift != Shift::Left
    }
}
