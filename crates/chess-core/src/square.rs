//! Board coordinates.
//!
//! A [`Square`] is a (rank, file) pair packed into one byte as
//! `rank * 8 + file`, so a1 = 0, h1 = 7 and h8 = 63.

use std::fmt;
use thiserror::Error;

/// Error returned for coordinates outside the 8x8 board.
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
#[error("invalid square: rank {rank}, file {file} (both must be 0-7)")]
pub struct SquareError {
    pub rank: i32,
    pub file: i32,
}

/// Declares one board axis: eight variants in order, labelled from `$first`.
macro_rules! axis {
    ($(#[$meta:meta])* $name:ident, $first:literal, [$($variant:ident),+ $(,)?]) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        #[repr(u8)]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            pub const ALL: [$name; 8] = [$($name::$variant),+];

            /// Returns the coordinate for index 0-7.
            #[inline]
            pub const fn from_index(index: u8) -> Option<Self> {
                if index < 8 {
                    Some(Self::ALL[index as usize])
                } else {
                    None
                }
            }

            #[inline]
            pub const fn from_char(c: char) -> Option<Self> {
                let c = c as u32;
                let first = $first as u32;
                if c >= first && c < first + 8 {
                    Self::from_index((c - first) as u8)
                } else {
                    None
                }
            }

            #[inline]
            pub const fn index(self) -> u8 {
                self as u8
            }

            #[inline]
            pub const fn to_char(self) -> char {
                ($first as u8 + self as u8) as char
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.to_char())
            }
        }
    };
}

axis!(
    /// Board column, written 'a' to 'h'.
    File,
    'a',
    [A, B, C, D, E, F, G, H]
);

axis!(
    /// Board row, written '1' to '8'. `R1` is White's back rank.
    Rank,
    '1',
    [R1, R2, R3, R4, R5, R6, R7, R8]
);

/// One of the 64 board squares.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Square(u8);

impl Square {
    pub const A1: Square = Square::new(File::A, Rank::R1);
    pub const B1: Square = Square::new(File::B, Rank::R1);
    pub const C1: Square = Square::new(File::C, Rank::R1);
    pub const D1: Square = Square::new(File::D, Rank::R1);
    pub const E1: Square = Square::new(File::E, Rank::R1);
    pub const F1: Square = Square::new(File::F, Rank::R1);
    pub const G1: Square = Square::new(File::G, Rank::R1);
    pub const H1: Square = Square::new(File::H, Rank::R1);
    pub const A8: Square = Square::new(File::A, Rank::R8);
    pub const B8: Square = Square::new(File::B, Rank::R8);
    pub const C8: Square = Square::new(File::C, Rank::R8);
    pub const D8: Square = Square::new(File::D, Rank::R8);
    pub const E8: Square = Square::new(File::E, Rank::R8);
    pub const F8: Square = Square::new(File::F, Rank::R8);
    pub const G8: Square = Square::new(File::G, Rank::R8);
    pub const H8: Square = Square::new(File::H, Rank::R8);

    #[inline]
    pub const fn new(file: File, rank: Rank) -> Self {
        Square(rank.index() << 3 | file.index())
    }

    /// Checked constructor for raw (rank, file) coordinates.
    pub const fn from_coords(rank: i32, file: i32) -> Result<Self, SquareError> {
        match (on_board(rank), on_board(file)) {
            (Some(r), Some(f)) => Ok(Square(r << 3 | f)),
            _ => Err(SquareError { rank, file }),
        }
    }

    #[inline]
    pub const fn from_index(index: u8) -> Option<Self> {
        if index < 64 {
            Some(Square(index))
        } else {
            None
        }
    }

    /// Parses lowercase coordinates such as "e4".
    pub const fn from_algebraic(s: &str) -> Option<Self> {
        match s.as_bytes() {
            [f, r] => match (File::from_char(*f as char), Rank::from_char(*r as char)) {
                (Some(file), Some(rank)) => Some(Square::new(file, rank)),
                _ => None,
            },
            _ => None,
        }
    }

    /// Every square, a1 first, h8 last.
    pub fn all() -> impl Iterator<Item = Square> {
        (0..64).map(Square)
    }

    #[inline]
    pub const fn index(self) -> u8 {
        self.0
    }

    #[inline]
    pub const fn file(self) -> File {
        File::ALL[(self.0 & 7) as usize]
    }

    #[inline]
    pub const fn rank(self) -> Rank {
        Rank::ALL[(self.0 >> 3) as usize]
    }

    /// Steps `d_rank` ranks and `d_file` files away; `None` off the board.
    #[inline]
    pub const fn offset(self, d_rank: i8, d_file: i8) -> Option<Self> {
        let rank = (self.0 >> 3) as i32 + d_rank as i32;
        let file = (self.0 & 7) as i32 + d_file as i32;
        match Square::from_coords(rank, file) {
            Ok(sq) => Some(sq),
            Err(_) => None,
        }
    }

    pub fn to_algebraic(self) -> String {
        self.to_string()
    }
}

const fn on_board(coord: i32) -> Option<u8> {
    if 0 <= coord && coord < 8 {
        Some(coord as u8)
    } else {
        None
    }
}

impl fmt::Debug for Square {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Square({})", self)
    }
}

impl fmt::Display for Square {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.file(), self.rank())
    }
}
