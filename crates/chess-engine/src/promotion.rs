//! Promotion decision boundary.
//!
//! When a pawn move reaches the last rank without a chosen piece, the game
//! asks a [`PromotionSource`]. Interactive front ends implement it with a
//! dialog; automated players use [`AutoQueen`] or [`FixedPromotion`].

use chess_core::{Color, PieceKind, Square};

/// Supplies the piece a pawn promotes to.
pub trait PromotionSource {
    /// Returns the kind to promote to. Anything that is not a valid
    /// promotion target is treated as a queen.
    fn choose_promotion(&mut self, color: Color, from: Square, to: Square) -> PieceKind;
}

/// Always promotes to a queen.
#[derive(Debug, Clone, Copy, Default)]
pub struct AutoQueen;

impl PromotionSource for AutoQueen {
    fn choose_promotion(&mut self, _color: Color, _from: Square, _to: Square) -> PieceKind {
        PieceKind::Queen
    }
}

/// Always promotes to the same kind.
#[derive(Debug, Clone, Copy)]
pub struct FixedPromotion(pub PieceKind);

impl PromotionSource for FixedPromotion {
    fn choose_promotion(&mut self, _color: Color, _from: Square, _to: Square) -> PieceKind {
        self.0
    }
}

impl<F> PromotionSource for F
where
    F: FnMut(Color, Square, Square) -> PieceKind,
{
    fn choose_promotion(&mut self, color: Color, from: Square, to: Square) -> PieceKind {
        self(color, from, to)
    }
}
