//! Maze generation, exit selection and entity placement.
//!
//! Everything in this module is pure grid logic: it knows nothing about the
//! GPU or the window. Randomness is injected through the [`Dice`] trait so the
//! carve, the exit choice and the scatter can be replayed exactly in tests.
//!
//! # Module Structure
//!
//! - [`grid`]: the boolean occupancy grid and the cell/world mapping
//! - [`generator`]: randomized depth-first carving on a doubled lattice
//! - [`exit`]: boundary exit selection and its protruding geometry
//! - [`placement`]: scatter of sculptures and figures into open cells

pub mod exit;
pub mod generator;
pub mod grid;
pub mod placement;

use rand::Rng;

/// Source of uniform randomness for the maze algorithms.
///
/// Any [`rand::Rng`] is a `Dice`. Tests implement it directly to script the
/// exact sequence of draws.
pub trait Dice {
    /// Uniform integer in `0..bound`. `bound` is never zero.
    fn below(&mut self, bound: usize) -> usize;

    /// Uniform float in `[0, 1)`.
    fn unit(&mut self) -> f32;
}

impl<R: Rng + ?Sized> Dice for R {
    fn below(&mut self, bound: usize) -> usize {
        self.gen_range(0..bound)
    }

    fn unit(&mut self) -> f32 {
        self.r#gen::<f32>()
    }
}

/// Fisher-Yates shuffle driven by a [`Dice`].
pub fn shuffle<T>(dice: &mut impl Dice, items: &mut [T]) {
    for i in (1..items.len()).rev() {
        let j = dice.below(i + 1);
        items.swap(i, j);
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::Dice;
    use std::collections::VecDeque;

    /// Dice that always roll the lowest value.
    pub struct ZeroDice;

    impl Dice for ZeroDice {
        fn below(&mut self, _bound: usize) -> usize {
            0
        }

        fn unit(&mut self) -> f32 {
            0.0
        }
    }

    /// Dice that replay a fixed script of integer draws, then fall back to 0.
    /// Unit draws always return 0.5 so jitter lands on the cell centre.
    pub struct ScriptedDice {
        pub draws: VecDeque<usize>,
    }

    impl ScriptedDice {
        pub fn new(draws: &[usize]) -> Self {
            Self {
                draws: draws.iter().copied().collect(),
            }
        }
    }

    impl Dice for ScriptedDice {
        fn below(&mut self, bound: usize) -> usize {
            self.draws.pop_front().unwrap_or(0) % bound
        }

        fn unit(&mut self) -> f32 {
            0.5
        }
    }
}

#[cfg(test)]
mod tests {
    use super::testing::ZeroDice;
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    /// With a dice that always rolls zero, every element rotates one slot.
    #[test]
    fn test_shuffle_with_zero_dice() {
        let mut items = [1, 2, 3, 4];
        shuffle(&mut ZeroDice, &mut items);
        assert_eq!(items, [2, 3, 4, 1]);
    }

    /// Shuffling keeps the same multiset of elements.
    #[test]
    fn test_shuffle_is_permutation() {
        let mut rng = StdRng::seed_from_u64(11);
        let mut items: Vec<u32> = (0..32).collect();
        shuffle(&mut rng, &mut items);
        let mut sorted = items.clone();
        sorted.sort();
        assert_eq!(sorted, (0..32).collect::<Vec<_>>());
    }

    #[test]
    fn test_rng_dice_stays_in_range() {
        let mut rng = StdRng::seed_from_u64(3);
        for bound in 1..20 {
            assert!(rng.below(bound) < bound);
            let u = Dice::unit(&mut rng);
            assert!((0.0..1.0).contains(&u));
        }
    }
}
