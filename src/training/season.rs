//! Round-robin match schedule for one generation

/// Ordered list of pairings played in one generation.
///
/// Round `r` pairs every controller `i` with `(i + offset) % n`, where
/// `offset = 1 + r % (n - 1)`. Each controller therefore plays as player 0
/// exactly once per round and never meets itself. Rounds only repeat an
/// opponent once `rounds >= n`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameSeason {
    pairings: Vec<(usize, usize)>,
}

impl GameSeason {
    /// Panics if fewer than two controllers are scheduled.
    pub fn new(num_controllers: usize, num_rounds: usize) -> Self {
        assert!(
            num_controllers >= 2,
            "a season needs at least two controllers, got {num_controllers}"
        );

        let mut pairings = Vec::with_capacity(num_controllers * num_rounds);
        for round in 0..num_rounds {
            let offset = 1 + round % (num_controllers - 1);
            for i in 0..num_controllers {
                pairings.push((i, (i + offset) % num_controllers));
            }
        }
        Self { pairings }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.pairings.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.pairings.is_empty()
    }

    /// Controller indices for game `index`, player 0 first
    #[inline]
    pub fn pairing(&self, index: usize) -> Option<(usize, usize)> {
        self.pairings.get(index).copied()
    }

    pub fn pairings(&self) -> &[(usize, usize)] {
        &self.pairings
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_four_controllers_two_rounds() {
        let season = GameSeason::new(4, 2);
        assert_eq!(season.len(), 8);

        for c in 0..4 {
            let opponents: Vec<usize> = season
                .pairings()
                .iter()
                .filter(|(a, _)| *a == c)
                .map(|&(_, b)| b)
                .collect();
            assert_eq!(opponents.len(), 2);
            assert!(!opponents.contains(&c));
            let distinct: HashSet<_> = opponents.iter().collect();
            assert_eq!(distinct.len(), 2, "controller {c} met {opponents:?}");
        }
    }

    #[test]
    fn test_two_controllers() {
        let season = GameSeason::new(2, 3);
        assert!(season.pairings().iter().all(|&p| p == (0, 1) || p == (1, 0)));
        assert_eq!(season.pairing(6), None);
    }

    #[test]
    #[should_panic]
    fn test_single_controller_panics() {
        GameSeason::new(1, 1);
    }
}
