//! Match execution engine

use serde::{Deserialize, Serialize};

use crate::config::SandboxConfig;
use crate::error::EngineError;
use crate::payoff;
use crate::random::SeededRng;
use crate::strategy::{Move, Strategy};

/// Result of a single round
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundResult {
    pub player1_move: Move,
    pub player2_move: Move,
    pub player1_score: u32,
    pub player2_score: u32,
}

impl RoundResult {
    /// Score a pair of moves with the payoff rule, from each side
    pub fn scored(player1_move: Move, player2_move: Move) -> Self {
        Self {
            player1_move,
            player2_move,
            player1_score: payoff(player1_move, player2_move),
            player2_score: payoff(player2_move, player1_move),
        }
    }
}

/// Result of a complete match
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchResult {
    pub rounds: Vec<RoundResult>,
    pub player1_total_score: u32,
    pub player2_total_score: u32,
}

impl MatchResult {
    pub fn round_count(&self) -> usize {
        self.rounds.len()
    }

    fn push(&mut self, round: RoundResult) {
        self.player1_total_score += round.player1_score;
        self.player2_total_score += round.player2_score;
        self.rounds.push(round);
    }
}

/// Play one round between two strategies.
///
/// Each strategy sees its own history first and the other player's second.
pub fn play_round(
    player1: &dyn Strategy,
    player2: &dyn Strategy,
    p1_history: &[Move],
    p2_history: &[Move],
    round: usize,
    rng: &mut SeededRng,
) -> RoundResult {
    let p1_move = player1.next_move(p1_history, p2_history, round, rng);
    let p2_move = player2.next_move(p2_history, p1_history, round, rng);

    RoundResult::scored(p1_move, p2_move)
}

/// Play `num_rounds` sequential rounds between two strategies.
///
/// Zero rounds is valid and yields an empty result with zero totals.
pub fn play_match(
    player1: &dyn Strategy,
    player2: &dyn Strategy,
    num_rounds: usize,
    rng: &mut SeededRng,
) -> MatchResult {
    let mut p1_history: Vec<Move> = Vec::with_capacity(num_rounds);
    let mut p2_history: Vec<Move> = Vec::with_capacity(num_rounds);
    let mut result = MatchResult {
        rounds: Vec::with_capacity(num_rounds),
        ..MatchResult::default()
    };

    for round in 0..num_rounds {
        let outcome = play_round(player1, player2, &p1_history, &p2_history, round, rng);

        p1_history.push(outcome.player1_move);
        p2_history.push(outcome.player2_move);
        result.push(outcome);
    }

    result
}

/// Play one round where player 1's move is supplied from outside
/// (a human, or any external controller).
pub fn play_interactive_round(
    human_move: Move,
    opponent: &dyn Strategy,
    human_history: &[Move],
    opponent_history: &[Move],
    round: usize,
    rng: &mut SeededRng,
) -> RoundResult {
    let opponent_move = opponent.next_move(opponent_history, human_history, round, rng);

    RoundResult::scored(human_move, opponent_move)
}

/// A fixed-length match against one opponent, driven one move at a time.
#[derive(Debug)]
pub struct InteractiveMatch<'a> {
    opponent: &'a dyn Strategy,
    total_rounds: usize,
    result: MatchResult,
    human_history: Vec<Move>,
    opponent_history: Vec<Move>,
    rng: SeededRng,
}

impl<'a> InteractiveMatch<'a> {
    pub fn new(opponent: &'a dyn Strategy, config: &SandboxConfig, rng: SeededRng) -> Self {
        Self {
            opponent,
            total_rounds: config.total_rounds,
            result: MatchResult::default(),
            human_history: Vec::with_capacity(config.total_rounds),
            opponent_history: Vec::with_capacity(config.total_rounds),
            rng,
        }
    }

    /// Play the next round with the human's move
    pub fn play(&mut self, human_move: Move) -> Result<RoundResult, EngineError> {
        if self.is_complete() {
            return Err(EngineError::MatchComplete {
                total_rounds: self.total_rounds,
            });
        }

        let outcome = play_interactive_round(
            human_move,
            self.opponent,
            &self.human_history,
            &self.opponent_history,
            self.round_index(),
            &mut self.rng,
        );

        self.human_history.push(outcome.player1_move);
        self.opponent_history.push(outcome.player2_move);
        self.result.push(outcome);

        Ok(outcome)
    }

    /// Start over against the same opponent
    pub fn reset(&mut self) {
        self.result = MatchResult::default();
        self.human_history.clear();
        self.opponent_history.clear();
    }

    /// Switch opponent; the match starts over
    pub fn select_opponent(&mut self, opponent: &'a dyn Strategy) {
        self.opponent = opponent;
        self.reset();
    }

    pub fn opponent(&self) -> &'a dyn Strategy {
        self.opponent
    }

    pub fn round_index(&self) -> usize {
        self.result.round_count()
    }

    pub fn total_rounds(&self) -> usize {
        self.total_rounds
    }

    pub fn remaining(&self) -> usize {
        self.total_rounds.saturating_sub(self.round_index())
    }

    pub fn is_complete(&self) -> bool {
        self.round_index() >= self.total_rounds
    }

    pub fn rounds(&self) -> &[RoundResult] {
        &self.result.rounds
    }

    /// (human total, opponent total)
    pub fn totals(&self) -> (u32, u32) {
        (self.result.player1_total_score, self.result.player2_total_score)
    }

    pub fn result(&self) -> &MatchResult {
        &self.result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::strategy::{
        AlwaysCheat, AlwaysCooperate, Copycat, Copykitten, Detective, Grudger, RandomPlayer,
        ALL_STRATEGIES,
    };
    use proptest::{prop_assert_eq, proptest};

    use Move::{Cheat as D, Cooperate as C};

    fn make_rng() -> SeededRng {
        SeededRng::from_u64(42)
    }

    fn moves(result: &MatchResult) -> Vec<(Move, Move)> {
        result
            .rounds
            .iter()
            .map(|r| (r.player1_move, r.player2_move))
            .collect()
    }

    #[test]
    fn test_cooperate_vs_cheat() {
        let result = play_match(&AlwaysCooperate, &AlwaysCheat, 5, &mut make_rng());

        assert_eq!(result.round_count(), 5);
        for round in &result.rounds {
            assert_eq!((round.player1_move, round.player2_move), (C, D));
            assert_eq!(round.player1_score, 0);
            assert_eq!(round.player2_score, 5);
        }
        assert_eq!(result.player1_total_score, 0);
        assert_eq!(result.player2_total_score, 25);
    }

    #[test]
    fn test_copycat_vs_copycat() {
        let result = play_match(&Copycat, &Copycat, 3, &mut make_rng());

        assert_eq!(moves(&result), vec![(C, C); 3]);
        assert!(result.rounds.iter().all(|r| r.player1_score == 3 && r.player2_score == 3));
        assert_eq!((result.player1_total_score, result.player2_total_score), (9, 9));
    }

    #[test]
    fn test_zero_rounds() {
        let result = play_match(&Copycat, &AlwaysCheat, 0, &mut make_rng());
        assert!(result.rounds.is_empty());
        assert_eq!(result.player1_total_score, 0);
        assert_eq!(result.player2_total_score, 0);
    }

    #[test]
    fn test_copycat_vs_always_cheat() {
        let result = play_match(&Copycat, &AlwaysCheat, 4, &mut make_rng());
        assert_eq!(moves(&result), vec![(C, D), (D, D), (D, D), (D, D)]);
        assert_eq!(result.player1_total_score, 3);
        assert_eq!(result.player2_total_score, 8);
    }

    #[test]
    fn test_detective_vs_copycat() {
        // Copycat answers the probe's cheat, so Detective settles into mirroring
        let result = play_match(&Detective, &Copycat, 7, &mut make_rng());
        assert_eq!(
            moves(&result),
            vec![(C, C), (D, C), (C, D), (C, C), (C, C), (C, C), (C, C)]
        );
    }

    #[test]
    fn test_detective_vs_always_cooperate() {
        let result = play_match(&Detective, &AlwaysCooperate, 6, &mut make_rng());
        assert_eq!(
            moves(&result),
            vec![(C, C), (D, C), (C, C), (C, C), (D, C), (D, C)]
        );
    }

    #[test]
    fn test_grudger_vs_detective() {
        let result = play_match(&Grudger, &Detective, 6, &mut make_rng());
        // Detective's round-1 cheat triggers the grudge from round 2 onward
        assert_eq!(
            moves(&result),
            vec![(C, C), (C, D), (D, C), (D, C), (D, D), (D, D)]
        );
    }

    #[test]
    fn test_copykitten_vs_detective() {
        let result = play_match(&Copykitten, &Detective, 7, &mut make_rng());
        // Copykitten lets the probe slide, so Detective exploits it until two cheats in a row
        assert_eq!(
            moves(&result),
            vec![(C, C), (C, D), (C, C), (C, C), (C, D), (C, D), (D, D)]
        );
    }

    #[test]
    fn test_match_determinism() {
        let a = play_match(&Copycat, &RandomPlayer, 20, &mut SeededRng::from_u64(5));
        let b = play_match(&Copycat, &RandomPlayer, 20, &mut SeededRng::from_u64(5));
        assert_eq!(a, b);
    }

    #[test]
    fn test_interactive_round_matches_play_round() {
        let history_h = [C, D];
        let history_o = [C, C];
        let r = play_interactive_round(D, &Copycat, &history_h, &history_o, 2, &mut make_rng());
        assert_eq!(r.player2_move, D);
        assert_eq!(r.player1_score, 1);
        assert_eq!(r.player2_score, 1);
    }

    #[test]
    fn test_interactive_match_session() {
        let config = SandboxConfig { total_rounds: 3 };
        let mut session = InteractiveMatch::new(&Grudger, &config, make_rng());

        assert_eq!(session.play(C).unwrap().player2_move, C);
        assert_eq!(session.play(D).unwrap().player2_move, C);
        assert_eq!(session.play(C).unwrap().player2_move, D);
        assert!(session.is_complete());
        assert_eq!(session.totals(), (8, 8));

        let err = session.play(C).unwrap_err();
        assert_eq!(err, EngineError::MatchComplete { total_rounds: 3 });
    }

    #[test]
    fn test_interactive_match_reset_and_switch() {
        let config = SandboxConfig::default();
        let mut session = InteractiveMatch::new(&AlwaysCheat, &config, make_rng());

        session.play(C).unwrap();
        assert_eq!(session.round_index(), 1);
        assert_eq!(session.remaining(), 9);

        session.select_opponent(&AlwaysCooperate);
        assert_eq!(session.round_index(), 0);
        assert_eq!(session.opponent().id(), "always-cooperate");
        assert_eq!(session.totals(), (0, 0));

        let r = session.play(D).unwrap();
        assert_eq!((r.player1_score, r.player2_score), (5, 0));

        session.reset();
        assert!(session.rounds().is_empty());
    }

    proptest! {
        #[test]
        fn prop_totals_equal_round_sums(i in 0usize..7, j in 0usize..7, rounds in 0usize..40, seed in 0u64..1000) {
            let result = play_match(ALL_STRATEGIES[i], ALL_STRATEGIES[j], rounds, &mut SeededRng::from_u64(seed));
            prop_assert_eq!(result.round_count(), rounds);
            prop_assert_eq!(result.player1_total_score, result.rounds.iter().map(|r| r.player1_score).sum::<u32>());
            prop_assert_eq!(result.player2_total_score, result.rounds.iter().map(|r| r.player2_score).sum::<u32>());
        }
    }
}
