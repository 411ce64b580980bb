//! Strategy definitions and the built-in catalog

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::EngineError;
use crate::random::SeededRng;

/// A move in the Trust Game
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Move {
    /// Put the coin in.
    Cooperate,
    /// Keep the coin.
    Cheat,
}

impl Move {
    pub fn as_str(self) -> &'static str {
        match self {
            Move::Cooperate => "cooperate",
            Move::Cheat => "cheat",
        }
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Move {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "cooperate" | "c" => Ok(Move::Cooperate),
            "cheat" | "d" => Ok(Move::Cheat),
            _ => Err(EngineError::InvalidMove { value: s.to_string() }),
        }
    }
}

/// Display metadata for a strategy
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct StrategyInfo {
    pub id: &'static str,
    pub name: &'static str,
    /// Two-letter badge shown in place of an icon
    pub icon: &'static str,
    /// Hex display color
    pub color: &'static str,
    pub short_description: &'static str,
    pub description: &'static str,
}

/// A decision policy for one player.
///
/// Implementations are stateless: everything they know about the match is
/// reconstructed from the two histories, which are oldest-first and hold one
/// entry per completed round. `round` is the 0-based index of the round about
/// to be played. The only mutable input is the random source.
pub trait Strategy: Send + Sync {
    fn info(&self) -> &StrategyInfo;

    fn next_move(
        &self,
        own_history: &[Move],
        opponent_history: &[Move],
        round: usize,
        rng: &mut SeededRng,
    ) -> Move;

    fn id(&self) -> &str {
        self.info().id
    }
}

impl fmt::Debug for dyn Strategy + '_ {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Strategy").field(&self.id()).finish()
    }
}

/// Always Cooperate: ignores history entirely.
#[derive(Clone, Copy, Debug, Default)]
pub struct AlwaysCooperate;

/// Always Cheat: ignores history entirely.
#[derive(Clone, Copy, Debug, Default)]
pub struct AlwaysCheat;

/// Copycat (Tit-for-Tat): cooperate first, then mirror the opponent.
#[derive(Clone, Copy, Debug, Default)]
pub struct Copycat;

/// Grudger: cooperate until the opponent cheats once, then cheat forever.
#[derive(Clone, Copy, Debug, Default)]
pub struct Grudger;

/// Detective: fixed probe, then exploit or mirror.
#[derive(Clone, Copy, Debug, Default)]
pub struct Detective;

/// Random: fair coin each round.
#[derive(Clone, Copy, Debug, Default)]
pub struct RandomPlayer;

/// Copykitten (Tit-for-Two-Tats): retaliate only after two cheats in a row.
#[derive(Clone, Copy, Debug, Default)]
pub struct Copykitten;

const ALWAYS_COOPERATE_INFO: StrategyInfo = StrategyInfo {
    id: "always-cooperate",
    name: "Always Cooperate",
    icon: "AC",
    color: "#4ade80",
    short_description: "Always puts in the coin. Endlessly trusting.",
    description: "This player always cooperates, no matter what. They believe in \
        unconditional kindness, even when it hurts them.",
};

const ALWAYS_CHEAT_INFO: StrategyInfo = StrategyInfo {
    id: "always-cheat",
    name: "Always Cheat",
    icon: "AX",
    color: "#f87171",
    short_description: "Never puts in the coin. Pure selfishness.",
    description: "This player always cheats, no matter what. They exploit everyone \
        they meet without remorse.",
};

const COPYCAT_INFO: StrategyInfo = StrategyInfo {
    id: "copycat",
    name: "Copycat",
    icon: "CC",
    color: "#60a5fa",
    short_description: "Cooperates first, then copies your last move.",
    description: "Copycat starts by cooperating, then copies whatever you did last \
        round. It's the golden rule: treat others as they treat you.",
};

const GRUDGER_INFO: StrategyInfo = StrategyInfo {
    id: "grudger",
    name: "Grudger",
    icon: "GR",
    color: "#c084fc",
    short_description: "Cooperates until betrayed, then cheats forever.",
    description: "Grudger cooperates at first, but the moment you cheat them even \
        once, they hold a grudge forever and always cheat back.",
};

const DETECTIVE_INFO: StrategyInfo = StrategyInfo {
    id: "detective",
    name: "Detective",
    icon: "DT",
    color: "#fbbf24",
    short_description: "Tests you first, then adapts.",
    description: "Detective plays a specific pattern: Cooperate, Cheat, Cooperate, \
        Cooperate. If you retaliate against their cheat, they'll play Copycat. If you \
        don't, they'll exploit you forever.",
};

const RANDOM_INFO: StrategyInfo = StrategyInfo {
    id: "random",
    name: "Random",
    icon: "RN",
    color: "#fb923c",
    short_description: "50/50 chance of cooperating or cheating.",
    description: "Random flips a coin each round. Cooperation or betrayal, \
        determined by pure chance.",
};

const COPYKITTEN_INFO: StrategyInfo = StrategyInfo {
    id: "copykitten",
    name: "Copykitten",
    icon: "CK",
    color: "#f472b6",
    short_description: "Only retaliates after two cheats in a row.",
    description: "Like Copycat, but more forgiving. Copykitten only cheats back if \
        you cheat them twice in a row. One cheat? They'll let it slide.",
};

/// Detective's probe for rounds 0..4
pub const DETECTIVE_OPENING: [Move; 4] =
    [Move::Cooperate, Move::Cheat, Move::Cooperate, Move::Cooperate];

impl Strategy for AlwaysCooperate {
    fn info(&self) -> &StrategyInfo {
        &ALWAYS_COOPERATE_INFO
    }

    fn next_move(&self, _: &[Move], _: &[Move], _: usize, _: &mut SeededRng) -> Move {
        Move::Cooperate
    }
}

impl Strategy for AlwaysCheat {
    fn info(&self) -> &StrategyInfo {
        &ALWAYS_CHEAT_INFO
    }

    fn next_move(&self, _: &[Move], _: &[Move], _: usize, _: &mut SeededRng) -> Move {
        Move::Cheat
    }
}

impl Strategy for Copycat {
    fn info(&self) -> &StrategyInfo {
        &COPYCAT_INFO
    }

    fn next_move(
        &self,
        _own_history: &[Move],
        opponent_history: &[Move],
        _round: usize,
        _rng: &mut SeededRng,
    ) -> Move {
        opponent_history.last().copied().unwrap_or(Move::Cooperate)
    }
}

impl Strategy for Grudger {
    fn info(&self) -> &StrategyInfo {
        &GRUDGER_INFO
    }

    fn next_move(
        &self,
        _own_history: &[Move],
        opponent_history: &[Move],
        _round: usize,
        _rng: &mut SeededRng,
    ) -> Move {
        if opponent_history.contains(&Move::Cheat) {
            Move::Cheat
        } else {
            Move::Cooperate
        }
    }
}

impl Strategy for Detective {
    fn info(&self) -> &StrategyInfo {
        &DETECTIVE_INFO
    }

    fn next_move(
        &self,
        _own_history: &[Move],
        opponent_history: &[Move],
        round: usize,
        _rng: &mut SeededRng,
    ) -> Move {
        if let Some(opening) = DETECTIVE_OPENING.get(round) {
            return *opening;
        }

        // Only the opponent's answers to the probe count
        let retaliated = opponent_history
            .iter()
            .take(DETECTIVE_OPENING.len())
            .any(|m| *m == Move::Cheat);

        if retaliated {
            opponent_history.last().copied().unwrap_or(Move::Cooperate)
        } else {
            Move::Cheat
        }
    }
}

impl Strategy for RandomPlayer {
    fn info(&self) -> &StrategyInfo {
        &RANDOM_INFO
    }

    fn next_move(&self, _: &[Move], _: &[Move], _: usize, rng: &mut SeededRng) -> Move {
        if rng.coin_flip() {
            Move::Cooperate
        } else {
            Move::Cheat
        }
    }
}

impl Strategy for Copykitten {
    fn info(&self) -> &StrategyInfo {
        &COPYKITTEN_INFO
    }

    fn next_move(
        &self,
        _own_history: &[Move],
        opponent_history: &[Move],
        _round: usize,
        _rng: &mut SeededRng,
    ) -> Move {
        match opponent_history {
            [.., Move::Cheat, Move::Cheat] => Move::Cheat,
            _ => Move::Cooperate,
        }
    }
}

/// Every built-in strategy, in display order
pub static ALL_STRATEGIES: [&dyn Strategy; 7] = [
    &Copycat,
    &AlwaysCooperate,
    &AlwaysCheat,
    &Grudger,
    &Detective,
    &Copykitten,
    &RandomPlayer,
];

/// Look up a built-in strategy by id
pub fn get_strategy_by_id(id: &str) -> Option<&'static dyn Strategy> {
    ALL_STRATEGIES.iter().copied().find(|s| s.id() == id)
}

/// Look up a strategy by id within an arbitrary set
pub fn find_strategy<'a>(strategies: &[&'a dyn Strategy], id: &str) -> Option<&'a dyn Strategy> {
    strategies.iter().copied().find(|s| s.id() == id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::collection::vec;
    use proptest::strategy::{Just, Strategy as PropStrategy};
    use proptest::{prop_assert_eq, prop_oneof, proptest};

    use Move::{Cheat as D, Cooperate as C};

    fn make_rng() -> SeededRng {
        SeededRng::from_u64(42)
    }

    fn decide(strategy: &dyn Strategy, opponent_history: &[Move]) -> Move {
        let own = vec![C; opponent_history.len()];
        strategy.next_move(&own, opponent_history, opponent_history.len(), &mut make_rng())
    }

    fn any_history() -> impl PropStrategy<Value = Vec<Move>> {
        vec(prop_oneof![Just(C), Just(D)], 0..24)
    }

    #[test]
    fn test_always_cooperate() {
        let mut rng = make_rng();
        for round in 0..10 {
            assert_eq!(AlwaysCooperate.next_move(&[], &[D; 3], round, &mut rng), C);
        }
    }

    #[test]
    fn test_always_cheat() {
        let mut rng = make_rng();
        for round in 0..10 {
            assert_eq!(AlwaysCheat.next_move(&[], &[C; 3], round, &mut rng), D);
        }
    }

    #[test]
    fn test_copycat_first_move() {
        assert_eq!(decide(&Copycat, &[]), C);
    }

    #[test]
    fn test_copycat_copies() {
        assert_eq!(decide(&Copycat, &[C]), C);
        assert_eq!(decide(&Copycat, &[C, D]), D);
        assert_eq!(decide(&Copycat, &[D, C]), C);
    }

    #[test]
    fn test_grudger_never_forgives() {
        assert_eq!(decide(&Grudger, &[C, C]), C);
        assert_eq!(decide(&Grudger, &[C, D]), D);
        assert_eq!(decide(&Grudger, &[D, C, C, C, C]), D);
    }

    #[test]
    fn test_detective_opening() {
        let mut rng = make_rng();
        let mut opponent = Vec::new();
        for (round, expected) in DETECTIVE_OPENING.iter().enumerate() {
            let m = Detective.next_move(&[], &opponent, round, &mut rng);
            assert_eq!(m, *expected, "round {}", round);
            opponent.push(D);
        }
    }

    #[test]
    fn test_detective_exploits_pushover() {
        assert_eq!(decide(&Detective, &[C, C, C, C]), D);
        assert_eq!(decide(&Detective, &[C, C, C, C, C, C]), D);
    }

    #[test]
    fn test_detective_mirrors_after_retaliation() {
        assert_eq!(decide(&Detective, &[C, C, D, C]), C);
        assert_eq!(decide(&Detective, &[C, C, D, C, D]), D);
    }

    #[test]
    fn test_detective_ignores_cheats_after_probe() {
        // A cheat at round 5 does not count as retaliation
        assert_eq!(decide(&Detective, &[C, C, C, C, D, C]), D);
    }

    #[test]
    fn test_copykitten_forgives_single_cheat() {
        assert_eq!(decide(&Copykitten, &[]), C);
        assert_eq!(decide(&Copykitten, &[D]), C);
        assert_eq!(decide(&Copykitten, &[C, D]), C);
        assert_eq!(decide(&Copykitten, &[D, C]), C);
        assert_eq!(decide(&Copykitten, &[D, D]), D);
        assert_eq!(decide(&Copykitten, &[C, D, D]), D);
    }

    #[test]
    fn test_random_is_seedable() {
        let moves = |seed: u64| {
            let mut rng = SeededRng::from_u64(seed);
            (0..32)
                .map(|round| RandomPlayer.next_move(&[], &[], round, &mut rng))
                .collect::<Vec<_>>()
        };
        assert_eq!(moves(9), moves(9));
        let sample = moves(9);
        assert!(sample.contains(&C) && sample.contains(&D));
    }

    #[test]
    fn test_catalog_lookup() {
        assert_eq!(ALL_STRATEGIES.len(), 7);
        for s in ALL_STRATEGIES.iter() {
            let found = get_strategy_by_id(s.id()).map(|f| f.info().name);
            assert_eq!(found, Some(s.info().name));
        }
        assert!(get_strategy_by_id("tit-for-two-tats").is_none());
        assert!(get_strategy_by_id("").is_none());
    }

    #[test]
    fn test_catalog_order_and_ids_unique() {
        let ids: Vec<_> = ALL_STRATEGIES.iter().map(|s| s.id()).collect();
        assert_eq!(
            ids,
            [
                "copycat",
                "always-cooperate",
                "always-cheat",
                "grudger",
                "detective",
                "copykitten",
                "random"
            ]
        );
    }

    #[test]
    fn test_move_parsing() {
        assert_eq!("cooperate".parse::<Move>(), Ok(C));
        assert_eq!(" Cheat ".parse::<Move>(), Ok(D));
        assert_eq!("c".parse::<Move>(), Ok(C));
        assert_eq!("d".parse::<Move>(), Ok(D));
        assert!(matches!(
            "maybe".parse::<Move>(),
            Err(EngineError::InvalidMove { .. })
        ));
    }

    #[test]
    fn test_move_serde_names() {
        assert_eq!(serde_json::to_string(&C).unwrap(), "\"cooperate\"");
        assert_eq!(serde_json::from_str::<Move>("\"cheat\"").unwrap(), D);
    }

    proptest! {
        #[test]
        fn prop_copycat_mirrors_last(history in any_history()) {
            let expected = history.last().copied().unwrap_or(C);
            prop_assert_eq!(decide(&Copycat, &history), expected);
        }

        #[test]
        fn prop_grudger_cheats_iff_ever_cheated(history in any_history()) {
            let expected = if history.contains(&D) { D } else { C };
            prop_assert_eq!(decide(&Grudger, &history), expected);
        }

        #[test]
        fn prop_copykitten_needs_two_cheats(history in any_history()) {
            let n = history.len();
            let expected = if n >= 2 && history[n - 1] == D && history[n - 2] == D { D } else { C };
            prop_assert_eq!(decide(&Copykitten, &history), expected);
        }

        #[test]
        fn prop_detective_after_probe(history in vec(prop_oneof![Just(C), Just(D)], 4..24)) {
            let expected = if history[..4].contains(&D) { history[history.len() - 1] } else { D };
            prop_assert_eq!(decide(&Detective, &history), expected);
        }
    }
}
