//! Plain-text output

use trust_engine::{
    get_strategy_by_id, MatchResult, Move, Population, RoundResult, ScoreEntry, Strategy,
};

fn badge(m: Move) -> &'static str {
    match m {
        Move::Cooperate => "C",
        Move::Cheat => "D",
    }
}

/// Display name for an id, falling back to the id itself
fn display_name(strategy_id: &str) -> &str {
    get_strategy_by_id(strategy_id)
        .map(|s| s.info().name)
        .unwrap_or(strategy_id)
}

pub fn strategies(catalog: &[&dyn Strategy]) -> String {
    catalog
        .iter()
        .map(|s| {
            let info = s.info();
            format!(
                "{:2}  {:18} {:17} {}",
                info.icon, info.id, info.name, info.short_description
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn round(index: usize, result: &RoundResult) -> String {
    format!(
        "{:>3}  {} {}  {:>2} {:>2}",
        index + 1,
        badge(result.player1_move),
        badge(result.player2_move),
        result.player1_score,
        result.player2_score
    )
}

pub fn match_report(player1: &dyn Strategy, player2: &dyn Strategy, result: &MatchResult) -> String {
    let mut lines = vec![format!(
        "{} vs {} ({} rounds)",
        player1.info().name,
        player2.info().name,
        result.round_count()
    )];
    lines.extend(result.rounds.iter().enumerate().map(|(i, r)| round(i, r)));
    lines.push(format!(
        "Total  {} - {}",
        result.player1_total_score, result.player2_total_score
    ));
    lines.join("\n")
}

pub fn standings(standings: &[ScoreEntry], matches_played: usize) -> String {
    let mut lines: Vec<String> = standings
        .iter()
        .enumerate()
        .map(|(rank, entry)| {
            format!(
                "{:>2}. {:18} {:>6}",
                rank + 1,
                display_name(&entry.strategy_id),
                entry.total_score
            )
        })
        .collect();
    lines.push(format!("{} matches played", matches_played));
    lines.join("\n")
}

pub fn population(generation: usize, population: &Population) -> String {
    let counts = population
        .by_count_desc()
        .into_iter()
        .filter(|e| e.count > 0)
        .map(|e| format!("{} {}", display_name(&e.strategy_id), e.count))
        .collect::<Vec<_>>()
        .join(", ");
    format!("Gen {:>2}: {}", generation, counts)
}

pub fn evolution(history: &[Population]) -> String {
    let mut lines: Vec<String> = history
        .iter()
        .enumerate()
        .map(|(generation, p)| population(generation, p))
        .collect();
    if let Some(leader) = history.last().and_then(|p| p.leader()) {
        lines.push(format!(
            "Leader: {} with {}",
            display_name(&leader.strategy_id),
            leader.count
        ));
    }
    lines.join("\n")
}
