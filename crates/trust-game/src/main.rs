mod render;
mod settings;

use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use log::{debug, info, LevelFilter};
use serde::Serialize;
use trust_engine::{
    get_strategy_by_id, play_match, run_tournament, EngineConfig, EvolutionRun, InteractiveMatch,
    MatchResult, Move, Population, ScoreEntry, SeededRng, Strategy, StrategyInfo, ALL_STRATEGIES,
};

#[derive(Debug, Parser)]
#[command(name = "trust-game", version)]
#[command(about = "Iterated Prisoner's Dilemma: matches, tournaments and evolution")]
struct Cli {
    /// Seed for the random number generator (defaults to the clock)
    #[arg(long, global = true)]
    seed: Option<u64>,

    /// TOML file with engine settings
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Print results as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// List the built-in strategies
    Strategies,

    /// Play one match between two strategies
    Match {
        #[arg(long)]
        p1: String,
        #[arg(long)]
        p2: String,
        #[arg(long)]
        rounds: Option<usize>,
    },

    /// Round-robin tournament over the whole catalog
    Tournament {
        /// Rounds per match
        #[arg(long)]
        rounds: Option<usize>,
        /// Matches per pairing
        #[arg(long)]
        matches: Option<usize>,
    },

    /// Evolve a uniform population
    Evolve {
        #[arg(long)]
        generations: Option<u32>,
        /// Rounds per match
        #[arg(long)]
        rounds: Option<usize>,
        /// Starting population size
        #[arg(long)]
        population: Option<u32>,
    },

    /// Play against a strategy yourself, one move per line on stdin
    Play {
        #[arg(long, default_value = "copycat")]
        opponent: String,
        #[arg(long)]
        rounds: Option<usize>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let mut config = settings::load(cli.config.as_deref())?;
    apply_overrides(&cli.command, &mut config);
    debug!("Config: {:?}", config);

    let stdin = io::stdin();
    let stdout = io::stdout();
    run(&cli, &config, &mut stdin.lock(), &mut stdout.lock())
}

fn init_logging(verbose: bool) {
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"));
    if verbose {
        builder.filter_level(LevelFilter::Debug);
    }
    builder.init();
}

/// Subcommand flags win over the config file
fn apply_overrides(command: &Command, config: &mut EngineConfig) {
    match command {
        Command::Strategies => {}
        Command::Match { rounds, .. } => {
            if let Some(rounds) = rounds {
                config.single_match.rounds = *rounds;
            }
        }
        Command::Tournament { rounds, matches } => {
            if let Some(rounds) = rounds {
                config.tournament.rounds_per_match = *rounds;
            }
            if let Some(matches) = matches {
                config.tournament.matches_per_pairing = *matches;
            }
        }
        Command::Evolve {
            generations,
            rounds,
            population,
        } => {
            if let Some(generations) = generations {
                config.evolution.max_generations = *generations;
            }
            if let Some(rounds) = rounds {
                config.evolution.rounds_per_match = *rounds;
            }
            if let Some(population) = population {
                config.evolution.population_size = *population;
            }
        }
        Command::Play { rounds, .. } => {
            if let Some(rounds) = rounds {
                config.sandbox.total_rounds = *rounds;
            }
        }
    }
}

fn lookup(id: &str) -> Result<&'static dyn Strategy> {
    get_strategy_by_id(id).ok_or_else(|| {
        let known: Vec<&str> = ALL_STRATEGIES.iter().map(|s| s.id()).collect();
        anyhow!(
            "{} (known: {})",
            trust_engine::EngineError::UnknownStrategy { id: id.to_string() },
            known.join(", ")
        )
    })
}

fn write_json<W: Write, T: Serialize>(out: &mut W, value: &T) -> Result<()> {
    serde_json::to_writer_pretty(&mut *out, value).context("writing JSON output")?;
    writeln!(out)?;
    Ok(())
}

#[derive(Serialize)]
struct MatchOutput<'a> {
    seed: u64,
    player1: &'a str,
    player2: &'a str,
    result: &'a MatchResult,
}

#[derive(Serialize)]
struct TournamentOutput {
    seed: u64,
    matches_played: usize,
    standings: Vec<ScoreEntry>,
}

#[derive(Serialize)]
struct EvolutionOutput<'a> {
    seed: u64,
    generations: &'a [Population],
}

fn run<R: BufRead, W: Write>(
    cli: &Cli,
    config: &EngineConfig,
    input: &mut R,
    out: &mut W,
) -> Result<()> {
    match &cli.command {
        Command::Strategies => {
            if cli.json {
                let infos: Vec<StrategyInfo> = ALL_STRATEGIES.iter().map(|s| *s.info()).collect();
                write_json(out, &infos)?;
            } else {
                writeln!(out, "{}", render::strategies(&ALL_STRATEGIES))?;
            }
        }

        Command::Match { p1, p2, .. } => {
            let (player1, player2) = (lookup(p1)?, lookup(p2)?);
            let seed = settings::resolve_seed(cli.seed, config);
            let result = play_match(
                player1,
                player2,
                config.single_match.rounds,
                &mut SeededRng::from_u64(seed),
            );

            if cli.json {
                write_json(
                    out,
                    &MatchOutput {
                        seed,
                        player1: player1.id(),
                        player2: player2.id(),
                        result: &result,
                    },
                )?;
            } else {
                writeln!(out, "{}", render::match_report(player1, player2, &result))?;
            }
        }

        Command::Tournament { .. } => {
            let seed = settings::resolve_seed(cli.seed, config);
            let board = run_tournament(
                &ALL_STRATEGIES,
                config.tournament.rounds_per_match,
                config.tournament.matches_per_pairing,
                &mut SeededRng::from_u64(seed),
            );
            let standings = board.standings();
            if let Some(winner) = standings.first() {
                info!("Winner: {} with {}", winner.strategy_id, winner.total_score);
            }

            if cli.json {
                write_json(
                    out,
                    &TournamentOutput {
                        seed,
                        matches_played: board.matches_played(),
                        standings,
                    },
                )?;
            } else {
                writeln!(out, "{}", render::standings(&standings, board.matches_played()))?;
            }
        }

        Command::Evolve { .. } => {
            let seed = settings::resolve_seed(cli.seed, config);
            let mut evolution = EvolutionRun::uniform(
                &ALL_STRATEGIES,
                &config.evolution,
                SeededRng::from_u64(seed),
            );
            evolution.run_to_end().context("evolving population")?;
            if let Some(leader) = evolution.leader() {
                info!(
                    "After {} generations {} leads with {}",
                    evolution.generation(),
                    leader.strategy_id,
                    leader.count
                );
            }

            if cli.json {
                write_json(
                    out,
                    &EvolutionOutput {
                        seed,
                        generations: evolution.history(),
                    },
                )?;
            } else {
                writeln!(out, "{}", render::evolution(evolution.history()))?;
            }
        }

        Command::Play { opponent, .. } => {
            let opponent = lookup(opponent)?;
            let seed = settings::resolve_seed(cli.seed, config);
            let mut session =
                InteractiveMatch::new(opponent, &config.sandbox, SeededRng::from_u64(seed));
            play_sandbox(&mut session, input, out)?;

            if cli.json {
                write_json(
                    out,
                    &MatchOutput {
                        seed,
                        player1: "you",
                        player2: session.opponent().id(),
                        result: session.result(),
                    },
                )?;
            }
        }
    }

    out.flush()?;
    Ok(())
}

/// Read moves until the match is over, input runs out, or the player quits.
///
/// Besides a move, a line may be `r` to start over or `o <id>` to switch
/// opponent.
fn play_sandbox<R: BufRead, W: Write>(
    session: &mut InteractiveMatch<'static>,
    input: &mut R,
    out: &mut W,
) -> Result<()> {
    writeln!(
        out,
        "{} rounds against {}. Type c to cooperate, d to cheat, q to quit.",
        session.total_rounds(),
        session.opponent().info().name
    )?;

    let mut line = String::new();
    while !session.is_complete() {
        write!(
            out,
            "Round {}/{}> ",
            session.round_index() + 1,
            session.total_rounds()
        )?;
        out.flush()?;

        line.clear();
        if input.read_line(&mut line).context("reading move")? == 0 {
            writeln!(out)?;
            break;
        }

        let command = line.trim();
        match command {
            "q" | "quit" => break,
            "r" | "reset" => {
                session.reset();
                writeln!(out, "Starting over.")?;
                continue;
            }
            _ => {}
        }

        if let Some(id) = command.strip_prefix("o ") {
            match get_strategy_by_id(id.trim()) {
                Some(opponent) => {
                    session.select_opponent(opponent);
                    writeln!(out, "Now playing {}.", opponent.info().name)?;
                }
                None => writeln!(out, "No strategy called `{}`.", id.trim())?,
            }
            continue;
        }

        let human_move: Move = match command.parse() {
            Ok(m) => m,
            Err(e) => {
                writeln!(out, "{}", e)?;
                continue;
            }
        };

        let result = session.play(human_move)?;
        writeln!(out, "{}", render::round(session.round_index() - 1, &result))?;
    }

    let (you, them) = session.totals();
    writeln!(
        out,
        "You {} - {} {}",
        you,
        them,
        session.opponent().info().name
    )?;
    Ok(())
}
