use anyhow::{Context, Result};
use clap::Parser;
use overlord_core::ai::DEFAULT_SEED;
use overlord_core::{
    AiDifficulty, AiPersonality, AiProfile, ConsoleObserver, EventLogObserver, Faction,
    RulesConfig, SaveGame, Scenario, StrategicAi, TurnController,
};
use std::path::{Path, PathBuf};

#[derive(Clone, Copy, Debug, clap::ValueEnum, PartialEq, Eq)]
enum Personality {
    Aggressive,
    Balanced,
    Defensive,
    Economic,
}

impl From<Personality> for AiPersonality {
    fn from(p: Personality) -> Self {
        match p {
            Personality::Aggressive => AiPersonality::Aggressive,
            Personality::Balanced => AiPersonality::Balanced,
            Personality::Defensive => AiPersonality::Defensive,
            Personality::Economic => AiPersonality::Economic,
        }
    }
}

#[derive(Clone, Copy, Debug, clap::ValueEnum, PartialEq, Eq)]
enum Difficulty {
    Easy,
    Normal,
    Hard,
}

impl From<Difficulty> for AiDifficulty {
    fn from(d: Difficulty) -> Self {
        match d {
            Difficulty::Easy => AiDifficulty::Easy,
            Difficulty::Normal => AiDifficulty::Normal,
            Difficulty::Hard => AiDifficulty::Hard,
        }
    }
}

#[derive(Clone, Copy, Debug, clap::ValueEnum, PartialEq, Eq)]
enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<LogLevel> for log::LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

#[derive(Parser, Debug)]
#[command(author, version, about = "Headless Overlord simulation", long_about = None)]
struct Args {
    /// Scenario JSON file (default: built-in campaign)
    #[arg(long)]
    scenario: Option<PathBuf>,

    /// Resume from a save file instead of starting a scenario
    #[arg(long, conflicts_with = "scenario")]
    load: Option<PathBuf>,

    /// Rules JSON file overriding the default rules
    #[arg(long)]
    rules: Option<PathBuf>,

    /// Number of turns to run
    #[arg(short, long, default_value_t = 50)]
    turns: u32,

    /// RNG seed for the AI [default: 12345, or the saved seed with --load]
    #[arg(long)]
    seed: Option<u64>,

    /// Override the scenario's (or save's) AI personality
    #[arg(long, value_enum)]
    personality: Option<Personality>,

    /// Override the scenario's (or save's) AI difficulty
    #[arg(long, value_enum)]
    difficulty: Option<Difficulty>,

    /// Let a Balanced AI play the player faction
    #[arg(long)]
    autoplay: bool,

    /// Write every event as a JSON line to this file ("-" for stdout)
    #[arg(long)]
    event_log: Option<PathBuf>,

    /// Save the game here when the run ends
    #[arg(long)]
    save: Option<PathBuf>,

    /// Log executed commands as well as game events
    #[arg(short, long)]
    verbose: bool,

    /// Log level
    #[arg(long, value_enum, default_value_t = LogLevel::Info)]
    log_level: LogLevel,
}

fn load_rules(path: Option<&Path>) -> Result<RulesConfig> {
    let Some(path) = path else {
        return Ok(RulesConfig::default());
    };
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read rules file {}", path.display()))?;
    serde_json::from_str(&json).with_context(|| format!("Invalid rules file {}", path.display()))
}

fn build_controller(args: &Args, rules: RulesConfig) -> Result<TurnController> {
    if let Some(path) = &args.load {
        let mut save = SaveGame::read(path)
            .with_context(|| format!("Failed to load save {}", path.display()))?;
        let saved = save.ai.unwrap_or_default();
        let profile = AiProfile {
            personality: args.personality.map_or(saved.personality, Into::into),
            difficulty: args.difficulty.map_or(saved.difficulty, Into::into),
            seed: args.seed.unwrap_or(saved.seed),
        };
        if save.ai != Some(profile) {
            save.set_ai_profile(profile);
        }
        log::info!(
            "Resuming turn {} from {}, opponent {} ({:?})",
            save.state.turn,
            path.display(),
            profile.personality,
            profile.difficulty
        );
        let ai = save.opponent();
        return Ok(save.into_controller(rules, Box::new(ai)));
    }

    let mut scenario = match &args.scenario {
        Some(path) => Scenario::load(path)
            .with_context(|| format!("Failed to load scenario {}", path.display()))?,
        None => Scenario::default_campaign(),
    };
    if let Some(p) = args.personality {
        scenario.ai_personality = p.into();
    }
    if let Some(d) = args.difficulty {
        scenario.ai_difficulty = d.into();
    }

    let state = scenario
        .build_state()
        .with_context(|| format!("Scenario '{}' is not playable", scenario.name))?;
    log::info!(
        "Scenario '{}': {} planets, opponent {} ({:?})",
        scenario.name,
        state.planets().len(),
        scenario.ai_personality,
        scenario.ai_difficulty
    );
    let ai = StrategicAi::new(
        scenario.ai_personality,
        scenario.ai_difficulty,
        args.seed.unwrap_or(DEFAULT_SEED),
    );
    Ok(TurnController::new(state, rules, Box::new(ai))
        .with_conditions(scenario.victory_conditions, scenario.start_turn))
}

fn print_summary(controller: &TurnController) {
    let state = controller.state();
    let metrics = controller.metrics();

    println!("=== Overlord ===");
    println!("Finished on turn {} ({})", state.turn, state.phase);
    println!("Result: {:?}", controller.outcome());
    if let Some(profile) = controller.ai_profile() {
        println!("Opponent: {} ({:?})", profile.personality, profile.difficulty);
    }
    for faction in Faction::BOTH {
        let record = state.faction(faction);
        println!(
            "{}: {} planets, {} platoons, {} craft, {} credits",
            faction,
            record.owned_planets().len(),
            state.platoons_of(faction).count(),
            state.fleet_count(faction),
            record.ledger.credits
        );
    }
    for status in controller.condition_report().conditions {
        println!(
            "  [{}] {}",
            if status.met { "x" } else { " " },
            status.description
        );
    }
    println!(
        "Commands: {} executed, {} rejected",
        metrics.commands, metrics.rejected_commands
    );
    println!(
        "Time: {:.2}ms/turn (income {:?}, combat {:?}, end {:?}, ai {:?})",
        metrics.turn_avg_ms(),
        metrics.income_time,
        metrics.combat_time,
        metrics.end_time,
        metrics.ai_time
    );
}

fn main() -> Result<()> {
    let args = Args::parse();

    env_logger::Builder::new()
        .filter_level(args.log_level.into())
        .format_timestamp(None)
        .init();

    log::info!("Starting overlord-sim...");

    let rules = load_rules(args.rules.as_deref())?;
    let mut controller = build_controller(&args, rules)?;

    controller
        .bus_mut()
        .subscribe_all(Box::new(ConsoleObserver::new().verbose(args.verbose)));
    if let Some(path) = &args.event_log {
        let observer = if path.as_os_str() == "-" {
            EventLogObserver::stdout()
        } else {
            EventLogObserver::file(path)
                .with_context(|| format!("Failed to create event log {}", path.display()))?
        };
        controller.bus_mut().subscribe_all(Box::new(observer));
    }

    let mut autopilot = args.autoplay.then(|| {
        StrategicAi::new(
            AiPersonality::Balanced,
            AiDifficulty::Normal,
            args.seed.unwrap_or(DEFAULT_SEED).wrapping_add(1),
        )
    });

    controller.start();
    let last_turn = controller.state().turn.saturating_add(args.turns);
    while !controller.is_over() && controller.state().turn < last_turn {
        if let Some(autopilot) = autopilot.as_mut() {
            let accepted = controller.autoplay_player(autopilot);
            log::debug!("Autopilot issued {} commands", accepted);
        }
        let turn = controller.advance_to_next_turn()?;
        log::debug!("Turn {} begins", turn);
    }

    print_summary(&controller);

    if let Some(path) = &args.save {
        SaveGame::capture(&controller)
            .write(path)
            .with_context(|| format!("Failed to save game to {}", path.display()))?;
        println!("Saved to {}", path.display());
    }

    Ok(())
}
