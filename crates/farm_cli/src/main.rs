use anyhow::Result;
use clap::{Parser, Subcommand};
use farm_control::{analysis_or_fallback, Advisor, AutoFarmer, CommandSource, FieldAnalyst};
use farm_core::{
    compute_metrics, notification, Command, CommandEnvelope, CommandId, Event, GameContent,
    GameState, LocationId, NoticeLevel,
};
use farm_world::{build_initial_state, load_content, session_rng};

// ---------------------------------------------------------------------------
// CLI definition
// ---------------------------------------------------------------------------

#[derive(Parser)]
#[command(name = "farm_cli", about = "Satellite Data Farm headless runner")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the simulation for a fixed number of ticks with the autoplayer.
    Run {
        #[arg(long)]
        ticks: u64,
        /// Session seed; drawn at random when omitted.
        #[arg(long)]
        seed: Option<u64>,
        #[arg(long, default_value = "central_valley_usa")]
        location: String,
        #[arg(long, default_value = "./content")]
        content_dir: String,
        #[arg(long, default_value_t = 24)]
        print_every: u64,
        /// Ask the local assistant for a suggestion every N days.
        #[arg(long, default_value_t = 1)]
        advise_every: u64,
        /// Play without the assistant.
        #[arg(long)]
        no_advisor: bool,
    },
}

// ---------------------------------------------------------------------------
// Run loop
// ---------------------------------------------------------------------------

struct RunOptions {
    ticks: u64,
    print_every: u64,
    /// In ticks; `None` disables the assistant.
    advise_every: Option<u64>,
}

/// Selects the location and lays out a fresh farm for this seed.
fn new_session(
    content: &GameContent,
    seed: Option<u64>,
    location: &str,
) -> Result<(GameState, rand_chacha::ChaCha8Rng)> {
    let resolved_seed = seed.unwrap_or_else(rand::random);
    let mut rng = session_rng(resolved_seed);
    let state = build_initial_state(
        content,
        &LocationId(location.to_string()),
        resolved_seed,
        &mut rng,
    )?;
    Ok((state, rng))
}

/// Queues the assistant's suggestion, if it has one, ahead of the autoplayer.
fn advise(
    state: &GameState,
    content: &GameContent,
    next_command_id: &mut u64,
    commands: &mut Vec<CommandEnvelope>,
) {
    let analysis = analysis_or_fallback(FieldAnalyst.analyze(state, content));
    let Some(suggestion) = analysis.suggestion else {
        return;
    };
    println!(
        "    Terra: {} Suggestion: {}",
        analysis.summary, suggestion.message
    );
    let id = CommandId(format!("cmd_{:06}", *next_command_id));
    *next_command_id += 1;
    commands.insert(
        0,
        CommandEnvelope {
            id,
            issued_tick: state.meta.tick,
            command: Command::ApplySuggestion { suggestion },
        },
    );
}

fn run(
    content: &GameContent,
    state: &mut GameState,
    rng: &mut rand_chacha::ChaCha8Rng,
    options: &RunOptions,
) {
    let mut autoplayer = AutoFarmer::default();
    let mut next_command_id = 0u64;

    println!(
        "Starting simulation: ticks={} seed={} location={} content_version={}",
        options.ticks, state.meta.seed, state.meta.location, content.content_version,
    );
    println!("{}", "-".repeat(80));

    for _ in 0..options.ticks {
        let mut commands = autoplayer.generate_commands(state, content, &mut next_command_id);
        if let Some(every) = options.advise_every {
            if state.meta.tick.is_multiple_of(every) {
                advise(state, content, &mut next_command_id, &mut commands);
            }
        }

        let events = farm_core::tick(state, &commands, content, rng);

        // Print notable events regardless of print_every.
        for envelope in &events {
            print_notable(&envelope.event, state.meta.tick);
        }

        if state.meta.tick.is_multiple_of(options.print_every) {
            print_status(state);
        }
    }

    println!("{}", "-".repeat(80));
    println!("Done. Final state at tick {}:", state.meta.tick);
    print_status(state);
}

fn print_notable(event: &Event, tick: u64) {
    let Some(note) = notification(event) else {
        return;
    };
    let label = match (note.level, event) {
        (NoticeLevel::Achievement, _) => "ACHIEVEMENT",
        (NoticeLevel::LevelUp, _) => "LEVEL UP",
        (_, Event::SeasonChanged { .. }) => "SEASON",
        (_, Event::ProactiveNotice { .. }) => "NOTICE",
        _ => return,
    };
    println!("*** {label}: {} at tick={tick:05} ***", note.message);
}

fn print_status(state: &GameState) {
    let m = compute_metrics(state);
    println!(
        "[tick={:05}  day={:3}  {:<6}]  money={:6}  lvl={:2}  xp={:5}  \
         water={:5.1}/{:<5.0}  energy={:5.1}/{:<5.0}  \
         plots={}/{}  ready={:2}  moisture={:4.1}%  ndvi={:.2}  temp={:4.1}C",
        m.tick,
        m.day,
        m.season.to_string(),
        m.money,
        m.level,
        m.xp,
        m.water,
        m.max_water,
        m.energy,
        m.max_energy,
        m.tiles_planted,
        m.tiles_unlocked,
        m.harvest_ready,
        m.soil_moisture,
        m.ndvi,
        m.temperature,
    );
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

fn main() -> Result<()> {
    let cli = Cli::parse();
    match cli.command {
        Commands::Run {
            ticks,
            seed,
            location,
            content_dir,
            print_every,
            advise_every,
            no_advisor,
        } => {
            let content = load_content(&content_dir)?;
            let (mut state, mut rng) = new_session(&content, seed, &location)?;
            let ticks_per_day = content.constants.ticks_per_day.max(1);
            let options = RunOptions {
                ticks,
                print_every: print_every.max(1),
                advise_every: (!no_advisor).then(|| advise_every.max(1) * ticks_per_day),
            };
            run(&content, &mut state, &mut rng, &options);
        }
    }
    Ok(())
}
