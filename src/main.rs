//! Tank Arena headless driver
//!
//! Runs the simulation with a scripted pilot and prints the final world
//! snapshot as JSON. Usage: `tank-arena [seed] [frames] [tuning.json]`

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    use tank_arena::Tuning;
    use tank_arena::sim::{FixedStep, GameEvent, GameState, TickInput};

    env_logger::init();

    let mut args = std::env::args().skip(1);
    let seed = args.next().and_then(|s| s.parse().ok()).unwrap_or(42);
    let frames: u32 = args.next().and_then(|s| s.parse().ok()).unwrap_or(3600);
    let tuning = match args.next() {
        Some(path) => match std::fs::read_to_string(&path) {
            Ok(json) => Tuning::from_json_or_default(&json),
            Err(err) => {
                log::warn!("Could not read {}: {}", path, err);
                Tuning::default()
            }
        },
        None => Tuning::default(),
    };

    log::info!("Tank Arena (headless) starting with seed {}", seed);
    let mut state = GameState::with_tuning(seed, tuning);
    let mut stepper = FixedStep::new();
    let mut input = TickInput::default();

    // Uneven frame times exercise the accumulator
    let frame_times = [1.0 / 60.0, 1.0 / 144.0, 1.0 / 30.0, 1.0 / 60.0];
    let (mut particles, mut texts, mut tones) = (0u32, 0u32, 0u32);

    for frame in 0..frames {
        if state.is_game_over() {
            break;
        }
        script_input(&mut input, frame);

        let dt = frame_times[frame as usize % frame_times.len()];
        for event in stepper.advance(&mut state, &mut input, dt) {
            match event {
                GameEvent::SpawnParticles { count, .. } => particles += count,
                GameEvent::SpawnFloatingText { text, .. } => {
                    log::debug!("Text: {}", text);
                    texts += 1;
                }
                GameEvent::PlayTone { .. } => tones += 1,
            }
        }

        if frame % 600 == 0 {
            let hud = state.hud();
            log::info!(
                "Frame {}: health {} score {} level {}",
                frame,
                hud.health,
                hud.score,
                hud.level
            );
        }
    }

    let hud = state.hud();
    log::info!(
        "Finished after {} ticks: score {} level {} ({} particles, {} texts, {} tones)",
        state.time_ticks,
        hud.score,
        hud.level,
        particles,
        texts,
        tones
    );

    match serde_json::to_string_pretty(&state.snapshot()) {
        Ok(json) => println!("{json}"),
        Err(err) => log::error!("Failed to serialize snapshot: {}", err),
    }
}

/// Sweep the arena while firing, calling in allies now and then
#[cfg(not(target_arch = "wasm32"))]
fn script_input(input: &mut tank_arena::sim::TickInput, frame: u32) {
    let leg = (frame / 90) % 4;
    input.move_up = leg == 0;
    input.move_left = leg == 1;
    input.move_down = leg == 2;
    input.move_right = leg == 3;
    input.fire = true;
    if frame % 900 == 0 {
        input.spawn_ally = true;
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // The library is embedded by a host page; there is no standalone binary
}
