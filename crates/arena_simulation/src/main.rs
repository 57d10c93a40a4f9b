//! Headless симуляция арены
//!
//! `arena_simulation [config.json] [ticks]`
//! Scripted input: strafe влево/вправо + trigger, медленный поворот камеры.

use std::process::ExitCode;
use std::time::{Duration, Instant};

use arena_simulation::logger::{init_logger, log_error, log_info, log_warning};
use arena_simulation::{LogSink, PlayerInput, Simulation, SimulationConfig, WallClock, WeaponSwitch};

const DEFAULT_TICKS: usize = 600;
/// Целевая длительность кадра (~60 FPS), реальный delta берётся из WallClock
const FRAME: Duration = Duration::from_micros(16_667);

fn scripted_input(tick: usize) -> PlayerInput {
    let phase = (tick / 120) % 2 == 0;
    PlayerInput {
        forward: tick % 240 < 60,
        back: tick % 240 >= 180,
        left: phase,
        right: !phase,
        sprint: tick % 300 > 200,
        jump: tick % 150 == 0,
        // Пульсирующий trigger: semi-auto тоже стреляет
        firing: tick % 20 < 10,
        yaw: tick as f32 * 0.01,
        pitch: 0.0,
        reload: tick % 200 == 199,
        switch: (tick % 180 == 179).then_some(WeaponSwitch::Relative(1)),
        cycle_skin: false,
    }
}

fn main() -> ExitCode {
    init_logger();
    let mut args = std::env::args().skip(1);

    let config = match args.next() {
        Some(path) => match SimulationConfig::from_json_file(&path) {
            Ok(config) => config,
            Err(error) => {
                log_error(&format!("Failed to load config {}: {}", path, error));
                return ExitCode::FAILURE;
            }
        },
        None => SimulationConfig::default(),
    };
    let ticks = match args.next() {
        Some(value) => value.parse::<usize>().unwrap_or_else(|_| {
            log_warning(&format!("Invalid tick count '{}', using {}", value, DEFAULT_TICKS));
            DEFAULT_TICKS
        }),
        None => DEFAULT_TICKS,
    };

    let mut simulation = match Simulation::new(config) {
        Ok(simulation) => simulation,
        Err(error) => {
            log_error(&format!("Failed to start simulation: {}", error));
            return ExitCode::FAILURE;
        }
    };

    log_info(&format!("Starting arena headless simulation ({} ticks)", ticks));

    let started = Instant::now();
    let mut wall = WallClock::start();
    let mut sink = LogSink;
    for tick in 0..ticks {
        let frame_start = Instant::now();
        simulation.tick(wall.sample(), scripted_input(tick), &mut sink);

        if tick % 60 == 0 {
            let player = simulation.player();
            let ammo = simulation
                .weapon_state(player.equipped)
                .map(|state| (state.current_ammo, state.reserve_ammo))
                .unwrap_or_default();
            log_info(&format!(
                "Tick {} (t = {:.2}s): player hp {}/{} at ({:.0}, {:.0}, {:.0}), slot {} ammo {}/{}, {} enemies",
                tick,
                simulation.now().as_secs_f32(),
                player.health,
                player.max_health,
                player.position.x,
                player.position.y,
                player.position.z,
                player.equipped,
                ammo.0,
                ammo.1,
                simulation.enemies().len()
            ));
        }

        if let Some(rest) = FRAME.checked_sub(frame_start.elapsed()) {
            std::thread::sleep(rest);
        }
    }

    log_info(&format!(
        "Simulation complete: {:.2}s simulated in {:.3}s wall time",
        simulation.now().as_secs_f32(),
        started.elapsed().as_secs_f32()
    ));
    ExitCode::SUCCESS
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scripted_input_never_pushes_both_ways() {
        for tick in 0..480 {
            let input = scripted_input(tick);
            assert!(!(input.forward && input.back), "tick {}", tick);
            assert!(!(input.left && input.right), "tick {}", tick);
        }
        assert!(scripted_input(200).back);
    }
}
