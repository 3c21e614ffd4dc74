/// Entry point and frame loop.

mod config;
mod domain;
mod sim;
mod ui;

use std::time::{Duration, Instant};

use anyhow::Context;
use tracing_subscriber::EnvFilter;

use config::GameConfig;
use sim::clock::{TickClock, TickHandle};
use sim::event::GameEvent;
use sim::step;
use sim::world::GameState;
use ui::gamepad::GamepadState;
use ui::input::Keyboard;
use ui::present;
use ui::renderer::Renderer;

const FRAME_SLEEP: Duration = Duration::from_millis(5);

fn main() -> anyhow::Result<()> {
    init_logging();

    let config = GameConfig::load().context("invalid configuration")?;
    let mut world = GameState::new(&config);
    let mut renderer = Renderer::new(config.board, config.theme);

    if let Err(e) = renderer.init() {
        let _ = renderer.cleanup();
        return Err(e).context("terminal init failed");
    }

    let result = game_loop(&mut world, &mut renderer, &config);
    let cleanup = renderer.cleanup();

    result.context("game error")?;
    cleanup.context("terminal cleanup failed")?;

    println!();
    println!("Thanks for playing Snake!");
    println!("High Score: {}", world.high_score);
    Ok(())
}

/// Logs go to stderr, quiet unless `RUST_LOG` asks for more.
fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn tick_interval(world: &GameState) -> Duration {
    Duration::from_millis(world.speed_ms)
}

fn game_loop(
    world: &mut GameState,
    renderer: &mut Renderer,
    config: &GameConfig,
) -> anyhow::Result<()> {
    let mut kb = Keyboard::new();
    let mut gp = GamepadState::new();
    gp.load_button_config(&config.gamepad);
    if gp.connected {
        tracing::info!("gamepad detected");
    }

    let mut clock = TickClock::new();
    let mut next_tick: Option<TickHandle> = Some(clock.schedule_once(Instant::now(), tick_interval(world)));

    tracing::info!(run = world.run, board = ?config.board, "game started");
    present::redraw(world, renderer);

    loop {
        kb.drain_events()?;
        gp.update();

        if kb.quit_pressed() || gp.quit_pressed() {
            break;
        }

        if kb.pause_pressed() || gp.pause_pressed() {
            world.toggle_pause();
            renderer.set_paused(world.paused);
            if world.paused {
                if let Some(handle) = next_tick.take() {
                    clock.cancel(handle);
                }
            } else {
                next_tick = Some(clock.schedule_once(Instant::now(), tick_interval(world)));
            }
        }

        if !world.paused {
            for dir in kb.directions().chain(gp.directions()) {
                world.request_direction(dir);
            }
        }

        let now = Instant::now();
        if clock.poll(now).is_some() {
            let events = step::step(world);
            log_events(world, &events);
            if events.iter().any(|e| matches!(e, GameEvent::RunStarted { .. })) {
                // New run: nothing from the old chain may survive.
                clock.cancel_all();
            }
            present::present(world, &events, renderer);
            next_tick = Some(clock.schedule_once(now, tick_interval(world)));
        }

        if renderer.check_resize()? {
            present::redraw(world, renderer);
        }
        renderer.present()?;
        std::thread::sleep(FRAME_SLEEP);
    }

    Ok(())
}

fn log_events(world: &GameState, events: &[GameEvent]) {
    for ev in events {
        match ev {
            GameEvent::RunEnded { cause, score, length } => {
                tracing::info!(tick = world.tick, ?cause, score, length, "run ended");
            }
            GameEvent::RunStarted { run } => tracing::info!(run, "run started"),
            GameEvent::FoodEaten { at } => tracing::debug!(x = at.x, y = at.y, "food eaten"),
            GameEvent::SpeedChanged { speed_ms } => tracing::debug!(speed_ms, "tick interval"),
            _ => {}
        }
    }
}
