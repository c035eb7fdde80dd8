/// Entry point and game loop.

mod config;
mod domain;
mod sim;
mod ui;

use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

use crossterm::event::KeyCode;
use glam::Vec2;

use config::GameConfig;
use domain::entity::FrameInput;
use sim::event::GameEvent;
use sim::world::{Game, Mode};
use ui::input::InputState;
use ui::renderer::{cell_to_world, Renderer};
use ui::sound::SoundEngine;

const FRAME_SLEEP: Duration = Duration::from_millis(5);

// ── Key Constants ──

const KEYS_LEFT: &[KeyCode] = &[KeyCode::Left, KeyCode::Char('a'), KeyCode::Char('A')];
const KEYS_RIGHT: &[KeyCode] = &[KeyCode::Right, KeyCode::Char('d'), KeyCode::Char('D')];
const KEYS_UP: &[KeyCode] = &[KeyCode::Up, KeyCode::Char('w'), KeyCode::Char('W')];
const KEYS_DOWN: &[KeyCode] = &[KeyCode::Down, KeyCode::Char('s'), KeyCode::Char('S')];
const KEYS_CONFIRM: &[KeyCode] = &[KeyCode::Enter, KeyCode::Char(' ')];

fn main() {
    let config = GameConfig::load();
    let seed = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos() as u64)
        .unwrap_or(0x5eed);
    let mut game = Game::new(config, seed);

    let mut renderer = Renderer::new();
    if let Err(e) = renderer.init() {
        eprintln!("Terminal init failed: {e}");
        return;
    }

    let sound = SoundEngine::new();
    let result = game_loop(&mut game, &mut renderer, sound.as_ref());

    if let Err(e) = renderer.cleanup() {
        eprintln!("Terminal cleanup failed: {e}");
    }
    if let Err(e) = result {
        eprintln!("Game error: {e}");
    }

    println!();
    println!("Thanks for playing Spider Isle!");
    println!("Final score: {}", game.score);
}

fn game_loop(
    game: &mut Game,
    renderer: &mut Renderer,
    sound: Option<&SoundEngine>,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut kb = InputState::new();
    kb.honor_release = renderer.enhanced_keys();
    let tick_rate = Duration::from_millis(game.config.tick_rate_ms);
    let mut last_tick = Instant::now();
    let mut pending_fire: Option<Vec2> = None;

    loop {
        kb.drain_events();
        if kb.ctrl_c_pressed() {
            break;
        }

        let confirm = kb.any_pressed(KEYS_CONFIRM);
        let esc = kb.any_pressed(&[KeyCode::Esc]);
        let click = kb.take_click();

        match game.mode {
            Mode::Playing(_) => {
                if esc {
                    game.return_to_title();
                    pending_fire = None;
                } else if let Some((col, row)) = click {
                    // Recorded between ticks, consumed at the next tick start.
                    pending_fire = Some(cell_to_world(col, row));
                }
            }
            Mode::Title { .. } => {
                pending_fire = None;
                if esc || kb.any_pressed(&[KeyCode::Char('q'), KeyCode::Char('Q')]) {
                    break;
                }
                if confirm || click.is_some() {
                    game.advance_screen()?;
                }
            }
            _ => {
                pending_fire = None;
                if esc {
                    game.return_to_title();
                } else if confirm || click.is_some() {
                    game.advance_screen()?;
                }
            }
        }

        if last_tick.elapsed() >= tick_rate {
            if matches!(game.mode, Mode::Playing(_)) {
                let input = FrameInput {
                    left: kb.any_held(KEYS_LEFT),
                    right: kb.any_held(KEYS_RIGHT),
                    up: kb.any_held(KEYS_UP),
                    down: kb.any_held(KEYS_DOWN),
                    fire: pending_fire.take(),
                };
                let events = game.tick(input)?;
                process_sound_events(sound, &events);
            }
            last_tick = Instant::now();
        }

        renderer.render(game)?;
        std::thread::sleep(FRAME_SLEEP);
    }

    Ok(())
}

fn process_sound_events(sound: Option<&SoundEngine>, events: &[GameEvent]) {
    let sfx = match sound {
        Some(s) => s,
        None => return,
    };
    for event in events {
        match event {
            GameEvent::Jumped => sfx.play_jump(),
            GameEvent::ShotFired => sfx.play_shot(),
            GameEvent::CoinCollected { .. } => sfx.play_coin(),
            GameEvent::SpiderKilled { .. } => sfx.play_kill(),
            GameEvent::PlayerKilled => sfx.play_die(),
            GameEvent::LevelCleared => sfx.play_clear(),
            GameEvent::GameWon => sfx.play_win(),
            GameEvent::SpiderDrowned { .. } => {}
        }
    }
}
