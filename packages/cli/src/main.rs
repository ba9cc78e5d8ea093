//! Headless driver: load the data files, paint a demo scene, run the engine
//! for a fixed number of frames and report throughput.

use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Instant;

use clap::Parser;
use granula_engine::{Category, ElementRegistry, Engine, Settings, EMPTY};

#[derive(Parser, Debug)]
#[command(name = "granula")]
#[command(about = "Falling-sand engine soak driver")]
struct Args {
    /// Element definitions file
    #[arg(long, default_value = "data/elements.data")]
    elements: PathBuf,

    /// Engine settings file
    #[arg(long, default_value = "data/settings.data")]
    settings: PathBuf,

    /// Frames to run before exiting
    #[arg(long, default_value = "600")]
    frames: u64,

    /// RNG seed
    #[arg(long, default_value = "12345")]
    seed: u32,

    /// Pace frames on the wall clock instead of a simulated one
    #[arg(long)]
    realtime: bool,
}

fn main() -> ExitCode {
    env_logger::init();
    let args = Args::parse();

    let settings = match Settings::from_file(&args.settings) {
        Ok(settings) => settings,
        Err(err) => {
            eprintln!("granula: {}", err);
            return ExitCode::FAILURE;
        }
    };
    let elements = match ElementRegistry::from_file(&args.elements) {
        Ok(elements) => elements,
        Err(err) => {
            eprintln!("granula: {}", err);
            return ExitCode::FAILURE;
        }
    };

    let render_interval = settings.render_interval;
    let mut engine = Engine::with_seed(settings, elements, args.seed);
    log::info!(
        "granula {}x{}, {} elements, {} frames",
        engine.width(),
        engine.height(),
        engine.elements().len(),
        args.frames
    );

    paint_demo_scene(&mut engine);
    engine.start();

    let started = Instant::now();
    for frame in 0..args.frames {
        let now_ms = if args.realtime {
            let target = frame as f64 * render_interval;
            let elapsed = started.elapsed().as_secs_f64() * 1000.0;
            if target > elapsed {
                std::thread::sleep(std::time::Duration::from_micros(
                    ((target - elapsed) * 1000.0) as u64,
                ));
            }
            started.elapsed().as_secs_f64() * 1000.0
        } else {
            frame as f64 * render_interval
        };
        engine.tick(now_ms);
    }

    let wall = started.elapsed().as_secs_f64();
    println!(
        "ran {} frames / {} physics ticks in {:.2}s ({} particles resting)",
        args.frames,
        engine.tick_count(),
        wall,
        engine.particle_count()
    );
    ExitCode::SUCCESS
}

/// Drop a mound of the first sand over a pool of the first liquid, so a soak
/// run exercises falling, displacement and equalisation.
fn paint_demo_scene(engine: &mut Engine) {
    let sand = first_of(engine.elements(), Category::Sand);
    let liquid = first_of(engine.elements(), Category::Liquid);
    let w = engine.width() as i32;
    let h = engine.height() as i32;

    if let Some(liquid) = liquid {
        for x in 0..w {
            for y in 0..h / 8 {
                engine.paint_circle(x, y, 0, liquid);
            }
        }
    }
    if let Some(sand) = sand {
        engine.paint_circle(w / 2, h / 2, (w / 10).max(2), sand);
    }
}

fn first_of(elements: &ElementRegistry, category: Category) -> Option<u16> {
    elements
        .iter()
        .find(|el| el.category == category && el.id != EMPTY)
        .map(|el| el.id)
}
