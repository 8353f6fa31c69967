use std::collections::VecDeque;
use std::path::PathBuf;

use colorfill::display::{
    window_size, Display, InputEvent, MouseButtonKind, RenderTarget, MAX_SCALE,
};
use colorfill::{export_png, line_art, FillCanvas, FillStep, PixelBuffer, Settings};
use sdl2::keyboard::Keycode;
use tracing_subscriber::EnvFilter;

const SETTINGS_PATH: &str = "colorfill.json";
const EXPORT_PATH: &str = "colorfill.png";
const SKETCH_WIDTH: u32 = 480;
const SKETCH_HEIGHT: u32 = 360;

struct Options {
    image: Option<PathBuf>,
    settings: PathBuf,
    scale: u32,
    vsync: bool,
}

/// Parse command line arguments
fn parse_args() -> Options {
    let args: Vec<String> = std::env::args().collect();
    let mut options = Options {
        image: None,
        settings: PathBuf::from(SETTINGS_PATH),
        scale: 1,
        vsync: true,
    };

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--no-vsync" => options.vsync = false,
            "--config" | "-c" => {
                if i + 1 < args.len() {
                    options.settings = PathBuf::from(&args[i + 1]);
                    i += 1;
                }
            },
            "--scale" | "-s" => {
                if i + 1 < args.len() {
                    match args[i + 1].parse::<u32>() {
                        Ok(s) if (1..=MAX_SCALE).contains(&s) => options.scale = s,
                        _ => eprintln!(
                            "Ignoring --scale {}, expected 1 to {}",
                            args[i + 1], MAX_SCALE
                        ),
                    }
                    i += 1;
                }
            },
            "--help" => {
                println!("Usage: colorfill [OPTIONS] [IMAGE.png]");
                println!();
                println!("Without an image a line-art sketch is generated.");
                println!();
                println!("Options:");
                println!(
                    "  --config F, -c F      Settings file (default: {})",
                    SETTINGS_PATH
                );
                println!(
                    "  --scale N, -s N       Window pixels per image pixel, 1-{} (default: 1)",
                    MAX_SCALE
                );
                println!("  --no-vsync            Disable VSync, fills advance every loop");
                println!("  --help                Show this help message");
                std::process::exit(0);
            },
            other if !other.starts_with('-') => options.image = Some(PathBuf::from(other)),
            other => eprintln!("Ignoring unknown option {}", other),
        }
        i += 1;
    }

    options
}

fn main() -> Result<(), String> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let options = parse_args();
    let settings = Settings::load_or_default(&options.settings).map_err(|e| e.to_string())?;

    let buffer = match &options.image {
        Some(path) => {
            let img = colorfill::load_image(path).map_err(|e| e.to_string())?;
            PixelBuffer::from_source(&img)
        },
        None => line_art(SKETCH_WIDTH, SKETCH_HEIGHT),
    }
    .map_err(|e| e.to_string())?;
    let mut canvas = FillCanvas::new(buffer, settings.fill).map_err(|e| e.to_string())?;

    let (width, height) = (canvas.buffer().width(), canvas.buffer().height());
    let (window_width, window_height) = window_size(width, height, options.scale)?;
    let (mut display, texture_creator) =
        Display::with_options("colorfill", window_width, window_height, options.vsync)?;
    let mut target = RenderTarget::for_buffer(&texture_creator, canvas.buffer())?;

    let mut color_slot = 0usize;
    // Clicks that arrive while a fill runs wait here, in order
    let mut pending: VecDeque<(i32, i32)> = VecDeque::new();

    println!("=== colorfill ===");
    println!(
        "Image: {}x{}, window {}x{}",
        width,
        height,
        display.width(),
        display.height()
    );
    println!(
        "Alpha threshold {}, flush every {} waves, {:?} propagation",
        settings.fill.alpha_threshold, settings.fill.max_fill_count, settings.fill.propagation
    );
    println!("Controls:");
    println!("  Left click - Fill from the clicked pixel");
    println!("  1-9        - Select palette color");
    println!("  X          - Cancel the running fill");
    println!("  C          - Clear all fills");
    println!("  P          - Export {}", EXPORT_PATH);
    println!("  S          - Save settings");
    println!("  Escape     - Quit");

    'main: loop {
        for event in display.poll_events() {
            match event {
                InputEvent::Quit => break 'main,
                InputEvent::KeyDown(key) => match key {
                    Keycode::Escape => break 'main,
                    Keycode::X => {
                        pending.clear();
                        if let Some(report) = canvas.cancel() {
                            println!("Fill cancelled after {} waves", report.waves);
                        }
                    },
                    Keycode::C => {
                        if !canvas.reset() {
                            println!("Fill in progress, press X first");
                        }
                    },
                    Keycode::P => match export_png(canvas.buffer(), EXPORT_PATH) {
                        Ok(()) => println!("Image exported to {}", EXPORT_PATH),
                        Err(e) => eprintln!("Failed to export: {}", e),
                    },
                    Keycode::S => {
                        if let Err(e) = settings.save(&options.settings) {
                            eprintln!("Failed to save: {}", e);
                        } else {
                            println!("Settings saved to {}", options.settings.display());
                        }
                    },
                    _ => {
                        if let Some(slot) = palette_slot(key) {
                            color_slot = slot;
                            println!("Color {} selected", slot + 1);
                        }
                    },
                },
                InputEvent::MouseDown {
                    x,
                    y,
                    button: MouseButtonKind::Left,
                } => {
                    // Window pixels back to image pixels
                    let sx = (display.width() / width) as i32;
                    let sy = (display.height() / height) as i32;
                    pending.push_back((x / sx, y / sy));
                },
                InputEvent::MouseDown { .. } => {},
            }
        }

        if !canvas.is_filling() {
            if let Some((x, y)) = pending.pop_front() {
                if let Err(e) = canvas.begin(x, y, settings.color(color_slot)) {
                    eprintln!("Failed to start fill: {}", e);
                }
            }
        }

        // One flush point per frame; idle frames just redraw
        if let FillStep::Done(report) = canvas.advance() {
            println!(
                "Filled {} cells in {} waves ({} gated)",
                report.painted, report.waves, report.gated
            );
        }

        display.present(&mut target, canvas.buffer())?;
    }

    Ok(())
}

fn palette_slot(key: Keycode) -> Option<usize> {
    match key {
        Keycode::Num1 => Some(0),
        Keycode::Num2 => Some(1),
        Keycode::Num3 => Some(2),
        Keycode::Num4 => Some(3),
        Keycode::Num5 => Some(4),
        Keycode::Num6 => Some(5),
        Keycode::Num7 => Some(6),
        Keycode::Num8 => Some(7),
        Keycode::Num9 => Some(8),
        _ => None,
    }
}
