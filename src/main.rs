//! pmpc - real-time polyphonic 8-bit synthesizer.
//!
//! Usage:
//!   pmpc path/to/song.pmpc
//!   pmpc path/to/song.pmpc --wav output.wav --max-seconds 60

use clap::Parser;
use pm_master::{Controller, Song, SAMPLE_RATE};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Duration;

#[derive(Parser)]
#[command(name = "pmpc")]
#[command(about = "Play or render a pmpc score")]
struct Args {
    /// Score file
    path: PathBuf,

    /// Render to an 8-bit mono WAV file instead of playing
    #[arg(long)]
    wav: Option<PathBuf>,

    /// Longest render, in seconds
    #[arg(long, default_value_t = 300)]
    max_seconds: u32,

    /// Play every track once instead of looping
    #[arg(long)]
    once: bool,

    /// Print song information and exit
    #[arg(long)]
    info: bool,
}

fn main() -> ExitCode {
    env_logger::init();
    let args = Args::parse();

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(args: &Args) -> Result<(), String> {
    let text = std::fs::read_to_string(&args.path)
        .map_err(|e| format!("Failed to read {}: {}", args.path.display(), e))?;

    let mut ctrl = Controller::new();
    ctrl.load_score(&text)
        .map_err(|e| format!("Failed to load {}: {}", args.path.display(), e))?;
    if let Some(stem) = args.path.file_stem() {
        ctrl.set_title(&stem.to_string_lossy());
    }
    ctrl.set_looping(!args.once);

    print_info(ctrl.song());
    if args.info {
        return Ok(());
    }

    match &args.wav {
        Some(wav) => render_to_wav(&ctrl, wav, args.max_seconds),
        None => {
            play_audio(&mut ctrl, args.once);
            Ok(())
        }
    }
}

fn print_info(song: &Song) {
    println!("Title:    {}", song.title);
    println!("Tracks:   {}", song.track_count());
    for (i, track) in song.tracks.iter().enumerate() {
        println!(
            "  {:>2}: {:<8} {:>5} ticks, {} bytes",
            i,
            track.generator,
            track.duration_ticks(),
            track.data.len()
        );
    }
    println!("Tick:     {} samples", song.samples_per_tick);
    println!("Shift:    {}", song.attenuation);
    println!(
        "Length:   {:.2}s",
        song.duration_samples() as f64 / SAMPLE_RATE as f64
    );
    println!();
}

fn play_audio(ctrl: &mut Controller, once: bool) {
    ctrl.play();
    if once {
        println!("Playing...");
    } else {
        println!("Playing (looping, Ctrl-C to quit)...");
    }
    println!();

    while ctrl.is_playing() {
        if let Some(pos) = ctrl.position() {
            print!("\rTime: {:>7.2}s", pos as f64 / SAMPLE_RATE as f64);
            let _ = std::io::stdout().flush();
        }
        std::thread::sleep(Duration::from_millis(10));
    }

    println!("\rDone.          ");
}

fn render_to_wav(ctrl: &Controller, path: &Path, max_seconds: u32) -> Result<(), String> {
    println!("Rendering to {} (at most {}s)...", path.display(), max_seconds);

    let samples = ctrl
        .export_wav(path, max_seconds)
        .map_err(|e| format!("Failed to write {}: {}", path.display(), e))?;
    println!(
        "Rendered {} samples ({:.2}s)",
        samples,
        samples as f64 / SAMPLE_RATE as f64
    );

    println!("Done.");
    Ok(())
}
