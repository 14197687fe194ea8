use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use clap::Parser as ClapParser;
use tracing::{info, Level};
use tracing_subscriber::EnvFilter;

use subplay::player::{Command, Player, ScriptedInput, SyntheticVideo};
use subplay::srt::format_ts;
use subplay::{parse_file, Cue, Frame, RenderStyle, TextRenderer, Timeline, TimingOffset};

fn main() {
    match run() {
        Ok(()) => (),
        Err(err) => {
            eprintln!("An error occurred: {}", err);
            for cause in err.chain().skip(1) {
                eprintln!("    {}", cause);
            }
            std::process::exit(1);
        }
    }
}

#[derive(ClapParser)]
#[command(about = "Play timed subtitles against a video clock")]
struct Cli {
    #[arg(
        value_name = "VIDEO",
        help = "The video being played. Subtitles named after it (NAME.srt, NAME.en.srt, NAME.ru.srt) are picked up automatically."
    )]
    video: PathBuf,
    #[arg(
        short,
        long,
        value_name = "FILE",
        help = "The subtitle file to show. Overrides automatic discovery."
    )]
    subs: Option<PathBuf>,
    #[arg(long, default_value_t = 25.0, help = "Frames per second of the video clock.")]
    fps: f64,
    #[arg(
        long,
        value_name = "MS",
        help = "Length of the video. Defaults to one second past the last subtitle."
    )]
    duration_ms: Option<i64>,
    #[arg(long, default_value_t = 80, help = "Frame width in character cells.")]
    width: usize,
    #[arg(long, default_value_t = 24, help = "Frame height in character cells.")]
    height: usize,
    #[arg(long, default_value_t = 2, help = "Cells kept free around the subtitles.")]
    margin: usize,
    #[arg(
        short,
        long,
        value_name = "MS",
        default_value_t = 0,
        allow_hyphen_values = true,
        help = "Initial subtitle delay. Negative values show subtitles later."
    )]
    offset_ms: i64,
    #[arg(
        short,
        long = "key",
        value_name = "AT_MS:KEY",
        value_parser = parse_key,
        help = "Press KEY once the video reaches AT_MS. KEY is one of space, esc, a, d, j, k, 0, q. May be repeated."
    )]
    keys: Vec<(i64, Command)>,
    #[arg(short, long, help = "Log debug output.")]
    verbose: bool,
}

fn parse_key(arg: &str) -> std::result::Result<(i64, Command), String> {
    let (at, key) = arg
        .split_once(':')
        .ok_or_else(|| format!("expected AT_MS:KEY, got '{}'", arg))?;
    let at: i64 = at
        .trim()
        .parse()
        .map_err(|_| format!("'{}' is not a time in milliseconds", at))?;
    let key = match key {
        "space" => ' ',
        "esc" => '\u{1b}',
        _ => {
            let mut chars = key.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) => c,
                _ => return Err(format!("unknown key '{}'", key)),
            }
        }
    };
    let command = Command::from_key(key).ok_or_else(|| format!("key '{}' does nothing", key))?;
    Ok((at, command))
}

fn init_logging(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::INFO };
    let env_filter = EnvFilter::builder()
        .with_default_directive(level.into())
        .from_env_lossy();
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();
}

fn find_subtitles(video: &Path) -> Option<PathBuf> {
    let stem = video.file_stem()?.to_string_lossy();
    let dir = video.parent().unwrap_or_else(|| Path::new(""));
    ["srt", "en.srt", "ru.srt"]
        .iter()
        .map(|ext| dir.join(format!("{}.{}", stem, ext)))
        .find(|candidate| candidate.is_file())
}

fn check_fps(fps: f64) -> Result<f64> {
    if fps.is_finite() && fps > 0.0 {
        Ok(fps)
    } else {
        Err(anyhow!("Frame rate must be a positive number, got {}", fps))
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let fps = check_fps(cli.fps)?;

    let subs_path = cli.subs.clone().or_else(|| find_subtitles(&cli.video));
    let subtitles = match &subs_path {
        Some(path) => {
            let timeline = parse_file(path)
                .context(format!("Failed to load subtitles: '{}'", path.display()))?;
            info!(path = %path.display(), cues = timeline.len(), "Loaded subtitles");
            Some(timeline)
        }
        None => {
            info!(video = %cli.video.display(), "No subtitles provided");
            None
        }
    };

    let duration_ms = cli.duration_ms.unwrap_or_else(|| {
        subtitles
            .as_ref()
            .and_then(Timeline::end_ms)
            .unwrap_or(0)
            + 1000
    });

    let style = RenderStyle {
        margin: cli.margin,
        ..RenderStyle::default()
    };
    let mut player = Player::new(
        SyntheticVideo::new(fps, duration_ms),
        subtitles,
        TextRenderer::new(style),
        Frame::new(cli.width, cli.height),
    )
    .with_timing(TimingOffset::new(cli.offset_ms));
    let mut input = ScriptedInput::new(cli.keys);

    let mut shown: Option<Cue> = None;
    player.run(&mut input, |frame, status| {
        if status.cue == shown.as_ref() {
            return;
        }
        shown = status.cue.cloned();
        match status.cue {
            Some(cue) => {
                println!(
                    "[{}] offset {}ms, shown for {}ms",
                    format_ts(status.video_ms),
                    status.offset_ms,
                    cue.duration_ms()
                );
                for y in 0..frame.height() {
                    if let Some(row) = frame.row(y) {
                        if !row.trim().is_empty() {
                            println!("  {}", row.trim_end());
                        }
                    }
                }
            }
            None => println!("[{}] -", format_ts(status.video_ms)),
        }
    });

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::fs;

    fn fixture_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("subplay-{}-{}", name, std::process::id()));
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn discovery_prefers_plain_srt() {
        let dir = fixture_dir("plain");
        for name in ["movie.ru.srt", "movie.en.srt", "movie.srt"] {
            fs::write(dir.join(name), "").unwrap();
        }

        let found = find_subtitles(&dir.join("movie.mp4"));
        fs::remove_dir_all(&dir).unwrap();

        assert_eq!(found, Some(dir.join("movie.srt")));
    }

    #[test]
    fn discovery_prefers_english_over_russian() {
        let dir = fixture_dir("english");
        fs::write(dir.join("movie.ru.srt"), "").unwrap();
        fs::write(dir.join("movie.en.srt"), "").unwrap();

        let found = find_subtitles(&dir.join("movie.mp4"));
        fs::remove_dir_all(&dir).unwrap();

        assert_eq!(found, Some(dir.join("movie.en.srt")));
    }

    #[test]
    fn discovery_skips_directories() {
        let dir = fixture_dir("dirs");
        fs::create_dir(dir.join("x.srt")).unwrap();
        fs::write(dir.join("x.ru.srt"), "").unwrap();

        let found = find_subtitles(&dir.join("x.mkv"));
        fs::remove_dir_all(&dir).unwrap();

        assert_eq!(found, Some(dir.join("x.ru.srt")));
    }

    #[test]
    fn discovery_without_candidates_finds_nothing() {
        let dir = fixture_dir("none");
        fs::write(dir.join("other.srt"), "").unwrap();

        let found = find_subtitles(&dir.join("movie.mp4"));
        fs::remove_dir_all(&dir).unwrap();

        assert_eq!(found, None);
    }

    macro_rules! test_parse_key {
        ($($name:ident: $value:expr,)*) => {
        $(
            #[test]
            fn $name() {
                let (input, expected) = $value;

                assert_eq!(parse_key(input).ok(), expected);
            }
        )*
        }
    }

    test_parse_key! {
        test_parse_key_space: ("1500:space", Some((1500, Command::TogglePause))),
        test_parse_key_esc: ("0:esc", Some((0, Command::Quit))),
        test_parse_key_char: ("250:k", Some((250, Command::NudgeSubtitles(100)))),
        test_parse_key_padded_time: (" 42 :d", Some((42, Command::Seek(5000)))),
        test_parse_key_no_separator: ("abc", None),
        test_parse_key_unmapped: ("1:x", None),
        test_parse_key_multi_char: ("1:zz", None),
        test_parse_key_bad_time: ("soon:q", None),
        test_parse_key_empty_key: ("1:", None),
    }

    #[test]
    fn slow_frame_rates_are_kept() {
        assert_eq!(check_fps(0.5).unwrap(), 0.5);
        assert_eq!(check_fps(25.0).unwrap(), 25.0);
    }

    #[test]
    fn unusable_frame_rates_are_rejected() {
        for fps in [0.0, -1.0, f64::NAN, f64::INFINITY] {
            assert!(check_fps(fps).is_err(), "accepted {}", fps);
        }
    }
}
