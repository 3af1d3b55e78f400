use crate::config::{Config, OrientationSetting, load_config};
use crate::date::parse_date;
use crate::interchange::{export_html, import_tracks};
#[cfg(feature = "png")]
use crate::render::write_output_png;
use crate::layout_dump::write_layout_dump;
use crate::render::{render_svg, write_output_svg};
use crate::render_tracks;
use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use std::io::{self, Read};
use std::path::{Path, PathBuf};

#[derive(Parser, Debug)]
#[command(name = "tubetl", version, about = "Tube-map style timeline renderer")]
pub struct Args {
    /// Input JSON file (array of tracks) or '-' for stdin
    #[arg(short = 'i', long = "input")]
    pub input: Option<PathBuf>,

    /// Output file (svg/png/html). Defaults to stdout for SVG if omitted.
    #[arg(short = 'o', long = "output")]
    pub output: Option<PathBuf>,

    /// Output format; inferred from the output extension when omitted
    #[arg(short = 'e', long = "outputFormat", value_enum)]
    pub output_format: Option<OutputFormat>,

    /// Config JSON/JSON5 file
    #[arg(short = 'c', long = "configFile")]
    pub config: Option<PathBuf>,

    /// Width
    #[arg(short = 'w', long = "width")]
    pub width: Option<f32>,

    /// Height
    #[arg(short = 'H', long = "height")]
    pub height: Option<f32>,

    /// auto, horizontal or vertical
    #[arg(long = "orientation")]
    pub orientation: Option<OrientationSetting>,

    /// Pretend today is this date (DD/MM/YYYY)
    #[arg(long = "today")]
    pub today: Option<String>,

    /// Hide the today marker
    #[arg(long = "no-today")]
    pub no_today: bool,

    #[arg(long = "title")]
    pub title: Option<String>,

    #[arg(long = "subtitle")]
    pub subtitle: Option<String>,

    /// Isolate one track, dimming the others
    #[arg(long = "focus")]
    pub focus: Option<String>,

    /// Also write a JSON dump of the computed layout
    #[arg(long = "dump-layout")]
    pub dump_layout: Option<PathBuf>,

    /// Debug logging
    #[arg(short = 'v', long = "verbose")]
    pub verbose: bool,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Svg,
    Png,
    Html,
}

pub fn run() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose)?;

    let mut config = load_config(args.config.as_deref())?;
    apply_overrides(&mut config, &args);
    config.layout.validate()?;
    let today = match args.today.as_deref() {
        Some(raw) => parse_date(raw).with_context(|| format!("invalid --today date `{raw}`"))?,
        None => chrono::Local::now().date_naive(),
    };

    let input = read_input(args.input.as_deref())?;
    let tracks = import_tracks(&input)?;
    if let Some(focus) = args.focus.as_deref()
        && !tracks.iter().any(|track| track.track == focus)
    {
        log::warn!("--focus `{focus}` matches no track");
    }
    let (model, layout, scene) = render_tracks(&tracks, &config, args.focus.as_deref(), today);
    if let Some(path) = args.dump_layout.as_deref() {
        write_layout_dump(path, &model, &layout, &scene)?;
    }
    let svg = render_svg(&scene);

    let format = resolve_format(args.output_format, args.output.as_deref());
    match format {
        OutputFormat::Svg => write_output_svg(&svg, args.output.as_deref())?,
        OutputFormat::Html => {
            let html = export_html(&tracks, &config.timeline, &svg)?;
            write_output_svg(&html, args.output.as_deref())?;
        }
        OutputFormat::Png => {
            let output = ensure_output(args.output.as_deref(), "png")?;
            write_png(&svg, output, &config)?;
        }
    }
    Ok(())
}

fn init_logging(verbose: bool) -> Result<()> {
    let spec = if verbose { "debug" } else { "warn" };
    flexi_logger::Logger::try_with_env_or_str(spec)?
        .log_to_stderr()
        .start()?;
    Ok(())
}

fn apply_overrides(config: &mut Config, args: &Args) {
    if let Some(width) = args.width {
        config.render.width = width;
    }
    if let Some(height) = args.height {
        config.render.height = height;
    }
    if let Some(orientation) = args.orientation {
        config.timeline.orientation = orientation;
    }
    if args.no_today {
        config.timeline.show_today = false;
    }
    if let Some(title) = &args.title {
        config.timeline.header.title = title.clone();
    }
    if let Some(subtitle) = &args.subtitle {
        config.timeline.header.subtitle = subtitle.clone();
    }
}

fn resolve_format(explicit: Option<OutputFormat>, output: Option<&Path>) -> OutputFormat {
    if let Some(format) = explicit {
        return format;
    }
    let ext = output
        .and_then(|path| path.extension())
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase);
    match ext.as_deref() {
        Some("png") => OutputFormat::Png,
        Some("html" | "htm") => OutputFormat::Html,
        _ => OutputFormat::Svg,
    }
}

#[cfg(feature = "png")]
fn write_png(svg: &str, output: &Path, config: &Config) -> Result<()> {
    write_output_png(svg, output, &config.render, &config.theme)
}

#[cfg(not(feature = "png"))]
fn write_png(_svg: &str, _output: &Path, _config: &Config) -> Result<()> {
    Err(anyhow::anyhow!("PNG output requires the `png` feature"))
}

fn read_input(path: Option<&Path>) -> Result<String> {
    if let Some(path) = path
        && path != Path::new("-")
    {
        return std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()));
    }
    let mut buf = String::new();
    io::stdin().read_to_string(&mut buf)?;
    Ok(buf)
}

fn ensure_output<'a>(output: Option<&'a Path>, ext: &str) -> Result<&'a Path> {
    output.ok_or_else(|| anyhow::anyhow!("Output path required for {ext} output"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn format_follows_extension_unless_explicit() {
        assert_eq!(resolve_format(None, None), OutputFormat::Svg);
        assert_eq!(
            resolve_format(None, Some(Path::new("plan.PNG"))),
            OutputFormat::Png
        );
        assert_eq!(
            resolve_format(None, Some(Path::new("plan.html"))),
            OutputFormat::Html
        );
        assert_eq!(
            resolve_format(Some(OutputFormat::Svg), Some(Path::new("plan.png"))),
            OutputFormat::Svg
        );
    }

    #[test]
    fn flags_override_config() {
        let args = Args::parse_from([
            "tubetl",
            "-w",
            "640",
            "--orientation",
            "vertical",
            "--no-today",
            "--title",
            "Roadmap",
        ]);
        let mut config = Config::default();
        apply_overrides(&mut config, &args);
        assert_eq!(config.render.width, 640.0);
        assert_eq!(config.render.height, 800.0);
        assert_eq!(config.timeline.orientation, OrientationSetting::Vertical);
        assert!(!config.timeline.show_today);
        assert_eq!(config.timeline.header.title, "Roadmap");
    }

    #[test]
    fn pipeline_renders_svg() {
        let tracks = import_tracks(
            r##"[{"track": "Bakerloo", "color": "#B36305", "dates": [
                {"date": "01/01/2024", "name": "Start", "type": "start"},
                {"date": "01/03/2024", "name": "End", "type": "end"}]}]"##,
        )
        .unwrap();
        let mut config = Config::default();
        config.layout.fast_text_metrics = true;
        let today = NaiveDate::from_ymd_opt(2024, 2, 1).unwrap();
        let svg = crate::render_tracks_svg(&tracks, &config, Some("Bakerloo"), today);
        assert!(svg.contains("Bakerloo"));
        assert!(svg.contains(">Today</text>"));
    }
}
