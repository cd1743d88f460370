use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use env_logger::Env;
use hra_lib::{
    io::csv::{parse_series, read_series},
    pipeline::{analyze_dataset, AnalysisConfig, AnalysisReport},
    plot::{figure_from_report, Figure, Series},
    signal::SeriesDataset,
};
use log::{debug, info};
use plotters::prelude::*;
use std::{
    fs,
    io::{self, Read},
    path::{Path, PathBuf},
};

#[derive(Parser)]
#[command(
    name = "hra",
    version,
    about = "Heart rate analyzer: statistics, trend and spectral BPM from CSV recordings"
)]
struct Cli {
    /// Logging verbosity (e.g., debug, info, warn); RUST_LOG takes precedence
    #[arg(long, default_value = "warn", global = true)]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct InputArgs {
    /// CSV file with a heart-rate column (reads stdin when omitted)
    #[arg(long)]
    input: Option<PathBuf>,
    /// Sampling rate in Hz for the frequency estimate (overrides --config)
    #[arg(long)]
    fs: Option<f64>,
    /// TOML file with analysis settings
    #[arg(long)]
    config: Option<PathBuf>,
}

#[derive(Copy, Clone, Debug, ValueEnum)]
enum OutputFormat {
    #[value(name = "json")]
    Json,
    #[value(name = "text")]
    Text,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze a heart-rate CSV and print the full report
    Analyze {
        #[command(flatten)]
        input: InputArgs,
        #[arg(long, default_value = "json")]
        format: OutputFormat,
        /// Pretty-print JSON output
        #[arg(long)]
        pretty: bool,
    },
    /// Print only the interpretation, one finding per line
    Interpret {
        #[command(flatten)]
        input: InputArgs,
    },
    /// Render raw and smoothed heart rate to a PNG via plotters
    Plot {
        #[command(flatten)]
        input: InputArgs,
        #[arg(long)]
        out: PathBuf,
        #[arg(long, default_value_t = 1024)]
        max_points: usize,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    env_logger::Builder::from_env(Env::default().default_filter_or(&cli.log_level)).init();

    match cli.command {
        Commands::Analyze {
            input,
            format,
            pretty,
        } => cmd_analyze(&input, format, pretty)?,
        Commands::Interpret { input } => cmd_interpret(&input)?,
        Commands::Plot {
            input,
            out,
            max_points,
        } => cmd_plot(&input, &out, max_points)?,
    }
    Ok(())
}

fn load_config(args: &InputArgs) -> Result<AnalysisConfig> {
    let mut cfg = match &args.config {
        Some(path) => {
            let text = fs::read_to_string(path)
                .with_context(|| format!("failed to read {}", path.display()))?;
            toml::from_str::<AnalysisConfig>(&text)
                .with_context(|| format!("invalid config {}", path.display()))?
        }
        None => AnalysisConfig::default(),
    };
    if args.fs.is_some() {
        cfg.sampling_rate_hz = args.fs;
    }
    if let Some(fs) = cfg.sampling_rate_hz {
        if !fs.is_finite() || fs <= 0.0 {
            bail!("sampling rate must be a positive number of Hz, got {}", fs);
        }
    }
    debug!("analysis config: {:?}", cfg);
    Ok(cfg)
}

fn load_dataset(input: Option<&Path>) -> Result<SeriesDataset> {
    let ds = match input {
        Some(path) => read_series(path)?,
        None => {
            let mut buf = String::new();
            io::stdin().read_to_string(&mut buf)?;
            parse_series(&buf)?
        }
    };
    Ok(ds)
}

fn run_analysis(args: &InputArgs) -> Result<AnalysisReport> {
    let cfg = load_config(args)?;
    let ds = load_dataset(args.input.as_deref())?;
    Ok(analyze_dataset(&ds, &cfg))
}

fn cmd_analyze(args: &InputArgs, format: OutputFormat, pretty: bool) -> Result<()> {
    let report = run_analysis(args)?;
    match format {
        OutputFormat::Json if pretty => println!("{}", serde_json::to_string_pretty(&report)?),
        OutputFormat::Json => println!("{}", serde_json::to_string(&report)?),
        OutputFormat::Text => print!("{}", render_text(&report)),
    }
    Ok(())
}

fn cmd_interpret(args: &InputArgs) -> Result<()> {
    let report = run_analysis(args)?;
    for finding in &report.interpretation {
        println!("{}", finding);
    }
    Ok(())
}

fn cmd_plot(args: &InputArgs, out: &Path, max_points: usize) -> Result<()> {
    if max_points < 2 {
        bail!("--max-points must be at least 2");
    }
    let report = run_analysis(args)?;
    let fig = figure_from_report(&report, max_points);
    draw_plotters_figure(out, &fig)?;
    info!("wrote {}", out.display());
    Ok(())
}

fn render_text(report: &AnalysisReport) -> String {
    let d = &report.display;
    let mut text = String::new();
    text.push_str(&format!(
        "Samples:      {} ({} Hz)\n",
        report.sample_count, report.sampling_rate_hz
    ));
    text.push_str(&format!("Average HR:   {} bpm\n", d.mean));
    text.push_str(&format!(
        "Range:        {} bpm ({} - {} bpm)\n",
        d.range, d.min, d.max
    ));
    text.push_str(&format!("Std dev:      {} bpm\n", d.std_dev));
    text.push_str(&format!("HRV (RMSSD):  {}\n", d.rmssd));
    text.push_str(&format!("Trend:        {}\n", report.trend));
    text.push_str(&format!("Anomalies:    {}\n", report.summary.anomaly_count));
    text.push_str(&format!(
        "FFT estimate: {}\n",
        d.fft_bpm
            .as_ref()
            .map(|bpm| format!("{} bpm", bpm))
            .unwrap_or_else(|| "n/a".into())
    ));
    text.push_str("\nFindings:\n");
    for finding in &report.interpretation {
        text.push_str(&format!("- {}\n", finding));
    }
    text
}

fn draw_plotters_figure(path: &Path, fig: &Figure) -> Result<()> {
    let Some((x_min, x_max, y_min, y_max)) = fig.bounds() else {
        bail!("nothing to plot");
    };
    let (x_min, x_max) = padded(x_min, x_max);
    let (y_min, y_max) = padded(y_min, y_max);

    let backend = BitMapBackend::new(path, (800, 480));
    let root = backend.into_drawing_area();
    root.fill(&WHITE)?;
    let mut chart = ChartBuilder::on(&root)
        .margin(10)
        .caption(
            fig.title.clone().unwrap_or_else(|| "Plot".into()),
            ("sans-serif", 24),
        )
        .x_label_area_size(30)
        .y_label_area_size(40)
        .build_cartesian_2d(x_min..x_max, y_min..y_max)?;
    let mut mesh = chart.configure_mesh();
    if let Some(label) = &fig.x.label {
        mesh.x_desc(label.as_str());
    }
    if let Some(label) = &fig.y.label {
        mesh.y_desc(label.as_str());
    }
    mesh.draw()?;
    for series in &fig.series {
        match series {
            Series::Line(line) => {
                let (r, g, b) = line.style.color.rgb();
                let color = RGBColor(r, g, b);
                chart
                    .draw_series(LineSeries::new(
                        line.points.iter().map(|p| (p[0], p[1])),
                        color.stroke_width(line.style.width.round().max(1.0) as u32),
                    ))?
                    .label(line.name.clone())
                    .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], color));
            }
        }
    }
    chart
        .configure_series_labels()
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .draw()?;
    root.present()?;
    Ok(())
}

/// Widen a degenerate axis so plotters gets a non-empty range.
fn padded(min: f64, max: f64) -> (f64, f64) {
    if (max - min).abs() < f64::EPSILON {
        (min - 1.0, max + 1.0)
    } else {
        (min, max)
    }
}
