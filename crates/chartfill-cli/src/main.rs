use chartfill::page::{self, HydrateOptions, PageError, ScanMode};
use chartfill::render::raster::{self, RasterError, RasterOptions};
use chartfill::render::{DEFAULT_SIZE, RenderOptions, render_chart_svg};
use chartfill::{ChartDescriptor, ChartPayload, normalize};
use futures::executor::block_on;
use serde::Serialize;
use serde_json::Value;
use std::io::Read;
use std::str::FromStr;

#[derive(Debug)]
enum CliError {
    Usage(&'static str),
    Io(std::io::Error),
    Page(PageError),
    Chart(chartfill::Error),
    Json(serde_json::Error),
    Raster(RasterError),
    NoCharts,
}

impl std::fmt::Display for CliError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CliError::Usage(msg) => write!(f, "{msg}"),
            CliError::Io(err) => write!(f, "I/O error: {err}"),
            CliError::Page(err) => write!(f, "{err}"),
            CliError::Chart(err) => write!(f, "{err}"),
            CliError::Json(err) => write!(f, "JSON error: {err}"),
            CliError::Raster(err) => write!(f, "{err}"),
            CliError::NoCharts => write!(f, "no charts found in input"),
        }
    }
}

impl From<std::io::Error> for CliError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<PageError> for CliError {
    fn from(value: PageError) -> Self {
        Self::Page(value)
    }
}

impl From<chartfill::Error> for CliError {
    fn from(value: chartfill::Error) -> Self {
        Self::Chart(value)
    }
}

impl From<serde_json::Error> for CliError {
    fn from(value: serde_json::Error) -> Self {
        Self::Json(value)
    }
}

impl From<RasterError> for CliError {
    fn from(value: RasterError) -> Self {
        Self::Raster(value)
    }
}

#[derive(Debug, Clone, Copy, Default)]
enum Command {
    #[default]
    Normalize,
    Scan,
    Render,
    Hydrate,
}

#[derive(Debug, Clone, Copy, Default)]
enum RenderFormat {
    #[default]
    Svg,
    Png,
    Jpeg,
    Pdf,
}

impl FromStr for RenderFormat {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "svg" => Ok(Self::Svg),
            "png" => Ok(Self::Png),
            "jpg" | "jpeg" => Ok(Self::Jpeg),
            "pdf" => Ok(Self::Pdf),
            _ => Err(()),
        }
    }
}

#[derive(Debug, Default)]
struct Args {
    command: Command,
    input: Option<String>,
    pretty: bool,
    mode: ScanMode,
    render_format: RenderFormat,
    render_scale: f32,
    background: Option<String>,
    width: f64,
    height: f64,
    chart_id: Option<String>,
    out: Option<String>,
}

fn usage() -> &'static str {
    "chartfill-cli\n\
\n\
USAGE:\n\
  chartfill-cli [normalize] [--pretty] [<path>|-]\n\
  chartfill-cli scan [--mode auto|placeholders|grouped] [--pretty] [<path>|-]\n\
  chartfill-cli render [--format svg|png|jpg|pdf] [--width <n>] [--height <n>] [--id <chart-id>] [--scale <n>] [--background <css-color>] [--out <path>|-] [<path>|-]\n\
  chartfill-cli hydrate [--mode auto|placeholders|grouped] [--width <n>] [--height <n>] [--out <path>] [<path>|-]\n\
\n\
NOTES:\n\
  - If <path> is omitted or '-', input is read from stdin.\n\
  - normalize accepts one chart or a {\"charts\": [...]} payload and prints the full config(s).\n\
  - render draws one chart (the first of a payload); SVG prints to stdout by default.\n\
  - png/jpg/pdf always need --out; pass '--out -' to write the bytes to stdout.\n\
"
}

const OUT_REQUIRED: &str = "png/jpg/pdf output requires --out <path>; use '--out -' for stdout";

fn parse_args(argv: &[String]) -> Result<Args, CliError> {
    let mut args = Args {
        command: Command::Normalize,
        render_format: RenderFormat::Svg,
        render_scale: 1.0,
        width: DEFAULT_SIZE,
        height: DEFAULT_SIZE,
        ..Default::default()
    };

    let mut it = argv.iter().skip(1);
    while let Some(a) = it.next() {
        match a.as_str() {
            "--help" | "-h" => return Err(CliError::Usage(usage())),
            "normalize" => args.command = Command::Normalize,
            "scan" => args.command = Command::Scan,
            "render" => args.command = Command::Render,
            "hydrate" => args.command = Command::Hydrate,
            "--pretty" => args.pretty = true,
            "--mode" => {
                let Some(mode) = it.next() else {
                    return Err(CliError::Usage(usage()));
                };
                args.mode = match mode.as_str() {
                    "auto" => ScanMode::Auto,
                    "placeholders" => ScanMode::Placeholders,
                    "grouped" => ScanMode::Grouped,
                    _ => return Err(CliError::Usage(usage())),
                };
            }
            "--format" => {
                let Some(fmt) = it.next() else {
                    return Err(CliError::Usage(usage()));
                };
                args.render_format = fmt
                    .parse::<RenderFormat>()
                    .map_err(|_| CliError::Usage(usage()))?;
            }
            "--scale" => {
                let Some(scale) = it.next() else {
                    return Err(CliError::Usage(usage()));
                };
                args.render_scale = scale.parse::<f32>().map_err(|_| CliError::Usage(usage()))?;
                if !(args.render_scale.is_finite() && args.render_scale > 0.0) {
                    return Err(CliError::Usage(usage()));
                }
            }
            "--background" => {
                let Some(bg) = it.next() else {
                    return Err(CliError::Usage(usage()));
                };
                if !bg.trim().is_empty() {
                    args.background = Some(bg.trim().to_string());
                }
            }
            "--width" => {
                let Some(w) = it.next() else {
                    return Err(CliError::Usage(usage()));
                };
                args.width = w.parse::<f64>().map_err(|_| CliError::Usage(usage()))?;
            }
            "--height" => {
                let Some(h) = it.next() else {
                    return Err(CliError::Usage(usage()));
                };
                args.height = h.parse::<f64>().map_err(|_| CliError::Usage(usage()))?;
            }
            "--id" => {
                let Some(id) = it.next() else {
                    return Err(CliError::Usage(usage()));
                };
                args.chart_id = Some(id.clone());
            }
            "--out" | "-o" => {
                let Some(out) = it.next() else {
                    return Err(CliError::Usage(usage()));
                };
                args.out = Some(out.clone());
            }
            "--" => {
                if let Some(rest) = it.next() {
                    if args.input.is_some() {
                        return Err(CliError::Usage(usage()));
                    }
                    args.input = Some(rest.clone());
                }
                if it.next().is_some() {
                    return Err(CliError::Usage(usage()));
                }
            }
            other if other.starts_with('-') => return Err(CliError::Usage(usage())),
            path => {
                if args.input.is_some() {
                    return Err(CliError::Usage(usage()));
                }
                args.input = Some(path.to_string());
            }
        }
    }

    Ok(args)
}

fn read_input(input: Option<&str>) -> Result<String, CliError> {
    match input {
        None | Some("-") => {
            let mut buf = String::new();
            std::io::stdin().read_to_string(&mut buf)?;
            Ok(buf)
        }
        Some(path) => Ok(std::fs::read_to_string(path)?),
    }
}

fn write_json(value: &impl Serialize, pretty: bool) -> Result<(), CliError> {
    if pretty {
        serde_json::to_writer_pretty(std::io::stdout().lock(), value)?;
    } else {
        serde_json::to_writer(std::io::stdout().lock(), value)?;
    }
    Ok(())
}

fn write_text(text: &str, out: Option<&str>) -> Result<(), CliError> {
    match out {
        None => {
            print!("{text}");
            Ok(())
        }
        Some(path) => {
            std::fs::write(path, text)?;
            Ok(())
        }
    }
}

fn write_bytes(bytes: &[u8], out: &str) -> Result<(), CliError> {
    if out == "-" {
        use std::io::Write;
        std::io::stdout().lock().write_all(bytes)?;
    } else {
        std::fs::write(out, bytes)?;
    }
    Ok(())
}

fn binary_out(out: Option<&str>) -> Result<&str, CliError> {
    out.ok_or(CliError::Usage(OUT_REQUIRED))
}

fn render_options(args: &Args) -> RenderOptions {
    let options = RenderOptions::default().with_size(args.width, args.height);
    match args.chart_id.as_deref() {
        Some(id) => options.with_chart_id(id),
        None => options,
    }
}

fn raster_options(args: &Args) -> RasterOptions {
    let mut options = RasterOptions::default().with_scale(args.render_scale);
    if let Some(bg) = &args.background {
        options = options.with_background(bg.clone());
    }
    options
}

/// One chart on its own, or the first chart of a `{"charts": [...]}` payload.
fn single_chart(text: &str) -> Result<ChartDescriptor, CliError> {
    let value: Value = serde_json::from_str(text)?;
    if value.get("charts").is_some() {
        let payload: ChartPayload = serde_json::from_value(value)?;
        payload.charts.into_iter().next().ok_or(CliError::NoCharts)
    } else {
        Ok(serde_json::from_value(value)?)
    }
}

fn run(args: Args) -> Result<(), CliError> {
    let text = read_input(args.input.as_deref())?;

    match args.command {
        Command::Normalize => {
            let value: Value = serde_json::from_str(&text)?;
            if value.get("charts").is_some() {
                let payload: ChartPayload = serde_json::from_value(value)?;
                let mut configs = Vec::with_capacity(payload.charts.len());
                for mut chart in payload.charts {
                    normalize(&mut chart);
                    configs.push(chart.config_value()?);
                }
                write_json(&configs, args.pretty)?;
            } else {
                let mut chart: ChartDescriptor = serde_json::from_value(value)?;
                normalize(&mut chart);
                write_json(&chart.config_value()?, args.pretty)?;
            }
            Ok(())
        }
        Command::Scan => {
            let found = block_on(page::scan(&text, args.mode))?;
            let payload = ChartPayload {
                charts: found.charts,
            };
            write_json(&payload, args.pretty)?;
            Ok(())
        }
        Command::Render => {
            let mut chart = single_chart(&text)?;
            normalize(&mut chart);
            let svg = render_chart_svg(&chart, &render_options(&args));

            match args.render_format {
                RenderFormat::Svg => {
                    write_text(&svg, args.out.as_deref())?;
                }
                RenderFormat::Png => {
                    let out = binary_out(args.out.as_deref())?;
                    let bytes = raster::svg_to_png(&svg, &raster_options(&args))?;
                    write_bytes(&bytes, out)?;
                }
                RenderFormat::Jpeg => {
                    let out = binary_out(args.out.as_deref())?;
                    let bytes = raster::svg_to_jpeg(&svg, &raster_options(&args))?;
                    write_bytes(&bytes, out)?;
                }
                RenderFormat::Pdf => {
                    let out = binary_out(args.out.as_deref())?;
                    let bytes = raster::svg_to_pdf(&svg)?;
                    write_bytes(&bytes, out)?;
                }
            }
            Ok(())
        }
        Command::Hydrate => {
            let options = HydrateOptions {
                mode: args.mode,
                render: render_options(&args),
            };
            let hydrated = block_on(page::hydrate(&text, &options))?;
            write_text(&hydrated, args.out.as_deref())?;
            Ok(())
        }
    }
}

fn main() {
    let args = match parse_args(&std::env::args().collect::<Vec<_>>()) {
        Ok(v) => v,
        Err(CliError::Usage(msg)) => {
            eprintln!("{msg}");
            std::process::exit(2);
        }
        Err(err) => {
            eprintln!("error: {err}");
            std::process::exit(1);
        }
    };

    match run(args) {
        Ok(()) => {}
        Err(CliError::Usage(msg)) => {
            eprintln!("{msg}");
            std::process::exit(2);
        }
        Err(CliError::NoCharts) => {
            eprintln!("error: {}", CliError::NoCharts);
            std::process::exit(3);
        }
        Err(err) => {
            eprintln!("error: {err}");
            std::process::exit(1);
        }
    }
}
