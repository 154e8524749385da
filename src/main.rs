use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::{Parser, ValueEnum};
use litepaint::rendering::paint::save_trace;
use litepaint::{EngineKind, RenderConfig, RenderSession, Viewport};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Engine {
    /// litehtml through the linked container shim
    Native,
    /// replay JSON paint traces
    Trace,
}

impl From<Engine> for EngineKind {
    fn from(e: Engine) -> Self {
        match e {
            Engine::Native => EngineKind::Native,
            Engine::Trace => EngineKind::Trace,
        }
    }
}

/// Render documents to PNG through the litehtml paint bridge.
///
/// Each input is written next to itself as `<input>.png`.
#[derive(Debug, Parser)]
#[command(name = "litepaint", version)]
struct Args {
    /// Documents to render (HTML for `native`, JSON traces for `trace`)
    #[arg(required = true)]
    files: Vec<PathBuf>,

    #[arg(long, value_enum, default_value = "native")]
    engine: Engine,

    /// JSON configuration file; flags below override it
    #[arg(long)]
    config: Option<PathBuf>,

    /// Surface width in pixels
    #[arg(long)]
    width: Option<u32>,

    /// Surface height in pixels
    #[arg(long)]
    height: Option<u32>,

    /// Pixels per inch for point conversion
    #[arg(long)]
    ppi: Option<u32>,

    /// Crop each image to its inked area
    #[arg(long)]
    crop: bool,

    /// Also write the paint requests of each render to `<input>.trace.json`
    #[arg(long)]
    record: bool,

    /// Print the SHA-256 of each written PNG
    #[arg(long)]
    digest: bool,
}

fn load_config(args: &Args) -> anyhow::Result<RenderConfig> {
    let mut config = match &args.config {
        Some(path) => RenderConfig::from_json_file(path)?,
        None => RenderConfig::default(),
    };
    let Viewport { width, height } = config.viewport;
    config.viewport = Viewport {
        width: args.width.unwrap_or(width),
        height: args.height.unwrap_or(height),
    };
    if let Some(ppi) = args.ppi {
        config.ppi = ppi;
    }
    config.crop |= args.crop;
    config.validate()?;
    Ok(config)
}

fn run(args: Args) -> anyhow::Result<()> {
    let config = load_config(&args)?;
    let mut session = RenderSession::open(args.engine.into(), config).context("failed to open session")?;
    session.set_recording(args.record);

    for file in &args.files {
        let (out, shot) = session
            .render_file(file)
            .with_context(|| format!("failed to render {}", file.display()))?;

        if args.record {
            let mut trace_path = file.as_os_str().to_owned();
            trace_path.push(".trace.json");
            save_trace(session.trace(), &PathBuf::from(trace_path))?;
        }

        if args.digest {
            println!("{}  {}", shot.digest(), out.display());
        } else {
            println!("{}", out.display());
        }
    }

    session.close()?;
    Ok(())
}

fn main() -> ExitCode {
    env_logger::init();
    let args = Args::parse();
    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("litepaint: {:#}", e);
            ExitCode::FAILURE
        }
    }
}
