mod dedup;
mod detect;
mod error;
mod loader;
mod normalize;
mod pipeline;
mod procedure;
mod render;
mod settings;
mod validate;

use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::warn;

use detect::Variant;
use loader::{DocumentSource, Scan};
use procedure::ProcedureStore;

#[derive(Parser)]
#[command(name = "docproc", about = "Extract step-by-step procedures from archived HTML help pages")]
struct Cli {
    /// Worker threads for detection (default: one per core)
    #[arg(long, global = true)]
    threads: Option<usize>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Detect procedures in HTML snapshots and write them as JSON
    Extract {
        /// Directory of HTML snapshots
        #[arg(short, long, default_value = "raw/html")]
        input: PathBuf,
        /// Procedures JSON to write
        #[arg(short, long, default_value = "extract/procedures.json")]
        output: PathBuf,
        /// Markup convention of the pages
        #[arg(long, value_enum, default_value_t = Variant::Generic)]
        variant: Variant,
        /// Accepted extensions, comma separated (default: html, plus htm for vendor)
        #[arg(long, value_delimiter = ',')]
        ext: Vec<String>,
    },
    /// Render procedures JSON to Markdown with front-matter
    Render {
        #[arg(short, long, default_value = "extract/procedures.json")]
        input: PathBuf,
        #[arg(short, long, default_value = "output/markdown")]
        output: PathBuf,
        /// Metadata file (product, module, version, persona)
        #[arg(short, long, default_value = settings::DEFAULT_CONFIG_PATH)]
        config: PathBuf,
    },
    /// Check rendered Markdown before ingestion
    Validate {
        #[arg(short, long, default_value = "output/markdown")]
        dir: PathBuf,
    },
    /// Extract + render + validate in one go
    Run {
        #[arg(long, default_value = "raw/html")]
        html: PathBuf,
        #[arg(long, default_value = "extract/procedures.json")]
        json: PathBuf,
        #[arg(long, default_value = "output/markdown")]
        markdown: PathBuf,
        #[arg(short, long, default_value = settings::DEFAULT_CONFIG_PATH)]
        config: PathBuf,
        #[arg(long, value_enum, default_value_t = Variant::Generic)]
        variant: Variant,
        #[arg(long, value_delimiter = ',')]
        ext: Vec<String>,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let t0 = Instant::now();
    let cli = Cli::parse();

    if let Some(n) = cli.threads {
        rayon::ThreadPoolBuilder::new().num_threads(n).build_global()?;
    }

    let result = match cli.command {
        Commands::Extract {
            input,
            output,
            variant,
            ext,
        } => extract(&input, &output, variant, &ext).map(|_| ()),
        Commands::Render {
            input,
            output,
            config,
        } => {
            let store = ProcedureStore::read_json(&input)?;
            render(&store, &config, &output).map(|_| ())
        }
        Commands::Validate { dir } => validate(&dir),
        Commands::Run {
            html,
            json,
            markdown,
            config,
            variant,
            ext,
        } => {
            let Some(store) = extract(&html, &json, variant, &ext)? else {
                return Ok(());
            };
            if render(&store, &config, &markdown)? == 0 {
                return Ok(());
            }
            validate(&markdown)
        }
    };

    let elapsed = t0.elapsed();
    if elapsed.as_secs() >= 1 {
        println!("\nDone in {}", format_duration(elapsed));
    }

    result
}

/// `None` when there was nothing to process; that is not an error.
fn extract(input: &Path, output: &Path, variant: Variant, ext: &[String]) -> Result<Option<ProcedureStore>> {
    let extensions: Vec<String> = if ext.is_empty() {
        variant
            .default_extensions()
            .iter()
            .map(|e| e.to_string())
            .collect()
    } else {
        ext.iter().map(|e| e.trim_start_matches('.').to_string()).collect()
    };

    let source = match DocumentSource::scan(input, &extensions)? {
        Scan::Missing => {
            warn!(dir = %input.display(), "input directory not found");
            println!("No {} directory found. Run the snapshot step first.", input.display());
            return Ok(None);
        }
        Scan::Empty => {
            warn!(dir = %input.display(), "no matching files");
            println!("No {} files found in {}", extensions.join("/"), input.display());
            return Ok(None);
        }
        Scan::Ready(source) => source,
    };

    println!("Processing {} HTML files ({:?} markup)...", source.len(), variant);
    let report = pipeline::extract_corpus(&source, variant)?;
    report.print();

    report.store.write_json(output)?;
    println!("Extracted {} procedures to {}", report.store.len(), output.display());
    Ok(Some(report.store))
}

fn render(store: &ProcedureStore, config: &Path, output: &Path) -> Result<usize> {
    if store.is_empty() {
        println!("No procedures to render.");
        return Ok(0);
    }
    let meta = settings::load_metadata(config)?;
    let written = render::write_all(store, &meta, output)?;
    println!("Generated {} markdown files in {}", written.len(), output.display());
    Ok(written.len())
}

fn validate(dir: &Path) -> Result<()> {
    let summary = validate::validate_dir(dir)?;
    println!("Validated {} markdown files", summary.files.len());
    summary.print();
    if !summary.passed() {
        anyhow::bail!("validation failed with {} error(s)", summary.error_count());
    }
    Ok(())
}

fn format_duration(d: std::time::Duration) -> String {
    let secs = d.as_secs();
    if secs < 60 {
        format!("{:.1}s", d.as_secs_f64())
    } else if secs < 3600 {
        format!("{}m {}s", secs / 60, secs % 60)
    } else {
        format!("{}h {}m {}s", secs / 3600, (secs % 3600) / 60, secs % 60)
    }
}
