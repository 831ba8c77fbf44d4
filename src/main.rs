//! gridbench: build a benchmark sample from a raw image corpus and score
//! grid extraction results against it.
//!
//!   gridbench sample  --rules sample4benchmark.csv --input dst
//!   gridbench convert --input list.txt --output png --shape 1024,1024
//!   gridbench report  --input sample_benchmark --output benchmark.csv.gz

use std::io::{BufRead, BufReader};
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};

use gridbench::files::list_files;
use gridbench::pipeline::{convert_files, evaluate_corpus, prepare_samples, select_samples};
use gridbench::report::aggregate;
use gridbench::sample::write_manifest;
use gridbench::{PipelineConfig, SidecarStore, TargetSize};

#[derive(Debug, Parser)]
#[command(name = "gridbench", version, about = "Benchmark sampling and validation for grid extraction")]
struct Cli {
    /// Increase verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Suppress logging and progress output
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Classify the corpus, draw a balanced sample and write normalized PNGs
    Sample(SampleArgs),
    /// Normalize a list of images to PNG without ground truth
    Convert(ConvertArgs),
    /// Score extraction output attached to the samples and write the report
    Report(ReportArgs),
}

/// Options shared with the JSON config file; flags win over the file.
#[derive(Debug, Args)]
struct ConfigArgs {
    /// JSON configuration file
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Worker threads (default: one per core)
    #[arg(short = 'j', long)]
    threads: Option<usize>,
}

impl ConfigArgs {
    fn load(&self) -> Result<PipelineConfig> {
        let mut config = match &self.config {
            Some(path) => PipelineConfig::load_json(path)
                .with_context(|| format!("loading config {}", path.display()))?,
            None => PipelineConfig::default(),
        };
        if self.threads.is_some() {
            config.threads = self.threads;
        }
        Ok(config)
    }
}

#[derive(Debug, Args)]
struct SampleArgs {
    #[command(flatten)]
    base: ConfigArgs,

    /// Root directory of the raw corpus
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// Only consider files whose path matches this regex
    #[arg(long)]
    file_regex: Option<String>,

    /// Rule table (regex,type,shape)
    #[arg(short, long)]
    rules: Option<PathBuf>,

    /// Maximum samples per type
    #[arg(long)]
    cap: Option<usize>,

    #[arg(long)]
    seed: Option<u64>,

    /// Directory receiving the normalized samples
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Sample manifest (.csv or .csv.gz)
    #[arg(short, long)]
    manifest: Option<PathBuf>,

    /// Resize samples to WIDTH,HEIGHT
    #[arg(short, long, value_name = "W,H")]
    shape: Option<TargetSize>,

    /// Drop classified paths matching this regex (repeatable)
    #[arg(short, long)]
    exclude: Vec<String>,

    /// Abort when a file matches zero or several rules
    #[arg(long)]
    strict: bool,
}

impl SampleArgs {
    fn config(&self) -> Result<PipelineConfig> {
        let mut config = self.base.load()?;
        if let Some(v) = &self.input { config.input_dir = v.clone(); }
        if let Some(v) = &self.file_regex { config.file_regex = v.clone(); }
        if let Some(v) = &self.rules { config.rules = v.clone(); }
        if let Some(v) = self.cap { config.per_type_cap = v; }
        if let Some(v) = self.seed { config.seed = v; }
        if let Some(v) = &self.output { config.output_dir = v.clone(); }
        if let Some(v) = &self.manifest { config.manifest = v.clone(); }
        if self.shape.is_some() { config.target_shape = self.shape; }
        config.exclude.extend(self.exclude.iter().cloned());
        config.strict |= self.strict;
        config.check()?;
        Ok(config)
    }

    fn execute(&self, quiet: bool) -> Result<()> {
        let config = self.config()?;
        log::debug!("configuration: {:?}", config);

        let set = select_samples(&config).context("selecting samples")?;
        write_manifest(&config.manifest, set.items()).context("writing sample manifest")?;

        let items = set.shuffled(config.seed);
        let progress = Progress::new(items.len(), quiet);
        let outcome = prepare_samples(&items, &config, &SidecarStore, &|| progress.tick())?;
        progress.finish();

        log::info!(
            "{} samples written to {}, {} failed",
            outcome.written.len(),
            config.output_dir.display(),
            outcome.failed.len()
        );
        Ok(())
    }
}

#[derive(Debug, Args)]
struct ConvertArgs {
    #[command(flatten)]
    base: ConfigArgs,

    /// File listing image paths, one per line ('-' for stdin)
    #[arg(short, long, default_value = "-")]
    input: String,

    /// Output directory
    #[arg(short, long, default_value = "png")]
    output: PathBuf,

    /// Resize output to WIDTH,HEIGHT (resolution is kept otherwise)
    #[arg(short, long, value_name = "W,H")]
    shape: Option<TargetSize>,
}

impl ConvertArgs {
    fn read_list(&self) -> Result<Vec<PathBuf>> {
        let reader: Box<dyn BufRead> = if self.input == "-" {
            Box::new(BufReader::new(std::io::stdin()))
        } else {
            let file = std::fs::File::open(&self.input)
                .with_context(|| format!("opening {}", self.input))?;
            Box::new(BufReader::new(file))
        };
        let mut paths = Vec::new();
        for line in reader.lines() {
            let line = line.context("reading path list")?;
            let line = line.trim();
            if !line.is_empty() {
                paths.push(PathBuf::from(line));
            }
        }
        Ok(paths)
    }

    fn execute(&self, quiet: bool) -> Result<()> {
        let config = self.base.load()?;
        let paths = self.read_list()?;
        let shape = self.shape.or(config.target_shape);

        let progress = Progress::new(paths.len(), quiet);
        let outcome = convert_files(&paths, &self.output, shape, config.epsilon, config.threads, &|| {
            progress.tick()
        })?;
        progress.finish();

        log::info!("converted {} files, {} failed", outcome.written.len(), outcome.failed.len());
        Ok(())
    }
}

#[derive(Debug, Args)]
struct ReportArgs {
    #[command(flatten)]
    base: ConfigArgs,

    /// Directory of evaluated samples (default: the config's output_dir)
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// Only evaluate files whose path matches this regex
    #[arg(long)]
    regex: Option<String>,

    /// Report file (.csv or .csv.gz)
    #[arg(short, long)]
    output: Option<PathBuf>,
}

impl ReportArgs {
    fn execute(&self, quiet: bool) -> Result<()> {
        let config = self.base.load()?;
        let dir = self.input.clone().unwrap_or(config.output_dir.clone());
        let regex = self.regex.clone().unwrap_or(config.sample_regex.clone());
        let output = self.output.clone().unwrap_or(config.report.clone());

        let paths = list_files(&dir, &regex)?;
        let progress = Progress::new(paths.len(), quiet);
        let (metrics, failed) = evaluate_corpus(&paths, &SidecarStore, config.threads, &|| progress.tick())?;
        progress.finish();

        aggregate(&metrics)
            .write(&output)
            .with_context(|| format!("writing report {}", output.display()))?;
        if !failed.is_empty() {
            log::warn!("{} images were left out of the report", failed.len());
        }
        Ok(())
    }
}

/// Progress bar for corpus passes; silent when quiet.
struct Progress {
    bar: Option<ProgressBar>,
}

impl Progress {
    fn new(total: usize, quiet: bool) -> Progress {
        if quiet {
            return Progress { bar: None };
        }
        let bar = ProgressBar::new(total as u64);
        let style = ProgressStyle::default_bar()
            .template("[{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} images")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("##-");
        bar.set_style(style);
        bar.enable_steady_tick(Duration::from_millis(100));
        Progress { bar: Some(bar) }
    }

    fn tick(&self) {
        if let Some(bar) = &self.bar {
            bar.inc(1);
        }
    }

    fn finish(&self) {
        if let Some(bar) = &self.bar {
            bar.finish_and_clear();
        }
    }
}

fn init_logging(verbose: u8, quiet: bool) {
    if quiet {
        return;
    }
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.quiet);

    match &cli.command {
        Command::Sample(args) => args.execute(cli.quiet),
        Command::Convert(args) => args.execute(cli.quiet),
        Command::Report(args) => args.execute(cli.quiet),
    }
}
