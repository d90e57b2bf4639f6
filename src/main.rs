use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Result};
use clap::Parser;
use log::{LevelFilter, info};

use pmi_synth::error::util::validate_directory;
use pmi_synth::utils::logging::{create_spinner, finish_progress_bar};
use pmi_synth::{
    ColumnSelection, GeneratorConfig, IdentityGraphBuilder, MasterIndex, PmiError, ProvenanceEntry,
    ReferenceData, write_records,
};

#[derive(Parser, Debug)]
#[command(name = "pmi-synth")]
#[command(about = "Create a synthetic Patient Master Index with controlled identity links and errors")]
struct Args {
    /// Directory holding the reference Parquet tables
    #[arg(short = 'D', long, default_value = "data")]
    data_dir: PathBuf,

    /// Directory the PMI is written to
    #[arg(short = 'O', long, default_value = "output")]
    output_dir: PathBuf,

    /// Name of the PMI Parquet file to create
    #[arg(short = 'o', long, default_value = "master.parquet")]
    outfile: String,

    /// Generator configuration (JSON)
    #[arg(short = 'C', long)]
    config: Option<PathBuf>,

    /// Master PMI Parquet file; when given a secondary PMI cross-linked to it is created
    #[arg(short = 'M', long)]
    master: Option<PathBuf>,

    /// File to write provenance lines to
    #[arg(short = 'P', long)]
    provenance: Option<PathBuf>,

    /// Make random Australian addresses
    #[arg(short = 'r', long)]
    make_random: bool,

    /// PMI records can be both merged and an alias
    #[arg(short = 'b', long)]
    both: bool,

    /// Allow aliases to aliased or merged patients
    #[arg(short = 'a', long)]
    alias2alias: bool,

    /// Allow merges to aliased or merged patients
    #[arg(short = 'm', long)]
    merge2merge: bool,

    /// Add Australian IHI numbers
    #[arg(short = 'i', long = "ihi")]
    ihi: bool,

    /// Extend names with sequential letters
    #[arg(short = 'x', long)]
    extend_names: bool,

    /// Create a PMI with errors
    #[arg(short = 'e', long)]
    errors: bool,

    /// Seed for a reproducible run
    #[arg(short = 's', long)]
    seed: Option<u64>,

    /// Logging level: 0=error, 1=warn, 2=info, 3=debug, 4=trace
    #[arg(short = 'v', long, value_parser = clap::value_parser!(u8).range(0..=4))]
    verbose: Option<u8>,

    /// Hide the progress bar
    #[arg(long)]
    no_progress: bool,
}

impl Args {
    /// Configuration file settings with command-line switches applied on top
    fn generator_config(&self) -> Result<GeneratorConfig> {
        let mut config = match &self.config {
            Some(path) => GeneratorConfig::from_json_file(path)
                .with_context(|| format!("loading configuration {}", path.display()))?,
            None => GeneratorConfig::default(),
        };
        let flags = &mut config.flags;
        flags.synthetic_addresses |= self.make_random;
        flags.both |= self.both;
        flags.alias2alias |= self.alias2alias;
        flags.merge2merge |= self.merge2merge;
        flags.include_ihi |= self.ihi;
        flags.extend_names |= self.extend_names;
        flags.inject_errors |= self.errors;
        if self.seed.is_some() {
            config.random_seed = self.seed;
        }
        let config = config.normalized();
        config.validate()?;
        Ok(config)
    }
}

fn init_logging(verbose: Option<u8>) {
    let mut builder = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"));
    if let Some(level) = verbose {
        builder.filter_level(match level {
            0 => LevelFilter::Error,
            1 => LevelFilter::Warn,
            2 => LevelFilter::Info,
            3 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        });
    }
    builder.init();
}

fn write_provenance(path: &Path, entries: &[ProvenanceEntry]) -> Result<()> {
    let mut file = fs::File::create(path)
        .with_context(|| format!("creating provenance file {}", path.display()))?;
    for entry in entries {
        for line in entry.lines() {
            writeln!(file, "{line}")?;
        }
    }
    Ok(())
}

fn run(args: &Args) -> Result<()> {
    let start = Instant::now();
    let config = args.generator_config()?;
    info!("{config}");

    validate_directory(&args.data_dir, "reference data")?;
    let spinner = (!args.no_progress).then(|| create_spinner(Some("Loading reference data")));
    let reference = ReferenceData::load_dir(&args.data_dir)
        .with_context(|| format!("loading reference data from {}", args.data_dir.display()))?;
    if let Some(spinner) = &spinner {
        finish_progress_bar(spinner, Some("Reference data loaded"));
    }

    let master = args
        .master
        .as_deref()
        .map(|path| MasterIndex::load(path, config.flags.include_ihi))
        .transpose()?;
    let selection = ColumnSelection::from_config(&config, master.is_some())?;

    let mut builder = IdentityGraphBuilder::from_config(&config, &reference).with_progress(!args.no_progress);
    if let Some(master) = &master {
        builder = builder.with_secondary(master);
    }
    let mut checker = selection.checker(config.max_field_length);
    let output = builder.run_into(&mut checker)?;

    fs::create_dir_all(&args.output_dir)
        .with_context(|| format!("creating output directory {}", args.output_dir.display()))?;
    let path = args.output_dir.join(&args.outfile);
    write_records(&path, &output.records, &selection, config.max_field_length)?;
    if let Some(provenance) = &args.provenance {
        write_provenance(provenance, &output.provenance)?;
    }

    println!(
        "{}",
        output
            .counters
            .summary(config.errors_enabled(), config.flags.both)
    );
    info!("Finished in {:?}", start.elapsed());
    Ok(())
}

fn main() {
    let args = Args::parse();
    init_logging(args.verbose);

    if let Err(err) = run(&args) {
        log::error!("{err:#}");
        let code = err.downcast_ref::<PmiError>().map_or(1, PmiError::exit_code);
        std::process::exit(code);
    }
}
