use anyhow::{Context, Result};
use clap::Parser;
use docprobe::cli::Cli;
use docprobe::config::{load_config, load_config_file, ProbeConfig};
use docprobe::io::{open_destination, JsonWriter, OutputWriter};
use docprobe::observability::init_tracing;
use docprobe::probe::{ProbeRecord, Prober};
use docprobe::reflect::{ModuleRef, SourceLoader};
use tracing::info;

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbosity);

    let config = resolve_config(&cli)?;
    let options = config.probe_options()?;
    let prober = Prober::new(SourceLoader::new(config.search_paths_or_default()), options);

    let records = probe_all(&prober, &cli.modules)?;
    info!(records = records.len(), dialect = %options.dialect, "Probing complete");

    let destination = open_destination(cli.output.as_deref())?;
    JsonWriter::new(destination).write_records(&records)
}

// Explicit --config wins over discovery; command-line flags win over both.
fn resolve_config(cli: &Cli) -> Result<ProbeConfig> {
    let base = match cli.config.as_deref() {
        Some(path) => load_config_file(path)?,
        None => load_config(),
    };
    Ok(base.merge(cli.config_overrides()))
}

// Records are concatenated in argument order; each module is ordered on its own.
fn probe_all(prober: &Prober<SourceLoader>, modules: &[String]) -> Result<Vec<ProbeRecord>> {
    let mut records = Vec::new();
    for reference in modules {
        let probed = prober
            .probe_module(ModuleRef::parse(reference))
            .with_context(|| format!("Failed to probe {reference}"))?;
        records.extend(probed);
    }
    Ok(records)
}
