mod args;
mod config;

use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use args::Args;
use config::CliConfig;
use timemachine_catalog::{DEFAULT_RECORD_ID, RecordStore};
use timemachine_core::{Analysis, RiskBand, Session, Weight, sweep};
use timemachine_output::{OutputConfig, OutputFormat, OutputManager, OutputSpec};
use timemachine_types::ExploitRecord;

fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize tracing based on verbosity
    let filter = match args.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .init();

    let config = match args.config {
        Some(ref path) => CliConfig::load(path)?,
        None => CliConfig::load_default()?,
    };

    let store = load_store(&args, &config)?;

    if args.list {
        for entry in store.entries() {
            println!("{:<18} {}", entry.id, entry.selector_label);
        }
        return Ok(());
    }

    let mut session = Session::new(&store);
    let id = resolve_exploit(&args, &config, &store)?;
    session
        .select(&id)
        .with_context(|| format!("cannot select exploit '{id}' (use --list to see ids)"))?;

    if let Some(percent) = args.weight {
        let weight = Weight::new(percent).context("invalid --weight")?;
        session.set_weight(weight);
    }

    let Some(analysis) = session.analysis() else {
        bail!("no exploit record selected");
    };
    info!(
        id = %id,
        weight = %analysis.weight,
        score = analysis.current_score(),
        "analysis ready"
    );

    if args.sweep {
        print!("{}", sweep_table(analysis.record));
    }

    let output_config = build_output_config(&args, &config, &analysis);
    let delivered = OutputManager::new(output_config)
        .run(&analysis)
        .context("failed to render output")?;
    for d in &delivered {
        if let Some(ref e) = d.presentation_error {
            warn!(error = %e, "output not delivered");
            eprintln!("Warning: {e}");
        }
    }

    Ok(())
}

fn load_store(args: &Args, config: &CliConfig) -> Result<RecordStore> {
    match args.data_dir.as_ref().or(config.data_dir.as_ref()) {
        Some(dir) => RecordStore::load_dir(dir)
            .with_context(|| format!("failed to load records from {}", dir.display())),
        None => RecordStore::bundled().context("failed to load bundled records"),
    }
}

/// `--exploit`, then the config default, then the bundled default, then the
/// first record of a custom catalogue.
fn resolve_exploit(args: &Args, config: &CliConfig, store: &RecordStore) -> Result<String> {
    if let Some(ref id) = args.exploit {
        return Ok(id.clone());
    }
    if let Some(ref id) = config.default_exploit {
        return Ok(id.clone());
    }
    if store.contains(DEFAULT_RECORD_ID) {
        return Ok(DEFAULT_RECORD_ID.to_string());
    }
    match store.list().next() {
        Some(id) => Ok(id.to_string()),
        None => bail!("the record catalogue is empty"),
    }
}

fn build_output_config(args: &Args, config: &CliConfig, analysis: &Analysis<'_>) -> OutputConfig {
    let mut outputs = Vec::new();
    if let Some(ref report) = args.report {
        let path = match report {
            Some(path) => path.clone(),
            None => config
                .report_dir
                .clone()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(format!("{}-risk-report.html", analysis.record.id)),
        };
        outputs.push(OutputSpec {
            format: OutputFormat::Html,
            path,
        });
    }
    if let Some(ref path) = args.json {
        outputs.push(OutputSpec {
            format: OutputFormat::Json,
            path: path.clone(),
        });
    }
    OutputConfig {
        outputs,
        show_guidance: args.guidance,
        stdout: !args.no_dashboard,
    }
}

fn sweep_table(record: &ExploitRecord) -> String {
    let mut out = format!(
        "Actuarial sweep for {} (pre-actuarial {}, base {})\n",
        record.meta.name, record.actuarial.pre_actuarial_score, record.actuarial.base
    );
    out.push_str(&format!(
        "{:>7} {:>6} {:>6} {:>8}  {}\n",
        "WEIGHT", "DELTA", "SCORE", "REFINED", "BAND"
    ));
    for (weight, adj) in sweep(&record.actuarial) {
        out.push_str(&format!(
            "{:>7} {:>6} {:>6} {:>8}  {}\n",
            weight.to_string(),
            adj.delta,
            adj.current_score,
            adj.refined_value,
            RiskBand::from_score(adj.current_score),
        ));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_args() -> Args {
        Args {
            list: false,
            exploit: None,
            weight: None,
            sweep: false,
            report: None,
            json: None,
            data_dir: None,
            config: None,
            guidance: false,
            no_dashboard: false,
            verbose: 0,
        }
    }

    #[test]
    fn exploit_flag_beats_config() {
        let store = RecordStore::bundled().unwrap();
        let mut args = make_args();
        args.exploit = Some("wormhole_2022".into());
        let config = CliConfig {
            default_exploit: Some("euler_2023".into()),
            ..CliConfig::default()
        };
        assert_eq!(resolve_exploit(&args, &config, &store).unwrap(), "wormhole_2022");
        assert_eq!(
            resolve_exploit(&make_args(), &config, &store).unwrap(),
            "euler_2023"
        );
        assert_eq!(
            resolve_exploit(&make_args(), &CliConfig::default(), &store).unwrap(),
            DEFAULT_RECORD_ID
        );
    }

    #[test]
    fn custom_catalogue_falls_back_to_first_record() {
        let store = RecordStore::from_documents(
            timemachine_catalog::bundled_documents()
                .into_iter()
                .filter(|(id, _)| *id != DEFAULT_RECORD_ID),
        )
        .unwrap();
        let first = store.list().next().unwrap().to_string();
        assert_eq!(
            resolve_exploit(&make_args(), &CliConfig::default(), &store).unwrap(),
            first
        );
    }

    #[test]
    fn bare_report_goes_to_report_dir() {
        let store = RecordStore::bundled().unwrap();
        let analysis = Analysis::new(store.get("dao_2016").unwrap(), Weight::DEFAULT);
        let mut args = make_args();
        args.report = Some(None);
        args.no_dashboard = true;
        let config = CliConfig {
            report_dir: Some(PathBuf::from("reports")),
            ..CliConfig::default()
        };

        let output = build_output_config(&args, &config, &analysis);
        assert!(!output.stdout);
        assert_eq!(output.outputs.len(), 1);
        assert_eq!(
            output.outputs[0].path,
            PathBuf::from("reports").join("dao_2016-risk-report.html")
        );
    }

    #[test]
    fn sweep_lists_every_weight() {
        let store = RecordStore::bundled().unwrap();
        let table = sweep_table(store.get("dao_2016").unwrap());
        assert_eq!(table.lines().count(), 13);
        assert!(table.contains("30%"));
        assert!(table.contains("100%"));
    }
}
