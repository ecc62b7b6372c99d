use std::path::PathBuf;

use clap::Parser;

/// timemachine — replay pre-exploit risk analyses of historic DeFi incidents
#[derive(Parser, Debug)]
#[command(
    name = "timemachine",
    version,
    about = "Pre-exploit risk analysis viewer with actuarial refinement"
)]
pub struct Args {
    /// List the catalogue and exit
    #[arg(short = 'l', long = "list")]
    pub list: bool,

    /// Exploit record to analyse (default: config `default_exploit`, then the bundled default)
    #[arg(short = 'e', long = "exploit", value_name = "ID")]
    pub exploit: Option<String>,

    /// Actuarial weight in percent, multiple of 10 (default 30)
    #[arg(short = 'w', long = "weight", value_name = "0-100")]
    pub weight: Option<u32>,

    /// Print the score at every actuarial weight
    #[arg(long = "sweep")]
    pub sweep: bool,

    /// Write the printable HTML report (default path: <report_dir>/<id>-risk-report.html)
    #[arg(long = "report", value_name = "PATH", num_args = 0..=1)]
    pub report: Option<Option<PathBuf>>,

    /// Write a JSON analysis snapshot
    #[arg(long = "json", value_name = "PATH")]
    pub json: Option<PathBuf>,

    /// Load records from a directory of JSON documents instead of the bundled set
    #[arg(long = "data-dir", value_name = "DIR")]
    pub data_dir: Option<PathBuf>,

    /// Config file (default: ~/.timemachine/config.toml)
    #[arg(long = "config", value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Show investor/developer guidance under each finding
    #[arg(short = 'g', long = "guidance")]
    pub guidance: bool,

    /// Do not print the dashboard
    #[arg(long = "no-dashboard")]
    pub no_dashboard: bool,

    /// Increase verbosity level (use -v or -vv)
    #[arg(short = 'v', long = "verbose", action = clap::ArgAction::Count)]
    pub verbose: u8,
}
