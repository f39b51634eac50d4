//! Command-line arguments.

use crate::config::Config;
use crate::geo::GeoPoint;
use clap::{ArgAction, Parser};
use std::path::PathBuf;

/// Join a site location workbook with the current alert workbook, rank the
/// alerted sites by distance and export map-ready data.
#[derive(Debug, Clone, Parser)]
#[command(name = "field_map", version)]
pub struct Args {
    /// Site location workbook (.xlsx, .xls, .ods)
    #[arg(short = 'l', long = "locations", value_name = "PATH")]
    pub locations: PathBuf,

    /// Alert workbook
    #[arg(short = 'a', long = "alerts", value_name = "PATH")]
    pub alerts: PathBuf,

    /// Reference latitude in decimal degrees
    #[arg(long, allow_negative_numbers = true, requires = "lon")]
    pub lat: Option<f64>,

    /// Reference longitude in decimal degrees
    #[arg(long, allow_negative_numbers = true, requires = "lat")]
    pub lon: Option<f64>,

    /// TOML configuration file
    #[arg(short = 'c', long = "config", value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Alert sheet name to look for before falling back to the first sheet
    #[arg(long = "sheet", value_name = "NAME")]
    pub sheet: Option<String>,

    /// Ask the renderer to cluster nearby markers
    #[arg(long)]
    pub cluster: bool,

    /// Keep only these issues (repeatable)
    #[arg(long = "issue", value_name = "ISSUE")]
    pub issues: Vec<String>,

    /// Keep only sites of this chain (Lant) code
    #[arg(long = "chain", value_name = "CODE")]
    pub chain: Option<String>,

    /// Route stops, in order (repeatable)
    #[arg(long = "route", value_name = "SITE")]
    pub route: Vec<String>,

    /// Directory for exported files
    #[arg(short = 'o', long = "output-dir", value_name = "PATH")]
    pub output_dir: Option<PathBuf>,

    /// Prepare, filter and export without the interactive menu
    #[arg(long)]
    pub export: bool,

    /// More log output (-v, -vv, -vvv)
    #[arg(short = 'v', long = "verbose", action = ArgAction::Count)]
    pub verbose: u8,

    /// Only log errors
    #[arg(short = 'q', long = "quiet")]
    pub quiet: bool,
}

impl Args {
    /// Fold command-line overrides into a configuration loaded from file.
    pub fn apply_to(&self, mut config: Config) -> Config {
        if let (Some(lat), Some(lon)) = (self.lat, self.lon) {
            config.reference = Some(GeoPoint::new(lat, lon));
        }
        if let Some(sheet) = &self.sheet {
            config.alert_sheet = sheet.clone();
        }
        if self.cluster {
            config.cluster = true;
        }
        if !self.issues.is_empty() {
            config.filters.issues = Some(self.issues.clone());
        }
        if let Some(chain) = &self.chain {
            config.filters.chain_code = Some(chain.clone());
        }
        if let Some(dir) = &self.output_dir {
            config.output_dir = dir.clone();
        }
        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn verify_cli() {
        Args::command().debug_assert();
    }

    #[test]
    fn parses_negative_longitude_and_overrides_config() {
        let args = Args::try_parse_from([
            "field_map",
            "-l",
            "loc.xlsx",
            "-a",
            "alerts.xlsx",
            "--lat",
            "38.7223",
            "--lon",
            "-9.1393",
            "--issue",
            "DOWN",
            "--issue",
            "INFRA",
            "--chain",
            "482",
            "-vv",
        ])
        .unwrap();
        assert_eq!(args.verbose, 2);

        let config = args.apply_to(Config::default());
        assert_eq!(config.reference, Some(GeoPoint::new(38.7223, -9.1393)));
        assert_eq!(
            config.filters.issues,
            Some(vec!["DOWN".to_string(), "INFRA".to_string()])
        );
        assert_eq!(config.filters.chain_code.as_deref(), Some("482"));
    }

    #[test]
    fn lat_requires_lon() {
        let res = Args::try_parse_from(["field_map", "-l", "a", "-a", "b", "--lat", "1.0"]);
        assert!(res.is_err());
    }
}
