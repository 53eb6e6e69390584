//! Shared CLI definitions for tourism-dash.
//!
//! Used by the main application and by the build script (manpage) and
//! gen_docs binary (command-line-options markdown).

use clap::{CommandFactory, Parser, ValueEnum};
use std::path::PathBuf;

/// Facility metric column to plot on a scatter axis or bubble size
#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq)]
pub enum MetricArg {
    /// Total number of hotels
    Hotels,
    /// Total number of cafes
    Cafes,
    /// Total number of restaurants
    Restaurants,
    /// Total number of guest houses
    GuestHouses,
}

/// Facility to include in the pie chart
#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq)]
pub enum FacilityArg {
    Restaurants,
    Hotels,
    Cafes,
    GuestHouses,
}

/// Image format for exported charts
#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq, Default)]
pub enum ExportFormatArg {
    /// Portable Network Graphics bitmap
    #[default]
    Png,
    /// Scalable Vector Graphics
    Svg,
}

/// Command-line arguments for tourism-dash
#[derive(Clone, Parser, Debug)]
#[command(
    name = "tourism-dash",
    version,
    about = "Lebanon Tourism Dashboard in the Terminal",
    long_about = "Interactive terminal dashboard over a table of tourism facility counts per town.\n\
                  Shows the top towns by hotels, the distribution of towns having each facility, \
                  and a bubble plot correlating facility counts."
)]
pub struct Args {
    /// Path to the tourism CSV file (default: data.path from config, else Tourism.csv)
    #[arg(value_name = "PATH")]
    pub path: Option<PathBuf>,

    /// Banner image shown above the title (default: data.banner from config, else pic.jpeg)
    #[arg(long = "banner", value_name = "FILE")]
    pub banner: Option<PathBuf>,

    /// Field delimiter as an ASCII code, e.g. 59 for ';' or 9 for tab (default: comma)
    #[arg(long = "delimiter", value_name = "ASCII_CODE")]
    pub delimiter: Option<u8>,

    /// Initial number of top towns in the bar chart (5-30)
    #[arg(long = "top-n", value_name = "N", value_parser = clap::value_parser!(u8).range(5..=30))]
    pub top_n: Option<u8>,

    /// Facility to include in the pie chart. Use once per facility; default is all four
    #[arg(long = "facility", value_enum, value_name = "FACILITY")]
    pub facilities: Vec<FacilityArg>,

    /// Initial x-axis metric of the correlation plot
    #[arg(long = "x-metric", value_enum)]
    pub x_metric: Option<MetricArg>,

    /// Initial y-axis metric of the correlation plot
    #[arg(long = "y-metric", value_enum)]
    pub y_metric: Option<MetricArg>,

    /// Initial bubble size metric of the correlation plot
    #[arg(long = "size-metric", value_enum)]
    pub size_metric: Option<MetricArg>,

    /// Render the three charts into this directory and exit without starting the dashboard
    #[arg(long = "export", value_name = "DIR")]
    pub export: Option<PathBuf>,

    /// Image format used by --export
    #[arg(long = "export-format", value_enum, default_value_t = ExportFormatArg::Png)]
    pub export_format: ExportFormatArg,

    /// Enable debug mode to show operational information
    #[arg(long = "debug", action)]
    pub debug: bool,

    /// Write logs to this file (default: logging.file from config, else the cache directory)
    #[arg(long = "log-file", value_name = "FILE")]
    pub log_file: Option<PathBuf>,

    /// Generate default configuration file at ~/.config/tourism-dash/config.toml
    #[arg(long = "generate-config", action)]
    pub generate_config: bool,

    /// Force overwrite existing config file when using --generate-config
    #[arg(long = "force", requires = "generate_config", action)]
    pub force: bool,
}

/// Escape `|` and newlines for use in markdown table cells.
fn escape_table_cell(s: &str) -> String {
    s.replace('|', "\\|").replace(['\n', '\r'], " ")
}

fn value_placeholder(arg: &clap::Arg) -> String {
    arg.get_value_names()
        .map(|names| {
            names
                .iter()
                .map(|n: &clap::builder::Str| format!("<{}>", n.as_ref() as &str))
                .collect::<Vec<_>>()
                .join(" ")
        })
        .unwrap_or_default()
}

/// Render command-line options as markdown.
pub fn render_options_markdown() -> String {
    let mut cmd = Args::command();
    cmd.build();

    let mut out = String::from("# Command Line Options\n\n");

    out.push_str("## Usage\n\n```\n");
    let usage = cmd.render_usage();
    out.push_str(&usage.to_string());
    out.push_str("\n```\n\n");

    out.push_str("## Options\n\n");
    out.push_str("| Option | Description |\n");
    out.push_str("|--------|-------------|\n");

    for arg in cmd.get_arguments() {
        let id = arg.get_id().as_ref().to_string();
        if id == "help" || id == "version" {
            continue;
        }

        let option_str = if arg.is_positional() {
            let placeholder = value_placeholder(arg);
            if arg.is_required_set() {
                placeholder
            } else {
                format!("[{placeholder}]")
            }
        } else {
            let mut parts = Vec::new();
            if let Some(s) = arg.get_short() {
                parts.push(format!("-{s}"));
            }
            if let Some(l) = arg.get_long() {
                parts.push(format!("--{l}"));
            }
            let op = parts.join(", ");
            let placeholder = if arg.get_action().takes_values() {
                value_placeholder(arg)
            } else {
                String::new()
            };
            if placeholder.is_empty() {
                op
            } else {
                format!("{op} {placeholder}")
            }
        };

        let help = arg
            .get_help()
            .map(|h| escape_table_cell(&h.to_string()))
            .unwrap_or_else(|| "-".to_string());

        out.push_str(&format!("| `{option_str}` | {help} |\n"));
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_widget_overrides() {
        let args = Args::try_parse_from([
            "tourism-dash",
            "data/Tourism.csv",
            "--top-n",
            "20",
            "--facility",
            "hotels",
            "--facility",
            "guest-houses",
            "--x-metric",
            "cafes",
        ])
        .unwrap();
        assert_eq!(args.path, Some(PathBuf::from("data/Tourism.csv")));
        assert_eq!(args.top_n, Some(20));
        assert_eq!(
            args.facilities,
            vec![FacilityArg::Hotels, FacilityArg::GuestHouses]
        );
        assert_eq!(args.x_metric, Some(MetricArg::Cafes));
        assert_eq!(args.y_metric, None);
        assert_eq!(args.export_format, ExportFormatArg::Png);
    }

    #[test]
    fn test_top_n_out_of_range_rejected() {
        assert!(Args::try_parse_from(["tourism-dash", "--top-n", "4"]).is_err());
        assert!(Args::try_parse_from(["tourism-dash", "--top-n", "31"]).is_err());
        assert!(Args::try_parse_from(["tourism-dash", "--top-n", "30"]).is_ok());
    }

    #[test]
    fn test_force_requires_generate_config() {
        assert!(Args::try_parse_from(["tourism-dash", "--force"]).is_err());
        assert!(Args::try_parse_from(["tourism-dash", "--generate-config", "--force"]).is_ok());
    }

    #[test]
    fn test_delimiter_takes_ascii_code() {
        let args = Args::try_parse_from(["tourism-dash", "--delimiter", "59"]).unwrap();
        assert_eq!(args.delimiter, Some(b';'));
        assert!(Args::try_parse_from(["tourism-dash", "--delimiter", ";"]).is_err());
    }

    #[test]
    fn test_options_markdown_lists_flags() {
        let md = render_options_markdown();
        assert!(md.contains("--top-n"));
        assert!(md.contains("ASCII code"));
        assert!(md.contains("--export-format"));
        assert!(md.contains("[<PATH>]"));
    }
}
