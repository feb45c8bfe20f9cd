use crate::config::ProbeConfig;
use crate::probe::{MemberFilter, NamePolicy, RecordOrder};
use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "docprobe")]
#[command(
    about = "Derive pyannotate type comments from Sphinx or numpy-style docstrings",
    long_about = None
)]
#[command(version)]
pub struct Cli {
    /// Modules to probe: dotted names (pkg.sub) or paths to .py files
    #[arg(required = true, num_args = 1..)]
    pub modules: Vec<String>,

    /// The docstring flavor to expect (sphinx, gensim) [default: sphinx]
    #[arg(short, long)]
    pub flavor: Option<String>,

    /// Directory searched when importing dotted module names (repeatable)
    #[arg(short = 'p', long = "search-path")]
    pub search_paths: Vec<PathBuf>,

    /// How methods are named in func_name
    #[arg(long, value_enum)]
    pub naming: Option<NamePolicy>,

    /// Which class members are considered for probing
    #[arg(long = "member-filter", value_enum)]
    pub member_filter: Option<MemberFilter>,

    /// Ordering of the emitted records
    #[arg(long, value_enum)]
    pub order: Option<RecordOrder>,

    /// Output file (defaults to stdout)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Configuration file (defaults to the nearest .docprobe.toml)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Increase verbosity level (can be repeated: -v, -vv, -vvv)
    #[arg(short = 'v', long = "verbose", action = clap::ArgAction::Count)]
    pub verbosity: u8,
}

impl Cli {
    /// Settings given on the command line, as a config layer.
    pub fn config_overrides(&self) -> ProbeConfig {
        ProbeConfig {
            dialect: self.flavor.clone(),
            naming: self.naming,
            member_filter: self.member_filter,
            order: self.order,
            search_paths: (!self.search_paths.is_empty()).then(|| self.search_paths.clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_modules_and_flags() {
        let cli = Cli::try_parse_from([
            "docprobe",
            "pkg.sub",
            "script.py",
            "-f",
            "gensim",
            "-p",
            "src",
            "-p",
            "lib",
            "--naming",
            "bare",
            "--member-filter",
            "origin-only",
            "--order",
            "line",
            "-vv",
        ])
        .unwrap();

        assert_eq!(cli.modules, ["pkg.sub", "script.py"]);
        assert_eq!(cli.verbosity, 2);

        let overrides = cli.config_overrides();
        assert_eq!(overrides.dialect.as_deref(), Some("gensim"));
        assert_eq!(overrides.naming, Some(NamePolicy::Bare));
        assert_eq!(overrides.member_filter, Some(MemberFilter::OriginOnly));
        assert_eq!(overrides.order, Some(RecordOrder::Line));
        assert_eq!(
            overrides.search_paths,
            Some(vec![PathBuf::from("src"), PathBuf::from("lib")])
        );
    }

    #[test]
    fn test_unset_flags_leave_config_untouched() {
        let cli = Cli::try_parse_from(["docprobe", "pkg"]).unwrap();
        assert_eq!(cli.config_overrides(), ProbeConfig::default());
    }

    #[test]
    fn test_modules_are_required() {
        assert!(Cli::try_parse_from(["docprobe"]).is_err());
    }
}
