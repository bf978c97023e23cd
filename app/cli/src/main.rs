//! FILENAME: app/cli/src/main.rs
//! PURPOSE: Command-line entry point: reads the workbook and templates,
//! runs the merge and writes the result.

mod messages;

use clap::{Parser, ValueEnum};
use env_logger::Env;
use injector::logging::{close_log_file, init_log_file, set_console_echo};
use injector::{
    decode, encode, log_enter_info, log_error, log_exit_info, log_info, run_with_report, InjectError,
    InjectorConfig, Locale, MergeReport, Templates,
};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tempfile::NamedTempFile;

#[derive(Clone, Copy, Debug, ValueEnum)]
enum LocaleArg {
    El,
    En,
}

impl From<LocaleArg> for Locale {
    fn from(arg: LocaleArg) -> Self {
        match arg {
            LocaleArg::El => Locale::El,
            LocaleArg::En => Locale::En,
        }
    }
}

#[derive(Parser, Debug)]
#[command(
    name = "ledger-merge",
    version,
    about = "Injects the monthly sheets and summary sheets of the report templates into a workbook."
)]
struct Args {
    /// Workbook to merge into. It is read, never modified.
    target: PathBuf,

    /// Where to write the merged workbook.
    #[arg(short, long)]
    output: PathBuf,

    /// JSON configuration file.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Overrides the monthly template path from the configuration.
    #[arg(long)]
    monthly_template: Option<PathBuf>,

    /// Skip the monthly stage.
    #[arg(long, conflicts_with = "monthly_template")]
    no_monthly: bool,

    /// Overrides the summary template path from the configuration.
    #[arg(long)]
    summary_template: Option<PathBuf>,

    /// Language of the messages printed.
    #[arg(long, value_enum)]
    locale: Option<LocaleArg>,

    /// Also write the log to this file.
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// Echo log lines to stderr.
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> ExitCode {
    let args = Args::parse();

    init_logger();
    set_console_echo(args.verbose);
    if let Some(path) = &args.log_file {
        if let Err(e) = init_log_file(path) {
            eprintln!("[LOG_ERROR] Failed to open log file {}: {}", path.display(), e);
        }
    }
    log_info!("CLI", "ledger-merge started at {}", chrono::Local::now().to_rfc3339());

    let code = run_cli(&args);
    close_log_file();
    code
}

/// Routes the unified log lines through the `log` facade to stderr.
/// `RUST_LOG` filters by category, e.g. `RUST_LOG=ADAPT=debug`; off by default.
fn init_logger() {
    let _ = env_logger::Builder::from_env(Env::default().default_filter_or("off"))
        .format(|buf, record| writeln!(buf, "{}", record.args()))
        .try_init();
}

fn run_cli(args: &Args) -> ExitCode {
    let config = match load_config(args) {
        Ok(config) => config,
        Err(e) => {
            let locale = messages::resolve_locale(args.locale.map(Locale::from), None);
            log_error!("CLI", "{}", e);
            eprintln!("{}", messages::failure(locale, &e));
            return ExitCode::FAILURE;
        }
    };
    let locale = messages::resolve_locale(args.locale.map(Locale::from), config.locale);

    match execute(args, &config) {
        Ok(report) => {
            println!("{}", messages::success(locale, &args.output, &report));
            if let Some(monthly) = &report.monthly {
                if !monthly.preserved.is_empty() {
                    println!("{}", messages::preserved(locale, &monthly.preserved));
                }
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            log_error!("CLI", "{}", e);
            eprintln!("{}", messages::failure(locale, &e));
            ExitCode::FAILURE
        }
    }
}

/// Config file (or the reference defaults) with command-line overrides applied.
fn load_config(args: &Args) -> Result<InjectorConfig, InjectError> {
    let mut config = match &args.config {
        Some(path) => InjectorConfig::from_json_file(path)?,
        None => InjectorConfig::default(),
    };

    if let Some(path) = &args.monthly_template {
        config.monthly_template_path = Some(path.clone());
    }
    if args.no_monthly {
        config.monthly_template_path = None;
    }
    if let Some(path) = &args.summary_template {
        config.summary_template_path = path.clone();
    }
    config.validate()?;
    Ok(config)
}

fn execute(args: &Args, config: &InjectorConfig) -> Result<MergeReport, InjectError> {
    log_enter_info!("CLI", "execute", "{}", args.target.display());

    let target_bytes = std::fs::read(&args.target)?;
    let target = decode(&target_bytes)?;
    let templates = Templates::load(config)?;

    let (merged, report) = run_with_report(target, &templates, config)?;
    let bytes = encode(&merged)?;
    write_atomically(&args.output, &bytes)?;

    log_exit_info!("CLI", "execute", "wrote {} bytes to {}", bytes.len(), args.output.display());
    Ok(report)
}

/// Writes through a temporary file in the destination directory, so the
/// output is either the old file or the complete new one.
fn write_atomically(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let mut file = NamedTempFile::new_in(dir)?;
    file.write_all(bytes)?;
    file.flush()?;
    file.persist(path).map_err(|e| e.error)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_atomically_replaces_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.xlsx");
        std::fs::write(&path, b"old").unwrap();

        write_atomically(&path, b"new contents").unwrap();
        assert_eq!(std::fs::read(&path).unwrap(), b"new contents");
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[test]
    fn test_overrides_apply_on_top_of_defaults() {
        let args = Args::parse_from([
            "ledger-merge",
            "book.xlsx",
            "-o",
            "out.xlsx",
            "--no-monthly",
            "--summary-template",
            "s.xlsx",
        ]);
        let config = load_config(&args).unwrap();
        assert_eq!(config.monthly_template_path, None);
        assert_eq!(config.summary_template_path, PathBuf::from("s.xlsx"));
    }

    #[test]
    fn test_logger_can_be_installed_twice() {
        init_logger();
        init_logger();
        injector::log_debug!("CLI", "logger installed");
    }

    #[test]
    fn test_locale_flag_parses() {
        let args = Args::parse_from(["ledger-merge", "a.xlsx", "--output", "b.xlsx", "--locale", "el"]);
        assert!(matches!(args.locale, Some(LocaleArg::El)));
        assert!(!args.verbose);
    }
}
