mod app;
mod calendar;
mod config;
mod help;
mod jumpto;
mod sessions;
mod theme;
use crate::app::App;
use crate::config::Config;
use anyhow::Context;
use flexi_logger::{FileSpec, Logger};
use lexopt::{Arg, Parser, ValueExt};
use ratatui::DefaultTerminal;
use std::path::{Path, PathBuf};
use time::{format_description::FormatItem, macros::format_description, Date, OffsetDateTime};

static YMD_FMT: &[FormatItem<'_>] = format_description!("[year]-[month]-[day]");

#[derive(Clone, Debug, Eq, PartialEq)]
enum Command {
    Run(Options),
    Help,
    Version,
}

#[derive(Clone, Debug, Default, Eq, PartialEq)]
struct Options {
    config: Option<PathBuf>,
    roster: Option<PathBuf>,
    log_file: Option<PathBuf>,
    date: Option<Date>,
}

impl Command {
    fn from_parser(mut parser: Parser) -> Result<Command, lexopt::Error> {
        let mut opts = Options::default();
        while let Some(arg) = parser.next()? {
            match arg {
                Arg::Short('h') | Arg::Long("help") => return Ok(Command::Help),
                Arg::Short('V') | Arg::Long("version") => return Ok(Command::Version),
                Arg::Short('c') | Arg::Long("config") => {
                    opts.config = Some(PathBuf::from(parser.value()?));
                }
                Arg::Short('s') | Arg::Long("sessions") => {
                    opts.roster = Some(PathBuf::from(parser.value()?));
                }
                Arg::Long("log-file") => {
                    opts.log_file = Some(PathBuf::from(parser.value()?));
                }
                Arg::Value(value) if opts.date.is_none() => {
                    let value = value.string()?;
                    match Date::parse(&value, &YMD_FMT) {
                        Ok(d) => opts.date = Some(d),
                        Err(e) => {
                            return Err(lexopt::Error::ParsingFailed {
                                value,
                                error: Box::new(e),
                            })
                        }
                    }
                }
                _ => return Err(arg.unexpected()),
            }
        }
        Ok(Command::Run(opts))
    }

    fn run(self) -> anyhow::Result<()> {
        match self {
            Command::Run(opts) => {
                // The handle has to outlive the event loop; dropping it
                // shuts the logger down.
                let _logger = match opts.log_file {
                    Some(path) => Some(
                        Logger::try_with_env_or_str("info")
                            .context("invalid log specification")?
                            .log_to_file(
                                FileSpec::try_from(path).context("invalid log file path")?,
                            )
                            .start()
                            .context("failed to start logger")?,
                    ),
                    None => None,
                };
                let config = Config::load(opts.config.as_deref())?;
                let roster_path = opts
                    .roster
                    .or_else(|| config.sessions_file().map(Path::to_path_buf));
                let sessions = match &roster_path {
                    Some(path) => sessions::load_roster(path)?,
                    None => Vec::new(),
                };
                let today = OffsetDateTime::now_local()
                    .context("failed to determine local date")?
                    .date();
                let start = opts.date.unwrap_or(today);
                with_terminal(|mut terminal| {
                    terminal.hide_cursor().context("failed to hide cursor")?;
                    App::new(config, sessions, today, start).run(terminal)?;
                    Ok(())
                })
            }
            Command::Help => {
                println!("Usage: trainday [OPTIONS] [YYYY-MM-DD]");
                println!();
                println!("Terminal month-view calendar for a safety-training session schedule");
                println!();
                println!("Options:");
                println!("  -c, --config <PATH>    Read configuration from <PATH>");
                println!("  -s, --sessions <PATH>  Load the session roster from <PATH>");
                println!("      --log-file <PATH>  Append log messages to <PATH>");
                println!("  -h, --help             Display this help message and exit");
                println!("  -V, --version          Show the program version and exit");
                Ok(())
            }
            Command::Version => {
                println!("{} {}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"));
                Ok(())
            }
        }
    }
}

fn main() -> anyhow::Result<()> {
    Command::from_parser(Parser::from_env())?.run()
}

fn with_terminal<F, T>(func: F) -> anyhow::Result<T>
where
    F: FnOnce(DefaultTerminal) -> anyhow::Result<T>,
{
    let terminal = ratatui::init();
    let r = func(terminal);
    ratatui::restore();
    r
}
