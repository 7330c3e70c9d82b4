//! Command-line parsing.

use anyhow::{bail, Context, Result};

pub const USAGE: &str = "\
Usage: maniac-lab [OPTIONS]

Options:
      --no-threaded-simulation  Disable multithreading for the simulation
      --data <DIR>              Data directory mounted as the VFS root [default: data]
      --log <FILTER>            Log filter, env_logger syntax (overrides RUST_LOG)
  -h, --help                    Print this help
";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CliOptions {
    pub threaded_simulation: bool,
    pub data_dir: String,
    pub log_filter: Option<String>,
}

impl Default for CliOptions {
    fn default() -> Self {
        Self { threaded_simulation: true, data_dir: "data".into(), log_filter: None }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Invocation {
    Run(CliOptions),
    Help,
}

/// Parses arguments (without the program name).
pub fn parse<I>(args: I) -> Result<Invocation>
where
    I: IntoIterator<Item = String>,
{
    let mut opts = CliOptions::default();
    let mut args = args.into_iter();

    while let Some(arg) = args.next() {
        let (flag, inline) = match arg.split_once('=') {
            Some((f, v)) if f.starts_with("--") => (f.to_string(), Some(v.to_string())),
            _ => (arg.clone(), None),
        };
        let mut value = |name: &str| -> Result<String> {
            match inline.clone() {
                Some(v) => Ok(v),
                None => args.next().with_context(|| format!("{name} needs a value")),
            }
        };

        match flag.as_str() {
            "-h" | "--help" => return Ok(Invocation::Help),
            "--no-threaded-simulation" => opts.threaded_simulation = false,
            "--data" => opts.data_dir = value("--data")?,
            "--log" => opts.log_filter = Some(value("--log")?),
            other => bail!("unknown argument `{other}`\n\n{USAGE}"),
        }
    }

    Ok(Invocation::Run(opts))
}
