use std::{env, path::PathBuf};

use anyhow::{Result, anyhow};

const USAGE: &str = "usage: categorizer [--config <path>] <sanitize|categorize|route> [--input <path>] [--output <path>]\n       categorizer [--config <path>] chat <prompt...>";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Sanitize,
    Categorize,
    Route,
    Chat { prompt: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CliArgs {
    pub config_path: PathBuf,
    pub command: Command,
    pub input: Option<PathBuf>,
    pub output: Option<PathBuf>,
}

pub fn args_from_env() -> Result<CliArgs> {
    parse_args(env::args().skip(1))
}

pub fn parse_args(args: impl IntoIterator<Item = String>) -> Result<CliArgs> {
    let mut args = args.into_iter();
    let mut config_path = None;
    let mut command = None;
    let mut input = None;
    let mut output = None;

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--config" => config_path = Some(PathBuf::from(flag_value(&mut args, "--config")?)),
            "--input" => input = Some(PathBuf::from(flag_value(&mut args, "--input")?)),
            "--output" => output = Some(PathBuf::from(flag_value(&mut args, "--output")?)),
            "sanitize" | "categorize" | "route" if command.is_none() => {
                command = Some(match arg.as_str() {
                    "sanitize" => Command::Sanitize,
                    "categorize" => Command::Categorize,
                    _ => Command::Route,
                });
            }
            "chat" if command.is_none() => {
                let prompt = args.by_ref().collect::<Vec<_>>().join(" ");
                if prompt.trim().is_empty() {
                    return Err(anyhow!("chat needs a prompt. {USAGE}"));
                }
                command = Some(Command::Chat { prompt });
            }
            other => {
                return Err(anyhow!("unknown argument: {other}. {USAGE}"));
            }
        }
    }

    let command = command.ok_or_else(|| anyhow!("missing command. {USAGE}"))?;
    if matches!(command, Command::Chat { .. }) && (input.is_some() || output.is_some()) {
        return Err(anyhow!("--input/--output do not apply to chat. {USAGE}"));
    }

    Ok(CliArgs {
        config_path: config_path.unwrap_or_else(|| PathBuf::from("./categorizer.jsonc")),
        command,
        input,
        output,
    })
}

fn flag_value(args: &mut impl Iterator<Item = String>, flag: &str) -> Result<String> {
    args.next()
        .ok_or_else(|| anyhow!("missing value for {flag}"))
}
