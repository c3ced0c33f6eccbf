mod tui;

use std::error::Error;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};

use re_lab::core::{
    crackme::{self, Crackme},
    error::LabError,
    exercises,
    input::{parse_hex, read_candidate},
    solve::{self, DEFAULT_MAX_LEN, SearchSpace},
};
use re_lab::utils::TargetProcess;

#[derive(Parser, Debug)]
#[command(name = "re-lab", about = "Reverse engineering lab workbench")]
struct Cli {
    #[command(subcommand)]
    command: Option<LabCommand>,
}

#[derive(Subcommand, Debug)]
enum LabCommand {
    /// List the lab targets
    List,
    /// Try a candidate against a target
    Check {
        name: String,
        #[command(flatten)]
        candidate: CandidateArgs,
        /// Feed the candidate to this compiled target instead of checking in process
        #[arg(long)]
        exec: Option<PathBuf>,
    },
    /// Recover an accepted input
    Solve {
        name: String,
        #[command(flatten)]
        space: SpaceArgs,
    },
    /// Print the results of the practice computations
    Exercises,
    /// Interactive workbench (default)
    Tui {
        #[command(flatten)]
        space: SpaceArgs,
    },
}

#[derive(Args, Debug)]
#[group(multiple = false)]
struct CandidateArgs {
    /// Candidate as text
    #[arg(long)]
    input: Option<String>,
    /// Candidate as hex bytes
    #[arg(long)]
    hex: Option<String>,
}

#[derive(Args, Debug, Clone)]
struct SpaceArgs {
    /// Bytes tried by the brute force search [default: printable ASCII]
    #[arg(long)]
    charset: Option<String>,
    #[arg(long, default_value_t = DEFAULT_MAX_LEN)]
    max_len: usize,
}

impl SpaceArgs {
    fn to_space(&self) -> Result<SearchSpace, LabError> {
        match &self.charset {
            Some(charset) => SearchSpace::new(charset.as_bytes(), self.max_len),
            None => Ok(SearchSpace {
                max_len: self.max_len,
                ..SearchSpace::default()
            }),
        }
    }
}

impl CandidateArgs {
    fn read(&self) -> Result<Vec<u8>, LabError> {
        if let Some(text) = &self.input {
            return Ok(text.as_bytes().to_vec());
        }
        if let Some(hex) = &self.hex {
            return parse_hex(hex);
        }

        let stdin = std::io::stdin();
        Ok(read_candidate(&mut stdin.lock()).unwrap_or_default())
    }
}

fn list(out: &mut impl Write) -> Result<(), LabError> {
    for c in crackme::all() {
        writeln!(
            out,
            "{:<10} prompt: {:<12} target: {}",
            c.name(),
            format!("{:?}", c.prompt()),
            c.target_hex()
        )?;
    }
    Ok(())
}

fn check(
    crackme: &dyn Crackme,
    candidate: &[u8],
    exec: Option<&Path>,
    out: &mut impl Write,
) -> Result<i32, LabError> {
    if let Some(path) = exec {
        tracing::info!(path = %path.display(), "running target");
        let output = TargetProcess::spawn(path)?.answer(candidate)?;
        writeln!(out, "{}", output.verdict())?;
        return Ok(output.exit_code.unwrap_or(1));
    }

    let verdict = crackme.verdict(candidate);
    writeln!(out, "{verdict}")?;
    Ok(verdict.exit_code)
}

fn solve_cmd(
    crackme: &dyn Crackme,
    space: &SearchSpace,
    out: &mut impl Write,
) -> Result<i32, LabError> {
    match solve::solve(crackme, space) {
        Some(found) => {
            writeln!(out, "hex:  {}", hex::encode(&found))?;
            if let Ok(text) = std::str::from_utf8(&found) {
                writeln!(out, "text: {text}")?;
            }
            Ok(0)
        }
        None => {
            writeln!(
                out,
                "no input up to {} bytes over {} symbols",
                space.max_len,
                space.charset.len()
            )?;
            Ok(1)
        }
    }
}

fn run_tui(space: SearchSpace) -> Result<(), Box<dyn Error>> {
    let mut terminal = ratatui::init();
    let result = tui::App::new(space).run(&mut terminal);
    ratatui::restore();
    result
}

fn main() -> ExitCode {
    match run(Cli::parse()) {
        Ok(code) => ExitCode::from(code.clamp(0, 255) as u8),
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<i32, Box<dyn Error>> {
    let command = cli.command.unwrap_or(LabCommand::Tui {
        space: SpaceArgs {
            charset: None,
            max_len: DEFAULT_MAX_LEN,
        },
    });

    // a subscriber writing to the terminal would tear the TUI
    if !matches!(command, LabCommand::Tui { .. }) {
        re_lab::init_logging();
    }

    let mut stdout = std::io::stdout();
    let code = match command {
        LabCommand::List => {
            list(&mut stdout)?;
            0
        }
        LabCommand::Check {
            name,
            candidate,
            exec,
        } => {
            let crackme = crackme::find(&name)?;
            let candidate = candidate.read()?;
            check(crackme.as_ref(), &candidate, exec.as_deref(), &mut stdout)?
        }
        LabCommand::Solve { name, space } => {
            let crackme = crackme::find(&name)?;
            solve_cmd(crackme.as_ref(), &space.to_space()?, &mut stdout)?
        }
        LabCommand::Exercises => {
            for line in exercises::report() {
                writeln!(stdout, "{line}")?;
            }
            0
        }
        LabCommand::Tui { space } => {
            run_tui(space.to_space()?)?;
            0
        }
    };

    Ok(code)
}
