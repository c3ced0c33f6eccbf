use std::fmt::Display;
use std::io::{BufRead, Write};

use crate::core::checker::Checker;
use crate::core::error::LabError;
use crate::core::input::read_candidate;

/// Exit status and message a target prints for one attempt.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Verdict {
    pub accepted: bool,
    pub message: &'static str,
    pub exit_code: i32,
}

impl Display for Verdict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

pub trait Crackme: Send + Sync {
    fn name(&self) -> &'static str;

    fn prompt(&self) -> &'static str;

    fn check(&self, candidate: &[u8]) -> bool;

    /// Target constant the input is compared against, hex encoded.
    fn target_hex(&self) -> String;

    fn accept_message(&self) -> &'static str {
        "OK"
    }

    fn reject_message(&self) -> &'static str {
        "NO"
    }

    fn reject_code(&self) -> i32 {
        0
    }

    /// Whether an empty stdin aborts the target instead of being judged as
    /// an empty candidate.
    fn requires_input(&self) -> bool {
        false
    }

    fn verdict(&self, candidate: &[u8]) -> Verdict {
        if self.check(candidate) {
            Verdict {
                accepted: true,
                message: self.accept_message(),
                exit_code: 0,
            }
        } else {
            Verdict {
                accepted: false,
                message: self.reject_message(),
                exit_code: self.reject_code(),
            }
        }
    }
}

/// The byte obfuscation checker behind the `obf` target.
#[derive(Debug, Clone, Default)]
pub struct ObfCrackme {
    checker: Checker,
}

impl ObfCrackme {
    pub fn new(checker: Checker) -> Self {
        ObfCrackme { checker }
    }

    pub fn checker(&self) -> &Checker {
        &self.checker
    }
}

impl Crackme for ObfCrackme {
    fn name(&self) -> &'static str {
        "obf"
    }

    fn prompt(&self) -> &'static str {
        "Input: "
    }

    fn check(&self, candidate: &[u8]) -> bool {
        self.checker.is_match(candidate)
    }

    fn target_hex(&self) -> String {
        hex::encode(self.checker.target())
    }
}

pub const PASSWORD_TARGET: u32 = 0xdeadbeef;
/// Longest password the target reads; the rest of the line is ignored.
pub const PASSWORD_MAX_LEN: usize = 127;

pub fn hash_password(input: &[u8]) -> u32 {
    let end = memchr::memchr(0, input).unwrap_or(input.len());
    let input = &input[..end.min(PASSWORD_MAX_LEN)];

    input.iter().fold(0u32, |acc, &b| {
        acc.wrapping_mul(33) ^ (b as u32).wrapping_add(0x13)
    })
}

#[derive(Debug, Clone)]
pub struct PasswordCrackme {
    target: u32,
}

impl Default for PasswordCrackme {
    fn default() -> Self {
        PasswordCrackme {
            target: PASSWORD_TARGET,
        }
    }
}

impl PasswordCrackme {
    pub fn with_target(target: u32) -> Self {
        PasswordCrackme { target }
    }
}

impl Crackme for PasswordCrackme {
    fn name(&self) -> &'static str {
        "crackme1"
    }

    fn prompt(&self) -> &'static str {
        "Password: "
    }

    fn check(&self, candidate: &[u8]) -> bool {
        hash_password(candidate) == self.target
    }

    fn target_hex(&self) -> String {
        hex::encode(self.target.to_be_bytes())
    }

    fn accept_message(&self) -> &'static str {
        "Access granted"
    }

    fn reject_message(&self) -> &'static str {
        "Access denied"
    }

    fn reject_code(&self) -> i32 {
        1
    }

    fn requires_input(&self) -> bool {
        true
    }
}

pub const GUESS_TARGET: u32 = 0xc0ffee11;

/// Hashes the input character by character, each one salted with its position.
pub fn hash_guess(input: &[u8]) -> u32 {
    String::from_utf8_lossy(input)
        .chars()
        .enumerate()
        .fold(0u32, |acc, (i, ch)| {
            let acc = (acc << 5).wrapping_sub(acc);
            acc ^ (ch as u32).wrapping_add(i as u32)
        })
}

#[derive(Debug, Clone)]
pub struct GuessCrackme {
    target: u32,
}

impl Default for GuessCrackme {
    fn default() -> Self {
        GuessCrackme {
            target: GUESS_TARGET,
        }
    }
}

impl GuessCrackme {
    pub fn with_target(target: u32) -> Self {
        GuessCrackme { target }
    }
}

impl Crackme for GuessCrackme {
    fn name(&self) -> &'static str {
        "guess"
    }

    fn prompt(&self) -> &'static str {
        "Guess: "
    }

    fn check(&self, candidate: &[u8]) -> bool {
        hash_guess(candidate) == self.target
    }

    fn target_hex(&self) -> String {
        hex::encode(self.target.to_be_bytes())
    }
}

pub fn all() -> Vec<Box<dyn Crackme>> {
    vec![
        Box::new(ObfCrackme::default()),
        Box::new(PasswordCrackme::default()),
        Box::new(GuessCrackme::default()),
    ]
}

pub fn find(name: &str) -> Result<Box<dyn Crackme>, LabError> {
    let name = name.trim().to_lowercase();
    all()
        .into_iter()
        .find(|c| c.name() == name)
        .ok_or(LabError::UnknownCrackme(name))
}

/// Runs one prompt/answer round of a target over the given streams and
/// returns the process exit code.
///
/// Output errors are not fatal, the exit code only depends on the input.
pub fn run<R: BufRead, W: Write>(crackme: &dyn Crackme, input: &mut R, out: &mut W) -> i32 {
    if let Err(e) = write!(out, "{}", crackme.prompt()).and_then(|_| out.flush()) {
        tracing::debug!(error = %e, "could not write prompt");
    }

    let candidate = match read_candidate(input) {
        Some(candidate) => candidate,
        None if crackme.requires_input() => {
            tracing::debug!(crackme = crackme.name(), "no input, aborting");
            return 1;
        }
        None => Vec::new(),
    };

    let verdict = crackme.verdict(&candidate);
    tracing::debug!(
        crackme = crackme.name(),
        len = candidate.len(),
        accepted = verdict.accepted,
        "candidate checked"
    );

    if let Err(e) = writeln!(out, "{verdict}") {
        tracing::debug!(error = %e, "could not write verdict");
    }

    verdict.exit_code
}
