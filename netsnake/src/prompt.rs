//! Operator prompting.
//!
//! The workflow never reads stdin directly. It asks an [`OperatorPrompt`],
//! which is a terminal for real runs and a [`ScriptedPrompt`] in tests.

use std::collections::VecDeque;
use std::io::{self, BufRead, IsTerminal};

use dialoguer::Input;
use dialoguer::console::Term;
use secrecy::SecretString;

use crate::error::{Error, Result};

/// Operator answer to a yes/no question.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    Yes,
    No,
    /// Anything other than exactly `yes` or `no`.
    Invalid(String),
}

impl Decision {
    /// Parse an answer. Only exactly `yes` and `no` count; a trailing line
    /// ending is dropped, any other whitespace makes the answer invalid.
    pub fn parse(answer: &str) -> Self {
        match answer.trim_end_matches(['\r', '\n']) {
            "yes" => Self::Yes,
            "no" => Self::No,
            other => Self::Invalid(other.to_string()),
        }
    }
}

/// Source of operator input.
pub trait OperatorPrompt {
    /// Ask for a line of text. An empty answer is allowed.
    fn ask(&mut self, prompt: &str) -> Result<String>;

    /// Ask for a secret without echoing it.
    fn ask_secret(&mut self, prompt: &str) -> Result<SecretString>;

    /// Ask a yes/no question.
    fn confirm(&mut self, prompt: &str) -> Result<Decision> {
        self.ask(prompt).map(|answer| Decision::parse(&answer))
    }
}

/// Terminal prompt. Falls back to reading stdin lines when stdin or
/// stderr is not a terminal, so answers can be piped in.
#[derive(Debug, Default)]
pub struct ConsolePrompt;

impl ConsolePrompt {
    pub fn new() -> Self {
        Self
    }

    fn interactive() -> bool {
        io::stdin().is_terminal() && Term::stderr().is_term()
    }

    fn ask_piped(prompt: &str) -> Result<String> {
        eprint!("{prompt}: ");
        read_answer(&mut io::stdin().lock()).map_err(Error::Prompt)
    }
}

/// One answer line from `input`, without its line ending.
fn read_answer(input: &mut impl BufRead) -> io::Result<String> {
    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Err(io::Error::new(
            io::ErrorKind::UnexpectedEof,
            "input closed before an answer was given",
        ));
    }
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}

impl OperatorPrompt for ConsolePrompt {
    fn ask(&mut self, prompt: &str) -> Result<String> {
        if !Self::interactive() {
            return Self::ask_piped(prompt);
        }
        Input::<String>::new()
            .with_prompt(prompt)
            .allow_empty(true)
            .interact_text()
            .map_err(|e| Error::Prompt(io::Error::other(e.to_string())))
    }

    fn ask_secret(&mut self, prompt: &str) -> Result<SecretString> {
        if !Self::interactive() {
            return Self::ask_piped(prompt).map(SecretString::from);
        }
        rpassword::prompt_password(format!("{prompt}: "))
            .map(SecretString::from)
            .map_err(Error::Prompt)
    }
}

/// Replays canned answers in order and records every question asked.
#[derive(Debug, Default)]
pub struct ScriptedPrompt {
    answers: VecDeque<String>,
    asked: Vec<String>,
}

impl ScriptedPrompt {
    pub fn new<I, S>(answers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            answers: answers.into_iter().map(Into::into).collect(),
            asked: Vec::new(),
        }
    }

    /// Questions asked so far, secrets included.
    pub fn asked(&self) -> &[String] {
        &self.asked
    }

    /// Answers not yet consumed.
    pub fn remaining(&self) -> usize {
        self.answers.len()
    }

    fn next(&mut self, prompt: &str) -> Result<String> {
        self.asked.push(prompt.to_string());
        self.answers.pop_front().ok_or_else(|| {
            Error::Prompt(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                format!("no scripted answer for {prompt:?}"),
            ))
        })
    }
}

impl OperatorPrompt for ScriptedPrompt {
    fn ask(&mut self, prompt: &str) -> Result<String> {
        self.next(prompt)
    }

    fn ask_secret(&mut self, prompt: &str) -> Result<SecretString> {
        self.next(prompt).map(SecretString::from)
    }
}
