//! Interactive menu and prompts

use anyhow::{anyhow, Result};
use console::{style, Term};
use dialoguer::{theme::ColorfulTheme, Input};
use std::io::{self, BufRead, Write};

/// The three actions offered by the menu
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuAction {
    Export,
    Upload,
    CreateBucket,
}

impl MenuAction {
    pub const ALL: [MenuAction; 3] = [
        MenuAction::Export,
        MenuAction::Upload,
        MenuAction::CreateBucket,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            MenuAction::Export => "List/export bucket contents",
            MenuAction::Upload => "Upload file",
            MenuAction::CreateBucket => "Create bucket",
        }
    }

    /// Parse a 1-based menu choice
    pub fn from_choice(input: &str) -> Option<Self> {
        match input.trim() {
            "1" => Some(MenuAction::Export),
            "2" => Some(MenuAction::Upload),
            "3" => Some(MenuAction::CreateBucket),
            _ => None,
        }
    }
}

/// Numbered menu text, one action per line
pub fn render_menu() -> String {
    let mut text = String::from("What do you want to do?\n");
    for (i, action) in MenuAction::ALL.iter().enumerate() {
        text.push_str(&format!("{}. {}\n", i + 1, action.label()));
    }
    text
}

/// Source of single-line answers
pub trait Prompt {
    fn ask(&mut self, question: &str) -> Result<String>;
}

/// Prompts on an attached terminal, through dialoguer
struct TerminalPrompt {
    term: Term,
    theme: ColorfulTheme,
}

impl Prompt for TerminalPrompt {
    fn ask(&mut self, question: &str) -> Result<String> {
        Input::<String>::with_theme(&self.theme)
            .with_prompt(question)
            .allow_empty(true)
            .interact_text_on(&self.term)
            .map_err(|e| anyhow!("Failed to read answer: {}", e))
    }
}

/// Reads answers line by line from piped input
pub struct LinePrompt<R: BufRead> {
    reader: R,
}

impl<R: BufRead> LinePrompt<R> {
    pub fn new(reader: R) -> Self {
        Self { reader }
    }
}

impl<R: BufRead> Prompt for LinePrompt<R> {
    fn ask(&mut self, question: &str) -> Result<String> {
        print!("{} ", question);
        io::stdout().flush()?;

        let mut line = String::new();
        if self.reader.read_line(&mut line)? == 0 {
            return Err(anyhow!("Input closed before an answer was given"));
        }
        println!();
        Ok(line.trim_end_matches(['\r', '\n']).to_string())
    }
}

/// One interactive menu interaction
///
/// Owns the prompt for its whole lifetime. Dropping the session restores the
/// cursor and flushes the terminal, whichever way the interaction ends.
pub struct MenuSession {
    term: Term,
    prompt: Box<dyn Prompt>,
}

impl MenuSession {
    /// Open a session on stdin/stdout
    pub fn open() -> Self {
        let term = Term::stdout();
        let prompt: Box<dyn Prompt> = if term.is_term() {
            Box::new(TerminalPrompt {
                term: term.clone(),
                theme: ColorfulTheme::default(),
            })
        } else {
            Box::new(LinePrompt::new(io::BufReader::new(io::stdin())))
        };
        Self { term, prompt }
    }

    /// Show the menu and read the chosen action
    ///
    /// Returns `None` for an answer that matches no action.
    pub fn choose_action(&mut self) -> Result<Option<MenuAction>> {
        println!("{}", style(render_menu()).bold());
        let answer = self.prompt.ask(">")?;
        Ok(MenuAction::from_choice(&answer))
    }

    /// Ask a free-text question
    pub fn ask(&mut self, question: &str) -> Result<String> {
        self.prompt.ask(question)
    }
}

impl Drop for MenuSession {
    fn drop(&mut self) {
        let _ = self.term.show_cursor();
        let _ = self.term.flush();
    }
}
