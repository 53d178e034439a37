use console::{style, Style, StyledObject};
use dialoguer::{theme::ColorfulTheme, Input};

use crate::Result;

// region: --- Prompts

pub fn prompt(text: &str) -> Result<String> {
    let theme = ColorfulTheme {
        prompt_style: Style::new().for_stderr().color256(45),
        prompt_prefix: style("?".to_string()).color256(45).for_stderr(),
        ..ColorfulTheme::default()
    };

    let input = Input::with_theme(&theme);
    let res = input.with_prompt(text).allow_empty(true).interact_text()?;

    Ok(res)
}

// endregion: --- Prompts

// region: --- Confirm

/// Source of yes/no decisions for destructive or ambiguous operations.
pub trait Confirm {
    fn confirm(&mut self, question: &str) -> Result<bool>;
}

/// Scripted decisions, e.g. `|_: &str| false`.
impl<F> Confirm for F
where
    F: FnMut(&str) -> bool,
{
    fn confirm(&mut self, question: &str) -> Result<bool> {
        Ok(self(question))
    }
}

/// Asks on the terminal. Only `y` and `yes` (any case) approve.
pub struct CliConfirm;

impl Confirm for CliConfirm {
    fn confirm(&mut self, question: &str) -> Result<bool> {
        let answer = prompt(&format!("{question} (y/n)"))?;
        Ok(is_yes(&answer))
    }
}

pub fn is_yes(answer: &str) -> bool {
    matches!(answer.trim().to_lowercase().as_str(), "y" | "yes")
}

/// Auto-approval short-circuits without asking.
pub fn approve(auto_approve: bool, confirm: &mut dyn Confirm, question: &str) -> Result<bool> {
    if auto_approve {
        return Ok(true);
    }
    confirm.confirm(question)
}

// endregion: --- Confirm

// region: --- Icons

pub fn ico_res() -> StyledObject<&'static str> {
    style("➤").color256(45)
}

pub fn ico_check() -> StyledObject<&'static str> {
    style("✔").green()
}

pub fn ico_uploading() -> StyledObject<&'static str> {
    style("↥").yellow()
}

pub fn ico_uploaded() -> StyledObject<&'static str> {
    style("↥").green()
}

pub fn ico_deleted_ok() -> StyledObject<&'static str> {
    style("⌫").green()
}

pub fn ico_err() -> StyledObject<&'static str> {
    style("✗").red()
}

// endregion: --- Icons

// region: --- Text Output

pub fn text_res(text: String) -> StyledObject<String> {
    style(text).bright()
}

// endregion: --- Text Output
