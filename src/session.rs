use tokio::sync::watch;

use crate::assistant::{Assistant, Conv};
use crate::utils::cli::ico_err;
use crate::Result;

// region: --- Types

/// Input Command from user
#[derive(Debug, PartialEq)]
pub enum Cmd {
    Quit,
    Chat(String),
}

impl Cmd {
    pub fn from_input(input: impl Into<String>) -> Self {
        let input = input.into();

        if input.eq_ignore_ascii_case("exit") {
            Self::Quit
        } else {
            Self::Chat(input)
        }
    }
}

// endregion: --- Types

/// Reads lines until `exit`, running one turn per line.
///
/// Any failure during a turn ends the whole session.
pub async fn run_session<R, S>(
    asst: &Assistant,
    conv: &Conv,
    mut read_input: R,
    mut show_reply: S,
    mut cancel: Option<&mut watch::Receiver<bool>>,
) -> Result<()>
where
    R: FnMut() -> Result<String>,
    S: FnMut(&str),
{
    loop {
        let input = read_input()?;

        match Cmd::from_input(input) {
            Cmd::Quit => break,
            Cmd::Chat(msg) => {
                let reply = match asst.chat(conv, &msg, cancel.as_deref_mut()).await {
                    Ok(reply) => reply,
                    Err(err) => {
                        println!("{} An error occurred during the chat session.", ico_err());
                        return Err(err);
                    }
                };
                if let Some(reply) = reply {
                    show_reply(&reply);
                }
            }
        }
    }

    Ok(())
}
