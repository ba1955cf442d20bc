use std::fmt::Write;

use super::{gallows, GameState, Running};

impl GameState {
    /// The board as posted in the channel.
    pub fn render(&self, max_guesses: u32) -> String {
        match self {
            Self::Running(running) => running.render(max_guesses),
            Self::Solved(solved) => format!(
                "__Solved!__ {} won and guessed the phrase `{}`",
                solved.solver().mention,
                solved.phrase()
            ),
            Self::Failed(failed) => format!(
                "```\n{}\n```__Failed!__ The phrase was ||{}||",
                gallows::stage(max_guesses, max_guesses),
                failed.phrase()
            ),
        }
    }
}

impl Running {
    pub fn render(&self, max_guesses: u32) -> String {
        format!(
            "```\n{gallows}\n```Wrong guesses: {wrong}/{max_guesses}\nGuessed: {guessed}\n```\n{mask}\n```Guess with `!g` or `!guess`",
            gallows = gallows::stage(self.wrong_guesses(), max_guesses),
            wrong = self.wrong_guesses(),
            guessed = self.render_guessed(),
            mask = self.render_mask(),
        )
    }

    /// One slot per character: the character itself once shown, `_` until then.
    pub fn render_mask(&self) -> String {
        self.phrase()
            .chars()
            .zip(self.unveiled())
            .fold(String::new(), |mut mask, (ch, shown)| {
                let _ = write!(mask, " {} ", if *shown { ch } else { '_' });
                mask
            })
    }

    fn render_guessed(&self) -> String {
        if self.guessed().is_empty() {
            return "-".to_owned();
        }

        self.guessed()
            .iter()
            .map(|letter| format!("~~{letter}~~"))
            .collect::<Vec<_>>()
            .join(" ")
    }
}
