//! Prompt construction for the text-transformation provider.

use crate::mode::Mode;

/// Instruction sent ahead of the lyrics.
pub fn instruction(mode: Mode) -> String {
    format!(
        "Rewrite this in {mode} technical prose while preserving verse format \
         and putting an end-line at the end of each verse:"
    )
}

/// Full user message: instruction, blank line, then the lyrics verbatim.
pub fn build_prompt(lyrics: &str, mode: Mode) -> String {
    format!("{}\n\n{lyrics}", instruction(mode))
}
