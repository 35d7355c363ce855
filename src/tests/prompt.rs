// Unit Tests for Prompt Construction
//
// UNIT UNDER TEST: build_prompt
//
// BUSINESS RESPONSIBILITY:
//   - Produces the exact instruction the transformation model receives
//   - Keeps the lyrics verbatim so verse breaks survive
//
// TEST COVERAGE:
//   - Exact prompt text per mode
//   - Multi-line lyrics pass through untouched

use crate::mode::Mode;
use crate::prompt::build_prompt;

#[cfg(test)]
mod prompt_tests {
    use super::*;

    #[test]
    fn test_prompt_text_is_exact() {
        let prompt = build_prompt("Here comes the sun", Mode::Bureaucratic);

        assert_eq!(
            prompt,
            "Rewrite this in bureaucratic technical prose while preserving verse format and \
             putting an end-line at the end of each verse:\n\nHere comes the sun"
        );
    }

    #[test]
    fn test_lyrics_are_preserved_verbatim() {
        let lyrics = "Line one\nLine two\n\n  Indented \"quoted\" line\n";

        let prompt = build_prompt(lyrics, Mode::Medical);

        assert!(prompt.ends_with(lyrics));
        assert!(prompt.starts_with("Rewrite this in medical technical prose"));
    }
}
