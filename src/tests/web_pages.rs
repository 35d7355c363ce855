// Unit Tests for Web Pages
//
// UNIT UNDER TEST: web::pages, web::status_for
//
// BUSINESS RESPONSIBILITY:
//   - Renders the form, result, about and error pages
//   - Never lets lyric or user text inject markup
//   - Maps pipeline failures onto HTTP status codes
//
// TEST COVERAGE:
//   - Escaping of every special character
//   - Mode options on the index page
//   - Status mapping per failure class

use crate::error::RewriteError;
use crate::mode::Mode;
use crate::rewriter::Rewrite;
use crate::web::pages;
use crate::web::status_for;
use axum::http::StatusCode;

#[cfg(test)]
mod page_tests {
    use super::*;

    #[test]
    fn test_escape_special_characters() {
        assert_eq!(
            pages::escape(r#"<b>"Tom" & 'Jerry'</b>"#),
            "&lt;b&gt;&quot;Tom&quot; &amp; &#39;Jerry&#39;&lt;/b&gt;"
        );
    }

    #[test]
    fn test_index_lists_every_mode() {
        let page = pages::index();

        for mode in Mode::ALL {
            assert!(page.contains(&format!(r#"value="{}""#, mode.as_str())));
        }
        assert!(page.contains(r#"<option value="scientific" selected>"#));
        assert!(page.contains(r#"action="/lyrics""#));
    }

    #[test]
    fn test_lyrics_page_escapes_content() {
        let rewrite = Rewrite {
            lyrics: "<script>alert(1)</script>".to_string(),
            transformed: "Verse one\nVerse two".to_string(),
            mode: Mode::Engineering,
        };

        let page = pages::lyrics("Song & Dance", "Band", &rewrite);

        assert!(!page.contains("<script>"));
        assert!(page.contains("&lt;script&gt;"));
        assert!(page.contains("Song &amp; Dance"));
        assert!(page.contains("Verse one\nVerse two"));
        assert!(page.contains("Engineering"));
    }

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            status_for(&RewriteError::lyrics_not_found("a", "b")),
            StatusCode::NOT_FOUND
        );
        assert_eq!(status_for(&RewriteError::EmptyInput), StatusCode::BAD_REQUEST);
        assert_eq!(
            status_for(&RewriteError::configuration("missing")),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            status_for(&RewriteError::timeout(5)),
            StatusCode::BAD_GATEWAY
        );
    }
}
