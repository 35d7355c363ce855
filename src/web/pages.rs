//! HTML pages. Every interpolated value goes through [`escape`].

use crate::mode::Mode;
use crate::rewriter::Rewrite;

/// Escape text for HTML element content and attribute values.
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

fn layout(title: &str, body: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>{title} - SongReWriter</title>
</head>
<body>
<nav><a href="/">Home</a> | <a href="/about">About</a></nav>
<main>
{body}
</main>
</body>
</html>
"#,
        title = escape(title),
    )
}

fn mode_options() -> String {
    Mode::ALL
        .iter()
        .map(|mode| {
            let selected = if *mode == Mode::default() { " selected" } else { "" };
            format!(
                r#"<option value="{}"{selected}>{}</option>"#,
                mode.as_str(),
                mode.label()
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn index() -> String {
    let body = format!(
        r#"<h1>SongReWriter</h1>
<p>Convert song lyrics into technical prose.</p>
<form action="/lyrics" method="post">
<label>Title <input name="title" required></label>
<label>Artist <input name="artist" required></label>
<label>Mode <select name="mode">
{}
</select></label>
<button type="submit">Rewrite</button>
</form>"#,
        mode_options()
    );
    layout("Home", &body)
}

pub fn lyrics(title: &str, artist: &str, rewrite: &Rewrite) -> String {
    let body = format!(
        r#"<h1>{title} by {artist}</h1>
<section>
<h2>Original Lyrics</h2>
<pre class="lyrics">{lyrics}</pre>
</section>
<section>
<h2>Technical Prose Version ({mode})</h2>
<pre class="transformed">{transformed}</pre>
</section>"#,
        title = escape(title),
        artist = escape(artist),
        lyrics = escape(&rewrite.lyrics),
        mode = rewrite.mode.label(),
        transformed = escape(&rewrite.transformed),
    );
    layout("Lyrics", &body)
}

pub fn about() -> String {
    let body = format!(
        r#"<h1>About SongReWriter</h1>
<p>SongReWriter looks up a song's lyrics and rewrites them in a technical register:
scientific, bureaucratic, engineering, military or medical.</p>
<p>Version {}. MIT License.</p>"#,
        env!("CARGO_PKG_VERSION")
    );
    layout("About", &body)
}

pub fn error(message: &str) -> String {
    let body = format!(
        r#"<h1>Error</h1>
<p class="error">{}</p>
<p><a href="/">Try again</a></p>"#,
        escape(message)
    );
    layout("Error", &body)
}
