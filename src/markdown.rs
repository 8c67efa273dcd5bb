// Copyright 2025 Fernando Borretti
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use pulldown_cmark::Event;
use pulldown_cmark::Options;
use pulldown_cmark::Parser;
use pulldown_cmark::html::push_html;

/// Render an example sentence written in Markdown to inline HTML.
///
/// Raw HTML in the source is escaped rather than passed through, and a lone
/// paragraph is unwrapped so the sentence can sit inside other markup.
pub fn sentence_to_html(markdown: &str) -> String {
    let parser = Parser::new_ext(markdown, Options::ENABLE_STRIKETHROUGH);
    let events = parser.map(|event| match event {
        Event::Html(html) | Event::InlineHtml(html) => Event::Text(html),
        _ => event,
    });
    let mut html = String::new();
    push_html(&mut html, events);
    let trimmed = html.trim_end();
    match trimmed
        .strip_prefix("<p>")
        .and_then(|rest| rest.strip_suffix("</p>"))
    {
        Some(inner) if !inner.contains("<p>") => inner.to_string(),
        _ => html,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_emphasis() {
        assert_eq!(
            sentence_to_html("Der *Hund* bellt."),
            "Der <em>Hund</em> bellt."
        );
    }

    #[test]
    fn test_raw_html_is_escaped() {
        assert_eq!(
            sentence_to_html("a <script>x</script> b"),
            "a &lt;script&gt;x&lt;/script&gt; b"
        );
    }

    #[test]
    fn test_multiple_paragraphs_are_kept() {
        assert_eq!(sentence_to_html("one\n\ntwo"), "<p>one</p>\n<p>two</p>\n");
    }
}
