//! Rendering of code-cell outputs.

use std::sync::LazyLock;

use regex::Regex;

use docsmith_shared::{MimeBundle, Output};

/// MIME types tried for rich outputs, richest first.
const DISPLAY_PRIORITY: &[&str] = &[
    "text/html",
    "text/markdown",
    "image/png",
    "image/jpeg",
    "image/svg+xml",
    "text/latex",
    "text/plain",
];

/// Render one output as a Markdown block, or `None` if it has nothing to show.
pub(crate) fn render_output(output: &Output, image_alt: &str) -> Option<String> {
    let block = match output {
        Output::Stream { text, .. } => indent(&text.joined()),
        Output::ExecuteResult { data, .. } | Output::DisplayData { data } => {
            render_bundle(data, image_alt)?
        }
        Output::Error {
            ename,
            evalue,
            traceback,
        } => {
            let text = if traceback.is_empty() {
                format!("{ename}: {evalue}")
            } else {
                traceback.join("\n")
            };
            let cleaned = strip_ansi(&text)
                .lines()
                .map(str::trim_end)
                .collect::<Vec<_>>()
                .join("\n");
            indent(&cleaned)
        }
    };

    if block.trim().is_empty() {
        None
    } else {
        Some(block)
    }
}

/// Pick the richest representation in a MIME bundle.
fn render_bundle(data: &MimeBundle, image_alt: &str) -> Option<String> {
    DISPLAY_PRIORITY.iter().find_map(|mime| {
        let payload = data.text(mime)?;
        if payload.trim().is_empty() {
            return None;
        }
        let rendered = match *mime {
            "image/png" | "image/jpeg" => embed_image(mime, &payload, image_alt),
            "text/plain" => indent(&payload),
            _ => payload.trim_end().to_string(),
        };
        Some(rendered)
    })
}

/// Inline a base64 image as a Markdown data URI.
fn embed_image(mime: &str, base64: &str, alt: &str) -> String {
    let data: String = base64.chars().filter(|c| !c.is_whitespace()).collect();
    format!("![{alt}](data:{mime};base64,{data})")
}

/// Indent every non-empty line by four spaces.
fn indent(text: &str) -> String {
    overwrite_carriage_returns(text)
        .trim_end_matches('\n')
        .lines()
        .map(|line| {
            if line.is_empty() {
                String::new()
            } else {
                format!("    {line}")
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Keep what a terminal would show for each line: the last non-empty
/// segment after a bare `\r` (progress bars redraw this way).
fn overwrite_carriage_returns(text: &str) -> String {
    if !text.contains('\r') {
        return text.to_string();
    }
    text.replace("\r\n", "\n")
        .split('\n')
        .map(|line| line.rsplit('\r').find(|seg| !seg.is_empty()).unwrap_or(""))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Remove ANSI colour/cursor escape sequences.
pub(crate) fn strip_ansi(text: &str) -> String {
    static ANSI_RE: LazyLock<Regex> = LazyLock::new(|| {
        Regex::new(r"\x1b\[[0-9;?]*[A-Za-z]|\x1b\][^\x07]*\x07").expect("valid regex")
    });

    ANSI_RE.replace_all(text, "").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use docsmith_shared::MultilineString;

    fn bundle(json: &str) -> MimeBundle {
        serde_json::from_str(json).expect("bundle")
    }

    #[test]
    fn stream_output_is_indented() {
        let out = Output::Stream {
            name: "stdout".into(),
            text: MultilineString::Lines(vec!["a\n".into(), "\n".into(), "b\n".into()]),
        };
        assert_eq!(render_output(&out, "x").as_deref(), Some("    a\n\n    b"));
    }

    #[test]
    fn progress_bar_redraws_keep_final_state() {
        let out = Output::Stream {
            name: "stderr".into(),
            text: MultilineString::Single("10%\r50%\r100%\ndone\r\n".into()),
        };
        assert_eq!(render_output(&out, "x").as_deref(), Some("    100%\n    done"));
    }

    #[test]
    fn trailing_carriage_return_keeps_text() {
        assert_eq!(overwrite_carriage_returns("step 3/3\r"), "step 3/3");
        assert_eq!(overwrite_carriage_returns("a\rb\nc"), "b\nc");
    }

    #[test]
    fn empty_stream_renders_nothing() {
        let out = Output::Stream {
            name: "stderr".into(),
            text: MultilineString::Single("\n".into()),
        };
        assert_eq!(render_output(&out, "x"), None);
    }

    #[test]
    fn html_beats_plain_text() {
        let data = bundle(r#"{"text/html": ["<table>\n", "</table>\n"], "text/plain": "df"}"#);
        let out = Output::ExecuteResult {
            data,
            execution_count: Some(1),
        };
        assert_eq!(render_output(&out, "x").as_deref(), Some("<table>\n</table>"));
    }

    #[test]
    fn png_becomes_data_uri_with_alt() {
        let data = bundle(r#"{"image/png": "iVBOR\nw0KG\n", "text/plain": "<Figure>"}"#);
        let out = Output::DisplayData { data };
        assert_eq!(
            render_output(&out, "Cell Output").as_deref(),
            Some("![Cell Output](data:image/png;base64,iVBORw0KG)")
        );
    }

    #[test]
    fn jpeg_uses_its_own_mime() {
        let data = bundle(r#"{"image/jpeg": "/9j/4AAQ"}"#);
        let out = Output::DisplayData { data };
        assert_eq!(
            render_output(&out, "Photo").as_deref(),
            Some("![Photo](data:image/jpeg;base64,/9j/4AAQ)")
        );
    }

    #[test]
    fn structured_only_bundle_renders_nothing() {
        let data = bundle(r#"{"application/vnd.jupyter.widget-view+json": {"model_id": "m"}}"#);
        assert_eq!(render_output(&Output::DisplayData { data }, "x"), None);
    }

    #[test]
    fn error_traceback_is_cleaned() {
        let out = Output::Error {
            ename: "ValueError".into(),
            evalue: "bad".into(),
            traceback: vec![
                "\u{1b}[0;31m---------\u{1b}[0m   ".into(),
                "\u{1b}[0;31mValueError\u{1b}[0m: bad".into(),
            ],
        };
        assert_eq!(
            render_output(&out, "x").as_deref(),
            Some("    ---------\n    ValueError: bad")
        );
    }

    #[test]
    fn error_without_traceback_uses_name_and_value() {
        let out = Output::Error {
            ename: "KeyError".into(),
            evalue: "'k'".into(),
            traceback: vec![],
        };
        assert_eq!(render_output(&out, "x").as_deref(), Some("    KeyError: 'k'"));
    }

    #[test]
    fn strip_ansi_handles_osc_links() {
        let text = "\u{1b}]8;;file:///a.py\u{7}a.py\u{1b}]8;;\u{7} line 3";
        assert_eq!(strip_ansi(text), "a.py line 3");
    }
}
