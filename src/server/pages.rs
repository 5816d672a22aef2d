//! Server-rendered pages. Kept deliberately plain: the board page carries the
//! snapshot and hands the rest to `board.js`.

use std::fmt::Write;

use axum::{
    extract::{Path, State},
    http::{header, HeaderMap},
    response::{Html, IntoResponse},
};

use super::AppState;
use crate::entity::NoteView;
use crate::error::BoardError;
use crate::lang::{detect_language, texts, Texts};

const BOARD_JS: &str = include_str!("../../static/board.js");

const STYLE: &str = "body{font-family:system-ui,sans-serif;max-width:40rem;margin:2rem auto;padding:0 1rem;color:#222}\
.thought{padding:.75rem 1rem;margin:.5rem 0;border-radius:6px;white-space:pre-wrap;word-wrap:break-word}\
textarea{width:100%;box-sizing:border-box;padding:.5rem;font:inherit;resize:none}\
button{margin-top:.5rem;padding:.4rem 1rem;font:inherit}";

pub async fn landing() -> Html<String> {
    Html(render_landing())
}

pub async fn board(
    State(state): State<AppState>,
    Path(board_id): Path<String>,
    headers: HeaderMap,
) -> Result<Html<String>, BoardError> {
    let accept = headers
        .get(header::ACCEPT_LANGUAGE)
        .and_then(|v| v.to_str().ok());
    let lang = detect_language(accept);

    let notes = state.sync.snapshot(&board_id).await?;
    Ok(Html(render_board(&board_id, &notes, lang, texts(lang))))
}

pub async fn board_script() -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "application/javascript; charset=utf-8")],
        BOARD_JS,
    )
}

pub fn render_landing() -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head><meta charset="utf-8"><title>Thoughts</title><style>{STYLE}</style></head>
<body>
<h1>Thoughts</h1>
<form onsubmit="var b=this.board.value.trim();if(b){{location.href='/'+encodeURIComponent(b);}}return false;">
<input name="board" placeholder="board name" autofocus>
<button type="submit">Open</button>
</form>
</body>
</html>
"#
    )
}

pub fn render_board(board_id: &str, notes: &[NoteView], lang: &str, texts: Texts) -> String {
    let mut items = String::new();
    for note in notes {
        let _ = writeln!(
            items,
            r#"<div class="thought" data-id="{}" style="background-color:{}">{}</div>"#,
            note.id,
            escape_html(&note.color),
            escape_html(&note.content)
        );
    }

    format!(
        r#"<!DOCTYPE html>
<html lang="{lang}">
<head><meta charset="utf-8"><title>{title}</title><style>{STYLE}</style></head>
<body>
<h1>{title}</h1>
<textarea id="thought-input" rows="2" placeholder="{placeholder}"></textarea>
<button id="submit-thought">{submit}</button>
<div id="thought-board">
{items}</div>
<script>window.boardId = {board_json}; window.boardTexts = {texts_json};</script>
<script src="/static/board.js"></script>
</body>
</html>
"#,
        title = escape_html(board_id),
        placeholder = escape_html(texts.add_thought_placeholder),
        submit = escape_html(texts.submit_button),
        board_json = script_json(board_id),
        texts_json = script_json_texts(texts),
    )
}

/// Escape text for element content and double-quoted attributes.
pub fn escape_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
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

// JSON string literal that cannot close the surrounding <script>.
fn script_json(value: &str) -> String {
    serde_json::Value::from(value)
        .to_string()
        .replace("</", "<\\/")
}

fn script_json_texts(texts: Texts) -> String {
    serde_json::json!({
        "submit_button": texts.submit_button,
        "submitting_button": texts.submitting_button,
    })
    .to_string()
    .replace("</", "<\\/")
}
