//! Server-side rendering of the single page: theme, sidebar, main panel.

use crate::analyze::Analysis;
use crate::models::Mode;
use crate::session::{Notice, NoticeKind};
use crate::sysmon::MemorySnapshot;

/// Base stylesheet, applied on every render.
const BASE_CSS: &str = r#"
@import url('https://fonts.googleapis.com/css2?family=Roboto:wght@400;700&display=swap');

body {
    font-family: 'Roboto', sans-serif;
    background-color: #f4f7f6;
    color: #2E4053;
    margin: 0;
    transition: background-color 0.5s ease-in-out;
}

.layout { display: flex; min-height: 100vh; }

h1 {
    font-size: 3rem;
    font-weight: 700;
    text-align: center;
    margin-bottom: 0.5rem;
    transition: color 0.5s ease-in-out;
}

h3 {
    text-align: center;
    color: #2E4053;
    margin-bottom: 2rem;
    transition: opacity 0.5s ease-in-out;
}

button {
    background-color: #2E86C1;
    color: white;
    border-radius: 5px;
    border: none;
    padding: 10px 24px;
    font-size: 1rem;
    font-weight: 600;
    cursor: pointer;
    transition: background-color 0.3s ease;
}

button:hover { background-color: #1b4f72; }

input, textarea {
    font-size: 1.1rem;
    padding: 10px;
    border: 1px solid #dfe6e9;
    border-radius: 4px;
    box-sizing: border-box;
}

.sidebar {
    width: 270px;
    padding: 1.2rem;
    background: #eef2f1;
    border-right: 1px solid #dfe6e9;
}

.sidebar form { margin-bottom: 1rem; }
.sidebar .memory { font-size: 0.9rem; margin-bottom: 1rem; }
.sidebar label { display: block; margin: 0.3rem 0; }

.main { flex: 1; padding: 2rem 3rem; }
.main textarea { width: 100%; min-height: 140px; }

.notice { padding: 10px 14px; border-radius: 4px; margin-bottom: 0.6rem; }
.notice.info { background: #d6eaf8; }
.notice.warning { background: #fdebd0; }
.notice.error { background: #fadbd8; }

.result { text-align: center; font-size: 1.2rem; margin-top: 1.5rem; }
.verdict { margin-top: 0.6rem; font-style: italic; }
.model-id { text-align: center; color: #85929e; font-size: 0.85rem; margin-top: 2rem; }
"#;

/// Extra rules injected only while advanced mode is active.
const ADVANCED_CSS: &str = r#"
body.advanced-mode { background-color: #e8f0fe; }
.fade-in { animation: fadeIn 1s ease-in-out; }
@keyframes fadeIn {
    from { opacity: 0; }
    to { opacity: 1; }
}
"#;

/// Whether a pipeline handle is available for the active mode.
#[derive(Debug, Clone)]
pub enum ModelStatus {
    Ready { model_id: String },
    Unavailable(String),
}

/// Everything one render needs, resolved top-to-bottom by the handler.
pub struct PageContext {
    pub selected_mode: Mode,
    pub active_mode: Mode,
    /// Advanced is selected but the gate has not been passed yet.
    pub gate_pending: bool,
    pub notices: Vec<Notice>,
    pub memory: Option<MemorySnapshot>,
    pub model_status: ModelStatus,
    pub input_text: String,
    pub analysis: Option<Analysis>,
}

pub fn render(ctx: &PageContext) -> String {
    let advanced = ctx.active_mode == Mode::Advanced;
    let body_class = if advanced { " class=\"advanced-mode\"" } else { "" };
    let advanced_css = if advanced { ADVANCED_CSS } else { "" };

    let (title, title_class) = if advanced {
        ("SentiAnalyze: Advanced Emotion Detection", " class=\"fade-in\"")
    } else {
        ("SentiAnalyze: Basic Sentiment Analysis", "")
    };

    format!(
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n\
         <meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n\
         <title>SentiAnalyze</title>\n<style>{base}{advanced_css}</style>\n</head>\n\
         <body{body_class}>\n<div class=\"layout\">\n{sidebar}\n<div class=\"main\">\n\
         <h1{title_class}>{title}</h1>\n<h3>Analyze sentiment with style and precision</h3>\n\
         {notices}{status}{form}{result}\n{footer}\n</div>\n</div>\n</body>\n</html>\n",
        base = BASE_CSS,
        advanced_css = advanced_css,
        body_class = body_class,
        sidebar = sidebar(ctx),
        title_class = title_class,
        title = title,
        notices = notices_html(&ctx.notices),
        status = model_status_html(&ctx.model_status),
        form = analyze_form(&ctx.input_text),
        result = result_html(ctx.analysis.as_ref()),
        footer = footer_html(&ctx.model_status),
    )
}

fn sidebar(ctx: &PageContext) -> String {
    let mut out = String::from("<div class=\"sidebar\">\n");

    out.push_str(
        "<form method=\"post\" action=\"/reload\"><button type=\"submit\">Reload App</button></form>\n",
    );

    match ctx.memory {
        Some(snapshot) => out.push_str(&format!(
            "<div class=\"memory\">Memory: {:.1}% used ({} / {} MB)</div>\n",
            snapshot.percent_used(),
            snapshot.used_mb,
            snapshot.total_mb
        )),
        None => out.push_str(
            "<div class=\"notice warning\">Memory stats unavailable on this platform.</div>\n",
        ),
    }

    out.push_str("<form method=\"post\" action=\"/mode\">\n<strong>Select Mode</strong>\n");
    for mode in Mode::ALL {
        let checked = if mode == ctx.selected_mode { " checked" } else { "" };
        out.push_str(&format!(
            "<label><input type=\"radio\" name=\"mode\" value=\"{}\" onchange=\"this.form.submit()\"{}> {}</label>\n",
            mode.tag(),
            checked,
            mode.display_name()
        ));
    }
    out.push_str("<noscript><button type=\"submit\">Apply</button></noscript>\n</form>\n");

    if ctx.gate_pending {
        out.push_str(
            "<form method=\"post\" action=\"/unlock\">\n\
             <label for=\"password\">Enter password for advanced mode</label>\n\
             <input type=\"password\" id=\"password\" name=\"password\">\n\
             <button type=\"submit\">Unlock</button>\n</form>\n",
        );
    }

    if ctx.active_mode == Mode::Advanced {
        out.push_str("<details><summary>Show Available Emotion Classes</summary>\n<ol start=\"0\">\n");
        for label in ctx.active_mode.model_spec().labels {
            out.push_str(&format!("<li>{}</li>\n", escape_html(label)));
        }
        out.push_str("</ol></details>\n");
    }

    out.push_str("</div>");
    out
}

fn notices_html(notices: &[Notice]) -> String {
    let mut out = String::new();
    for notice in notices {
        let class = match notice.kind {
            NoticeKind::Info => "info",
            NoticeKind::Warning => "warning",
            NoticeKind::Error => "error",
        };
        out.push_str(&format!(
            "<div class=\"notice {}\">{}</div>\n",
            class,
            escape_html(&notice.text)
        ));
    }
    out
}

fn model_status_html(status: &ModelStatus) -> String {
    match status {
        ModelStatus::Ready { .. } => String::new(),
        ModelStatus::Unavailable(reason) => format!(
            "<div class=\"notice error\">The sentiment analysis model is unavailable. {}</div>\n",
            escape_html(reason)
        ),
    }
}

fn analyze_form(input_text: &str) -> String {
    format!(
        "<form method=\"post\" action=\"/analyze\">\n\
         <label for=\"text\">Enter text for analysis:</label>\n\
         <textarea id=\"text\" name=\"text\">{}</textarea>\n\
         <button type=\"submit\">Analyze</button>\n</form>\n",
        escape_html(input_text)
    )
}

fn result_html(analysis: Option<&Analysis>) -> String {
    let Some(analysis) = analysis else {
        return String::new();
    };

    match analysis {
        Analysis::Classified { label, score, verdict } => format!(
            "<div class=\"result\">\n\
             <strong>Predicted Label:</strong> {}<br>\n\
             <strong>Confidence Score:</strong> {:.2}\n\
             <div class=\"verdict\">{}</div>\n</div>\n",
            escape_html(label),
            score,
            escape_html(verdict)
        ),
        Analysis::EmptyInput => {
            "<div class=\"notice warning\">Please enter some text to analyze.</div>\n".to_string()
        }
        Analysis::ModelUnavailable(_) => {
            "<div class=\"notice error\">The sentiment analysis model is unavailable.</div>\n"
                .to_string()
        }
        Analysis::Failed(message) => format!(
            "<div class=\"notice error\">An error occurred during analysis: {}</div>\n",
            escape_html(message)
        ),
        Analysis::MalformedOutput => {
            "<div class=\"notice error\">Unexpected response format from the model.</div>\n"
                .to_string()
        }
    }
}

fn footer_html(status: &ModelStatus) -> String {
    match status {
        ModelStatus::Ready { model_id } => format!(
            "<div class=\"model-id\">Model: {}</div>",
            escape_html(model_id)
        ),
        ModelStatus::Unavailable(_) => String::new(),
    }
}

fn escape_html(text: &str) -> String {
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
