//! The single question-answering page

use axum::{extract::State, response::Html};

use crate::config::{Locale, QaConfig};
use crate::server::state::AppState;
use crate::types::MediaType;

const TEMPLATE: &str = include_str!("assets/index.html");

/// GET / - Serve the page
pub async fn index(State(state): State<AppState>) -> Html<String> {
    Html(render_page(state.config()))
}

/// Fill the page template from configuration
pub fn render_page(config: &QaConfig) -> String {
    let accept = MediaType::ALL
        .iter()
        .map(|m| format!(".{}", m.extension()))
        .collect::<Vec<_>>()
        .join(",");
    let lang = match config.ui.locale {
        Locale::En => "en",
        Locale::PtBr => "pt-BR",
    };

    TEMPLATE
        .replace("{{LANG}}", lang)
        .replace("{{TITLE}}", &escape_html(&config.ui.title))
        .replace("{{SUBTITLE}}", &escape_html(&config.ui.subtitle))
        .replace("{{ACCEPT}}", &accept)
        .replace("{{MIN_K}}", &config.retrieval.min_k.to_string())
        .replace("{{MAX_K}}", &config.retrieval.max_k.to_string())
        .replace("{{DEFAULT_K}}", &config.retrieval.default_k.to_string())
}

fn escape_html(raw: &str) -> String {
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
