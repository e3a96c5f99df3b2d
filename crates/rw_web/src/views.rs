use rw_core::{ArticleOutput, Tone, LEDE_MAX_CHARS, MAX_INPUT_CHARS, TITLE_MAX_CHARS};

use crate::form::{FormSnapshot, ViewState};

const STYLE: &str = "body{font-family:sans-serif;max-width:70rem;margin:2rem auto;padding:0 1rem}\
main{display:grid;grid-template-columns:1fr 1fr;gap:2rem}\
textarea,input,select{width:100%;box-sizing:border-box}\
.counter{font-size:.8rem;color:#666;text-align:right}\
.error{background:#fde8e8;padding:1rem}";

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

fn counter(value: &str, max: usize) -> String {
    format!("<div class=\"counter\">{} / {}</div>", value.chars().count(), max)
}

fn field(id: &str, label: &str, value: &str, rows: usize, max: Option<usize>) -> String {
    let control = if rows > 1 {
        format!("<textarea id=\"{id}\" rows=\"{rows}\" readonly>{}</textarea>", escape(value))
    } else {
        format!("<input type=\"text\" id=\"{id}\" value=\"{}\" readonly>", escape(value))
    };
    format!(
        "<div><label for=\"{id}\">{label}</label>{control}{}</div>",
        max.map(|m| counter(value, m)).unwrap_or_default()
    )
}

fn tone_options(selected: Tone) -> String {
    Tone::ALL
        .iter()
        .map(|tone| {
            format!(
                "<option value=\"{}\"{}>{}</option>",
                escape(tone.id()),
                if *tone == selected { " selected" } else { "" },
                tone.label()
            )
        })
        .collect()
}

const COPY_ALL: &str = "navigator.clipboard.writeText(document.getElementById('copy-all').value)";

/// Re-enables submit only once the textarea holds something besides whitespace.
const SUBMIT_TOGGLE: &str =
    " oninput=\"document.getElementById('submit').disabled = !this.value.trim()\"";

fn article_panel(article: &ArticleOutput) -> String {
    let copy = article.to_plain_text();
    [
        "<div class=\"result\">".to_string(),
        field("output-title", "Titre (SEO)", &article.title, 1, Some(TITLE_MAX_CHARS)),
        field("output-lede", "Chapeau", &article.lede, 3, Some(LEDE_MAX_CHARS)),
        field("output-hook", "Accroche", &article.hook, 1, None),
        field("output-section1-intertitle", "Intertitre 1", &article.section1.intertitle, 1, None),
        field("output-section1-paragraph", "Paragraphe 1", &article.section1.paragraph, 5, None),
        field("output-section2-intertitle", "Intertitre 2", &article.section2.intertitle, 1, None),
        field("output-section2-paragraph", "Paragraphe 2", &article.section2.paragraph, 5, None),
        format!("<textarea id=\"copy-all\" hidden>{}</textarea>", escape(&copy)),
        format!("<button type=\"button\" onclick=\"{}\">Copier tout</button>", COPY_ALL),
        "</div>".to_string(),
    ]
    .concat()
}

fn output_panel(view: &ViewState) -> String {
    match view {
        ViewState::Idle => {
            "<p class=\"idle\">Le résultat de l'optimisation apparaîtra ici.</p>".to_string()
        }
        ViewState::Busy => "<p class=\"busy\">Génération de l'article...</p>".to_string(),
        ViewState::Error { message } => format!(
            "<div class=\"error\"><h3>Erreur</h3><p>{}</p></div>",
            escape(message)
        ),
        ViewState::Ready { article, .. } => article_panel(article),
    }
}

pub fn render_page(snapshot: &FormSnapshot) -> String {
    let busy = matches!(snapshot.view, ViewState::Busy);
    let blank = snapshot.input.raw_text.trim().is_empty();
    let refresh = if busy {
        "<meta http-equiv=\"refresh\" content=\"2\">"
    } else {
        ""
    };
    let button_label = if busy { "Analyse en cours..." } else { "Optimiser le texte" };

    format!(
        "<!DOCTYPE html>\n<html lang=\"fr\"><head><meta charset=\"utf-8\">{refresh}\
<title>Rédacteur Web Pro</title><style>{style}</style></head><body>\
<header><h1>Rédacteur Web Pro</h1>\
<p>Transformez votre texte brut en article journalistique optimisé avec l'IA.</p></header>\
<main><section><h2>1. Collez votre texte brut</h2>\
<form method=\"post\" action=\"/generate\">\
<textarea id=\"raw-text\" name=\"text\" rows=\"15\" maxlength=\"{max}\" \
placeholder=\"[COLLER ICI VOTRE TEXTE BRUT]\" required{toggle}>{text}</textarea>\
{count}\
<label for=\"tone\">Ton</label><select id=\"tone\" name=\"tone\">{options}</select>\
<button id=\"submit\" type=\"submit\"{disabled}>{button_label}</button>\
</form></section>\
<section><h2>2. Résultat optimisé</h2>{output}</section></main></body></html>",
        style = STYLE,
        max = MAX_INPUT_CHARS,
        text = escape(&snapshot.input.raw_text),
        count = counter(&snapshot.input.raw_text, MAX_INPUT_CHARS),
        options = tone_options(snapshot.input.tone),
        toggle = if busy { "" } else { SUBMIT_TOGGLE },
        disabled = if busy || blank { " disabled" } else { "" },
        output = output_panel(&snapshot.view),
    )
}
