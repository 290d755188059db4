//! Server-rendered HTML pages.

use axum::{extract::State, response::Html};
use hvp_core::{FIELDS, Sample, schema::FieldKind, store::SampleStore};

use crate::{AppState, error::Error};

const STYLE: &str = "\
body { font-family: sans-serif; margin: 2rem; }
nav a { margin-right: 1rem; }
table { border-collapse: collapse; font-size: 0.85rem; }
th, td { border: 1px solid #ccc; padding: 0.25rem 0.5rem; white-space: nowrap; }
th { background: #f4f4f4; position: sticky; top: 0; }
td.date { font-variant-numeric: tabular-nums; }
.error { color: #b00020; }";

/// Escape text for use in HTML content and quoted attribute values.
pub fn escape(raw: &str) -> String {
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

fn layout(title: &str, nav: bool, body: &str) -> Html<String> {
  let nav = if nav {
    r#"<nav><a href="/">Home</a><a href="/samples">Samples</a><a href="/api/samples">JSON</a><a href="/logout">Log out</a></nav>"#
  } else {
    ""
  };
  Html(format!(
    "<!doctype html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n\
     <title>{title} · HVP</title>\n<style>\n{STYLE}\n</style>\n</head>\n\
     <body>\n{nav}\n{body}\n</body>\n</html>\n",
    title = escape(title),
  ))
}

// ─── Login ───────────────────────────────────────────────────────────────────

pub fn login_page(error: Option<&str>, next: &str) -> Html<String> {
  let error = error
    .map(|e| format!("<p class=\"error\">{}</p>\n", escape(e)))
    .unwrap_or_default();
  let body = format!(
    "<h1>Human Virome Project</h1>\n{error}\
     <form method=\"post\" action=\"/login\">\n\
     <input type=\"hidden\" name=\"next\" value=\"{next}\">\n\
     <label>Password <input type=\"password\" name=\"password\" autofocus></label>\n\
     <button type=\"submit\">Log in</button>\n\
     </form>",
    next = escape(next),
  );
  layout("Log in", false, &body)
}

// ─── Index ───────────────────────────────────────────────────────────────────

/// `GET /`
pub async fn index<S>(State(state): State<AppState<S>>) -> Result<Html<String>, Error>
where
  S: SampleStore + Clone + 'static,
{
  let count = state.store.count_samples().await.map_err(Error::store)?;
  let body = format!(
    "<h1>Human Virome Project</h1>\n\
     <p>{count} sample{} registered.</p>\n\
     <p><a href=\"/samples\">Browse samples</a></p>",
    if count == 1 { "" } else { "s" },
  );
  Ok(layout("Home", true, &body))
}

// ─── Samples ─────────────────────────────────────────────────────────────────

fn samples_table(samples: &[Sample]) -> String {
  let mut html = String::from("<table>\n<thead><tr>");
  for def in FIELDS {
    html.push_str(&format!("<th>{}</th>", def.name));
  }
  html.push_str("</tr></thead>\n<tbody>\n");

  for sample in samples {
    html.push_str("<tr>");
    for (def, value) in FIELDS.iter().zip(sample.values()) {
      let class = match def.kind {
        FieldKind::Date => " class=\"date\"",
        _ => "",
      };
      let text = value.map(|v| escape(&v.to_string())).unwrap_or_default();
      html.push_str(&format!("<td{class}>{text}</td>"));
    }
    html.push_str("</tr>\n");
  }

  html.push_str("</tbody>\n</table>");
  html
}

/// `GET /samples`: every sample, one column per field.
pub async fn samples<S>(State(state): State<AppState<S>>) -> Result<Html<String>, Error>
where
  S: SampleStore + Clone + 'static,
{
  let samples = state.store.list_samples().await.map_err(Error::store)?;
  let body = format!(
    "<h1>Samples</h1>\n<p>{} rows</p>\n{}",
    samples.len(),
    samples_table(&samples)
  );
  Ok(layout("Samples", true, &body))
}
