//! The index page.
//!
//! Deployment pipelines check that configuration and secret injection
//! reached the running workload by looking for literal strings on `/`. The
//! values are read from the environment on every request, and the page
//! layout is positional: the info, secrets and configs blocks are the
//! second, third and fourth children of `<body>`, each with a heading
//! followed by its first value.

use std::fmt::{self, Write};

use axum::{extract::State, response::Html};

use crate::config::{AppConfig, EnvSource};
use crate::http::response::AppError;
use crate::http::server::AppState;

/// Status line shown while the process is serving.
pub const RUNNING: &str = "Running";

/// Everything rendered on `/`. Unset variables are `None` and render empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexView {
    pub app_name: String,
    pub company_name: String,
    pub chart_version: Option<String>,
    pub docker_tag: Option<String>,
    pub secret_one: Option<String>,
    pub secret_two: Option<String>,
    pub config_one: Option<String>,
    pub config_two: Option<String>,
}

impl IndexView {
    pub fn from_env(app: &AppConfig, env: &dyn EnvSource) -> Self {
        Self {
            app_name: app.name.clone(),
            company_name: app.company.clone(),
            chart_version: env.var("CHART_VERSION"),
            docker_tag: env.var("DOCKER_TAG"),
            secret_one: env.var("SECRET_ONE"),
            secret_two: env.var("SECRET_TWO"),
            config_one: env.var("CONFIG_ONE"),
            config_two: env.var("CONFIG_TWO"),
        }
    }

    pub fn render(&self) -> Result<String, fmt::Error> {
        let mut out = String::with_capacity(1024);

        writeln!(out, "<!DOCTYPE html>")?;
        writeln!(out, "<html lang=\"en\">")?;
        writeln!(out, "<head><meta charset=\"utf-8\"><title>{}</title></head>", Escaped(&self.app_name))?;
        writeln!(out, "<body>")?;
        writeln!(out, "<h1>{}</h1>", Escaped(&self.app_name))?;

        section(&mut out, "info", &[
            ("app_name", Some(self.app_name.as_str())),
            ("company_name", Some(self.company_name.as_str())),
            ("chart_version", self.chart_version.as_deref()),
            ("docker_tag", self.docker_tag.as_deref()),
            ("status", Some(RUNNING)),
        ])?;
        section(&mut out, "secrets", &[
            ("SECRET_ONE", self.secret_one.as_deref()),
            ("SECRET_TWO", self.secret_two.as_deref()),
        ])?;
        section(&mut out, "configs", &[
            ("CONFIG_ONE", self.config_one.as_deref()),
            ("CONFIG_TWO", self.config_two.as_deref()),
        ])?;

        writeln!(out, "</body>")?;
        writeln!(out, "</html>")?;
        Ok(out)
    }
}

fn section(out: &mut String, title: &str, rows: &[(&str, Option<&str>)]) -> fmt::Result {
    writeln!(out, "<div class=\"{title}\">")?;
    writeln!(out, "<h2>{title}</h2>")?;
    for (key, value) in rows {
        writeln!(out, "<p>{key}: {}</p>", Escaped(value.unwrap_or_default()))?;
    }
    writeln!(out, "</div>")
}

/// HTML text escaping.
struct Escaped<'a>(&'a str);

impl fmt::Display for Escaped<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for c in self.0.chars() {
            match c {
                '&' => f.write_str("&amp;")?,
                '<' => f.write_str("&lt;")?,
                '>' => f.write_str("&gt;")?,
                '"' => f.write_str("&quot;")?,
                '\'' => f.write_str("&#39;")?,
                c => f.write_char(c)?,
            }
        }
        Ok(())
    }
}

/// HTML-escape `value` the way the page renders it.
pub fn escape_html(value: &str) -> String {
    Escaped(value).to_string()
}

/// Whether `page` shows `value` as rendered text.
pub fn shows_value(page: &str, value: &str) -> bool {
    page.contains(&escape_html(value))
}

/// `GET /`
pub async fn index(State(state): State<AppState>) -> Result<Html<String>, AppError> {
    let view = IndexView::from_env(&state.config.app, state.env.as_ref());
    Ok(Html(view.render()?))
}
