use minijinja::Environment;
use movie_agent::{Decade, Genre, ModelName, Mood};
use pulldown_cmark::{CowStr, Event, Options, Parser, Tag, html};
use serde::Serialize;

use crate::form::FormValues;

const INDEX_TEMPLATE: &str = "index.html";

/// Compiled page templates, shared by every request
pub struct Pages {
    env: Environment<'static>,
}

impl Pages {
    pub fn new() -> Result<Self, minijinja::Error> {
        let mut env = Environment::new();
        env.add_template(INDEX_TEMPLATE, include_str!("../templates/index.html"))?;
        Ok(Self { env })
    }

    pub fn render(&self, view: &PageView) -> Result<String, minijinja::Error> {
        self.env.get_template(INDEX_TEMPLATE)?.render(view)
    }
}

#[derive(Debug, Serialize)]
pub struct Choice {
    pub value: String,
    pub selected: bool,
}

/// Everything the page template displays
#[derive(Debug, Default, Serialize)]
pub struct PageView {
    pub models: Vec<Choice>,
    pub genres: Vec<Choice>,
    pub moods: Vec<Choice>,
    pub decades: Vec<Choice>,
    pub favorites: String,
    pub notes: String,
    pub warning: Option<String>,
    pub error: Option<String>,
    pub query: Option<String>,
    pub result_html: Option<String>,
    /// The markdown, percent-encoded so the browser posts it back unchanged
    pub result_download: Option<String>,
}

impl PageView {
    /// A page whose inputs show what the user last submitted
    pub fn from_form(form: &FormValues) -> Self {
        let models = ModelName::ALL
            .iter()
            .map(|model| choice(model.id(), form.model.as_deref() == Some(model.id())))
            .collect();
        let genres = Genre::ALL
            .iter()
            .map(|genre| choice(genre.label(), form.genres.iter().any(|g| g == genre.label())))
            .collect();
        let moods = Mood::ALL
            .iter()
            .map(|mood| choice(mood.label(), form.mood.as_deref() == Some(mood.label())))
            .collect();
        let decades = Decade::all()
            .iter()
            .map(|decade| {
                let label = decade.label();
                let selected = form.decade.as_deref() == Some(label.as_str());
                choice(&label, selected)
            })
            .collect();

        Self {
            models,
            genres,
            moods,
            decades,
            favorites: form.favorites.clone(),
            notes: form.notes.clone(),
            ..Default::default()
        }
    }

    pub fn blank() -> Self {
        Self::from_form(&FormValues::default())
    }

    pub fn with_warning(mut self, message: impl Into<String>) -> Self {
        self.warning = Some(message.into());
        self
    }

    pub fn with_error(mut self, message: impl Into<String>) -> Self {
        self.error = Some(message.into());
        self
    }

    pub fn with_result(mut self, query: &str, markdown: &str) -> Self {
        self.query = Some(query.to_string());
        self.result_html = Some(markdown_to_html(markdown));
        self.result_download = Some(urlencoding::encode(markdown).into_owned());
        self
    }
}

fn choice(value: &str, selected: bool) -> Choice {
    Choice {
        value: value.to_string(),
        selected,
    }
}

const SAFE_SCHEMES: [&str; 3] = ["http", "https", "mailto"];

/// Render agent markdown to HTML. Raw HTML in the text is shown as text and
/// link or image targets outside `SAFE_SCHEMES` are replaced by `#`.
pub fn markdown_to_html(markdown: &str) -> String {
    let options = Options::ENABLE_TABLES | Options::ENABLE_STRIKETHROUGH;
    let parser = Parser::new_ext(markdown, options).map(|event| match event {
        Event::Html(raw) | Event::InlineHtml(raw) => Event::Text(raw),
        Event::Start(Tag::Link {
            link_type,
            dest_url,
            title,
            id,
        }) => Event::Start(Tag::Link {
            link_type,
            dest_url: safe_destination(dest_url),
            title,
            id,
        }),
        Event::Start(Tag::Image {
            link_type,
            dest_url,
            title,
            id,
        }) => Event::Start(Tag::Image {
            link_type,
            dest_url: safe_destination(dest_url),
            title,
            id,
        }),
        other => other,
    });
    let mut out = String::with_capacity(markdown.len() * 3 / 2);
    html::push_html(&mut out, parser);
    out
}

/// Keep relative targets and the allowed schemes; anything else becomes `#`.
fn safe_destination(dest: CowStr<'_>) -> CowStr<'_> {
    // Browsers drop whitespace and control characters while parsing a URL,
    // so `java\tscript:` must be read as `javascript:`.
    let compact: String = dest
        .chars()
        .filter(|c| !c.is_whitespace() && !c.is_control())
        .collect();
    let scheme_end = compact.find(|c: char| matches!(c, ':' | '/' | '?' | '#'));
    match scheme_end {
        Some(end) if compact[end..].starts_with(':') => {
            let scheme = compact[..end].to_ascii_lowercase();
            if SAFE_SCHEMES.contains(&scheme.as_str()) {
                dest
            } else {
                CowStr::Borrowed("#")
            }
        }
        _ => dest,
    }
}
