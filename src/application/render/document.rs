use askama::Template;

/// Full HTML document wrapped around a rendered markdown fragment.
#[derive(Template)]
#[template(path = "export/document.html")]
pub struct DocumentTemplate<'a> {
    pub title: &'a str,
    pub stylesheet: &'a str,
    pub body: &'a str,
}
