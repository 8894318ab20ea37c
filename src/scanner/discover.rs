use crate::error::FetchError;
use crate::http::client::HttpClient;
use crate::http::request::HttpRequest;
use crate::scanner::surface::{FieldDescriptor, FormDescriptor, FormMethod, Surface};
use scraper::{ElementRef, Html, Selector};
use url::Url;

/// Everything injectable on one page.
#[derive(Debug, Clone, PartialEq)]
pub struct PageSurfaces {
    pub page_url: Url,
    /// One surface per distinct query key, first occurrence order.
    pub query_params: Vec<Surface>,
    pub forms: Vec<FormDescriptor>,
    pub body: String,
}

impl PageSurfaces {
    /// Injectable form fields, form by form, in document order.
    pub fn form_surfaces(&self) -> Vec<Surface> {
        let mut surfaces = Vec::new();
        for form in &self.forms {
            for field in form.injectable_fields() {
                if surfaces.iter().any(|s: &Surface| {
                    s.name() == field.name && s.form().map(|f| f.index) == Some(form.index)
                }) {
                    continue;
                }
                surfaces.push(Surface::FormField {
                    name: field.name.clone(),
                    field_type: field.field_type.clone(),
                    form: form.clone(),
                });
            }
        }
        surfaces
    }
}

/// Fetch `page_url` and extract its surfaces. Only the fetch can fail;
/// markup problems just yield fewer forms.
pub async fn discover(client: &HttpClient, page_url: &Url) -> Result<PageSurfaces, FetchError> {
    let resp = client
        .execute(HttpRequest::get(page_url.clone()))
        .await
        .map_err(|e| FetchError::new(page_url, e))?;

    Ok(extract(page_url, &resp.body_text()))
}

pub fn extract(page_url: &Url, body: &str) -> PageSurfaces {
    PageSurfaces {
        page_url: page_url.clone(),
        query_params: query_surfaces(page_url),
        forms: extract_forms(page_url, body),
        body: body.to_string(),
    }
}

fn query_surfaces(page_url: &Url) -> Vec<Surface> {
    let mut names: Vec<String> = Vec::new();
    for (key, _) in page_url.query_pairs() {
        if key.is_empty() || names.iter().any(|n| n == key.as_ref()) {
            continue;
        }
        names.push(key.into_owned());
    }
    names
        .into_iter()
        .map(|name| Surface::QueryParam { name })
        .collect()
}

pub fn extract_forms(page_url: &Url, body: &str) -> Vec<FormDescriptor> {
    let document = Html::parse_document(body);
    let (Ok(form_sel), Ok(field_sel)) = (Selector::parse("form"), Selector::parse("input, textarea"))
    else {
        return Vec::new();
    };

    document
        .select(&form_sel)
        .enumerate()
        .map(|(index, form)| {
            let action_url = match form.value().attr("action").map(str::trim) {
                Some(action) if !action.is_empty() => {
                    page_url.join(action).unwrap_or_else(|_| page_url.clone())
                }
                _ => page_url.clone(),
            };

            let fields = form
                .select(&field_sel)
                .filter_map(field_descriptor)
                .collect();

            FormDescriptor {
                index,
                action_url,
                method: FormMethod::parse(form.value().attr("method")),
                fields,
                text: form.text().collect::<String>().to_lowercase(),
            }
        })
        .collect()
}

fn field_descriptor(el: ElementRef<'_>) -> Option<FieldDescriptor> {
    let attrs = el.value();
    let name = attrs.attr("name").filter(|n| !n.is_empty())?;

    let mut field = if attrs.name() == "textarea" {
        let content: String = el.text().collect();
        let field = FieldDescriptor::new(name, "textarea");
        if content.is_empty() {
            field
        } else {
            field.with_value(content)
        }
    } else {
        let field_type = attrs
            .attr("type")
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .unwrap_or("text");
        let field = FieldDescriptor::new(name, field_type);
        match attrs.attr("value") {
            Some(v) => field.with_value(v),
            None => field,
        }
    };

    field.id = attrs.attr("id").map(str::to_string);
    field.placeholder = attrs.attr("placeholder").map(str::to_string);
    Some(field)
}
