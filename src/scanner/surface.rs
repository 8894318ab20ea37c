//! Injection points found on a page

use serde::Serialize;
use std::fmt;
use url::Url;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum FormMethod {
    Get,
    Post,
}

impl FormMethod {
    /// Anything other than `post` (case-insensitive) is a GET.
    pub fn parse(raw: Option<&str>) -> Self {
        match raw {
            Some(m) if m.trim().eq_ignore_ascii_case("post") => FormMethod::Post,
            _ => FormMethod::Get,
        }
    }
}

impl fmt::Display for FormMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FormMethod::Get => f.write_str("GET"),
            FormMethod::Post => f.write_str("POST"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldDescriptor {
    pub name: String,
    /// Lowercased `type` attribute; `"text"` when absent, `"textarea"` for textareas.
    pub field_type: String,
    /// Declared `value` attribute (or textarea content).
    pub value: Option<String>,
    pub is_submit_like: bool,
    pub id: Option<String>,
    pub placeholder: Option<String>,
}

impl FieldDescriptor {
    pub fn new(name: impl Into<String>, field_type: impl Into<String>) -> Self {
        let field_type = field_type.into().to_ascii_lowercase();
        let is_submit_like = is_submit_like(&field_type);
        Self {
            name: name.into(),
            field_type,
            value: None,
            is_submit_like,
            id: None,
            placeholder: None,
        }
    }

    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.value = Some(value.into());
        self
    }

    pub fn is_textarea(&self) -> bool {
        self.field_type == "textarea"
    }

    /// text, textarea, search, url
    pub fn is_text_like(&self) -> bool {
        matches!(
            self.field_type.as_str(),
            "text" | "textarea" | "search" | "url"
        )
    }
}

pub fn is_submit_like(field_type: &str) -> bool {
    matches!(field_type, "submit" | "button" | "image" | "reset" | "file")
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FormDescriptor {
    /// Zero-based position among the page's forms.
    pub index: usize,
    pub action_url: Url,
    pub method: FormMethod,
    /// Named `<input>`/`<textarea>` elements in document order.
    pub fields: Vec<FieldDescriptor>,
    /// Lowercased visible text of the form.
    pub text: String,
}

impl FormDescriptor {
    /// 1-based number used in finding text.
    pub fn number(&self) -> usize {
        self.index + 1
    }

    pub fn injectable_fields(&self) -> impl Iterator<Item = &FieldDescriptor> {
        self.fields.iter().filter(|f| !f.is_submit_like)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum Surface {
    QueryParam {
        name: String,
    },
    FormField {
        name: String,
        field_type: String,
        form: FormDescriptor,
    },
}

impl Surface {
    pub fn name(&self) -> &str {
        match self {
            Surface::QueryParam { name } => name,
            Surface::FormField { name, .. } => name,
        }
    }

    pub fn form(&self) -> Option<&FormDescriptor> {
        match self {
            Surface::QueryParam { .. } => None,
            Surface::FormField { form, .. } => Some(form),
        }
    }

    /// `"URL parameter 'q'"` / `"form input 'comment'"`
    pub fn label(&self) -> String {
        match self {
            Surface::QueryParam { name } => format!("URL parameter '{}'", name),
            Surface::FormField { name, .. } => format!("form input '{}'", name),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_method_defaults_to_get() {
        assert_eq!(FormMethod::parse(None), FormMethod::Get);
        assert_eq!(FormMethod::parse(Some("PoSt")), FormMethod::Post);
        assert_eq!(FormMethod::parse(Some("put")), FormMethod::Get);
    }

    #[test]
    fn test_submit_like_fields_are_not_injectable() {
        let form = FormDescriptor {
            index: 0,
            action_url: Url::parse("http://target.test/a").unwrap(),
            method: FormMethod::Post,
            fields: vec![
                FieldDescriptor::new("q", "text"),
                FieldDescriptor::new("go", "SUBMIT"),
                FieldDescriptor::new("upload", "file"),
            ],
            text: String::new(),
        };
        let names: Vec<&str> = form.injectable_fields().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["q"]);
        assert!(form.fields[1].is_submit_like);
        assert_eq!(form.number(), 1);
    }

    #[test]
    fn test_labels() {
        let s = Surface::QueryParam {
            name: "id".to_string(),
        };
        assert_eq!(s.label(), "URL parameter 'id'");
        assert!(s.form().is_none());
    }
}
