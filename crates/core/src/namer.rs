use crate::error::{Result, ShuffleError};
use crate::options::ShuffleOptions;
use serde_json::Value;

const NAME_PLACEHOLDER: &str = "{name}";
const ID_PLACEHOLDER: &str = "{id}";

#[derive(Debug, Clone, PartialEq, Eq)]
enum NameStyle {
    Mask(String),
    Prefix(String),
    Keep,
}

/// Assigns token ids and rewrites record names
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Namer {
    first_id: u64,
    add_token_id: bool,
    style: NameStyle,
}

impl Namer {
    pub fn from_options(options: &ShuffleOptions) -> Self {
        let non_empty = |value: &Option<String>| value.clone().filter(|s| !s.is_empty());
        let style = match (non_empty(&options.mask), non_empty(&options.prefix)) {
            (Some(mask), _) => NameStyle::Mask(mask),
            (None, Some(prefix)) => NameStyle::Prefix(prefix),
            (None, None) => NameStyle::Keep,
        };
        Self {
            first_id: options.first_id(),
            add_token_id: options.add_token_id,
            style,
        }
    }

    pub fn first_id(&self) -> u64 {
        self.first_id
    }

    /// `position + firstId`; fails instead of wrapping or saturating.
    pub fn token_id(&self, position: usize) -> Result<u64> {
        u64::try_from(position)
            .ok()
            .and_then(|position| position.checked_add(self.first_id))
            .ok_or_else(|| {
                ShuffleError::configuration(format!(
                    "Token id overflows: first id {} at ranked position {position}",
                    self.first_id
                ))
            })
    }

    fn rewrites(&self) -> bool {
        self.add_token_id || self.style != NameStyle::Keep
    }

    /// Apply token id and naming rules to the record at `position`; returns its token id.
    ///
    /// Only JSON objects can be rewritten. Other values pass through untouched.
    pub fn apply(&self, record: &mut Value, position: usize) -> Result<u64> {
        let token_id = self.token_id(position)?;
        let Some(fields) = record.as_object_mut() else {
            if self.rewrites() {
                log::warn!("Record at ranked position {position} is not an object; leaving it as is");
            }
            return Ok(token_id);
        };

        if self.add_token_id {
            fields.insert("tokenId".to_string(), Value::from(token_id));
        }

        match &self.style {
            NameStyle::Mask(mask) => {
                let current = display_name(fields.get("name"));
                let name = render_mask(mask, &current, token_id);
                fields.insert("name".to_string(), Value::String(name));
            }
            NameStyle::Prefix(prefix) => {
                fields.insert("name".to_string(), Value::String(format!("{prefix}{token_id}")));
            }
            NameStyle::Keep => {}
        }
        Ok(token_id)
    }
}

fn display_name(name: Option<&Value>) -> String {
    match name {
        Some(Value::String(name)) => name.clone(),
        Some(Value::Null) | None => String::new(),
        Some(other) => other.to_string(),
    }
}

/// Render a name template.
///
/// The first `{name}` and the first `{id}` are substituted; later copies stay
/// literal. `{{` and `}}` produce literal braces, so `{{name}}` renders as
/// `{name}`. Substituted values are inserted verbatim and never rescanned.
pub fn render_mask(mask: &str, name: &str, token_id: u64) -> String {
    let id = token_id.to_string();
    let mut out = String::with_capacity(mask.len() + name.len() + id.len());
    let mut name_done = false;
    let mut id_done = false;
    let mut rest = mask;

    while let Some(ch) = rest.chars().next() {
        if rest.starts_with("{{") {
            out.push('{');
            rest = &rest[2..];
        } else if rest.starts_with("}}") {
            out.push('}');
            rest = &rest[2..];
        } else if !name_done && rest.starts_with(NAME_PLACEHOLDER) {
            out.push_str(name);
            name_done = true;
            rest = &rest[NAME_PLACEHOLDER.len()..];
        } else if !id_done && rest.starts_with(ID_PLACEHOLDER) {
            out.push_str(&id);
            id_done = true;
            rest = &rest[ID_PLACEHOLDER.len()..];
        } else {
            out.push(ch);
            rest = &rest[ch.len_utf8()..];
        }
    }
    out
}
