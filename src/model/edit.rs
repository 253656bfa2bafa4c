use serde_json::{Map, Value};

use crate::error::{CoreError, CoreResult};

pub const TEXT_MAX_LENGTH: usize = 512;

/// Strips backslashes and caps the length at `TEXT_MAX_LENGTH` characters.
pub fn sanitize_text(text: &str) -> String {
    text.chars()
        .filter(|&c| c != '\\')
        .take(TEXT_MAX_LENGTH)
        .collect()
}

/// One instruction carried by a changed item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditOp {
    CommitTranslation { locale: String, text: String },
    RemoveTargets { locales: Vec<String> },
    RenameDraft { new_text: String },
    MarkNew,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChangedItem {
    pub ops: Vec<EditOp>,
}

impl ChangedItem {
    pub fn new(ops: Vec<EditOp>) -> Self {
        ChangedItem { ops }
    }

    /// True when the item carries a translation for any locale.
    pub fn has_targets(&self) -> bool {
        self.ops
            .iter()
            .any(|op| matches!(op, EditOp::CommitTranslation { .. }))
    }

    pub fn target(&self, locale: &str) -> Option<&str> {
        self.ops.iter().find_map(|op| match op {
            EditOp::CommitTranslation { locale: l, text } if l == locale => Some(text.as_str()),
            _ => None,
        })
    }

    pub fn new_text(&self) -> Option<&str> {
        self.ops.iter().find_map(|op| match op {
            EditOp::RenameDraft { new_text } => Some(new_text.as_str()),
            _ => None,
        })
    }

    pub fn removes_target(&self, locale: &str) -> bool {
        self.ops.iter().any(|op| match op {
            EditOp::RemoveTargets { locales } => locales.iter().any(|l| l == locale),
            _ => false,
        })
    }

    pub fn is_new(&self) -> bool {
        self.ops.iter().any(|op| matches!(op, EditOp::MarkNew))
    }

    fn parse(source: &str, value: &Value, accepted: &[String]) -> CoreResult<Self> {
        let props = value.as_object().ok_or_else(|| {
            CoreError::validation(format!("changed_items[{source}] must be an object"))
        })?;

        let mut ops = Vec::new();

        for (key, v) in props {
            match key.as_str() {
                "is_new" => match v {
                    Value::Bool(true) => ops.push(EditOp::MarkNew),
                    Value::Bool(false) | Value::Null => {}
                    _ => {
                        return Err(CoreError::validation(format!(
                            "changed_items[{source}].is_new must be a boolean"
                        )))
                    }
                },

                "new_default_text" => match v {
                    Value::String(s) => {
                        let new_text = sanitize_text(s);
                        if !new_text.is_empty() {
                            ops.push(EditOp::RenameDraft { new_text });
                        }
                    }
                    Value::Null => {}
                    _ => {
                        return Err(CoreError::validation(format!(
                            "changed_items[{source}].new_default_text must be a string"
                        )))
                    }
                },

                "removed_targets" => {
                    let locales = parse_locales(v, accepted, || {
                        format!("changed_items[{source}].removed_targets")
                    })?;
                    if !locales.is_empty() {
                        ops.push(EditOp::RemoveTargets { locales });
                    }
                }

                locale => {
                    if !accepted.iter().any(|l| l == locale) {
                        return Err(CoreError::validation(format!(
                            "unknown locale `{locale}` in changed_items[{source}]"
                        )));
                    }
                    let text = v.as_str().ok_or_else(|| {
                        CoreError::validation(format!(
                            "changed_items[{source}].{locale} must be a string"
                        ))
                    })?;
                    ops.push(EditOp::CommitTranslation {
                        locale: locale.to_string(),
                        text: sanitize_text(text),
                    });
                }
            }
        }

        Ok(ChangedItem { ops })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EditBatch {
    pub removed_items: Vec<String>,
    /// In wire order.
    pub changed_items: Vec<(String, ChangedItem)>,
}

impl EditBatch {
    pub fn is_empty(&self) -> bool {
        self.removed_items.is_empty() && self.changed_items.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BatchRequest {
    RemoveAll,
    Apply(EditBatch),
}

impl BatchRequest {
    /// Parses and validates a `language.save` payload against the accepted locales.
    pub fn parse(payload: &Value, accepted: &[String]) -> CoreResult<Self> {
        match payload.get("remove_all") {
            Some(Value::Bool(true)) => return Ok(BatchRequest::RemoveAll),
            Some(Value::Bool(false)) | Some(Value::Null) | None => {}
            Some(_) => return Err(CoreError::validation("remove_all must be a boolean")),
        }

        let removed_items = match payload.get("removed_items") {
            None | Some(Value::Null) => Vec::new(),
            Some(Value::Array(arr)) => arr
                .iter()
                .enumerate()
                .map(|(i, v)| {
                    v.as_str().map(str::to_string).ok_or_else(|| {
                        CoreError::validation(format!("removed_items[{i}] must be a string"))
                    })
                })
                .collect::<CoreResult<Vec<_>>>()?,
            Some(_) => return Err(CoreError::validation("removed_items must be an array")),
        };

        let changed_items = match payload.get("changed_items") {
            None | Some(Value::Null) => Vec::new(),
            Some(Value::Object(map)) => parse_changed_items(map, accepted)?,
            Some(_) => return Err(CoreError::validation("changed_items must be an object")),
        };

        Ok(BatchRequest::Apply(EditBatch {
            removed_items,
            changed_items,
        }))
    }
}

fn parse_changed_items(
    map: &Map<String, Value>,
    accepted: &[String],
) -> CoreResult<Vec<(String, ChangedItem)>> {
    let mut items = Vec::with_capacity(map.len());

    for (source, props) in map {
        let key = sanitize_text(source);
        if key.is_empty() {
            return Err(CoreError::validation("changed_items keys must not be empty"));
        }
        if items.iter().any(|(k, _)| *k == key) {
            return Err(CoreError::validation(format!(
                "changed_items has more than one entry for `{key}`"
            )));
        }
        items.push((key, ChangedItem::parse(source, props, accepted)?));
    }

    Ok(items)
}

/// Parses an array of locale codes, each of which must be accepted.
pub fn parse_locales(
    value: &Value,
    accepted: &[String],
    field: impl Fn() -> String,
) -> CoreResult<Vec<String>> {
    let arr = match value {
        Value::Null => return Ok(Vec::new()),
        Value::Array(arr) => arr,
        _ => return Err(CoreError::validation(format!("{} must be an array", field()))),
    };

    let mut locales = Vec::with_capacity(arr.len());
    for v in arr {
        let locale = v
            .as_str()
            .ok_or_else(|| CoreError::validation(format!("{} must hold strings", field())))?;
        if !accepted.iter().any(|l| l == locale) {
            return Err(CoreError::validation(format!(
                "unknown locale `{locale}` in {}",
                field()
            )));
        }
        if !locales.iter().any(|l| l == locale) {
            locales.push(locale.to_string());
        }
    }

    Ok(locales)
}
