//! Template definitions and their JSON wire format.
//!
//! A template file is a JSON array with exactly one header element
//! (`"__type__": "Template"`) followed by the cell-items, each tagged the
//! same way. Item locations are offsets relative to the anchor item at
//! (0, 0), never absolute grid coordinates.

use serde::{Deserialize, Serialize};

use crate::{Color, Error, Offset};

/// The kinds of template a file may declare. Currently only button grids.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TemplateKind {
    Buttons,
}

/// A single pad bound to a keyboard shortcut.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Button {
    pub name: String,
    #[serde(rename = "buttonID")]
    pub button_id: String,
    pub location: Offset,
    #[serde(rename = "normalColor")]
    pub normal_color: Color,
    #[serde(rename = "pushedColor")]
    pub pushed_color: Color,
    #[serde(rename = "keyboardCombo")]
    pub keyboard_combo: String,
}

impl Button {
    /// A button at the given offset with the default red/green color pair and
    /// no shortcut bound yet.
    pub fn new(name: impl Into<String>, button_id: impl Into<String>, location: Offset) -> Button {
        Button {
            name: name.into(),
            button_id: button_id.into(),
            location,
            normal_color: Color::RED,
            pushed_color: Color::GREEN,
            keyboard_combo: String::new(),
        }
    }
}

/// One cell-item of a template.
///
/// This is a closed set: color resolution, placement and serialization all
/// match on it exhaustively, so adding a new kind is a compile-time exercise
/// rather than a runtime surprise.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TemplateItem {
    Button(Button),
}

impl TemplateItem {
    pub fn name(&self) -> &str {
        match self {
            TemplateItem::Button(button) => &button.name,
        }
    }

    /// This item's offset from the template anchor.
    pub fn location(&self) -> Offset {
        match self {
            TemplateItem::Button(button) => button.location,
        }
    }

    /// The color shown while the pad is at rest.
    pub fn normal_color(&self) -> Color {
        match self {
            TemplateItem::Button(button) => button.normal_color,
        }
    }

    /// The color shown while the pad is held down.
    pub fn pushed_color(&self) -> Color {
        match self {
            TemplateItem::Button(button) => button.pushed_color,
        }
    }
}

/// A named, ordered collection of cell-items with the anchor at offset (0, 0).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
    pub name: String,
    pub kind: TemplateKind,
    pub items: Vec<TemplateItem>,
}

impl Template {
    /// Builds a template, checking the structural invariants: exactly one
    /// item at the anchor offset, and pairwise distinct offsets.
    pub fn new(
        name: impl Into<String>,
        kind: TemplateKind,
        items: Vec<TemplateItem>,
    ) -> Result<Template, Error> {
        let template = Template { name: name.into(), kind, items };
        template.check_invariants()?;
        Ok(template)
    }

    fn check_invariants(&self) -> Result<(), Error> {
        let anchors = self
            .items
            .iter()
            .filter(|item| item.location() == Offset::ANCHOR)
            .count();
        if anchors != 1 {
            return Err(Error::MalformedTemplateFile {
                reason: format!(
                    "template {:?} has {} items at the anchor offset (0, 0), expected exactly 1",
                    self.name, anchors
                ),
            });
        }

        for (i, item) in self.items.iter().enumerate() {
            let duplicate = self.items[..i]
                .iter()
                .any(|other| other.location() == item.location());
            if duplicate {
                return Err(Error::MalformedTemplateFile {
                    reason: format!(
                        "template {:?} has two items at offset ({}, {})",
                        self.name,
                        item.location().row,
                        item.location().col
                    ),
                });
            }
        }

        Ok(())
    }

    /// The item at offset (0, 0). Guaranteed to exist by construction.
    pub fn anchor(&self) -> &TemplateItem {
        self.items
            .iter()
            .find(|item| item.location() == Offset::ANCHOR)
            .expect("template invariant: exactly one anchor item")
    }

    /// Parses one template file.
    ///
    /// An unknown `"__type__"` discriminator is reported as
    /// [`Error::UnsupportedItemType`] (the file was probably written by a
    /// newer version); every other schema violation is
    /// [`Error::MalformedTemplateFile`].
    pub fn from_json(text: &str) -> Result<Template, Error> {
        let values: Vec<serde_json::Value> =
            serde_json::from_str(text).map_err(|e| Error::MalformedTemplateFile {
                reason: e.to_string(),
            })?;

        let mut header: Option<(String, TemplateKind)> = None;
        let mut items = Vec::new();

        for value in values {
            let tag = value
                .get("__type__")
                .and_then(|tag| tag.as_str())
                .ok_or_else(|| Error::MalformedTemplateFile {
                    reason: "element without a \"__type__\" tag".to_owned(),
                })?;

            match tag {
                "Template" | "Button" => {}
                other => {
                    return Err(Error::UnsupportedItemType {
                        type_name: other.to_owned(),
                    })
                }
            }

            let entry: Entry =
                serde_json::from_value(value).map_err(|e| Error::MalformedTemplateFile {
                    reason: e.to_string(),
                })?;

            match entry {
                Entry::Template { name, kind } => {
                    if header.is_some() {
                        return Err(Error::MalformedTemplateFile {
                            reason: "more than one \"Template\" element".to_owned(),
                        });
                    }
                    header = Some((name, kind));
                }
                Entry::Button(button) => items.push(TemplateItem::Button(button)),
            }
        }

        let (name, kind) = header.ok_or_else(|| Error::MalformedTemplateFile {
            reason: "missing the \"Template\" element".to_owned(),
        })?;

        Template::new(name, kind, items)
    }

    /// Serializes this template into the file format parsed by
    /// [`Template::from_json`].
    pub fn to_json(&self) -> String {
        let mut entries = Vec::with_capacity(self.items.len() + 1);
        entries.push(Entry::Template {
            name: self.name.clone(),
            kind: self.kind,
        });
        for item in &self.items {
            match item {
                TemplateItem::Button(button) => entries.push(Entry::Button(button.clone())),
            }
        }

        serde_json::to_string_pretty(&entries).expect("template entries always serialize")
    }
}

/// One element of a template file, discriminated by the `"__type__"` field.
#[derive(Serialize, Deserialize)]
#[serde(tag = "__type__")]
enum Entry {
    Template {
        name: String,
        #[serde(rename = "type")]
        kind: TemplateKind,
    },
    Button(Button),
}
