//! The loaded-template registry, owned by the editor session.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use log::{debug, warn};

use crate::{Error, Template};

/// Turns a display name into the filename-safe key templates are stored and
/// looked up under. `"My Template!"` becomes `"my_template_"`.
pub fn sterilize_name(name: &str) -> String {
    name.trim()
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() {
                c.to_ascii_lowercase()
            } else {
                '_'
            }
        })
        .collect()
}

/// All templates currently available for dropping onto the grid, keyed by
/// sterilized name. One registry per open editor session; components that
/// need lookup get a reference instead of reaching for a global.
#[derive(Debug, Default)]
pub struct TemplateRegistry {
    templates: BTreeMap<String, Template>,
}

impl TemplateRegistry {
    pub fn new() -> TemplateRegistry {
        TemplateRegistry { templates: BTreeMap::new() }
    }

    /// Adds a template, replacing any previous one with the same sterilized
    /// name. Returns the key it was stored under.
    pub fn insert(&mut self, template: Template) -> String {
        let key = sterilize_name(&template.name);
        debug!("registering template {:?} as {:?}", template.name, key);
        self.templates.insert(key.clone(), template);
        key
    }

    /// Looks a template up by display name or sterilized key.
    pub fn get(&self, name: &str) -> Option<&Template> {
        self.templates.get(&sterilize_name(name))
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }

    /// The sterilized names of all loaded templates, in sorted order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.templates.keys().map(|key| key.as_str())
    }

    /// Loads every `*.json` file in `dir`.
    ///
    /// A file that fails to parse is skipped and reported in the returned
    /// list; it never prevents the remaining files from loading. Only the
    /// directory read itself can fail the whole call.
    pub fn load_dir(dir: &Path) -> std::io::Result<(TemplateRegistry, Vec<(PathBuf, Error)>)> {
        let mut registry = TemplateRegistry::new();
        let mut failures = Vec::new();

        for entry in fs::read_dir(dir)? {
            let path = entry?.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some("json") {
                continue;
            }

            let result = fs::read_to_string(&path)
                .map_err(|e| Error::MalformedTemplateFile { reason: e.to_string() })
                .and_then(|text| Template::from_json(&text));

            match result {
                Ok(template) => {
                    registry.insert(template);
                }
                Err(error) => {
                    warn!("skipping template file {}: {}", path.display(), error);
                    failures.push((path, error));
                }
            }
        }

        debug!(
            "loaded {} templates from {} ({} skipped)",
            registry.len(),
            dir.display(),
            failures.len()
        );
        Ok((registry, failures))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Button, Offset, TemplateItem, TemplateKind};
    use std::io::Write;

    fn template(name: &str) -> Template {
        Template::new(
            name,
            TemplateKind::Buttons,
            vec![TemplateItem::Button(Button::new("Main", "main", Offset::ANCHOR))],
        )
        .unwrap()
    }

    #[test]
    fn sterilization_is_filename_safe() {
        assert_eq!(sterilize_name("My Template!"), "my_template_");
        assert_eq!(sterilize_name("  Plain  "), "plain__");
        assert_eq!(sterilize_name("abc123"), "abc123");
    }

    #[test]
    fn lookup_goes_through_sterilized_names() {
        let mut registry = TemplateRegistry::new();
        let key = registry.insert(template("Movement Keys"));
        assert_eq!(key, "movement_keys");
        assert!(registry.get("Movement Keys").is_some());
        assert!(registry.get("movement_keys").is_some());
        assert!(registry.get("other").is_none());
    }

    #[test]
    fn one_bad_file_does_not_block_the_rest() {
        let dir = tempfile::tempdir().unwrap();

        fs::write(dir.path().join("good.json"), template("Good").to_json()).unwrap();
        fs::write(dir.path().join("bad.json"), "{ not json").unwrap();
        // non-json files are ignored entirely
        let mut other = fs::File::create(dir.path().join("notes.txt")).unwrap();
        writeln!(other, "hello").unwrap();

        let (registry, failures) = TemplateRegistry::load_dir(dir.path()).unwrap();
        assert_eq!(registry.len(), 1);
        assert!(registry.get("Good").is_some());
        assert_eq!(failures.len(), 1);
        assert!(failures[0].0.ends_with("bad.json"));
    }
}
