//! Content catalog: planet types, resources, buildings, defense units,
//! ships, offense units, planet features. Loaded once at startup from a
//! directory of JSON documents; immutable thereafter (§4.1).

use std::collections::HashMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use strum::{EnumIter, IntoEnumIterator};

use crate::error::RegistryError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Buildings,
    DefenseUnits,
    Planets,
    PlanetFeatures,
    Resources,
    OffenseUnits,
    Ships,
}

impl Category {
    fn filename(self) -> &'static str {
        match self {
            Category::Buildings => "buildings.json",
            Category::DefenseUnits => "defense_units.json",
            Category::Planets => "planet_types.json",
            Category::PlanetFeatures => "planet_features.json",
            Category::Resources => "resources.json",
            Category::OffenseUnits => "offense_units.json",
            Category::Ships => "ships.json",
        }
    }
}

/// Cost bundle used by buildings, defense units, and colonization.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Cost {
    #[serde(default)]
    pub credits: f64,
    #[serde(default)]
    pub industry: Option<f64>,
    #[serde(default)]
    pub resources: HashMap<String, f64>,
}

/// A single catalog document. Fields are category-specific and absent
/// when the category doesn't use them; `#[serde(default)]` keeps every
/// catalog file free to omit fields it has no use for (§3).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegistryEntry {
    pub id: String,
    #[serde(default)]
    pub name: String,

    // planets
    #[serde(default)]
    pub rarity: Option<String>,
    #[serde(default)]
    pub possible_climates: Option<Vec<String>>,
    #[serde(default)]
    pub defense_base_bonus: Option<f64>,
    #[serde(default)]
    pub habitability: Option<f64>,
    #[serde(default)]
    pub colonization_cost: Option<Cost>,

    // resources
    #[serde(default)]
    pub resource_type: Option<String>,
    #[serde(default)]
    pub refinement_level: Option<String>,
    #[serde(default)]
    pub inputs: Option<HashMap<String, f64>>,
    #[serde(rename = "yield", default)]
    pub yield_amount: Option<f64>,

    // buildings
    #[serde(default)]
    pub cost: Option<Cost>,
    #[serde(default)]
    pub slot_type: Option<String>,
    #[serde(default)]
    pub base_yield: Option<f64>,
    #[serde(default)]
    pub upkeep: Option<Cost>,

    // defense units
    #[serde(default)]
    pub layer: Option<String>,
    #[serde(default)]
    pub defense_value: Option<f64>,
    #[serde(default)]
    pub power_use: Option<f64>,

    // planet features
    #[serde(default)]
    pub planet_type: Option<String>,
}

impl RegistryEntry {
    pub fn is_refinable(&self) -> bool {
        self.inputs.as_ref().is_some_and(|i| !i.is_empty())
    }
}

/// The in-memory catalog. Readable concurrently without locking once
/// loaded (§5) — it is never mutated after `load_dir`.
#[derive(Debug, Clone, Default)]
pub struct Registry {
    categories: HashMap<Category, HashMap<String, RegistryEntry>>,
    all: HashMap<String, RegistryEntry>,
}

impl Registry {
    pub fn load_dir(dir: &Path) -> Result<Registry, RegistryError> {
        let mut categories = HashMap::new();
        let mut all = HashMap::new();

        for category in Category::iter() {
            let path = dir.join(category.filename());
            let entries = Self::load_file(&path)?;
            let mut by_id = HashMap::new();
            for entry in entries {
                if all.contains_key(&entry.id) {
                    log::warn!(
                        "registry: id `{}` in {} collides with an entry already loaded",
                        entry.id,
                        category.filename()
                    );
                }
                if entry.name.is_empty() {
                    log::warn!(
                        "registry: entry `{}` in {} is missing a `name`",
                        entry.id,
                        category.filename()
                    );
                }
                all.insert(entry.id.clone(), entry.clone());
                by_id.insert(entry.id.clone(), entry);
            }
            categories.insert(category, by_id);
        }

        Ok(Registry { categories, all })
    }

    fn load_file(path: &Path) -> Result<Vec<RegistryEntry>, RegistryError> {
        if !path.exists() {
            log::warn!("registry: {} not found, treating as empty", path.display());
            return Ok(Vec::new());
        }
        let text = std::fs::read_to_string(path).map_err(|source| RegistryError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let raw: Vec<serde_json::Value> =
            serde_json::from_str(&text).map_err(|source| RegistryError::Json {
                path: path.display().to_string(),
                source,
            })?;
        let mut entries = Vec::with_capacity(raw.len());
        for value in raw {
            if value.get("id").and_then(|v| v.as_str()).is_none() {
                return Err(RegistryError::MissingId {
                    file: path.display().to_string(),
                });
            }
            let entry: RegistryEntry =
                serde_json::from_value(value).map_err(|source| RegistryError::Json {
                    path: path.display().to_string(),
                    source,
                })?;
            entries.push(entry);
        }
        Ok(entries)
    }

    pub fn get(&self, id: &str) -> Option<&RegistryEntry> {
        self.all.get(id)
    }

    pub fn category(&self, category: Category) -> Option<&HashMap<String, RegistryEntry>> {
        self.categories.get(&category)
    }

    /// Over-the-wire / persistence shape: category → (id → entry),
    /// excluding the `all` aggregate (§4.1).
    pub fn to_wire(&self) -> HashMap<Category, HashMap<String, RegistryEntry>> {
        self.categories.clone()
    }

    pub fn from_wire(categories: HashMap<Category, HashMap<String, RegistryEntry>>) -> Registry {
        let mut all = HashMap::new();
        for by_id in categories.values() {
            for (id, entry) in by_id {
                all.insert(id.clone(), entry.clone());
            }
        }
        Registry { categories, all }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn write_category(dir: &Path, filename: &str, json: &str) {
        fs::write(dir.join(filename), json).unwrap();
    }

    #[test]
    fn loads_all_categories_and_builds_aggregate() {
        let tmp = tempfile::tempdir().unwrap();
        write_category(
            tmp.path(),
            "resources.json",
            r#"[{"id":"basaltic_ore","name":"Basaltic Ore","resource_type":"ore","refinement_level":"raw"}]"#,
        );
        write_category(
            tmp.path(),
            "buildings.json",
            r#"[{"id":"mine_basic","name":"Basic Mine","slot_type":"mine","base_yield":2.0,"cost":{"industry":1000}}]"#,
        );
        let registry = Registry::load_dir(tmp.path()).unwrap();
        let ore = registry.get("basaltic_ore").unwrap();
        assert!(!ore.is_refinable());
        let mine = registry.get("mine_basic").unwrap();
        assert_eq!(mine.slot_type.as_deref(), Some("mine"));
        assert_eq!(
            registry.category(Category::Resources).unwrap().len(),
            1
        );
    }

    #[test]
    fn missing_id_is_an_error() {
        let tmp = tempfile::tempdir().unwrap();
        write_category(tmp.path(), "resources.json", r#"[{"name":"Nameless"}]"#);
        let err = Registry::load_dir(tmp.path()).unwrap_err();
        assert!(matches!(err, RegistryError::MissingId { .. }));
    }

    #[test]
    fn missing_file_is_treated_as_empty() {
        let tmp = tempfile::tempdir().unwrap();
        let registry = Registry::load_dir(tmp.path()).unwrap();
        assert!(registry.get("anything").is_none());
    }

    #[test]
    fn wire_round_trip_reconstructs_aggregate() {
        let tmp = tempfile::tempdir().unwrap();
        write_category(
            tmp.path(),
            "resources.json",
            r#"[{"id":"ore","name":"Ore","inputs":{}}]"#,
        );
        let registry = Registry::load_dir(tmp.path()).unwrap();
        let wire = registry.to_wire();
        let rebuilt = Registry::from_wire(wire);
        assert_eq!(rebuilt.get("ore").unwrap().name, "Ore");
    }
}
