use hashbrown::HashMap;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::directory::Directory;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DatasetError {
    #[error("dataset has no generations")]
    Empty,
    #[error("blank username in generation {generation}")]
    BlankUsername { generation: usize },
    #[error("@{username} appears in generation {first} and again in generation {second}")]
    Duplicate {
        username: String,
        first: usize,
        second: usize,
    },
    #[error("invalid roster json: {0}")]
    Json(String),
}

/// Ordered generations of unique usernames.
#[derive(Debug, Clone)]
pub struct Dataset {
    generations: Vec<Vec<String>>,
    // username -> 1-based generation
    index: HashMap<String, usize>,
}

impl Dataset {
    pub fn new(generations: Vec<Vec<String>>) -> Result<Self, DatasetError> {
        if generations.is_empty() {
            return Err(DatasetError::Empty);
        }

        let mut index = HashMap::with_capacity(generations.iter().map(Vec::len).sum());
        for (gen_idx, members) in generations.iter().enumerate() {
            let generation = gen_idx + 1;
            if members.is_empty() {
                tracing::warn!(generation, "generation has no members");
            }
            for username in members {
                if username.trim().is_empty() {
                    return Err(DatasetError::BlankUsername { generation });
                }
                if let Some(&first) = index.get(username.as_str()) {
                    return Err(DatasetError::Duplicate {
                        username: username.clone(),
                        first,
                        second: generation,
                    });
                }
                index.insert(username.clone(), generation);
            }
        }

        Ok(Self { generations, index })
    }

    /// Total number of generations; the upper bound of navigable depth.
    pub fn generation_count(&self) -> usize {
        self.generations.len()
    }

    /// Members of a 1-based generation.
    pub fn generation(&self, generation: usize) -> Option<&[String]> {
        generation
            .checked_sub(1)
            .and_then(|idx| self.generations.get(idx))
            .map(Vec::as_slice)
    }

    pub fn generations(&self) -> &[Vec<String>] {
        &self.generations
    }

    pub fn generation_of(&self, username: &str) -> Option<usize> {
        self.index.get(username).copied()
    }

    pub fn contains(&self, username: &str) -> bool {
        self.index.contains_key(username)
    }

    pub fn total_members(&self) -> usize {
        self.index.len()
    }

    /// `(generation, username)` pairs in generation order.
    pub fn members(&self) -> impl Iterator<Item = (usize, &str)> + '_ {
        self.generations
            .iter()
            .enumerate()
            .flat_map(|(idx, members)| members.iter().map(move |u| (idx + 1, u.as_str())))
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct RosterFile {
    #[serde(default)]
    generations: Vec<Vec<String>>,
    #[serde(default)]
    display_names: HashMap<String, String>,
    #[serde(default)]
    avatars: HashMap<String, String>,
}

/// Dataset plus its lookups, as shipped in a single JSON document.
#[derive(Debug, Clone)]
pub struct Roster {
    pub dataset: Dataset,
    pub directory: Directory,
}

impl Roster {
    pub fn new(dataset: Dataset, directory: Directory) -> Self {
        Self { dataset, directory }
    }

    /// Parse `{"generations": [[..]], "display_names": {..}, "avatars": {..}}`.
    pub fn from_json(text: &str) -> Result<Self, DatasetError> {
        let file: RosterFile =
            serde_json::from_str(text).map_err(|e| DatasetError::Json(e.to_string()))?;
        let dataset = Dataset::new(file.generations)?;
        let directory = Directory::new(file.display_names, file.avatars);
        Ok(Self { dataset, directory })
    }

    pub fn to_json(&self) -> Result<String, DatasetError> {
        let file = RosterFile {
            generations: self.dataset.generations().to_vec(),
            display_names: self.directory.display_names().clone(),
            avatars: self.directory.avatars().clone(),
        };
        serde_json::to_string_pretty(&file).map_err(|e| DatasetError::Json(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gens(spec: &[&[&str]]) -> Vec<Vec<String>> {
        spec.iter()
            .map(|g| g.iter().map(|s| s.to_string()).collect())
            .collect()
    }

    #[test]
    fn empty_dataset_is_rejected() {
        assert_eq!(Dataset::new(Vec::new()).unwrap_err(), DatasetError::Empty);
    }

    #[test]
    fn empty_generation_is_kept() {
        let ds = Dataset::new(gens(&[&["a"], &[], &["b"]])).unwrap();
        assert_eq!(ds.generation_count(), 3);
        assert_eq!(ds.generation(2), Some(&[][..]));
        assert_eq!(ds.generation_of("b"), Some(3));
    }

    #[test]
    fn duplicates_report_both_generations() {
        let err = Dataset::new(gens(&[&["a"], &["b", "a"]])).unwrap_err();
        assert_eq!(
            err,
            DatasetError::Duplicate {
                username: "a".to_string(),
                first: 1,
                second: 2
            }
        );
    }

    #[test]
    fn generation_lookup_is_one_based() {
        let ds = Dataset::new(gens(&[&["root"], &["b", "c"], &[]])).unwrap();
        assert_eq!(ds.generation_count(), 3);
        assert_eq!(ds.generation(0), None);
        assert_eq!(ds.generation(1).unwrap(), &["root".to_string()]);
        assert_eq!(ds.generation(3).unwrap().len(), 0);
        assert_eq!(ds.generation(4), None);
        assert_eq!(ds.generation_of("c"), Some(2));
        assert_eq!(ds.total_members(), 3);

        let order: Vec<(usize, &str)> = ds.members().collect();
        assert_eq!(order, vec![(1, "root"), (2, "b"), (2, "c")]);
    }

    #[test]
    fn roster_json_parses_lookups() {
        let text = r#"{
            "generations": [["alice"], ["bob", "carol"]],
            "display_names": {"alice": "Alice A.", "bob": "Bob"},
            "avatars": {"alice": "pfp/alice.webp"}
        }"#;
        let roster = Roster::from_json(text).unwrap();
        assert_eq!(roster.dataset.generation_count(), 2);
        assert_eq!(roster.directory.display_name("alice"), "Alice A.");
        assert_eq!(roster.directory.display_name("carol"), "carol");
        assert_eq!(roster.directory.avatar("alice"), Some("pfp/alice.webp"));
        assert_eq!(roster.directory.avatar("bob"), None);

        let again = Roster::from_json(&roster.to_json().unwrap()).unwrap();
        assert_eq!(again.dataset.total_members(), 3);
    }

    #[test]
    fn malformed_json_is_an_error() {
        assert!(matches!(
            Roster::from_json("{\"generations\": 4}"),
            Err(DatasetError::Json(_))
        ));
        assert_eq!(
            Roster::from_json("{}").unwrap_err(),
            DatasetError::Empty
        );
    }
}
