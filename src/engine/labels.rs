//! Class id to name mapping

use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;

use serde::Deserialize;

use crate::error::{DetectError, DetectResult};

/// Where a label map comes from.
///
/// A string is a path to a text file of `<id> <name>` lines. An array is a
/// list of names whose index is the class id.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum LabelMapSource {
    File(PathBuf),
    Names(Vec<String>),
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct LabelMap {
    names: BTreeMap<i32, String>,
}

impl LabelMap {
    pub fn load(source: &LabelMapSource) -> DetectResult<Self> {
        match source {
            LabelMapSource::File(path) => {
                let content = fs::read_to_string(path).map_err(|e| {
                    DetectError::config(format!("label map {}: {}", path.display(), e))
                })?;
                Self::parse(&content)
            }
            LabelMapSource::Names(names) => Ok(Self::from_names(names)),
        }
    }

    pub fn from_names<S: AsRef<str>>(names: &[S]) -> Self {
        let names = names
            .iter()
            .enumerate()
            .map(|(id, name)| (id as i32, name.as_ref().trim().to_string()))
            .collect();
        Self { names }
    }

    /// Parse `<id> <name>` lines. A line without a leading id continues
    /// numbering from the previous entry.
    pub fn parse(content: &str) -> DetectResult<Self> {
        let mut names = BTreeMap::new();
        let mut next_id = 0i32;

        for line in content.lines().map(str::trim).filter(|l| !l.is_empty()) {
            let (id, name) = match line.split_once(char::is_whitespace) {
                Some((head, rest)) => match head.parse::<i32>() {
                    Ok(id) => (id, rest.trim()),
                    Err(_) => (next_id, line),
                },
                None => (next_id, line),
            };

            if names.insert(id, name.to_string()).is_some() {
                return Err(DetectError::config(format!("duplicate label id {}", id)));
            }
            next_id = id + 1;
        }

        Ok(Self { names })
    }

    /// Check that the map names every class a detector with `num_classes`
    /// classes can emit. Ids run `1..=num_classes`; 0 is background and may
    /// be named or left out.
    pub fn validate_covers(&self, num_classes: usize) -> DetectResult<()> {
        if self.names.is_empty() {
            return Err(DetectError::config("label map is empty"));
        }
        if let Some(&id) = self
            .names
            .keys()
            .find(|id| **id < 0 || **id as usize > num_classes)
        {
            return Err(DetectError::config(format!(
                "label id {} is outside the model's class space 0..={}",
                id, num_classes
            )));
        }
        if let Some(id) = (1..=num_classes as i32).find(|id| !self.names.contains_key(id)) {
            return Err(DetectError::config(format!(
                "label map has no name for class {} of {}",
                id, num_classes
            )));
        }
        Ok(())
    }

    pub fn name(&self, id: i32) -> Option<&str> {
        self.names.get(&id).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_id_name_lines() {
        let map = LabelMap::parse("0 person\n1 bicycle\n\n2  traffic light\n").unwrap();
        assert_eq!(map.len(), 3);
        assert_eq!(map.name(0), Some("person"));
        assert_eq!(map.name(2), Some("traffic light"));
        assert_eq!(map.name(3), None);
    }

    #[test]
    fn test_parse_bare_names_continue_numbering() {
        let map = LabelMap::parse("5 car\ntruck\nbus").unwrap();
        assert_eq!(map.name(5), Some("car"));
        assert_eq!(map.name(6), Some("truck"));
        assert_eq!(map.name(7), Some("bus"));
    }

    #[test]
    fn test_duplicate_id_rejected() {
        assert!(matches!(
            LabelMap::parse("1 person\n1 car"),
            Err(DetectError::Config(_))
        ));
    }

    #[test]
    fn test_inline_names() {
        let source: LabelMapSource = serde_json::from_str(r#"["Unknown", "lindo_st_angel"]"#).unwrap();
        let map = LabelMap::load(&source).unwrap();
        assert_eq!(map.name(1), Some("lindo_st_angel"));
    }

    #[test]
    fn test_file_source() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("labels.txt");
        fs::write(&path, "1 person\n2 car\n").unwrap();

        let source: LabelMapSource =
            serde_json::from_value(serde_json::json!(path.to_str().unwrap())).unwrap();
        let map = LabelMap::load(&source).unwrap();
        assert_eq!(map.name(1), Some("person"));

        let missing = LabelMapSource::File(dir.path().join("nope.txt"));
        assert!(matches!(LabelMap::load(&missing), Err(DetectError::Config(_))));
    }

    #[test]
    fn test_coverage() {
        let map = LabelMap::parse("1 person\n2 car\n3 dog").unwrap();
        assert!(map.validate_covers(3).is_ok());
        assert!(map.validate_covers(4).is_err());
        assert!(map.validate_covers(2).is_err());
        assert!(LabelMap::default().validate_covers(1).is_err());

        let with_background = LabelMap::from_names(&["background", "person", "car", "dog"]);
        assert!(with_background.validate_covers(3).is_ok());
    }

    #[test]
    fn test_coverage_rejects_gaps() {
        // Enough entries, but class 3 has no name
        let map = LabelMap::parse("0 background\n1 person\n2 car").unwrap();
        assert!(matches!(map.validate_covers(3), Err(DetectError::Config(_))));

        let map = LabelMap::parse("0 background\n1 person\n3 dog").unwrap();
        assert!(map.validate_covers(3).is_err());

        // Index-numbered names without a background entry start at 0
        let map = LabelMap::from_names(&["person", "car", "dog"]);
        assert!(map.validate_covers(3).is_err());
    }
}
