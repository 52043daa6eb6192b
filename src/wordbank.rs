use include_dir::{include_dir, Dir};
use itertools::Itertools;
use rand::seq::SliceRandom;
use rand::Rng;
use serde::Deserialize;
use serde_json::from_str;
use std::error::Error;

static BANK_DIR: Dir = include_dir!("src/wordbanks");

/// An embedded pool of candidate puzzle words.
#[derive(Deserialize, Clone, Debug)]
pub struct WordBank {
    pub name: String,
    pub size: u32,
    pub words: Vec<String>,
}

impl WordBank {
    pub fn named(name: &str) -> Result<Self, Box<dyn Error>> {
        let file = BANK_DIR
            .get_file(format!("{name}.json"))
            .ok_or_else(|| format!("word bank '{name}' not found"))?;

        let file_as_str = file
            .contents_utf8()
            .ok_or("word bank file is not valid utf-8")?;

        let bank: WordBank = from_str(file_as_str)?;
        Ok(bank)
    }

    /// Names of all embedded banks.
    pub fn names() -> Vec<String> {
        BANK_DIR
            .files()
            .filter_map(|f| f.path().file_stem())
            .filter_map(|s| s.to_str())
            .map(|s| s.to_string())
            .sorted()
            .collect()
    }

    /// Draws up to `count` distinct words that can fit a grid whose longest
    /// run is `max_len` letters.
    pub fn sample<R: Rng + ?Sized>(
        &self,
        count: usize,
        max_len: usize,
        rng: &mut R,
    ) -> Vec<String> {
        let candidates: Vec<String> = self
            .words
            .iter()
            .map(|w| w.trim().to_lowercase())
            .filter(|w| {
                let len = w.chars().count();
                len >= 3 && len <= max_len
            })
            .unique()
            .collect();

        candidates
            .choose_multiple(rng, count)
            .cloned()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_named_english() {
        let bank = WordBank::named("english").unwrap();

        assert_eq!(bank.name, "english");
        assert!(!bank.words.is_empty());
        assert_eq!(bank.size as usize, bank.words.len());
    }

    #[test]
    fn test_named_animals() {
        let bank = WordBank::named("animals").unwrap();

        assert_eq!(bank.name, "animals");
        assert!(!bank.words.is_empty());
    }

    #[test]
    fn test_named_unknown_bank() {
        let err = WordBank::named("klingon").unwrap_err();
        assert!(err.to_string().contains("klingon"));
    }

    #[test]
    fn test_names_lists_embedded_banks() {
        let names = WordBank::names();
        assert!(names.contains(&"english".to_string()));
        assert!(names.contains(&"animals".to_string()));
    }

    #[test]
    fn test_sample_respects_count_and_length() {
        let bank = WordBank::named("english").unwrap();
        let mut rng = StdRng::seed_from_u64(5);

        let words = bank.sample(6, 6, &mut rng);

        assert_eq!(words.len(), 6);
        assert!(words.iter().all(|w| w.len() >= 3 && w.len() <= 6));
    }

    #[test]
    fn test_sample_yields_distinct_words() {
        let bank = WordBank::named("english").unwrap();
        let mut rng = StdRng::seed_from_u64(5);

        let words = bank.sample(20, 10, &mut rng);
        let mut deduped = words.clone();
        deduped.sort();
        deduped.dedup();

        assert_eq!(words.len(), deduped.len());
    }

    #[test]
    fn test_sample_more_than_available() {
        let bank = WordBank {
            name: "tiny".to_string(),
            size: 2,
            words: vec!["cat".to_string(), "dog".to_string()],
        };
        let mut rng = StdRng::seed_from_u64(1);

        let words = bank.sample(10, 8, &mut rng);
        assert_eq!(words.len(), 2);
    }

    #[test]
    fn test_bank_deserialization() {
        let json_data = r#"
        {
            "name": "test",
            "size": 2,
            "words": ["hello", "world"]
        }
        "#;

        let bank: WordBank = from_str(json_data).unwrap();
        assert_eq!(bank.name, "test");
        assert_eq!(bank.size, 2);
        assert_eq!(bank.words.len(), 2);
    }
}
