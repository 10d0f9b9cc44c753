//! Read-only in-memory data served by the handlers.
//!
//! Built once at first use and never mutated. The only moving part is the
//! [`Picker`], which may hold a seeded generator behind a mutex.

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::str::FromStr;
use std::sync::{Mutex, PoisonError};

use once_cell::sync::Lazy;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use thiserror::Error;

/// The fixed list sliced by `GET /bumbums/`.
pub const BUMBUM_NAMES: [&str; 3] = ["King", "Emperor", "President"];

/// Items echoed by `GET /specific-query`.
pub const SPECIFIC_ITEMS: [&str; 2] = ["Foo", "Bar"];

/// Accepted prefixes for book identifiers.
pub const BOOK_ID_PREFIXES: [&str; 2] = ["isbn-", "imdb-"];

pub const INVALID_BOOK_ID: &str = r#"Invalid ID format, it must start with "isbn-" or "imdb-""#;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BumBumModel {
    Root,
    Special,
    Hidden,
}

impl BumBumModel {
    /// Literals in declared order.
    pub const NAMES: &'static [&'static str] = &["root", "special", "hidden"];

    pub fn as_str(&self) -> &'static str {
        match self {
            BumBumModel::Root => "root",
            BumBumModel::Special => "special",
            BumBumModel::Hidden => "hidden",
        }
    }

    pub fn message(&self) -> &'static str {
        MODEL_MESSAGES.get(self).copied().unwrap_or_default()
    }
}

impl fmt::Display for BumBumModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The literal is not one of [`BumBumModel::NAMES`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown bumbum model `{0}`")]
pub struct UnknownModel(pub String);

impl FromStr for BumBumModel {
    type Err = UnknownModel;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "root" => Ok(BumBumModel::Root),
            "special" => Ok(BumBumModel::Special),
            "hidden" => Ok(BumBumModel::Hidden),
            other => Err(UnknownModel(other.to_string())),
        }
    }
}

static MODEL_MESSAGES: Lazy<HashMap<BumBumModel, &'static str>> = Lazy::new(|| {
    HashMap::from([
        (BumBumModel::Root, "ROOT OF ALL BUMBUMS"),
        (BumBumModel::Special, "My special BumBum"),
        (BumBumModel::Hidden, "Where are you, BumBum?"),
    ])
});

static BOOKS: Lazy<BTreeMap<&'static str, &'static str>> = Lazy::new(|| {
    BTreeMap::from([
        ("isbn-9781529046137", "The Hitchhiker's Guide to the Galaxy"),
        ("imdb-tt0371724", "The Hitchhiker's Guide to the Galaxy"),
        ("isbn-9781439512982", "Isaac Asimov: The Complete Stories, Vol. 2"),
    ])
});

pub fn book_title(id: &str) -> Option<&'static str> {
    BOOKS.get(id).copied()
}

pub fn books() -> impl Iterator<Item = (&'static str, &'static str)> {
    BOOKS.iter().map(|(id, title)| (*id, *title))
}

/// A book chosen by `picker`; `None` only if the mapping were empty.
pub fn random_book(picker: &Picker) -> Option<(&'static str, &'static str)> {
    picker.pick_index(BOOKS.len()).and_then(|i| books().nth(i))
}

/// Source of the random fallback pick.
///
/// Unseeded pickers draw from the thread-local generator. Seeded pickers
/// replay the same sequence for the same seed.
pub struct Picker {
    seeded: Option<Mutex<StdRng>>,
}

impl Picker {
    pub fn new(seed: Option<u64>) -> Self {
        Self {
            seeded: seed.map(|s| Mutex::new(StdRng::seed_from_u64(s))),
        }
    }

    pub fn is_seeded(&self) -> bool {
        self.seeded.is_some()
    }

    /// Uniform index in `0..len`, `None` when `len` is zero.
    pub fn pick_index(&self, len: usize) -> Option<usize> {
        if len == 0 {
            return None;
        }
        let index = match &self.seeded {
            Some(rng) => rng
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .gen_range(0..len),
            None => rand::thread_rng().gen_range(0..len),
        };
        Some(index)
    }
}

impl Default for Picker {
    fn default() -> Self {
        Self::new(None)
    }
}

impl fmt::Debug for Picker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Picker").field("seeded", &self.is_seeded()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_model_has_a_message() {
        for name in BumBumModel::NAMES {
            let model: BumBumModel = name.parse().unwrap();
            assert_eq!(model.as_str(), *name);
            assert!(!model.message().is_empty());
        }
        assert_eq!(BumBumModel::Root.message(), "ROOT OF ALL BUMBUMS");
        assert!("ROOT".parse::<BumBumModel>().is_err());
    }

    #[test]
    fn test_book_lookup() {
        assert_eq!(
            book_title("isbn-9781529046137"),
            Some("The Hitchhiker's Guide to the Galaxy")
        );
        assert_eq!(book_title("isbn-0000"), None);
    }

    #[test]
    fn test_seeded_picker_is_reproducible() {
        let a = Picker::new(Some(42));
        let b = Picker::new(Some(42));
        let left: Vec<_> = (0..16).map(|_| a.pick_index(3)).collect();
        let right: Vec<_> = (0..16).map(|_| b.pick_index(3)).collect();
        assert_eq!(left, right);
        assert!(left.iter().all(|i| matches!(i, Some(0..=2))));
    }

    #[test]
    fn test_random_book_is_a_known_entry() {
        let picker = Picker::default();
        for _ in 0..20 {
            let (id, title) = random_book(&picker).unwrap();
            assert_eq!(book_title(id), Some(title));
        }
        assert_eq!(picker.pick_index(0), None);
    }
}
