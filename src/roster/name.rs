//! Student name normalization.

/// Capitalize every whitespace separated word and join them with single
/// spaces. The first character of each word is upper-cased and the rest
/// lower-cased, so `"o'NEIL  mary"` becomes `"O'neil Mary"`.
pub fn capitalize_words(raw: &str) -> String {
    raw.split_whitespace()
        .map(capitalize)
        .collect::<Vec<_>>()
        .join(" ")
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.flat_map(char::to_lowercase))
            .collect(),
        None => String::new(),
    }
}

/// A roster name split into its legal name and optional alias.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StudentName {
    /// Legal name, capitalized, without the alias
    pub name: String,
    /// Text that appeared in parentheses, empty if none
    pub alias: String,
    pub first_name: String,
    pub last_name: String,
}

impl StudentName {
    /// Parse a raw roster name such as `"  jane   DOE (JJ)"`.
    pub fn parse(raw: &str) -> Self {
        let capitalized = capitalize_words(raw);

        let (name, alias) = match capitalized.find('(') {
            Some(idx) => {
                let alias: String = capitalized[idx..]
                    .chars()
                    .filter(|c| *c != '(' && *c != ')')
                    .collect();
                (
                    capitalized[..idx].trim().to_string(),
                    alias.trim().to_string(),
                )
            }
            None => (capitalized, String::new()),
        };

        let (first_name, last_name) = match name.rsplit_once(' ') {
            Some((first, last)) => (first.to_string(), last.to_string()),
            None => (name.clone(), String::new()),
        };

        Self {
            name,
            alias,
            first_name,
            last_name,
        }
    }

    /// First two lower-cased words of the name joined by `.`.
    pub fn username(&self) -> String {
        self.name
            .to_lowercase()
            .split_whitespace()
            .take(2)
            .collect::<Vec<_>>()
            .join(".")
    }

    pub fn is_empty(&self) -> bool {
        self.name.is_empty()
    }
}
