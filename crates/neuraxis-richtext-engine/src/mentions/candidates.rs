/// Identities offered when no other source is configured.
pub const USERNAMES: [&str; 19] = [
    "ben",
    "CJ",
    "cory.faller",
    "daniel.macdonald",
    "doug",
    "erinn",
    "henry",
    "Jason",
    "josh.barnett",
    "jritterbush",
    "margie",
    "mark",
    "matt.wade",
    "mattpilla",
    "Rob Bruhn",
    "ryanskurkis",
    "Stephanie Barker",
    "tim.deuchler",
    "travis",
];

/// Supplies mention candidates for a query, best first.
///
/// Any `Fn(&str) -> Vec<String>` is a source, so a test or a host can swap
/// the fixed list for its own lookup.
pub trait CandidateSource {
    fn lookup(&self, query: &str) -> Vec<String>;
}

impl<F> CandidateSource for F
where
    F: Fn(&str) -> Vec<String>,
{
    fn lookup(&self, query: &str) -> Vec<String> {
        self(query)
    }
}

/// A fixed, ordered universe matched by case-insensitive prefix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StaticCandidates {
    names: Vec<String>,
}

impl StaticCandidates {
    pub fn new<S: Into<String>>(names: impl IntoIterator<Item = S>) -> Self {
        Self {
            names: names.into_iter().map(Into::into).collect(),
        }
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }
}

impl Default for StaticCandidates {
    fn default() -> Self {
        Self::new(USERNAMES)
    }
}

impl CandidateSource for StaticCandidates {
    fn lookup(&self, query: &str) -> Vec<String> {
        let query = query.to_lowercase();
        self.names
            .iter()
            .filter(|name| name.to_lowercase().starts_with(&query))
            .cloned()
            .collect()
    }
}
