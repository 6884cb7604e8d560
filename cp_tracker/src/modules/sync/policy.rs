use once_cell::sync::Lazy;
use regex::Regex;
use std::{collections::BTreeSet, fmt, str::FromStr};

static DIV4: Lazy<Regex> = Lazy::new(|| Regex::new(r"Div\.\s*4").unwrap());
static DIV3: Lazy<Regex> = Lazy::new(|| Regex::new(r"Div\.\s*3").unwrap());
static DIV2: Lazy<Regex> = Lazy::new(|| Regex::new(r"Div\.\s*2").unwrap());
static STANDARD_ROUND: Lazy<Regex> = Lazy::new(|| Regex::new(r"Div\.|Global|Educational").unwrap());

/// Whether a contest counts as a regular rated round for the missed-contest list.
pub fn is_standard_round(contest_name: &str) -> bool {
    STANDARD_ROUND.is_match(contest_name)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContestDivision {
    Div2,
    Div3,
    Div4,
    Other,
}

impl ContestDivision {
    /// Checked from the lowest tier up, so `Div. 1 + Div. 2` is a Div. 2 round.
    pub fn classify(contest_name: &str) -> Self {
        if DIV4.is_match(contest_name) {
            ContestDivision::Div4
        } else if DIV3.is_match(contest_name) {
            ContestDivision::Div3
        } else if DIV2.is_match(contest_name) {
            ContestDivision::Div2
        } else {
            ContestDivision::Other
        }
    }
}

/// Problem indices of a contest that go into the queue when unsolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IndexSelection {
    All,
    Only(BTreeSet<char>),
}

impl IndexSelection {
    /// `C1` and `C2` are both matched by `C`.
    pub fn matches(&self, index: &str) -> bool {
        match self {
            IndexSelection::All => true,
            IndexSelection::Only(letters) => index
                .chars()
                .next()
                .map(|c| letters.contains(&c.to_ascii_uppercase()))
                .unwrap_or(false),
        }
    }
}

impl FromStr for IndexSelection {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s == "*" || s.eq_ignore_ascii_case("all") {
            return Ok(IndexSelection::All);
        }

        let mut letters = BTreeSet::new();
        for item in s.split(',').map(str::trim).filter(|item| !item.is_empty()) {
            let mut chars = item.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) if c.is_ascii_alphabetic() => {
                    letters.insert(c.to_ascii_uppercase());
                }
                _ => return Err(format!("invalid problem index `{}`", item)),
            }
        }
        if letters.is_empty() {
            return Err(String::from("index selection must not be empty"));
        }

        Ok(IndexSelection::Only(letters))
    }
}

impl fmt::Display for IndexSelection {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            IndexSelection::All => write!(f, "*"),
            IndexSelection::Only(letters) => {
                let letters: Vec<String> = letters.iter().map(char::to_string).collect();
                write!(f, "{}", letters.join(","))
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DivisionPolicy {
    pub div2: IndexSelection,
    pub div3: IndexSelection,
    pub div4: IndexSelection,
    /// Div. 1, Global rounds and anything unrecognized.
    pub other: IndexSelection,
}

impl Default for DivisionPolicy {
    fn default() -> Self {
        Self {
            div2: IndexSelection::Only(BTreeSet::from(['A', 'B', 'C', 'D'])),
            div3: IndexSelection::All,
            div4: IndexSelection::All,
            other: IndexSelection::Only(BTreeSet::from(['A', 'B', 'C'])),
        }
    }
}

impl DivisionPolicy {
    pub fn selection(&self, division: ContestDivision) -> &IndexSelection {
        match division {
            ContestDivision::Div2 => &self.div2,
            ContestDivision::Div3 => &self.div3,
            ContestDivision::Div4 => &self.div4,
            ContestDivision::Other => &self.other,
        }
    }

    pub fn includes(&self, contest_name: &str, index: &str) -> bool {
        self.selection(ContestDivision::classify(contest_name))
            .matches(index)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_classify_division() {
        let cases = [
            ("Codeforces Round 920 (Div. 3)", ContestDivision::Div3),
            ("Codeforces Round 918 (Div. 4)", ContestDivision::Div4),
            ("Codeforces Round 919 (Div. 2)", ContestDivision::Div2),
            ("Codeforces Round 921 (Div. 1)", ContestDivision::Other),
            (
                "Codeforces Round 917 (Div. 1 + Div. 2)",
                ContestDivision::Div2,
            ),
            (
                "Educational Codeforces Round 161 (Rated for Div. 2)",
                ContestDivision::Div2,
            ),
            ("Good Bye 2023", ContestDivision::Other),
            ("Codeforces Global Round 24", ContestDivision::Other),
        ];

        for (name, expected) in cases {
            assert_eq!(ContestDivision::classify(name), expected, "{}", name);
        }
    }

    #[test]
    fn test_standard_round() {
        assert!(is_standard_round("Codeforces Round 920 (Div. 3)"));
        assert!(is_standard_round("Codeforces Global Round 24"));
        assert!(is_standard_round("Educational Codeforces Round 161"));
        assert!(!is_standard_round("Good Bye 2023"));
        assert!(!is_standard_round("Kotlin Heroes: Episode 9"));
    }

    #[test]
    fn test_parse_index_selection() {
        assert_eq!("*".parse::<IndexSelection>(), Ok(IndexSelection::All));
        assert_eq!("ALL".parse::<IndexSelection>(), Ok(IndexSelection::All));
        assert_eq!(
            "a, b ,C".parse::<IndexSelection>(),
            Ok(IndexSelection::Only(BTreeSet::from(['A', 'B', 'C'])))
        );
        assert!("A,BC".parse::<IndexSelection>().is_err());
        assert!("".parse::<IndexSelection>().is_err());
        assert_eq!(
            "D,A".parse::<IndexSelection>().unwrap().to_string(),
            "A,D"
        );
    }

    #[test]
    fn test_index_matches_leading_letter() {
        let selection: IndexSelection = "A,B,C".parse().unwrap();
        assert!(selection.matches("C1"));
        assert!(selection.matches("c2"));
        assert!(!selection.matches("D"));
        assert!(!selection.matches(""));
    }

    #[test]
    fn test_default_policy() {
        let policy = DivisionPolicy::default();
        let div2 = "Codeforces Round 919 (Div. 2)";
        let included: Vec<&str> = ["A", "B", "C", "D", "E", "F"]
            .into_iter()
            .filter(|index| policy.includes(div2, index))
            .collect();
        assert_eq!(included, vec!["A", "B", "C", "D"]);

        assert!(policy.includes("Codeforces Round 920 (Div. 3)", "G"));
        assert!(policy.includes("Codeforces Round 921 (Div. 1)", "C"));
        assert!(!policy.includes("Codeforces Round 921 (Div. 1)", "D"));
    }
}
