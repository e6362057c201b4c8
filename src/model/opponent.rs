// src/model/opponent.rs
use serde::{Deserialize, Serialize};

use crate::core::sanitize::{normalize_ws, split_full_name};

/// Canonical team identity in a team's opponent registry.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Opponent {
    pub id: String,
    pub full_name: String,
    #[serde(default)]
    pub location: String,
    pub name: String,
    #[serde(default)]
    pub age_group: String,
    #[serde(default)]
    pub level: String,
    #[serde(default)]
    pub owha_id: Option<String>,
}

impl Opponent {
    pub fn new(id: impl Into<String>, location: impl Into<String>, name: impl Into<String>) -> Self {
        let location = normalize_ws(&location.into());
        let name = normalize_ws(&name.into());
        Self {
            id: id.into(),
            full_name: compose_full_name(&location, &name),
            location,
            name,
            age_group: s!(),
            level: s!(),
            owha_id: None,
        }
    }

    pub fn from_candidate(id: impl Into<String>, c: &OpponentCandidate) -> Self {
        let mut o = Opponent::new(id, c.location.clone(), c.name.clone());
        if !c.full_name.is_empty() {
            o.full_name = c.full_name.clone();
        }
        o.age_group = c.age_group.clone();
        o.level = c.level.clone();
        o.owha_id = c.owha_id.clone();
        o
    }
}

/// `location + " " + name`, or whichever part is present.
pub fn compose_full_name(location: &str, name: &str) -> String {
    match (location.is_empty(), name.is_empty()) {
        (false, false) => join!(location, " ", name),
        (true, _) => name.to_string(),
        (false, true) => location.to_string(),
    }
}

/// An opponent as an adapter saw it, before anyone assigns it an id.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct OpponentCandidate {
    pub full_name: String,
    pub location: String,
    pub name: String,
    pub age_group: String,
    pub level: String,
    pub owha_id: Option<String>,
}

impl OpponentCandidate {
    pub fn from_parts(location: &str, name: &str) -> Self {
        let location = normalize_ws(location);
        let name = normalize_ws(name);
        Self { full_name: compose_full_name(&location, &name), location, name, ..Self::default() }
    }

    /// Bare full name: last word is the team name, the rest is the location.
    pub fn from_full_name(full: &str) -> Self {
        let (location, name) = split_full_name(full);
        Self { full_name: normalize_ws(full), location, name, ..Self::default() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_name_is_derived() {
        let o = Opponent::new("o1", " Waterloo ", "Wildcats");
        assert_eq!(o.full_name, "Waterloo Wildcats");
        assert_eq!(Opponent::new("o2", "", "Ice").full_name, "Ice");
    }

    #[test]
    fn candidate_keeps_scraped_full_name() {
        let c = OpponentCandidate::from_full_name("Toronto Leaside  Wildcats");
        let o = Opponent::from_candidate("o3", &c);
        assert_eq!(o.full_name, "Toronto Leaside Wildcats");
        assert_eq!(o.location, "Toronto Leaside");
        assert_eq!(o.name, "Wildcats");
    }
}
