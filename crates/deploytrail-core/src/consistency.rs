//! Version consistency across an app's environments.
//!
//! Two rules are supported and callers pick one explicitly:
//!
//! - [`ConsistencyRule::Majority`]: each cell is compared with the row's
//!   majority version, so a 2-1 split flags only the odd environment.
//! - [`ConsistencyRule::AllSame`]: the whole row is consistent only when
//!   every environment runs the same version; every cell carries that
//!   row-level flag.
//!
//! Majority ties go to the version seen first when environments are walked
//! in ascending name order.

use std::collections::BTreeMap;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::matrix::EnvironmentRow;

/// Rule used to decide whether a cell is consistent.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ConsistencyRule {
    #[default]
    Majority,
    AllSame,
}

impl FromStr for ConsistencyRule {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "majority" => Ok(ConsistencyRule::Majority),
            "all-same" | "all_same" | "strict" => Ok(ConsistencyRule::AllSame),
            other => Err(format!(
                "unknown consistency rule {other:?} (expected majority or all-same)"
            )),
        }
    }
}

impl std::fmt::Display for ConsistencyRule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConsistencyRule::Majority => write!(f, "majority"),
            ConsistencyRule::AllSame => write!(f, "all-same"),
        }
    }
}

/// Most common version in a row, or `None` for an empty row.
pub fn majority_version(row: &EnvironmentRow) -> Option<&str> {
    // Vec keeps first-seen order so ties resolve to the earliest environment.
    let mut tally: Vec<(&str, usize)> = Vec::new();
    for record in row.values() {
        let version = record.version.as_str();
        match tally.iter_mut().find(|(v, _)| *v == version) {
            Some((_, count)) => *count += 1,
            None => tally.push((version, 1)),
        }
    }

    let mut best: Option<(&str, usize)> = None;
    for (version, count) in tally {
        match best {
            Some((_, best_count)) if best_count >= count => {}
            _ => best = Some((version, count)),
        }
    }
    best.map(|(version, _)| version)
}

/// True when the row is non-empty and every environment runs one version.
pub fn all_same(row: &EnvironmentRow) -> bool {
    let mut versions = row.values().map(|r| r.version.as_str());
    match versions.next() {
        Some(first) => versions.all(|v| v == first),
        None => false,
    }
}

/// Per-environment consistency flags for one row under `rule`.
pub fn cell_flags(row: &EnvironmentRow, rule: ConsistencyRule) -> BTreeMap<String, bool> {
    match rule {
        ConsistencyRule::Majority => {
            let majority = majority_version(row);
            row.iter()
                .map(|(env, record)| (env.clone(), Some(record.version.as_str()) == majority))
                .collect()
        }
        ConsistencyRule::AllSame => {
            let consistent = all_same(row);
            row.keys().map(|env| (env.clone(), consistent)).collect()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use deploytrail_store::DeploymentRecord;

    fn row(cells: &[(&str, &str)]) -> EnvironmentRow {
        cells
            .iter()
            .enumerate()
            .map(|(i, (env, version))| {
                (
                    env.to_string(),
                    DeploymentRecord::new(i as u64, "web", env, version, "2024-01-01T00:00:00Z"),
                )
            })
            .collect()
    }

    #[test]
    fn test_majority_of_agreeing_row() {
        let r = row(&[("prod", "1.3"), ("staging", "1.3")]);
        assert_eq!(majority_version(&r), Some("1.3"));
        assert!(all_same(&r));
        let flags = cell_flags(&r, ConsistencyRule::Majority);
        assert!(flags.values().all(|f| *f));
    }

    #[test]
    fn test_two_one_split_rules_disagree() {
        let r = row(&[("dev", "1.4"), ("prod", "1.3"), ("staging", "1.3")]);
        assert_eq!(majority_version(&r), Some("1.3"));

        let majority = cell_flags(&r, ConsistencyRule::Majority);
        assert!(!majority["dev"]);
        assert!(majority["prod"]);
        assert!(majority["staging"]);

        let strict = cell_flags(&r, ConsistencyRule::AllSame);
        assert!(strict.values().all(|f| !*f));
    }

    #[test]
    fn test_majority_tie_goes_to_first_environment_by_name() {
        // "alpha" sorts first, so its version wins the 1-1 tie.
        let r = row(&[("zeta", "2.0"), ("alpha", "1.0")]);
        assert_eq!(majority_version(&r), Some("1.0"));

        let flags = cell_flags(&r, ConsistencyRule::Majority);
        assert!(flags["alpha"]);
        assert!(!flags["zeta"]);
    }

    #[test]
    fn test_single_environment_is_consistent() {
        let r = row(&[("prod", "1.0")]);
        assert_eq!(majority_version(&r), Some("1.0"));
        assert!(cell_flags(&r, ConsistencyRule::Majority)["prod"]);
        assert!(cell_flags(&r, ConsistencyRule::AllSame)["prod"]);
    }

    #[test]
    fn test_empty_row() {
        let r = EnvironmentRow::new();
        assert_eq!(majority_version(&r), None);
        assert!(!all_same(&r));
        assert!(cell_flags(&r, ConsistencyRule::Majority).is_empty());
    }

    #[test]
    fn test_rule_parsing() {
        assert_eq!(
            "majority".parse::<ConsistencyRule>().unwrap(),
            ConsistencyRule::Majority
        );
        assert_eq!(
            "All-Same".parse::<ConsistencyRule>().unwrap(),
            ConsistencyRule::AllSame
        );
        assert!("sometimes".parse::<ConsistencyRule>().is_err());
        assert_eq!(ConsistencyRule::AllSame.to_string(), "all-same");
    }
}
