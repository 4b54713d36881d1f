//! Per-accident severity resolution.
//!
//! An accident's severity is the worst outcome among the people involved.
//! Casualty rows are grouped by accident id and each group is folded to
//! its highest-ranked row, keeping a count of every row in the group.

use std::collections::BTreeMap;

use road_safety_accident_models::RawCasualty;
use road_safety_config::SeverityScale;

use crate::parsing::parse_code;

/// Severity outcome of one accident.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedSeverity {
    /// Code of the highest-ranked casualty, `None` if it had no code.
    pub code: Option<i64>,
    /// Label of that code.
    pub label: String,
    /// Number of casualty rows for the accident.
    pub victim_count: u32,
}

/// Running state of one accident group.
struct Worst {
    code: Option<i64>,
    rank: i32,
    count: u32,
}

/// Resolves the worst severity of every accident that has casualty rows.
///
/// Unmapped or missing codes rank [`SeverityScale::UNRANKED`], so they only
/// win when no casualty of the accident has a known code. Among rows of
/// equal rank the first one is kept; they share the same code whenever the
/// rank is a known one. Accidents without casualty rows are absent from
/// the result.
#[must_use]
pub fn resolve_severities(
    casualties: &[RawCasualty],
    scale: &SeverityScale,
) -> BTreeMap<String, ResolvedSeverity> {
    let mut groups: BTreeMap<&str, Worst> = BTreeMap::new();

    for casualty in casualties {
        let code = parse_code(casualty.severity.as_deref());
        let rank = scale.rank(code);

        groups
            .entry(casualty.accident_id.as_str())
            .and_modify(|worst| {
                worst.count = worst.count.saturating_add(1);
                if rank > worst.rank {
                    worst.code = code;
                    worst.rank = rank;
                }
            })
            .or_insert(Worst {
                code,
                rank,
                count: 1,
            });
    }

    groups
        .into_iter()
        .map(|(accident_id, worst)| {
            (
                accident_id.to_owned(),
                ResolvedSeverity {
                    code: worst.code,
                    label: scale.label(worst.code).to_owned(),
                    victim_count: worst.count,
                },
            )
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use road_safety_accident_models::UNKNOWN_SEVERITY;
    use road_safety_config::SeverityLevel;

    use super::*;

    fn scale() -> SeverityScale {
        [(1, "Indemne", 0), (2, "Tue", 3), (3, "Blesse hospitalise", 2), (4, "Blesse leger", 1)]
            .into_iter()
            .map(|(code, label, rank)| {
                (
                    code,
                    SeverityLevel {
                        label: label.to_string(),
                        rank,
                    },
                )
            })
            .collect()
    }

    fn casualty(id: &str, severity: Option<&str>) -> RawCasualty {
        RawCasualty {
            accident_id: id.to_string(),
            severity: severity.map(str::to_string),
        }
    }

    #[test]
    fn highest_rank_wins_regardless_of_order() {
        let forward = vec![casualty("1", Some("2")), casualty("1", Some("3"))];
        let backward = vec![casualty("1", Some("3")), casualty("1", Some("2"))];

        for rows in [forward, backward] {
            let resolved = resolve_severities(&rows, &scale());
            let first = &resolved["1"];
            assert_eq!(first.code, Some(2));
            assert_eq!(first.label, "Tue");
            assert_eq!(first.victim_count, 2);
        }
    }

    #[test]
    fn counts_every_casualty_row() {
        let rows = vec![
            casualty("1", Some("4")),
            casualty("1", Some("1")),
            casualty("1", None),
            casualty("2", Some("4")),
        ];
        let resolved = resolve_severities(&rows, &scale());
        assert_eq!(resolved.len(), 2);
        assert_eq!(resolved["1"].victim_count, 3);
        assert_eq!(resolved["1"].code, Some(4));
        assert_eq!(resolved["2"].victim_count, 1);
    }

    #[test]
    fn unmapped_codes_never_beat_known_ones() {
        let rows = vec![casualty("1", Some("-1")), casualty("1", Some("1"))];
        let resolved = resolve_severities(&rows, &scale());
        assert_eq!(resolved["1"].code, Some(1));
        assert_eq!(resolved["1"].label, "Indemne");
    }

    #[test]
    fn all_unknown_gives_unknown_label() {
        let rows = vec![casualty("9", None), casualty("9", Some("x"))];
        let resolved = resolve_severities(&rows, &scale());
        assert_eq!(resolved["9"].code, None);
        assert_eq!(resolved["9"].label, UNKNOWN_SEVERITY);
        assert_eq!(resolved["9"].victim_count, 2);
    }

    #[test]
    fn empty_input_resolves_nothing() {
        assert!(resolve_severities(&[], &scale()).is_empty());
    }
}
