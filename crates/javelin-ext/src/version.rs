//! Maven version parsing and comparison.
//!
//! Maven versions use a custom ordering that differs from semver: segments
//! split on `.` and `-`, numeric segments compare as numbers, and string
//! qualifiers have a defined ordering
//! (`alpha < beta < milestone < rc < snapshot < "" (release) < sp`).
//! A missing segment compares as the empty/release segment, so `1.0` equals
//! `1.0.0` and `1.0` sorts above `1.0-rc`.

use std::cmp::Ordering;
use std::fmt;

/// A parsed Maven version with comparable segments.
#[derive(Debug, Clone)]
pub struct MavenVersion {
    pub original: String,
    segments: Vec<Segment>,
}

#[derive(Debug, Clone, Eq, PartialEq)]
enum Segment {
    Numeric(u64),
    Qualifier(Qualifier),
    Text(String),
}

#[derive(Debug, Clone, Copy, Eq, PartialEq, Ord, PartialOrd)]
enum Qualifier {
    Alpha,
    Beta,
    Milestone,
    Rc,
    Snapshot,
    Release,
    Sp,
}

impl MavenVersion {
    pub fn parse(version: &str) -> Self {
        let segments = version
            .split(['.', '-'])
            .filter(|token| !token.is_empty())
            .map(classify)
            .collect();
        Self {
            original: version.to_string(),
            segments,
        }
    }

    pub fn is_snapshot(&self) -> bool {
        self.original.ends_with("-SNAPSHOT")
    }
}

fn classify(token: &str) -> Segment {
    if let Ok(n) = token.parse::<u64>() {
        return Segment::Numeric(n);
    }
    match token.to_lowercase().as_str() {
        "alpha" | "a" => Segment::Qualifier(Qualifier::Alpha),
        "beta" | "b" => Segment::Qualifier(Qualifier::Beta),
        "milestone" | "m" => Segment::Qualifier(Qualifier::Milestone),
        "rc" | "cr" => Segment::Qualifier(Qualifier::Rc),
        "snapshot" => Segment::Qualifier(Qualifier::Snapshot),
        "ga" | "final" | "release" => Segment::Qualifier(Qualifier::Release),
        "sp" => Segment::Qualifier(Qualifier::Sp),
        _ => Segment::Text(token.to_string()),
    }
}

impl fmt::Display for MavenVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.original)
    }
}

impl PartialEq for MavenVersion {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for MavenVersion {}

impl Ord for MavenVersion {
    fn cmp(&self, other: &Self) -> Ordering {
        let len = self.segments.len().max(other.segments.len());
        for i in 0..len {
            let ord = match (self.segments.get(i), other.segments.get(i)) {
                (None, None) => Ordering::Equal,
                (Some(s), None) => segment_vs_empty(s),
                (None, Some(s)) => segment_vs_empty(s).reverse(),
                (Some(a), Some(b)) => segment_cmp(a, b),
            };
            if ord != Ordering::Equal {
                return ord;
            }
        }
        Ordering::Equal
    }
}

impl PartialOrd for MavenVersion {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// How a segment compares against a missing segment (release padding).
fn segment_vs_empty(seg: &Segment) -> Ordering {
    match seg {
        Segment::Numeric(0) => Ordering::Equal,
        Segment::Numeric(_) => Ordering::Greater,
        Segment::Qualifier(q) => q.cmp(&Qualifier::Release),
        Segment::Text(_) => Ordering::Less,
    }
}

fn segment_cmp(a: &Segment, b: &Segment) -> Ordering {
    match (a, b) {
        (Segment::Numeric(a), Segment::Numeric(b)) => a.cmp(b),
        (Segment::Qualifier(a), Segment::Qualifier(b)) => a.cmp(b),
        (Segment::Numeric(_), Segment::Qualifier(_) | Segment::Text(_)) => Ordering::Greater,
        (Segment::Qualifier(_) | Segment::Text(_), Segment::Numeric(_)) => Ordering::Less,
        (Segment::Text(a), Segment::Text(b)) => a.to_lowercase().cmp(&b.to_lowercase()),
        // An unknown qualifier sorts below release, above known pre-release
        (Segment::Qualifier(q), Segment::Text(_)) => {
            if *q >= Qualifier::Release {
                Ordering::Greater
            } else {
                Ordering::Less
            }
        }
        (Segment::Text(_), Segment::Qualifier(q)) => {
            if *q >= Qualifier::Release {
                Ordering::Less
            } else {
                Ordering::Greater
            }
        }
    }
}
