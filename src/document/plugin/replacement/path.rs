//! Field-path expression parsing
//!
//! A path expression addresses a location inside a document tree:
//!
//! ```text
//! spec.template.spec.containers[name=server].image
//! spec.clusterConfiguration.apiServer.certSANs[0]
//! data.endpoint%\d+\.\d+\.\d+\.\d+%
//! ```
//!
//! Segments are separated by `.`, a segment may carry a `[key=value]` filter
//! selecting a sequence element or a `[n]` numeric index, and the final
//! segment of a target path may end with a `%pattern%` substring-substitution
//! suffix. Filter values and patterns may themselves contain dots (IP
//! addresses are the common case), so the parser protects dots inside `[...]`
//! with a sentinel character and strips the `%...%` suffix outright before
//! splitting, restoring the dots afterwards.
//!
//! Parsing is pure and never inspects document shape: malformed bracket
//! syntax is kept as a literal field name and surfaces as a traversal error
//! at mutation time, and whether a plain segment is a mapping key or a
//! sequence index is only decided against the node it lands on.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;

/// Matches a `NAME[KEY=VALUE]` filter segment
static FILTER_SEGMENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\S+)\[(\S+)=(\S+)\]").expect("filter segment regex"));

/// Matches a `NAME[N]` indexed segment
static INDEX_SEGMENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\S+)\[(\d+)\]$").expect("index segment regex"));

/// Matches a trailing `%PATTERN%` substring suffix
static SUBSTRING_SUFFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\S+)%(\S+)%$").expect("substring suffix regex"));

/// Stand-in for dots that must survive segment splitting
const DOT_SENTINEL: &str = "\u{1}";

/// A `[key=value]` sequence-element filter
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ElementFilter {
    /// Field the filter inspects on each element
    pub key: String,
    /// Value the field must equal
    pub value: String,
}

/// One step of a parsed path expression
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PathStep {
    /// The mapping key or (over a sequence) numeric index
    pub field: String,
    /// Sequence-element filter attached to this step
    pub filter: Option<ElementFilter>,
}

impl PathStep {
    fn plain(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            filter: None,
        }
    }
}

/// A parsed path expression: ordered steps plus an optional terminal
/// substring pattern
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PathPlan {
    /// The steps, outermost first
    pub steps: Vec<PathStep>,
    /// Substring-substitution pattern for the terminal step
    pub substring: Option<String>,
}

impl PathPlan {
    /// Parse a path expression
    pub fn parse(expression: &str) -> Self {
        // Pass 1: protect dots inside bracketed filter bodies so the
        // segment split cannot tear a dotted filter value apart.
        let mut protected = String::with_capacity(expression.len());
        for (i, part) in expression.split('[').enumerate() {
            if i > 0 {
                protected.push('[');
            }
            match part.find(']') {
                Some(end) => {
                    protected.push_str(&part[..end].replace('.', DOT_SENTINEL));
                    protected.push_str(&part[end..]);
                }
                None => protected.push_str(part),
            }
        }

        // Pass 2: strip the substring suffix before splitting; its dots
        // leave the string entirely and come back on the plan instead.
        let suffix = SUBSTRING_SUFFIX
            .captures(&protected)
            .map(|caps| (caps[1].to_string(), caps[2].replace(DOT_SENTINEL, ".")));
        let (remainder, substring) = match suffix {
            Some((remainder, pattern)) => (remainder, Some(pattern)),
            None => (protected, None),
        };

        // Pass 3: split on dots, restore the protected ones, and lift
        // bracketed segments into structured steps. An indexed segment
        // `name[2]` becomes a field step followed by an index step, which
        // is exactly how the dotted spelling `name.2` parses.
        let mut steps = Vec::new();
        for segment in remainder.split('.') {
            let segment = segment.replace(DOT_SENTINEL, ".");
            if let Some(caps) = FILTER_SEGMENT.captures(&segment) {
                steps.push(PathStep {
                    field: caps[1].to_string(),
                    filter: Some(ElementFilter {
                        key: caps[2].to_string(),
                        value: caps[3].to_string(),
                    }),
                });
            } else if let Some(caps) = INDEX_SEGMENT.captures(&segment) {
                steps.push(PathStep::plain(&caps[1]));
                steps.push(PathStep::plain(&caps[2]));
            } else {
                steps.push(PathStep::plain(segment));
            }
        }

        Self { steps, substring }
    }
}

impl fmt::Display for PathStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.field)?;
        if let Some(filter) = &self.filter {
            write!(f, "[{}={}]", filter.key, filter.value)?;
        }
        Ok(())
    }
}

impl fmt::Display for PathPlan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, step) in self.steps.iter().enumerate() {
            if i > 0 {
                write!(f, ".")?;
            }
            write!(f, "{step}")?;
        }
        if let Some(substring) = &self.substring {
            write!(f, "%{substring}%")?;
        }
        Ok(())
    }
}
