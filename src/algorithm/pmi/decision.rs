//! The resolved outcome of every stage for one record

use std::fmt;

use smallvec::SmallVec;

use crate::models::UrValue;

/// Field tags changed on a potential duplicate
pub type Changes = SmallVec<[&'static str; 5]>;

/// Which link field a link occupies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LinkKind {
    Alias,
    Merge,
}

impl LinkKind {
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Alias => "Alias",
            Self::Merge => "Merged",
        }
    }
}

/// An Alias or Merge link as resolved
#[derive(Debug, Clone, PartialEq)]
pub struct Link {
    pub kind: LinkKind,
    /// Slot of the record the link was drawn against
    pub target: usize,
    /// Value written to the link field
    pub value: UrValue,
    /// The link points at a UR that is never emitted
    pub orphaned: bool,
    /// The target is deleted but the record was kept live
    pub undeleted: bool,
    /// The record became deleted because its target is
    pub inherited_delete: bool,
}

/// Duplicate injected in the anomaly-only stage
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Duplicate {
    /// Reuses the UR of the source record
    SameUr { source: usize },
    /// Copy of the source with at least one field changed
    Potential { source: usize, changes: Changes },
    /// Copy of the source with no effective change, under a new UR
    Actual { source: usize, changes: Changes },
}

impl Duplicate {
    #[must_use]
    pub const fn source(&self) -> usize {
        match self {
            Self::SameUr { source } | Self::Potential { source, .. } | Self::Actual { source, .. } => {
                *source
            }
        }
    }
}

/// How a secondary record's AltUR was corrupted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AltUrError {
    /// An unused master UR, or an invalid one
    Bad,
    /// The UR of a master alias record
    Alias,
    /// The UR of a master merged record
    Merged,
    /// The UR of a master deleted record
    Deleted,
}

/// Cross-link of a secondary record to a master record
#[derive(Debug, Clone, PartialEq)]
pub struct AltLink {
    /// Index of the master record cloned
    pub master: usize,
    pub error: Option<AltUrError>,
    /// Whether the error fell back to an invalid UR
    pub fell_back: bool,
    pub bad_ihi: bool,
}

/// The branch a record is counted under
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Branch {
    Unlinked,
    Alias,
    Merge,
    AliasAndMerge,
    DeletedOnly,
    DuplicateUr,
    PotentialDuplicate,
    ActualDuplicate,
    AltLinked,
}

/// Everything decided about one record
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecordDecision {
    pub bootstrap: bool,
    pub alias: Option<Link>,
    pub merge: Option<Link>,
    /// Deleted by the deletion stage itself
    pub deleted: bool,
    pub duplicate: Option<Duplicate>,
    pub alt_link: Option<AltLink>,
    /// Name component changed on an Alias ("fn" or "gn")
    pub alias_name_change: Option<&'static str>,
    pub family_name_error: bool,
    pub given_name_error: bool,
    /// Field groups copied from the source record
    pub clone_info: Option<String>,
}

impl RecordDecision {
    #[must_use]
    pub const fn is_linked(&self) -> bool {
        self.alias.is_some() || self.merge.is_some()
    }

    /// Slot of the record this one was cloned from, if any
    #[must_use]
    pub fn source(&self) -> Option<usize> {
        self.alias
            .as_ref()
            .or(self.merge.as_ref())
            .map(|link| link.target)
            .or_else(|| self.duplicate.as_ref().map(Duplicate::source))
    }

    #[must_use]
    pub const fn branch(&self) -> Branch {
        if self.alt_link.is_some() {
            return Branch::AltLinked;
        }
        match (&self.alias, &self.merge, &self.duplicate) {
            (Some(_), Some(_), _) => Branch::AliasAndMerge,
            (Some(_), None, _) => Branch::Alias,
            (None, Some(_), _) => Branch::Merge,
            (None, None, _) if self.deleted => Branch::DeletedOnly,
            (None, None, Some(Duplicate::SameUr { .. })) => Branch::DuplicateUr,
            (None, None, Some(Duplicate::Potential { .. })) => Branch::PotentialDuplicate,
            (None, None, Some(Duplicate::Actual { .. })) => Branch::ActualDuplicate,
            (None, None, None) => Branch::Unlinked,
        }
    }

    /// Whether the record took a branch worth a provenance line
    #[must_use]
    pub const fn is_notable(&self) -> bool {
        !matches!(self.branch(), Branch::Unlinked) || self.family_name_error || self.given_name_error
    }
}

fn push(text: &mut String, part: &str) {
    if !text.is_empty() {
        text.push(',');
    }
    text.push_str(part);
}

impl fmt::Display for RecordDecision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut text = String::new();
        if let Some(alt) = &self.alt_link {
            if alt.bad_ihi {
                push(&mut text, "AltIHI");
            }
            match (alt.error, alt.fell_back) {
                (Some(_), true) | (Some(AltUrError::Bad), false) => push(&mut text, "AltUR"),
                (Some(AltUrError::Alias), false) => push(&mut text, "aliasAltUR"),
                (Some(AltUrError::Merged), false) => push(&mut text, "mergedAltUR"),
                (Some(AltUrError::Deleted), false) => push(&mut text, "DelAltUR"),
                (None, _) => push(&mut text, "to AltUR"),
            }
        }
        for link in [&self.alias, &self.merge].into_iter().flatten() {
            let mut part = format!("to {}", link.kind.label());
            if link.kind == LinkKind::Alias {
                if let Some(change) = self.alias_name_change {
                    part.push(' ');
                    part.push_str(change);
                }
            }
            push(&mut text, &part);
            if link.undeleted {
                push(&mut text, "of Del");
            }
            if link.orphaned {
                push(&mut text, "badUR");
            }
        }
        if self.deleted {
            push(&mut text, "to Deleted");
        }
        match &self.duplicate {
            Some(Duplicate::SameUr { .. }) => push(&mut text, "to DupUR"),
            Some(Duplicate::Potential { changes, .. } | Duplicate::Actual { changes, .. }) => {
                let mut part = String::from("to potDup");
                if !changes.is_empty() {
                    part.push(' ');
                    part.push_str(&changes.join(" "));
                }
                push(&mut text, &part);
            }
            None => {}
        }
        if self.family_name_error {
            push(&mut text, "fn error");
        }
        if self.given_name_error {
            push(&mut text, "gn error");
        }
        f.write_str(&text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use smallvec::smallvec;

    fn link(kind: LinkKind, target: usize) -> Link {
        Link {
            kind,
            target,
            value: UrValue::Number(1000 + target as u64),
            orphaned: false,
            undeleted: false,
            inherited_delete: false,
        }
    }

    #[test]
    fn test_branch_precedence() {
        let mut decision = RecordDecision::default();
        assert_eq!(decision.branch(), Branch::Unlinked);
        assert!(!decision.is_notable());

        decision.deleted = true;
        assert_eq!(decision.branch(), Branch::DeletedOnly);

        decision.alias = Some(link(LinkKind::Alias, 2));
        assert_eq!(decision.branch(), Branch::Alias);
        decision.merge = Some(link(LinkKind::Merge, 2));
        assert_eq!(decision.branch(), Branch::AliasAndMerge);
        assert_eq!(decision.source(), Some(2));
    }

    #[test]
    fn test_description() {
        let mut decision = RecordDecision {
            alias: Some(Link {
                undeleted: true,
                ..link(LinkKind::Alias, 3)
            }),
            alias_name_change: Some("fn"),
            deleted: true,
            ..RecordDecision::default()
        };
        assert_eq!(decision.to_string(), "to Alias fn,of Del,to Deleted");

        decision = RecordDecision {
            duplicate: Some(Duplicate::Potential {
                source: 4,
                changes: smallvec!["married", "sex"],
            }),
            ..RecordDecision::default()
        };
        assert_eq!(decision.to_string(), "to potDup married sex");
        assert_eq!(decision.branch(), Branch::PotentialDuplicate);
    }
}
