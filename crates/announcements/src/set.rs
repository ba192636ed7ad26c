//! # Announcement Sets and Matchers
//!
//! `AnnouncementType + AnnouncementType` builds an [`AnnouncementSet`]; a
//! subscription matches through an [`AnnouncementMatcher`], which is either a
//! single type or a set.

use std::collections::HashSet;
use std::fmt;
use std::ops::Add;

use crate::announcement::AnnouncementType;

/// An unordered set of announcement types.
///
/// Handles a candidate if any member handles it. Duplicates collapse.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct AnnouncementSet {
    members: HashSet<AnnouncementType>,
}

impl AnnouncementSet {
    /// Create an empty set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` if any member handles `candidate`.
    #[must_use]
    pub fn handles(&self, candidate: &AnnouncementType) -> bool {
        self.members.iter().any(|member| member.handles(candidate))
    }

    /// Number of distinct member types.
    #[must_use]
    pub fn len(&self) -> usize {
        self.members.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Exact membership (no hierarchy lookup).
    #[must_use]
    pub fn contains(&self, announcement_type: &AnnouncementType) -> bool {
        self.members.contains(announcement_type)
    }

    pub fn iter(&self) -> impl Iterator<Item = &AnnouncementType> {
        self.members.iter()
    }

    fn sorted_names(&self) -> Vec<&'static str> {
        let mut names: Vec<_> = self.members.iter().map(AnnouncementType::name).collect();
        names.sort_unstable();
        names
    }
}

impl FromIterator<AnnouncementType> for AnnouncementSet {
    fn from_iter<I: IntoIterator<Item = AnnouncementType>>(iter: I) -> Self {
        Self {
            members: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a AnnouncementSet {
    type Item = &'a AnnouncementType;
    type IntoIter = std::collections::hash_set::Iter<'a, AnnouncementType>;

    fn into_iter(self) -> Self::IntoIter {
        self.members.iter()
    }
}

impl fmt::Debug for AnnouncementSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.sorted_names()).finish()
    }
}

impl fmt::Display for AnnouncementSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<AnnouncementSet({})>", self.sorted_names().join(", "))
    }
}

impl Add for AnnouncementType {
    type Output = AnnouncementSet;

    fn add(self, rhs: AnnouncementType) -> AnnouncementSet {
        [self, rhs].into_iter().collect()
    }
}

impl Add<AnnouncementType> for AnnouncementSet {
    type Output = AnnouncementSet;

    fn add(mut self, rhs: AnnouncementType) -> AnnouncementSet {
        self.members.insert(rhs);
        self
    }
}

impl Add<AnnouncementSet> for AnnouncementType {
    type Output = AnnouncementSet;

    fn add(self, rhs: AnnouncementSet) -> AnnouncementSet {
        rhs + self
    }
}

impl Add for AnnouncementSet {
    type Output = AnnouncementSet;

    fn add(mut self, rhs: AnnouncementSet) -> AnnouncementSet {
        self.members.extend(rhs.members);
        self
    }
}

/// What a subscription listens for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnnouncementMatcher {
    /// A single type and its descendants.
    Type(AnnouncementType),
    /// Any member of the set and their descendants.
    Set(AnnouncementSet),
}

impl AnnouncementMatcher {
    #[must_use]
    pub fn handles(&self, candidate: &AnnouncementType) -> bool {
        match self {
            Self::Type(announcement_type) => announcement_type.handles(candidate),
            Self::Set(set) => set.handles(candidate),
        }
    }
}

impl From<AnnouncementType> for AnnouncementMatcher {
    fn from(announcement_type: AnnouncementType) -> Self {
        Self::Type(announcement_type)
    }
}

impl From<AnnouncementSet> for AnnouncementMatcher {
    fn from(set: AnnouncementSet) -> Self {
        Self::Set(set)
    }
}

impl fmt::Display for AnnouncementMatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Type(announcement_type) => fmt::Display::fmt(announcement_type, f),
            Self::Set(set) => fmt::Display::fmt(set, f),
        }
    }
}
