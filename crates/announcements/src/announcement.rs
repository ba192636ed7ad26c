//! # Announcement Types
//!
//! Every event category is a Rust type implementing [`Announcement`]. The
//! category hierarchy is explicit: each [`AnnouncementType`] carries a link to
//! its parent, and every chain ends at [`RootAnnouncement`].
//!
//! ```text
//! RootAnnouncement
//!   ├── Clicked
//!   │     └── DoubleClicked
//!   └── KeyPressed
//! ```
//!
//! A subscription to `Clicked` handles `Clicked` and `DoubleClicked`; a
//! subscription to `RootAnnouncement` handles everything.

use std::any::{Any, TypeId};
use std::fmt;
use std::hash::{Hash, Hasher};

/// An event occurrence that can be announced.
///
/// Implemented through the [`announcement!`](crate::announcement) macro, which
/// also wires the type into the hierarchy.
pub trait Announcement: Any + Send + Sync + fmt::Debug {
    /// The category of this instance.
    fn announcement_type(&self) -> AnnouncementType;

    /// Upcast used for downcasting to the concrete announcement.
    fn as_any(&self) -> &dyn Any;
}

/// Static side of an announcement: the category of the type itself.
pub trait AnnouncementClass: Announcement + Sized {
    /// The category every instance of `Self` belongs to.
    fn announcement_class() -> AnnouncementType;
}

impl dyn Announcement {
    /// Returns `true` if the announcement is exactly a `T`.
    pub fn is<T: Announcement>(&self) -> bool {
        self.as_any().is::<T>()
    }

    /// Downcast to the concrete announcement.
    pub fn downcast_ref<T: Announcement>(&self) -> Option<&T> {
        self.as_any().downcast_ref::<T>()
    }
}

/// Identity of an announcement category plus its place in the hierarchy.
///
/// Equality and hashing use the Rust type only, so two instances of the same
/// announcement type are the same category.
#[derive(Clone, Copy)]
pub struct AnnouncementType {
    id: TypeId,
    name: &'static str,
    parent: Option<fn() -> AnnouncementType>,
}

impl AnnouncementType {
    /// Describe type `T` with the given parent category.
    ///
    /// Usually called by the [`announcement!`](crate::announcement) macro.
    #[must_use]
    pub fn new<T: 'static>(name: &'static str, parent: Option<fn() -> AnnouncementType>) -> Self {
        Self {
            id: TypeId::of::<T>(),
            name,
            parent,
        }
    }

    /// The category of announcement type `T`.
    #[must_use]
    pub fn of<T: AnnouncementClass>() -> Self {
        T::announcement_class()
    }

    /// The category of an announcement instance.
    #[must_use]
    pub fn of_val(announcement: &dyn Announcement) -> Self {
        announcement.announcement_type()
    }

    /// The base category every announcement descends from.
    #[must_use]
    pub fn root() -> Self {
        RootAnnouncement::announcement_class()
    }

    /// Type name as declared.
    #[must_use]
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// The direct parent category, `None` only for the root.
    #[must_use]
    pub fn parent(&self) -> Option<AnnouncementType> {
        self.parent.map(|parent| parent())
    }

    /// Returns `true` if this is the root category.
    #[must_use]
    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }

    /// Iterate from this category up to the root (inclusive on both ends).
    pub fn lineage(&self) -> Lineage {
        Lineage {
            next: Some(*self),
            remaining: MAX_LINEAGE_DEPTH,
        }
    }

    /// Returns `true` if `candidate` is this category or one of its
    /// descendants.
    #[must_use]
    pub fn handles(&self, candidate: &AnnouncementType) -> bool {
        candidate.lineage().any(|ancestor| ancestor == *self)
    }
}

impl PartialEq for AnnouncementType {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for AnnouncementType {}

impl Hash for AnnouncementType {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Debug for AnnouncementType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

impl fmt::Display for AnnouncementType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

/// Longest ancestor chain walked before a hierarchy is treated as cyclic.
pub const MAX_LINEAGE_DEPTH: usize = 256;

/// Ancestor chain of an [`AnnouncementType`], nearest first.
///
/// Yields at most [`MAX_LINEAGE_DEPTH`] types, so a cyclic declaration ends
/// the walk instead of looping.
pub struct Lineage {
    next: Option<AnnouncementType>,
    remaining: usize,
}

impl Iterator for Lineage {
    type Item = AnnouncementType;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        self.remaining -= 1;
        let current = self.next.take()?;
        self.next = current.parent();
        Some(current)
    }
}

/// Returns `true` if both announcements are of the same category.
#[must_use]
pub fn same_type(a: &dyn Announcement, b: &dyn Announcement) -> bool {
    a.announcement_type() == b.announcement_type()
}

/// The base announcement. Subscribing to it observes every announcement.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RootAnnouncement;

impl Announcement for RootAnnouncement {
    fn announcement_type(&self) -> AnnouncementType {
        Self::announcement_class()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl AnnouncementClass for RootAnnouncement {
    fn announcement_class() -> AnnouncementType {
        AnnouncementType::new::<RootAnnouncement>("RootAnnouncement", None)
    }
}

/// Declare a type as an announcement.
///
/// Without a parent the type descends directly from [`RootAnnouncement`].
/// Parents must form a chain ending at the root; a cycle such as
/// `announcement!(A: B)` with `announcement!(B: A)` is cut off after
/// [`MAX_LINEAGE_DEPTH`] steps and never reaches the root.
///
/// ```ignore
/// #[derive(Debug, Default)]
/// struct Clicked { x: u32, y: u32 }
/// announcement!(Clicked);
///
/// #[derive(Debug, Default)]
/// struct DoubleClicked;
/// announcement!(DoubleClicked: Clicked);
/// ```
#[macro_export]
macro_rules! announcement {
    ($ty:ty) => {
        $crate::announcement!($ty: $crate::RootAnnouncement);
    };
    ($ty:ty : $parent:ty) => {
        impl $crate::Announcement for $ty {
            fn announcement_type(&self) -> $crate::AnnouncementType {
                <$ty as $crate::AnnouncementClass>::announcement_class()
            }

            fn as_any(&self) -> &dyn ::std::any::Any {
                self
            }
        }

        impl $crate::AnnouncementClass for $ty {
            fn announcement_class() -> $crate::AnnouncementType {
                $crate::AnnouncementType::new::<$ty>(
                    stringify!($ty),
                    Some(
                        <$parent as $crate::AnnouncementClass>::announcement_class
                            as fn() -> $crate::AnnouncementType,
                    ),
                )
            }
        }
    };
}
