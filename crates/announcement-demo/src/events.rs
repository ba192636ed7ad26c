//! UI-style announcement types used by the demo scenario.
//!
//! ```text
//! RootAnnouncement
//!   ├── Clicked
//!   │     └── DoubleClicked
//!   ├── Hovered
//!   └── KeyPressed
//! ```

use announcements::announcement;

/// A pointer click.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Clicked {
    pub x: i32,
    pub y: i32,
}
announcement!(Clicked);

/// Two clicks in quick succession. Also a `Clicked`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DoubleClicked {
    pub x: i32,
    pub y: i32,
}
announcement!(DoubleClicked: Clicked);

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Hovered {
    pub x: i32,
    pub y: i32,
}
announcement!(Hovered);

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct KeyPressed {
    pub key: char,
}
announcement!(KeyPressed);
