//! The default series palette.
//!
//! Twenty fixed colors handed out to datasets (cartesian charts) or data
//! points (circular charts) that do not bring their own.

/// Default series colors, in assignment order.
///
/// `#3B3EAC` appears at both index 5 and index 19; the duplicate is part
/// of the upstream list and is kept as-is.
pub const PALETTE: [&str; 20] = [
    "#3366CC", "#DC3912", "#FF9900", "#109618", "#990099", "#3B3EAC", "#0099C6", "#DD4477",
    "#66AA00", "#B82E2E", "#316395", "#994499", "#22AA99", "#AAAA11", "#6633CC", "#E67300",
    "#8B0707", "#329262", "#5574A6", "#3B3EAC",
];

/// Color for the `index`-th series or slice, cycling past the end.
pub fn palette_color(index: usize) -> &'static str {
    PALETTE[index % PALETTE.len()]
}
