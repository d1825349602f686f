//! Legal implicit conversions along weak edges.
//!
//! Weak edges model places where the target language inserts an implicit
//! conversion. Only width changes inside one signedness family qualify:
//!
//! - `narrow_legal(t)`: types a weak dependent of a `t` source may take,
//!   `t` itself and every narrower width, widest first
//! - `widen_legal(t)`: types the source of a weak edge may take when its
//!   dependent is a `t`, `t` itself and every broader width, narrowest first
//!
//! Both tables are closed over their family and reflexive. Types outside the
//! integer families (addresses, `bool`, `string`, `bytes`) have no entry.

/// Unsigned widths, narrowest first.
static UINT_FAMILY: [&str; 6] = ["uint8", "uint16", "uint32", "uint64", "uint128", "uint256"];

/// Signed widths, narrowest first.
static INT_FAMILY: [&str; 6] = ["int8", "int16", "int32", "int64", "int128", "int256"];

/// Locates a canonical key in its family.
fn family_position(key: &str) -> Option<(&'static [&'static str; 6], usize)> {
    [&UINT_FAMILY, &INT_FAMILY].into_iter().find_map(|family| {
        family
            .iter()
            .position(|member| *member == key)
            .map(|pos| (family, pos))
    })
}

/// Legal weak-narrowing targets of a source type, widest first.
///
/// Returns `None` if the type has no table entry.
pub fn narrow_legal(source: &str) -> Option<Vec<&'static str>> {
    let (family, pos) = family_position(source)?;
    Some(family[..=pos].iter().rev().copied().collect())
}

/// Legal weak-widening sources for a target type, narrowest first.
///
/// Returns `None` if the type has no table entry.
pub fn widen_legal(target: &str) -> Option<Vec<&'static str>> {
    let (family, pos) = family_position(target)?;
    Some(family[pos..].to_vec())
}

/// Returns `true` if a weak edge may carry a `source` value into a `target`.
pub fn is_legal_narrowing(source: &str, target: &str) -> bool {
    narrow_legal(source).is_some_and(|legal| legal.iter().any(|t| *t == target))
}
