//! Partial-order abstraction over type values.
//!
//! Type compatibility in the generator is not a total order: `uint8` widens
//! to `uint256` but has nothing to do with `address`, and `address payable`
//! narrows `address` without involving any width. Every family of types
//! answers the same small set of neighbourhood queries through
//! [`LatticeValue`], and the derived queries below are built purely on top
//! of them so the solver never has to know which family it is handling.
//!
//! Identity is the canonical key: two values with equal [`LatticeValue::key`]
//! are the same value everywhere in the solver.

/// A type value usable as a constraint.
///
/// Implementors supply the canonical key, a family tag, and the one-hop
/// narrower/broader neighbourhoods. Both neighbourhoods are reflexive: a
/// value is always among its own `subs()` and `supers()`.
pub trait LatticeValue: Clone {
    /// Family tag. Values of different kinds are never [`includes`]-equal.
    type Kind: PartialEq;

    /// Canonical string key. Equality of keys is equality of values.
    fn key(&self) -> String;

    /// Family this value belongs to.
    fn kind(&self) -> Self::Kind;

    /// Immediate narrower values, including `self`.
    fn subs(&self) -> Vec<Self>;

    /// Immediate broader values, including `self`.
    fn supers(&self) -> Vec<Self>;

    /// Structural equality.
    fn same(&self, other: &Self) -> bool {
        self.key() == other.key()
    }

    /// A fresh value equal to `self`.
    fn copy(&self) -> Self {
        self.clone()
    }

    /// `true` if `other` is among this value's supers.
    fn is_sub_of(&self, other: &Self) -> bool {
        self.supers().iter().any(|s| s.same(other))
    }

    /// `true` if `other` is among this value's subs.
    fn is_super_of(&self, other: &Self) -> bool {
        self.subs().iter().any(|s| s.same(other))
    }

    /// The one-hop compatibility neighbourhood: supers followed by subs,
    /// without duplicates.
    fn same_range(&self) -> Vec<Self> {
        let mut range = self.supers();
        for sub in self.subs() {
            if !range.iter().any(|r| r.same(&sub)) {
                range.push(sub);
            }
        }
        range
    }

    /// Values interchangeable with this one: subs that are also supers.
    fn equivalents(&self) -> Vec<Self> {
        let supers = self.supers();
        self.subs()
            .into_iter()
            .filter(|t| supers.iter().any(|s| s.same(t)))
            .collect()
    }

    /// `true` if `other` is interchangeable with this value.
    fn is_equivalent_of(&self, other: &Self) -> bool {
        self.equivalents().iter().any(|e| e.same(other))
    }

    /// Subs that stay above `lower_bound`.
    fn sub_with_lowerbound(&self, lower_bound: &Self) -> Vec<Self> {
        self.subs()
            .into_iter()
            .filter(|t| t.is_super_of(lower_bound))
            .collect()
    }

    /// Supers that stay below `upper_bound`.
    fn super_with_upperbound(&self, upper_bound: &Self) -> Vec<Self> {
        self.supers()
            .into_iter()
            .filter(|t| t.is_sub_of(upper_bound))
            .collect()
    }
}

/// Membership test: some element has the same kind and is `same` as `item`.
pub fn includes<T: LatticeValue>(seq: &[T], item: &T) -> bool {
    seq.iter().any(|e| e.kind() == item.kind() && e.same(item))
}

/// `true` if every element of `subset` is included in `set`.
pub fn is_super_range<T: LatticeValue>(set: &[T], subset: &[T]) -> bool {
    subset.iter().all(|e| includes(set, e))
}

/// Positional equality. Order matters: `[a, b]` and `[b, a]` differ.
pub fn is_equal_range<T: LatticeValue>(a: &[T], b: &[T]) -> bool {
    a.len() == b.len() && a.iter().zip(b).all(|(x, y)| x.same(y))
}

/// Elements of `a` that are also included in `b`, in `a`'s order.
pub fn intersection_range<T: LatticeValue>(a: &[T], b: &[T]) -> Vec<T> {
    a.iter().filter(|e| includes(b, e)).cloned().collect()
}
