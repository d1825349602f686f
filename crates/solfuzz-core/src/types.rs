//! Elementary types of the target contract language.
//!
//! These are the concrete [`LatticeValue`]s the type dependency solver
//! assigns to program points:
//! - unsigned and signed integers in six widths (`uint8` .. `uint256`,
//!   `int8` .. `int256`), ordered by width inside each signedness family
//! - `address` and `address payable` (payable narrows plain)
//! - `bool`, `string`, `bytes`, related only to themselves
//!
//! Every type serializes as its canonical key, so candidate lists and
//! resolved maps read naturally in JSON.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::lattice::LatticeValue;

/// Integer bit widths, narrowest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum IntWidth {
    W8,
    W16,
    W32,
    W64,
    W128,
    W256,
}

impl IntWidth {
    /// All widths, narrowest first.
    pub const ALL: [IntWidth; 6] = [
        IntWidth::W8,
        IntWidth::W16,
        IntWidth::W32,
        IntWidth::W64,
        IntWidth::W128,
        IntWidth::W256,
    ];

    pub fn bits(self) -> u16 {
        match self {
            IntWidth::W8 => 8,
            IntWidth::W16 => 16,
            IntWidth::W32 => 32,
            IntWidth::W64 => 64,
            IntWidth::W128 => 128,
            IntWidth::W256 => 256,
        }
    }

    pub fn from_bits(bits: u16) -> Option<IntWidth> {
        IntWidth::ALL.into_iter().find(|w| w.bits() == bits)
    }
}

/// Family tag of a [`Type`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeKind {
    Uint,
    Int,
    Address,
    Bool,
    String,
    Bytes,
}

/// An elementary type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Type {
    Uint(IntWidth),
    Int(IntWidth),
    /// `payable` is only meaningful for addresses.
    Address { payable: bool },
    Bool,
    String,
    Bytes,
}

impl Type {
    /// Returns `true` for `uint*` and `int*`.
    pub fn is_integer(&self) -> bool {
        matches!(self, Type::Uint(_) | Type::Int(_))
    }

    /// Integer width, if this is an integer type.
    pub fn width(&self) -> Option<IntWidth> {
        match self {
            Type::Uint(w) | Type::Int(w) => Some(*w),
            _ => None,
        }
    }

    fn with_width(&self, width: IntWidth) -> Type {
        match self {
            Type::Int(_) => Type::Int(width),
            _ => Type::Uint(width),
        }
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Type::Uint(w) => write!(f, "uint{}", w.bits()),
            Type::Int(w) => write!(f, "int{}", w.bits()),
            Type::Address { payable: true } => write!(f, "address payable"),
            Type::Address { payable: false } => write!(f, "address"),
            Type::Bool => write!(f, "bool"),
            Type::String => write!(f, "string"),
            Type::Bytes => write!(f, "bytes"),
        }
    }
}

impl FromStr for Type {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let unknown = || CoreError::UnknownType {
            name: s.to_string(),
        };
        match s {
            "address" => return Ok(Type::Address { payable: false }),
            "address payable" => return Ok(Type::Address { payable: true }),
            "bool" => return Ok(Type::Bool),
            "string" => return Ok(Type::String),
            "bytes" => return Ok(Type::Bytes),
            _ => {}
        }
        let (signed, digits) = if let Some(rest) = s.strip_prefix("uint") {
            (false, rest)
        } else if let Some(rest) = s.strip_prefix("int") {
            (true, rest)
        } else {
            return Err(unknown());
        };
        // Reject "uint" without a width and leading '+' or zeros.
        if digits.is_empty() || !digits.starts_with(|c: char| ('1'..='9').contains(&c)) {
            return Err(unknown());
        }
        let width = digits
            .parse::<u16>()
            .ok()
            .and_then(IntWidth::from_bits)
            .ok_or_else(unknown)?;
        Ok(if signed {
            Type::Int(width)
        } else {
            Type::Uint(width)
        })
    }
}

impl TryFrom<String> for Type {
    type Error = CoreError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Type> for String {
    fn from(ty: Type) -> Self {
        ty.to_string()
    }
}

impl LatticeValue for Type {
    type Kind = TypeKind;

    fn key(&self) -> String {
        self.to_string()
    }

    fn kind(&self) -> TypeKind {
        match self {
            Type::Uint(_) => TypeKind::Uint,
            Type::Int(_) => TypeKind::Int,
            Type::Address { .. } => TypeKind::Address,
            Type::Bool => TypeKind::Bool,
            Type::String => TypeKind::String,
            Type::Bytes => TypeKind::Bytes,
        }
    }

    fn subs(&self) -> Vec<Self> {
        match self {
            Type::Uint(w) | Type::Int(w) => IntWidth::ALL
                .iter()
                .rev()
                .filter(|cand| *cand <= w)
                .map(|cand| self.with_width(*cand))
                .collect(),
            Type::Address { payable: false } => vec![
                Type::Address { payable: false },
                Type::Address { payable: true },
            ],
            other => vec![*other],
        }
    }

    fn supers(&self) -> Vec<Self> {
        match self {
            Type::Uint(w) | Type::Int(w) => IntWidth::ALL
                .iter()
                .filter(|cand| *cand >= w)
                .map(|cand| self.with_width(*cand))
                .collect(),
            Type::Address { payable: true } => vec![
                Type::Address { payable: true },
                Type::Address { payable: false },
            ],
            other => vec![*other],
        }
    }
}

/// Every integer type: unsigned then signed, widest first.
pub fn all_integer_types() -> Vec<Type> {
    let widest_first = IntWidth::ALL.iter().rev();
    widest_first
        .clone()
        .map(|w| Type::Uint(*w))
        .chain(widest_first.map(|w| Type::Int(*w)))
        .collect()
}

/// Every elementary type.
pub fn all_elementary_types() -> Vec<Type> {
    let mut types = all_integer_types();
    types.extend([
        Type::Address { payable: true },
        Type::Address { payable: false },
        Type::Bool,
        Type::String,
        Type::Bytes,
    ]);
    types
}
