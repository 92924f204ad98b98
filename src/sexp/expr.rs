//! Expression tree
//!
//! An [`Expression`] is one node: a typed [`Value`] plus an optional attribute
//! expression carrying metadata such as dimensions or factor levels. Parents
//! own their children and their attribute outright, so a tree is dropped as a
//! whole and never contains cycles.
//!
//! The `as_*` accessors never fail. A shape mismatch yields `None`, `0` or
//! `0.0`, which lets callers inspect a result without matching on every type.

use std::fmt;

use super::{Factor, RBool, RList, XpType};

/// Cap on elements rendered per array by `Display`
const DISPLAY_LIMIT: usize = 100;

/// Node payload; the variant determines the node's type
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Int(i32),
    Double(f64),
    Str(String),
    /// Symbol print name
    Symbol(String),
    Bool(RBool),
    Vector(Vec<Expression>),
    List(RList),
    Lang(RList),
    /// Closure body; the formals are not kept
    Closure(Box<Expression>),
    IntArray(Vec<i32>),
    DoubleArray(Vec<f64>),
    BoolArray(Vec<RBool>),
    StrArray(Vec<String>),
    /// Opaque 4-byte payload
    Unknown([u8; 4]),
    Factor(Factor),
    /// Node with a wire type this client does not interpret; no payload
    Unrecognized(u8),
}

impl Value {
    pub fn xp_type(&self) -> XpType {
        match self {
            Value::Null => XpType::Null,
            Value::Int(_) => XpType::Int,
            Value::Double(_) => XpType::Double,
            Value::Str(_) => XpType::Str,
            Value::Symbol(_) => XpType::Symbol,
            Value::Bool(_) => XpType::Bool,
            Value::Vector(_) => XpType::Vector,
            Value::List(_) => XpType::List,
            Value::Lang(_) => XpType::Lang,
            Value::Closure(_) => XpType::Closure,
            Value::IntArray(_) => XpType::ArrayInt,
            Value::DoubleArray(_) => XpType::ArrayDouble,
            Value::BoolArray(_) => XpType::ArrayBool,
            Value::StrArray(_) => XpType::ArrayStr,
            Value::Unknown(_) => XpType::Unknown,
            Value::Factor(_) => XpType::Factor,
            Value::Unrecognized(code) => XpType::Unrecognized(*code),
        }
    }
}

/// A node of the expression tree
#[derive(Debug, Clone, PartialEq)]
pub struct Expression {
    value: Value,
    attribute: Option<Box<Expression>>,
}

impl Expression {
    // =========================================================================
    // Construction
    // =========================================================================

    pub fn new(value: Value) -> Self {
        Self {
            value,
            attribute: None,
        }
    }

    pub(crate) fn from_parts(value: Value, attribute: Option<Box<Expression>>) -> Self {
        Self { value, attribute }
    }

    /// Attach an attribute expression
    pub fn with_attribute(mut self, attribute: Expression) -> Self {
        self.attribute = Some(Box::new(attribute));
        self
    }

    pub fn null() -> Self {
        Self::new(Value::Null)
    }

    pub fn int(value: i32) -> Self {
        Self::new(Value::Int(value))
    }

    pub fn double(value: f64) -> Self {
        Self::new(Value::Double(value))
    }

    pub fn string(value: impl Into<String>) -> Self {
        Self::new(Value::Str(value.into()))
    }

    pub fn symbol(name: impl Into<String>) -> Self {
        Self::new(Value::Symbol(name.into()))
    }

    pub fn bool(value: RBool) -> Self {
        Self::new(Value::Bool(value))
    }

    pub fn int_array(values: Vec<i32>) -> Self {
        Self::new(Value::IntArray(values))
    }

    pub fn double_array(values: Vec<f64>) -> Self {
        Self::new(Value::DoubleArray(values))
    }

    pub fn bool_array(values: Vec<RBool>) -> Self {
        Self::new(Value::BoolArray(values))
    }

    pub fn string_array<S: Into<String>>(values: impl IntoIterator<Item = S>) -> Self {
        Self::new(Value::StrArray(values.into_iter().map(Into::into).collect()))
    }

    pub fn vector(elements: Vec<Expression>) -> Self {
        Self::new(Value::Vector(elements))
    }

    pub fn list(list: RList) -> Self {
        Self::new(Value::List(list))
    }

    pub fn factor(factor: Factor) -> Self {
        Self::new(Value::Factor(factor))
    }

    // =========================================================================
    // Structure
    // =========================================================================

    pub fn xp_type(&self) -> XpType {
        self.value.xp_type()
    }

    pub fn value(&self) -> &Value {
        &self.value
    }

    pub fn attribute(&self) -> Option<&Expression> {
        self.attribute.as_deref()
    }

    pub fn into_parts(self) -> (Value, Option<Box<Expression>>) {
        (self.value, self.attribute)
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    /// Int, or the first element of an int array; otherwise 0
    pub fn as_int(&self) -> i32 {
        match &self.value {
            Value::Int(v) => *v,
            Value::IntArray(values) => values.first().copied().unwrap_or(0),
            _ => 0,
        }
    }

    /// Double, first element of a double array, or a widened int; otherwise 0.0
    pub fn as_double(&self) -> f64 {
        match &self.value {
            Value::Double(v) => *v,
            Value::DoubleArray(values) => values.first().copied().unwrap_or(0.0),
            Value::Int(v) => f64::from(*v),
            Value::IntArray(values) => values.first().copied().map(f64::from).unwrap_or(0.0),
            _ => 0.0,
        }
    }

    pub fn as_int_array(&self) -> Option<Vec<i32>> {
        match &self.value {
            Value::IntArray(values) => Some(values.clone()),
            Value::Int(v) => Some(vec![*v]),
            _ => None,
        }
    }

    pub fn as_double_array(&self) -> Option<Vec<f64>> {
        match &self.value {
            Value::DoubleArray(values) => Some(values.clone()),
            Value::Double(v) => Some(vec![*v]),
            Value::IntArray(values) => Some(values.iter().copied().map(f64::from).collect()),
            Value::Int(v) => Some(vec![f64::from(*v)]),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match &self.value {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<RBool> {
        match &self.value {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_factor(&self) -> Option<&Factor> {
        match &self.value {
            Value::Factor(f) => Some(f),
            _ => None,
        }
    }

    pub fn as_vector(&self) -> Option<&[Expression]> {
        match &self.value {
            Value::Vector(elements) => Some(elements),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&RList> {
        match &self.value {
            Value::List(list) => Some(list),
            _ => None,
        }
    }

    /// Rebuild a `rows × cols` grid from a double array with a `dim` attribute.
    ///
    /// The flat array is consumed row by row (outer loop rows, inner loop
    /// columns). The server stores matrices column-major, so this ordering
    /// is only correct for data written row-major.
    // TODO: confirm fill order against a live server before switching to column-major.
    pub fn as_double_matrix(&self) -> Option<Vec<Vec<f64>>> {
        let Value::DoubleArray(values) = &self.value else {
            return None;
        };
        let dims = match self.attribute()?.as_list()?.head().value() {
            Value::IntArray(dims) if dims.len() == 2 => dims,
            _ => return None,
        };

        let rows = usize::try_from(dims[0]).ok()?;
        let cols = usize::try_from(dims[1]).ok()?;
        if rows.checked_mul(cols)? > values.len() {
            return None;
        }

        let mut cells = values.iter().copied();
        let matrix = (0..rows)
            .map(|_| cells.by_ref().take(cols).collect())
            .collect();
        Some(matrix)
    }
}

impl From<Value> for Expression {
    fn from(value: Value) -> Self {
        Expression::new(value)
    }
}

// =============================================================================
// Display
// =============================================================================

fn write_seq<T: fmt::Display>(f: &mut fmt::Formatter<'_>, items: &[T]) -> fmt::Result {
    f.write_str("(")?;
    for (i, item) in items.iter().take(DISPLAY_LIMIT).enumerate() {
        if i > 0 {
            f.write_str(", ")?;
        }
        write!(f, "{}", item)?;
    }
    if items.len() > DISPLAY_LIMIT {
        write!(f, "... ({} more values follow)", items.len() - DISPLAY_LIMIT)?;
    }
    f.write_str(")")
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{} ", self.xp_type())?;

        if let Some(attribute) = &self.attribute {
            write!(f, "\nattr={}\n ", attribute)?;
        }

        match &self.value {
            Value::Null | Value::Unrecognized(_) => {}
            Value::Int(v) => write!(f, "{}", v)?,
            Value::Double(v) => write!(f, "{}", v)?,
            Value::Str(s) => write!(f, "\"{}\"", s)?,
            Value::Symbol(s) => f.write_str(s)?,
            Value::Bool(b) => write!(f, "{}", b)?,
            Value::Vector(elements) => write_seq(f, elements)?,
            Value::List(list) | Value::Lang(list) => {
                write!(f, "{} <-> {}", list.head(), list.body())?
            }
            Value::Closure(body) => write!(f, "{}", body)?,
            Value::IntArray(values) => write_seq(f, values)?,
            Value::DoubleArray(values) => write_seq(f, values)?,
            Value::BoolArray(values) => write_seq(f, values)?,
            Value::StrArray(values) => write_seq(f, values)?,
            Value::Unknown(raw) => write!(f, "{}", i32::from_le_bytes(*raw))?,
            Value::Factor(factor) => write!(f, "{}", factor)?,
        }

        f.write_str("]")
    }
}
