//! Column schema types for colsift.
//!
//! This crate contains the types shared by both sides of a column comparison:
//! the column description itself, raw type tokens as a source recorded them,
//! default values, and the per-dialect canonicalization used to decide whether
//! two differently spelled types are the same physical type.

use std::fmt;

mod dialect;
pub use dialect::Dialect;

mod resolve;
pub use resolve::{DialectTypeResolver, PhysicalType, ResolveError, TypeDescriptor, TypeResolver};

/// A column as described by one side of a comparison.
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    /// Column name
    pub name: String,
    /// Type token as recorded by the source
    pub data_type: DataType,
    /// Whether the column allows NULL
    pub nullable: bool,
    /// Default value (if any)
    pub default: Option<DefaultValue>,
    /// Ordinal position in the table, when the source knows it
    pub position: Option<u32>,
    /// Whether values are generated by the database (identity, serial, auto_increment)
    pub auto_increment: bool,
}

impl Column {
    /// Create a nullable column with no default and no known position.
    pub fn new(name: impl Into<String>, data_type: DataType) -> Self {
        Self {
            name: name.into(),
            data_type,
            nullable: true,
            default: None,
            position: None,
            auto_increment: false,
        }
    }

    /// Mark the column NOT NULL.
    pub fn not_null(mut self) -> Self {
        self.nullable = false;
        self
    }

    /// Set the default value.
    pub fn with_default(mut self, default: DefaultValue) -> Self {
        self.default = Some(default);
        self
    }

    /// Set the ordinal position.
    pub fn at_position(mut self, position: u32) -> Self {
        self.position = Some(position);
        self
    }

    /// Mark the column as database-generated.
    pub fn auto_increment(mut self) -> Self {
        self.auto_increment = true;
        self
    }
}

/// A raw type token, e.g. `VARCHAR(255)`, `numeric(10, 2)` or
/// `int(10) unsigned`.
///
/// This is what a source *said*, not what it means. Two `DataType`s that
/// differ here may still be the same physical type; use a [`TypeResolver`]
/// to find out.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DataType {
    /// Type name with whitespace collapsed, original case preserved
    pub name: String,
    /// Parenthesized numeric parameters (length, precision, scale)
    pub params: Vec<u32>,
    /// Parenthesized value list of an `enum(...)` or `set(...)`, unquoted
    pub values: Vec<String>,
    /// Trailing `UNSIGNED` modifier
    pub unsigned: bool,
    /// Trailing `ZEROFILL` modifier
    pub zerofill: bool,
    /// Number of name words before the parenthesized group, when the group
    /// sits inside the name (`timestamp(3) with time zone`). `None` means
    /// after the whole name.
    group_at: Option<usize>,
}

impl DataType {
    /// A type with no parameters.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: collapse_whitespace(&name.into()),
            params: Vec::new(),
            values: Vec::new(),
            unsigned: false,
            zerofill: false,
            group_at: None,
        }
    }

    /// A type with parameters.
    pub fn with_params(name: impl Into<String>, params: impl Into<Vec<u32>>) -> Self {
        Self {
            params: params.into(),
            ..Self::new(name)
        }
    }

    /// A type with a value list, such as `enum('draft', 'live')`.
    pub fn with_values<I, V>(name: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<String>,
    {
        Self {
            values: values.into_iter().map(Into::into).collect(),
            ..Self::new(name)
        }
    }

    /// Add the `UNSIGNED` modifier.
    pub fn unsigned(mut self) -> Self {
        self.unsigned = true;
        self
    }

    /// Parse a type token.
    ///
    /// The parenthesized group may appear anywhere in the token, so
    /// `timestamp(3) with time zone` parses to name `timestamp with time zone`
    /// with params `[3]`, and prints back unchanged. The group holds either
    /// numbers or quoted strings (`enum('a','b')`). Trailing `unsigned` and
    /// `zerofill` words are modifiers, not part of the name.
    pub fn parse(token: &str) -> Result<Self, DataTypeParseError> {
        let token = token.trim();
        if token.is_empty() {
            return Err(DataTypeParseError::Empty);
        }
        let unbalanced = || DataTypeParseError::UnbalancedParens(token.to_string());

        let (head, group, tail) = match token.find('(') {
            None => (token, None, ""),
            Some(open) => {
                let close = closing_paren(token, open).ok_or_else(unbalanced)?;
                (&token[..open], Some(&token[open + 1..close]), &token[close + 1..])
            }
        };
        if head.contains(')') || tail.contains('(') || tail.contains(')') {
            return Err(unbalanced());
        }

        let mut words: Vec<&str> = head.split_whitespace().collect();
        let head_words = words.len();
        words.extend(tail.split_whitespace());

        let mut unsigned = false;
        let mut zerofill = false;
        while words.len() > 1 {
            match words[words.len() - 1].to_ascii_lowercase().as_str() {
                "unsigned" => unsigned = true,
                "zerofill" => zerofill = true,
                _ => break,
            }
            words.pop();
        }
        if head_words == 0 || words.is_empty() {
            return Err(DataTypeParseError::Empty);
        }

        let (params, values) = match group {
            Some(inner) if inner.trim_start().starts_with('\'') => {
                (Vec::new(), parse_values(token, inner)?)
            }
            Some(inner) => (parse_params(token, inner)?, Vec::new()),
            None => (Vec::new(), Vec::new()),
        };

        let group_at = (group.is_some() && head_words < words.len()).then_some(head_words);

        Ok(Self {
            name: words.join(" "),
            params,
            values,
            unsigned,
            zerofill,
            group_at,
        })
    }

    /// Token equality ignoring the case of the name.
    pub fn same_token(&self, other: &DataType) -> bool {
        self.name.eq_ignore_ascii_case(&other.name)
            && self.params == other.params
            && self.values == other.values
            && self.unsigned == other.unsigned
            && self.zerofill == other.zerofill
            && self.group_at == other.group_at
    }

    fn group(&self) -> Option<String> {
        if !self.values.is_empty() {
            let values: Vec<String> = self
                .values
                .iter()
                .map(|v| format!("'{}'", v.replace('\'', "''")))
                .collect();
            return Some(format!("({})", values.join(",")));
        }
        if !self.params.is_empty() {
            let params: Vec<String> = self.params.iter().map(|p| p.to_string()).collect();
            return Some(format!("({})", params.join(", ")));
        }
        None
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let words: Vec<&str> = self.name.split(' ').collect();
        let at = self.group_at.unwrap_or(words.len()).min(words.len());

        f.write_str(&words[..at].join(" "))?;
        if let Some(group) = self.group() {
            f.write_str(&group)?;
        }
        if at < words.len() {
            write!(f, " {}", words[at..].join(" "))?;
        }
        if self.unsigned {
            f.write_str(" unsigned")?;
        }
        if self.zerofill {
            f.write_str(" zerofill")?;
        }
        Ok(())
    }
}

impl std::str::FromStr for DataType {
    type Err = DataTypeParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// Byte index of the `)` closing the group opened at `open`. Parentheses
/// inside quoted values don't count; a nested group is rejected.
fn closing_paren(token: &str, open: usize) -> Option<usize> {
    let mut quoted = false;
    for (i, c) in token[open + 1..].char_indices() {
        match c {
            '\'' => quoted = !quoted,
            '(' if !quoted => return None,
            ')' if !quoted => return Some(open + 1 + i),
            _ => {}
        }
    }
    None
}

fn parse_params(token: &str, inner: &str) -> Result<Vec<u32>, DataTypeParseError> {
    inner
        .split(',')
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(|p| {
            p.parse::<u32>()
                .map_err(|_| DataTypeParseError::InvalidParameter {
                    token: token.to_string(),
                    param: p.to_string(),
                })
        })
        .collect()
}

fn parse_values(token: &str, inner: &str) -> Result<Vec<String>, DataTypeParseError> {
    let invalid = |param: &str| DataTypeParseError::InvalidParameter {
        token: token.to_string(),
        param: param.trim().to_string(),
    };

    let mut values = Vec::new();
    let mut rest = inner.trim_start();
    loop {
        let (value, after) = take_quoted(rest).ok_or_else(|| invalid(rest))?;
        values.push(value);
        let after = after.trim_start();
        if after.is_empty() {
            return Ok(values);
        }
        rest = after
            .strip_prefix(',')
            .ok_or_else(|| invalid(after))?
            .trim_start();
    }
}

/// Errors from [`DataType::parse`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DataTypeParseError {
    #[error("empty type name")]
    Empty,

    #[error("unbalanced parentheses in type `{0}`")]
    UnbalancedParens(String),

    #[error("invalid parameter `{param}` in type `{token}`")]
    InvalidParameter { token: String, param: String },
}

/// A default computed by the database, e.g. `CURRENT_TIMESTAMP` or `now()`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DatabaseFunction(String);

impl DatabaseFunction {
    pub fn new(expr: impl Into<String>) -> Self {
        Self(expr.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DatabaseFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A column default.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum DefaultValue {
    /// A literal value, stored unquoted.
    Literal(String),
    /// An expression the database evaluates.
    Function(DatabaseFunction),
}

impl DefaultValue {
    pub fn literal(value: impl Into<String>) -> Self {
        DefaultValue::Literal(value.into())
    }

    pub fn function(expr: impl Into<String>) -> Self {
        DefaultValue::Function(DatabaseFunction::new(expr))
    }

    pub fn is_function(&self) -> bool {
        matches!(self, DefaultValue::Function(_))
    }

    /// Classify a default expression as reported by a database catalog.
    ///
    /// Quoted strings (optionally followed by a Postgres `::type` cast),
    /// numbers and booleans are literals. `NULL` means no default. Anything
    /// else is treated as an expression the database evaluates.
    ///
    /// ```
    /// use colsift_schema::DefaultValue;
    ///
    /// assert_eq!(DefaultValue::classify("'draft'::character varying"), Some(DefaultValue::literal("draft")));
    /// assert_eq!(DefaultValue::classify("now()"), Some(DefaultValue::function("now()")));
    /// assert_eq!(DefaultValue::classify("NULL"), None);
    /// ```
    pub fn classify(expr: &str) -> Option<Self> {
        let expr = expr.trim();
        if expr.is_empty() || expr.eq_ignore_ascii_case("null") {
            return None;
        }

        if let Some(literal) = unquote_literal(expr) {
            return Some(DefaultValue::Literal(literal));
        }

        if is_numeric_literal(expr)
            || expr.eq_ignore_ascii_case("true")
            || expr.eq_ignore_ascii_case("false")
        {
            return Some(DefaultValue::Literal(expr.to_string()));
        }

        Some(DefaultValue::function(expr))
    }

    /// Render as a SQL default expression.
    pub fn to_sql(&self) -> String {
        match self {
            DefaultValue::Literal(v)
                if is_numeric_literal(v)
                    || v.eq_ignore_ascii_case("true")
                    || v.eq_ignore_ascii_case("false") =>
            {
                v.clone()
            }
            DefaultValue::Literal(v) => format!("'{}'", v.replace('\'', "''")),
            DefaultValue::Function(func) => func.to_string(),
        }
    }
}

impl fmt::Display for DefaultValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_sql())
    }
}

/// Strip SQL quotes (and a trailing `::cast`) from a quoted literal.
fn unquote_literal(expr: &str) -> Option<String> {
    let (literal, rest) = take_quoted(expr)?;
    let rest = rest.trim();
    (rest.is_empty() || rest.starts_with("::")).then_some(literal)
}

/// Read one single-quoted SQL string off the front of `s`, returning it
/// unescaped along with whatever follows the closing quote.
fn take_quoted(s: &str) -> Option<(String, &str)> {
    let body = s.strip_prefix('\'')?;
    let mut out = String::new();
    let mut chars = body.char_indices().peekable();
    while let Some((i, c)) = chars.next() {
        if c != '\'' {
            out.push(c);
            continue;
        }
        if let Some((_, '\'')) = chars.peek() {
            out.push('\'');
            chars.next();
            continue;
        }
        return Some((out, &body[i + 1..]));
    }
    None
}

/// A SQL numeric literal: optional sign, digits with at most one decimal
/// point, optional exponent. `NaN` and `inf` are not numbers to SQL.
fn is_numeric_literal(s: &str) -> bool {
    fn digits(part: &str) -> bool {
        part.bytes().all(|b| b.is_ascii_digit())
    }

    let s = s.strip_prefix(['+', '-']).unwrap_or(s);
    let (mantissa, exponent) = match s.find(['e', 'E']) {
        Some(i) => (&s[..i], Some(&s[i + 1..])),
        None => (s, None),
    };
    let (whole, fraction) = mantissa.split_once('.').unwrap_or((mantissa, ""));
    if (whole.is_empty() && fraction.is_empty()) || !digits(whole) || !digits(fraction) {
        return false;
    }

    match exponent {
        None => true,
        Some(exp) => {
            let exp = exp.strip_prefix(['+', '-']).unwrap_or(exp);
            !exp.is_empty() && digits(exp)
        }
    }
}

fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}
