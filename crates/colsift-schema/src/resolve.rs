//! Type canonicalization.
//!
//! Sources spell the same physical type in many ways: `int4` and `INTEGER`,
//! `varchar(255)` and `character varying(255)`, `timestamp` and
//! `timestamp(6) without time zone`. Resolving a [`DataType`] against a
//! [`Dialect`] yields a [`TypeDescriptor`] whose equality is "the database
//! would store these the same way".

use crate::{DataType, Dialect};
use std::fmt;

/// Physical storage types after canonicalization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PhysicalType {
    TinyInt,
    SmallInt,
    MediumInt,
    Integer,
    BigInt,
    Real,
    Double,
    Numeric,
    Boolean,
    Bit,
    Char,
    Varchar,
    Text,
    Binary,
    Date,
    Time,
    Timestamp,
    TimestampTz,
    Year,
    Enum,
    Set,
    Uuid,
    Json,
    Jsonb,
}

impl PhysicalType {
    /// Whether the type takes MySQL's `UNSIGNED` modifier.
    pub fn is_numeric(self) -> bool {
        matches!(
            self,
            PhysicalType::TinyInt
                | PhysicalType::SmallInt
                | PhysicalType::MediumInt
                | PhysicalType::Integer
                | PhysicalType::BigInt
                | PhysicalType::Real
                | PhysicalType::Double
                | PhysicalType::Numeric
        )
    }
}

impl fmt::Display for PhysicalType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PhysicalType::TinyInt => "TINYINT",
            PhysicalType::SmallInt => "SMALLINT",
            PhysicalType::MediumInt => "MEDIUMINT",
            PhysicalType::Integer => "INTEGER",
            PhysicalType::BigInt => "BIGINT",
            PhysicalType::Real => "REAL",
            PhysicalType::Double => "DOUBLE PRECISION",
            PhysicalType::Numeric => "NUMERIC",
            PhysicalType::Boolean => "BOOLEAN",
            PhysicalType::Bit => "BIT",
            PhysicalType::Char => "CHAR",
            PhysicalType::Varchar => "VARCHAR",
            PhysicalType::Text => "TEXT",
            PhysicalType::Binary => "BINARY",
            PhysicalType::Date => "DATE",
            PhysicalType::Time => "TIME",
            PhysicalType::Timestamp => "TIMESTAMP",
            PhysicalType::TimestampTz => "TIMESTAMPTZ",
            PhysicalType::Year => "YEAR",
            PhysicalType::Enum => "ENUM",
            PhysicalType::Set => "SET",
            PhysicalType::Uuid => "UUID",
            PhysicalType::Json => "JSON",
            PhysicalType::Jsonb => "JSONB",
        };
        f.write_str(name)
    }
}

/// A canonical column type, resolved against one dialect.
///
/// Equality is only meaningful between descriptors resolved against the
/// same dialect.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TypeDescriptor {
    pub physical: PhysicalType,
    /// Length or precision, after dialect defaults have been applied
    pub length: Option<u32>,
    pub scale: Option<u32>,
    pub unsigned: bool,
    /// Permitted values of an enum or set, in declaration order
    pub values: Vec<String>,
}

impl TypeDescriptor {
    pub fn of(physical: PhysicalType) -> Self {
        Self::sized(physical, None)
    }

    pub fn sized(physical: PhysicalType, length: Option<u32>) -> Self {
        Self {
            physical,
            length,
            scale: None,
            unsigned: false,
            values: Vec::new(),
        }
    }

    pub fn decimal(precision: Option<u32>, scale: Option<u32>) -> Self {
        Self {
            scale,
            ..Self::sized(PhysicalType::Numeric, precision)
        }
    }

    pub fn listing(physical: PhysicalType, values: &[String]) -> Self {
        Self {
            values: values.to_vec(),
            ..Self::of(physical)
        }
    }
}

impl fmt::Display for TypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.physical)?;
        if !self.values.is_empty() {
            let values: Vec<String> = self.values.iter().map(|v| format!("'{}'", v)).collect();
            write!(f, "({})", values.join(","))?;
        }
        match (self.length, self.scale) {
            (Some(l), Some(s)) => write!(f, "({}, {})", l, s)?,
            (Some(l), None) => write!(f, "({})", l)?,
            _ => {}
        }
        if self.unsigned {
            f.write_str(" UNSIGNED")?;
        }
        Ok(())
    }
}

/// Failure to canonicalize a type token.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ResolveError {
    #[error("unknown type `{token}` for {dialect}")]
    UnknownType { token: String, dialect: Dialect },
}

/// Resolves raw type tokens into canonical descriptors.
pub trait TypeResolver: Send + Sync {
    fn resolve(&self, raw: &DataType, dialect: Dialect) -> Result<TypeDescriptor, ResolveError>;
}

/// Built-in alias tables for every [`Dialect`].
#[derive(Debug, Clone, Copy, Default)]
pub struct DialectTypeResolver;

impl TypeResolver for DialectTypeResolver {
    fn resolve(&self, raw: &DataType, dialect: Dialect) -> Result<TypeDescriptor, ResolveError> {
        match dialect {
            Dialect::Postgres => resolve_postgres(raw),
            Dialect::MySql => resolve_mysql(raw),
            Dialect::Sqlite => Ok(resolve_sqlite(raw)),
        }
    }
}

fn unknown(raw: &DataType, dialect: Dialect) -> ResolveError {
    ResolveError::UnknownType {
        token: raw.to_string(),
        dialect,
    }
}

fn resolve_postgres(raw: &DataType) -> Result<TypeDescriptor, ResolveError> {
    use PhysicalType::*;

    if raw.unsigned || raw.zerofill || !raw.values.is_empty() {
        return Err(unknown(raw, Dialect::Postgres));
    }

    let name = raw.name.to_ascii_lowercase();
    let first = raw.params.first().copied();

    let descriptor = match name.as_str() {
        "smallint" | "int2" | "smallserial" | "serial2" => TypeDescriptor::of(SmallInt),
        "integer" | "int" | "int4" | "serial" | "serial4" => TypeDescriptor::of(Integer),
        "bigint" | "int8" | "bigserial" | "serial8" => TypeDescriptor::of(BigInt),
        "real" | "float4" => TypeDescriptor::of(Real),
        "double precision" | "float8" => TypeDescriptor::of(Double),
        // float(p) picks its storage by precision
        "float" => match first {
            Some(p) if p <= 24 => TypeDescriptor::of(Real),
            _ => TypeDescriptor::of(Double),
        },
        "numeric" | "decimal" => match raw.params.as_slice() {
            [] => TypeDescriptor::decimal(None, None),
            [p] => TypeDescriptor::decimal(Some(*p), Some(0)),
            [p, s, ..] => TypeDescriptor::decimal(Some(*p), Some(*s)),
        },
        "boolean" | "bool" => TypeDescriptor::of(Boolean),
        "character varying" | "varchar" => TypeDescriptor::sized(Varchar, first),
        "character" | "char" | "bpchar" => TypeDescriptor::sized(Char, Some(first.unwrap_or(1))),
        "text" | "clob" => TypeDescriptor::of(Text),
        "bytea" | "blob" => TypeDescriptor::of(Binary),
        "date" => TypeDescriptor::of(Date),
        "time" | "time without time zone" => TypeDescriptor::sized(Time, Some(first.unwrap_or(6))),
        "timestamp" | "timestamp without time zone" => {
            TypeDescriptor::sized(Timestamp, Some(first.unwrap_or(6)))
        }
        "timestamptz" | "timestamp with time zone" => {
            TypeDescriptor::sized(TimestampTz, Some(first.unwrap_or(6)))
        }
        "uuid" => TypeDescriptor::of(Uuid),
        "json" => TypeDescriptor::of(Json),
        "jsonb" => TypeDescriptor::of(Jsonb),
        _ => return Err(unknown(raw, Dialect::Postgres)),
    };

    Ok(descriptor)
}

fn resolve_mysql(raw: &DataType) -> Result<TypeDescriptor, ResolveError> {
    use PhysicalType::*;

    let name = raw.name.to_ascii_lowercase();
    let first = raw.params.first().copied();
    // ZEROFILL implies UNSIGNED
    let unsigned = raw.unsigned || raw.zerofill;

    // Integer display widths (`int(11)`) don't change storage and are ignored.
    let mut descriptor = match name.as_str() {
        "tinyint" if first == Some(1) && !unsigned => TypeDescriptor::of(Boolean),
        "bool" | "boolean" => TypeDescriptor::of(Boolean),
        "bit" => match first.unwrap_or(1) {
            1 => TypeDescriptor::of(Boolean),
            n => TypeDescriptor::sized(Bit, Some(n)),
        },
        "tinyint" => TypeDescriptor::of(TinyInt),
        "smallint" => TypeDescriptor::of(SmallInt),
        "mediumint" => TypeDescriptor::of(MediumInt),
        "int" | "integer" => TypeDescriptor::of(Integer),
        "bigint" => TypeDescriptor::of(BigInt),
        // BIGINT UNSIGNED NOT NULL AUTO_INCREMENT UNIQUE
        "serial" => TypeDescriptor {
            unsigned: true,
            ..TypeDescriptor::of(BigInt)
        },
        "float" => match first {
            Some(p) if p > 24 => TypeDescriptor::of(Double),
            _ => TypeDescriptor::of(Real),
        },
        "float4" => TypeDescriptor::of(Real),
        // REAL is DOUBLE unless REAL_AS_FLOAT is set
        "double" | "double precision" | "real" | "float8" => TypeDescriptor::of(Double),
        "decimal" | "numeric" | "dec" | "fixed" => match raw.params.as_slice() {
            [] => TypeDescriptor::decimal(Some(10), Some(0)),
            [p] => TypeDescriptor::decimal(Some(*p), Some(0)),
            [p, s, ..] => TypeDescriptor::decimal(Some(*p), Some(*s)),
        },
        "varchar" | "character varying" => TypeDescriptor::sized(Varchar, first),
        "char" | "character" => TypeDescriptor::sized(Char, Some(first.unwrap_or(1))),
        "uuid" => TypeDescriptor::sized(Char, Some(36)),
        // text and blob families differ only by maximum length
        "tinytext" => TypeDescriptor::sized(Text, Some(255)),
        "text" => TypeDescriptor::sized(Text, Some(65_535)),
        "mediumtext" => TypeDescriptor::sized(Text, Some(16_777_215)),
        "longtext" | "clob" => TypeDescriptor::sized(Text, Some(u32::MAX)),
        "tinyblob" => TypeDescriptor::sized(Binary, Some(255)),
        "blob" => TypeDescriptor::sized(Binary, Some(65_535)),
        "mediumblob" => TypeDescriptor::sized(Binary, Some(16_777_215)),
        "longblob" => TypeDescriptor::sized(Binary, Some(u32::MAX)),
        "binary" | "varbinary" => TypeDescriptor::sized(Binary, first),
        "date" => TypeDescriptor::of(Date),
        "time" => TypeDescriptor::sized(Time, Some(first.unwrap_or(0))),
        "datetime" => TypeDescriptor::sized(Timestamp, Some(first.unwrap_or(0))),
        // TIMESTAMP is stored as UTC and converted on read
        "timestamp" => TypeDescriptor::sized(TimestampTz, Some(first.unwrap_or(0))),
        // YEAR(4) is the only width still accepted
        "year" => TypeDescriptor::of(Year),
        "enum" if !raw.values.is_empty() => TypeDescriptor::listing(Enum, &raw.values),
        "set" if !raw.values.is_empty() => TypeDescriptor::listing(Set, &raw.values),
        "json" => TypeDescriptor::of(Json),
        _ => return Err(unknown(raw, Dialect::MySql)),
    };

    if unsigned {
        if !descriptor.physical.is_numeric() {
            return Err(unknown(raw, Dialect::MySql));
        }
        descriptor.unsigned = true;
    }

    Ok(descriptor)
}

/// SQLite has no real column types, only storage-class affinity, determined
/// by substring rules applied in a fixed order. Every token has an affinity.
fn resolve_sqlite(raw: &DataType) -> TypeDescriptor {
    let name = raw.name.to_ascii_uppercase();

    let physical = if name.contains("INT") {
        PhysicalType::Integer
    } else if name.contains("CHAR") || name.contains("CLOB") || name.contains("TEXT") {
        PhysicalType::Text
    } else if name.contains("BLOB") {
        PhysicalType::Binary
    } else if name.contains("REAL") || name.contains("FLOA") || name.contains("DOUB") {
        PhysicalType::Real
    } else {
        PhysicalType::Numeric
    };

    TypeDescriptor::of(physical)
}
