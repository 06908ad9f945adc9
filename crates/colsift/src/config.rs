//! Output options for SQL rendering.

use colsift_schema::Dialect;

/// Controls how generated statements name tables and columns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputControl {
    /// Schema to qualify table names with
    pub schema: Option<String>,
    /// Quote identifiers. On by default, since reserved words like `user`
    /// and `order` are common column and table names.
    pub quote_identifiers: bool,
}

impl Default for OutputControl {
    fn default() -> Self {
        Self {
            schema: None,
            quote_identifiers: true,
        }
    }
}

impl OutputControl {
    pub fn with_schema(mut self, schema: impl Into<String>) -> Self {
        self.schema = Some(schema.into());
        self
    }

    pub fn unquoted(mut self) -> Self {
        self.quote_identifiers = false;
        self
    }

    pub(crate) fn ident(&self, dialect: Dialect, name: &str) -> String {
        if self.quote_identifiers {
            dialect.quote_ident(name)
        } else {
            name.to_string()
        }
    }

    pub(crate) fn table(&self, dialect: Dialect, table: &str) -> String {
        match &self.schema {
            Some(schema) => format!(
                "{}.{}",
                self.ident(dialect, schema),
                self.ident(dialect, table)
            ),
            None => self.ident(dialect, table),
        }
    }
}
