//! # Column Definitions
//!
//! A `Column` is what the catalog reports about one schema column: name, SQL
//! type, nullability, the catalog-assigned oid and the raw attribute width.
//!
//! The raw width normally follows from the SQL type. It can be overridden with
//! `with_attr_size` when column metadata is loaded from an external source; in
//! that case the width is untrusted and is only validated when a physical
//! layout is built from it.

use crate::config::VARLEN_COLUMN;
use crate::types::{ColumnOid, WidthClass, WidthError};

/// SQL types the table layer can lay out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SqlType {
    Boolean,
    TinyInt,
    SmallInt,
    Integer,
    BigInt,
    Decimal,
    Date,
    Timestamp,
    Varchar,
    Varbinary,
}

impl SqlType {
    /// Raw attribute width of values of this type.
    pub const fn attr_size(self) -> u16 {
        match self {
            SqlType::Boolean | SqlType::TinyInt => 1,
            SqlType::SmallInt => 2,
            SqlType::Integer | SqlType::Date => 4,
            SqlType::BigInt | SqlType::Decimal | SqlType::Timestamp => 8,
            SqlType::Varchar | SqlType::Varbinary => VARLEN_COLUMN,
        }
    }

    pub const fn is_varlen(self) -> bool {
        matches!(self, SqlType::Varchar | SqlType::Varbinary)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Column {
    name: String,
    sql_type: SqlType,
    nullable: bool,
    oid: ColumnOid,
    attr_size: u16,
}

impl Column {
    pub fn new(name: impl Into<String>, sql_type: SqlType, nullable: bool) -> Self {
        Self {
            name: name.into(),
            sql_type,
            nullable,
            oid: ColumnOid::INVALID,
            attr_size: sql_type.attr_size(),
        }
    }

    pub fn with_oid(mut self, oid: ColumnOid) -> Self {
        self.oid = oid;
        self
    }

    /// Overrides the raw width reported for this column.
    pub fn with_attr_size(mut self, attr_size: u16) -> Self {
        self.attr_size = attr_size;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn sql_type(&self) -> SqlType {
        self.sql_type
    }

    pub fn nullable(&self) -> bool {
        self.nullable
    }

    pub fn oid(&self) -> ColumnOid {
        self.oid
    }

    pub fn attr_size(&self) -> u16 {
        self.attr_size
    }

    pub fn width_class(&self) -> Result<WidthClass, WidthError> {
        WidthClass::try_from(self.attr_size)
    }

    pub(crate) fn set_oid(&mut self, oid: ColumnOid) {
        self.oid = oid;
    }
}
