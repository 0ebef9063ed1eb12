//! SQLite-backed job persistence.

use std::collections::{BTreeMap, VecDeque};
use std::path::Path;

use rusqlite::types::ValueRef;
use rusqlite::{params_from_iter, Connection, OpenFlags};
use serde_json::{Map, Number, Value};

use super::{JobPersistence, RecordStream};
use crate::error::{DumpError, Result};

/// Rows fetched per query while streaming a table.
pub const DEFAULT_PAGE_SIZE: usize = 500;

/// Job database stored in SQLite.
///
/// Tables are streamed page by page in rowid order, so at most `page_size`
/// rows of one table are in memory at a time. Each page seeks past the last
/// rowid seen instead of re-scanning skipped rows.
pub struct SqlitePersistence {
    conn: Connection,
    page_size: usize,
}

impl SqlitePersistence {
    /// Open an existing database read-only.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let conn = Connection::open_with_flags(path, OpenFlags::SQLITE_OPEN_READ_ONLY)
            .map_err(|e| DumpError::StorageRead(format!("Cannot open {:?}: {}", path, e)))?;
        Ok(Self::from_connection(conn))
    }

    /// Create an in-memory database (for testing)
    pub fn in_memory() -> Result<Self> {
        Ok(Self::from_connection(Connection::open_in_memory()?))
    }

    pub fn from_connection(conn: Connection) -> Self {
        Self {
            conn,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }

    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    /// User tables, sorted by name.
    pub fn list_tables(&self) -> Result<Vec<String>> {
        let mut stmt = self.conn.prepare(
            "SELECT name FROM sqlite_master WHERE type = 'table' AND name NOT LIKE 'sqlite_%' ORDER BY name",
        )?;
        let names = stmt
            .query_map([], |row| row.get::<_, String>(0))?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(names)
    }
}

impl JobPersistence for SqlitePersistence {
    fn export_default_schema(&self) -> Result<BTreeMap<String, RecordStream<'_>>> {
        let mut tables = BTreeMap::new();
        for name in self.list_tables()? {
            let paging = if has_rowid(&self.conn, &name) {
                Paging::Rowid(None)
            } else {
                Paging::Offset(0)
            };
            let order_by = match paging {
                Paging::Rowid(_) => Vec::new(),
                Paging::Offset(_) => primary_key(&self.conn, &name)?,
            };
            let rows = TableRows::new(&self.conn, &name, &order_by, paging, self.page_size);
            tables.insert(name, Box::new(rows) as RecordStream<'_>);
        }
        Ok(tables)
    }
}

/// Where the next page starts.
#[derive(Debug, Clone, Copy)]
enum Paging {
    /// Rows after this rowid, in rowid order.
    Rowid(Option<i64>),
    /// Rows after this many, for `WITHOUT ROWID` tables.
    Offset(usize),
}

/// Paged iterator over the rows of one table.
struct TableRows<'a> {
    conn: &'a Connection,
    table: String,
    order_by: String,
    paging: Paging,
    page_size: usize,
    page: VecDeque<Value>,
    exhausted: bool,
}

impl<'a> TableRows<'a> {
    fn new(
        conn: &'a Connection,
        table: &str,
        order_by: &[String],
        paging: Paging,
        page_size: usize,
    ) -> Self {
        let order_by = if order_by.is_empty() {
            String::new()
        } else {
            let columns: Vec<String> = order_by.iter().map(|c| quote_ident(c)).collect();
            format!(" ORDER BY {}", columns.join(", "))
        };
        Self {
            conn,
            table: quote_ident(table),
            order_by,
            paging,
            page_size,
            page: VecDeque::new(),
            exhausted: false,
        }
    }

    /// Query text and bound values for the next page.
    ///
    /// Rowid pages select the rowid as an extra leading column.
    fn next_query(&self) -> (String, Vec<i64>) {
        let limit = self.page_size as i64;
        match self.paging {
            Paging::Rowid(None) => (
                format!("SELECT rowid, * FROM {} ORDER BY rowid LIMIT ?1", self.table),
                vec![limit],
            ),
            Paging::Rowid(Some(last)) => (
                format!(
                    "SELECT rowid, * FROM {} WHERE rowid > ?2 ORDER BY rowid LIMIT ?1",
                    self.table
                ),
                vec![limit, last],
            ),
            Paging::Offset(offset) => (
                format!(
                    "SELECT * FROM {}{} LIMIT ?1 OFFSET ?2",
                    self.table, self.order_by
                ),
                vec![limit, offset as i64],
            ),
        }
    }

    fn fetch_page(&mut self) -> Result<()> {
        let (sql, bound) = self.next_query();
        let skip = usize::from(matches!(self.paging, Paging::Rowid(_)));

        let mut stmt = self.conn.prepare_cached(&sql)?;
        let columns: Vec<String> = stmt
            .column_names()
            .into_iter()
            .skip(skip)
            .map(String::from)
            .collect();
        let mut rows = stmt.query(params_from_iter(bound))?;

        let mut page = Vec::with_capacity(self.page_size);
        let mut last_rowid = None;
        while let Some(row) = rows.next()? {
            if skip == 1 {
                last_rowid = Some(row.get::<_, i64>(0)?);
            }
            let mut record = Map::new();
            for (i, column) in columns.iter().enumerate() {
                record.insert(column.clone(), to_json(column, row.get_ref(i + skip)?)?);
            }
            page.push(Value::Object(record));
        }

        let fetched = page.len();
        self.page.extend(page);
        self.paging = match self.paging {
            Paging::Rowid(previous) => Paging::Rowid(last_rowid.or(previous)),
            Paging::Offset(offset) => Paging::Offset(offset + fetched),
        };
        if fetched < self.page_size {
            self.exhausted = true;
        }
        Ok(())
    }
}

impl Iterator for TableRows<'_> {
    type Item = Result<Value>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.page.is_empty() && !self.exhausted {
            if let Err(e) = self.fetch_page() {
                self.exhausted = true;
                return Some(Err(e));
            }
        }
        self.page.pop_front().map(Ok)
    }
}

/// `WITHOUT ROWID` tables reject a `rowid` reference.
fn has_rowid(conn: &Connection, table: &str) -> bool {
    conn.prepare(&format!("SELECT rowid FROM {} LIMIT 0", quote_ident(table)))
        .is_ok()
}

/// Primary key columns in key order.
fn primary_key(conn: &Connection, table: &str) -> Result<Vec<String>> {
    let mut stmt =
        conn.prepare("SELECT name FROM pragma_table_info(?1) WHERE pk > 0 ORDER BY pk")?;
    let columns = stmt
        .query_map([table], |row| row.get::<_, String>(0))?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(columns)
}

fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

fn to_json(column: &str, value: ValueRef<'_>) -> Result<Value> {
    Ok(match value {
        ValueRef::Null => Value::Null,
        ValueRef::Integer(i) => Value::from(i),
        ValueRef::Real(f) => Number::from_f64(f).map(Value::Number).unwrap_or(Value::Null),
        ValueRef::Text(bytes) => {
            let text = std::str::from_utf8(bytes).map_err(|e| {
                DumpError::Serialization(format!("Invalid UTF-8 in column {}: {}", column, e))
            })?;
            Value::String(text.to_string())
        }
        ValueRef::Blob(bytes) => Value::String(hex::encode(bytes)),
    })
}
