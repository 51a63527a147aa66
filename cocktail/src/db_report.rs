//! Read-only overview of whatever tables the configured database holds.

use sea_orm::{ConnectionTrait, DatabaseConnection, DbBackend, Statement};
use std::error::Error;
use std::fmt::Write;

#[derive(Debug, Clone, PartialEq)]
pub struct ColumnInfo {
    pub name: String,
    pub data_type: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TableReport {
    pub name: String,
    pub columns: Vec<ColumnInfo>,
    /// Every value rendered as text, `NULL` for SQL nulls.
    pub rows: Vec<Vec<String>>,
}

fn quote_identifier(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

fn unsupported(backend: DbBackend) -> Box<dyn Error + Send + Sync> {
    format!("Database inspection is not supported for {:?}", backend).into()
}

pub async fn list_tables(
    db: &DatabaseConnection,
) -> Result<Vec<String>, Box<dyn Error + Send + Sync>> {
    let backend = db.get_database_backend();
    let sql = match backend {
        DbBackend::Sqlite => {
            "SELECT name FROM sqlite_master \
             WHERE type = 'table' AND name NOT LIKE 'sqlite_%' ORDER BY name"
        }
        DbBackend::Postgres => {
            "SELECT table_name::text AS name FROM information_schema.tables \
             WHERE table_schema = 'public' ORDER BY table_name"
        }
        other => return Err(unsupported(other)),
    };

    db.query_all(Statement::from_string(backend, sql))
        .await?
        .iter()
        .map(|row| Ok(row.try_get::<String>("", "name")?))
        .collect::<Result<Vec<_>, Box<dyn Error + Send + Sync>>>()
}

pub async fn table_columns(
    db: &DatabaseConnection,
    table: &str,
) -> Result<Vec<ColumnInfo>, Box<dyn Error + Send + Sync>> {
    let backend = db.get_database_backend();
    let statement = match backend {
        DbBackend::Sqlite => Statement::from_string(
            backend,
            format!(
                "SELECT name, type AS data_type FROM pragma_table_info('{}') ORDER BY cid",
                table.replace('\'', "''")
            ),
        ),
        DbBackend::Postgres => Statement::from_sql_and_values(
            backend,
            "SELECT column_name::text AS name, data_type::text AS data_type \
             FROM information_schema.columns \
             WHERE table_schema = 'public' AND table_name = $1 ORDER BY ordinal_position",
            [table.into()],
        ),
        other => return Err(unsupported(other)),
    };

    db.query_all(statement)
        .await?
        .iter()
        .map(|row| {
            Ok(ColumnInfo {
                name: row.try_get("", "name")?,
                data_type: row.try_get("", "data_type")?,
            })
        })
        .collect::<Result<Vec<_>, Box<dyn Error + Send + Sync>>>()
}

pub async fn table_rows(
    db: &DatabaseConnection,
    table: &str,
    columns: &[ColumnInfo],
) -> Result<Vec<Vec<String>>, Box<dyn Error + Send + Sync>> {
    if columns.is_empty() {
        return Ok(Vec::new());
    }
    let backend = db.get_database_backend();
    let select_list = columns
        .iter()
        .map(|column| {
            let quoted = quote_identifier(&column.name);
            match backend {
                DbBackend::Postgres => format!("{}::text AS {}", quoted, quoted),
                _ => format!("CAST({} AS TEXT) AS {}", quoted, quoted),
            }
        })
        .collect::<Vec<_>>()
        .join(", ");
    let sql = format!("SELECT {} FROM {}", select_list, quote_identifier(table));

    db.query_all(Statement::from_string(backend, sql))
        .await?
        .iter()
        .map(|row| {
            columns
                .iter()
                .map(|column| {
                    let value: Option<String> = row.try_get("", &column.name)?;
                    Ok(value.unwrap_or_else(|| "NULL".to_string()))
                })
                .collect::<Result<Vec<_>, Box<dyn Error + Send + Sync>>>()
        })
        .collect::<Result<Vec<_>, Box<dyn Error + Send + Sync>>>()
}

pub async fn collect_report(
    db: &DatabaseConnection,
) -> Result<Vec<TableReport>, Box<dyn Error + Send + Sync>> {
    let mut reports = Vec::new();
    for name in list_tables(db).await? {
        let columns = table_columns(db, &name).await?;
        let rows = table_rows(db, &name, &columns).await?;
        reports.push(TableReport { name, columns, rows });
    }
    Ok(reports)
}

pub fn render_report(reports: &[TableReport]) -> String {
    let mut out = String::from("=== Database overview ===\n");

    let _ = writeln!(out, "\n1. Tables:");
    for table in reports {
        let _ = writeln!(out, "- {}", table.name);
    }

    for table in reports {
        let _ = writeln!(out, "\n2. {} schema:", table.name);
        for column in &table.columns {
            let _ = writeln!(out, "  - {} ({})", column.name, column.data_type);
        }
    }

    for table in reports {
        let _ = writeln!(out, "\n3. {} data:", table.name);
        if table.rows.is_empty() {
            let _ = writeln!(out, "  - no data");
        }
        for row in &table.rows {
            let _ = writeln!(out, "  - ({})", row.join(", "));
        }
    }
    out
}
