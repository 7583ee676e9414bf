//! SQL statement text generation.
//!
//! All value positions use `?N` placeholders; only identifiers are spliced
//! into the text. Identifiers are wrapped in double quotes but not escaped
//! beyond that; names containing quotes, spaces, or commas are a caller
//! obligation, as documented on [`FrameStore`](crate::FrameStore).

/// The implicit primary-key column present on every mapped table.
pub const ID_COLUMN: &str = "ID";

fn quote(ident: &str) -> String {
    format!("\"{ident}\"")
}

/// `CREATE TABLE` with the implicit integer primary key plus one unbounded
/// `TEXT` column per name.
pub fn create_table(table: &str, columns: &[&str]) -> String {
    let mut decls = vec![format!("{} INTEGER PRIMARY KEY", quote(ID_COLUMN))];
    decls.extend(columns.iter().map(|c| format!("{} TEXT", quote(c))));
    format!("CREATE TABLE {} ({})", quote(table), decls.join(", "))
}

pub fn drop_table(table: &str) -> String {
    format!("DROP TABLE {}", quote(table))
}

pub fn drop_table_if_exists(table: &str) -> String {
    format!("DROP TABLE IF EXISTS {}", quote(table))
}

/// Parameterized single-row `INSERT` over the given columns.
pub fn insert(table: &str, columns: &[&str]) -> String {
    let cols: Vec<String> = columns.iter().map(|c| quote(c)).collect();
    let marks: Vec<String> = (1..=columns.len()).map(|i| format!("?{i}")).collect();
    format!(
        "INSERT INTO {} ({}) VALUES ({})",
        quote(table),
        cols.join(", "),
        marks.join(", ")
    )
}

pub fn select_all(table: &str) -> String {
    format!("SELECT * FROM {}", quote(table))
}

/// `SELECT *` that matches nothing; used to read a table's column shape.
pub fn select_none(table: &str) -> String {
    format!("SELECT * FROM {} LIMIT 0", quote(table))
}

/// `SELECT *` filtered by exact string equality on one column.
///
/// The column is cast to text so that an integer `ID` matches its rendered
/// string form.
pub fn select_where_eq(table: &str, column: &str) -> String {
    format!(
        "SELECT * FROM {} WHERE CAST({} AS TEXT) = ?1",
        quote(table),
        quote(column)
    )
}

/// Single-cell `UPDATE` keyed by string-compared `ID`.
pub fn update_cell(table: &str, column: &str) -> String {
    format!(
        "UPDATE {} SET {} = ?1 WHERE CAST({} AS TEXT) = ?2",
        quote(table),
        quote(column),
        quote(ID_COLUMN)
    )
}

/// `DELETE` with AND-combined string-equality conditions, one per column,
/// in the order given.
pub fn delete_where_eq(table: &str, columns: &[&str]) -> String {
    let conditions: Vec<String> = columns
        .iter()
        .enumerate()
        .map(|(i, c)| format!("CAST({} AS TEXT) = ?{}", quote(c), i + 1))
        .collect();
    format!(
        "DELETE FROM {} WHERE {}",
        quote(table),
        conditions.join(" AND ")
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_table_declares_id_and_text_columns() {
        assert_eq!(
            create_table("people", &["Name", "Age"]),
            "CREATE TABLE \"people\" (\"ID\" INTEGER PRIMARY KEY, \"Name\" TEXT, \"Age\" TEXT)"
        );
    }

    #[test]
    fn create_table_with_no_columns_is_id_only() {
        assert_eq!(
            create_table("bare", &[]),
            "CREATE TABLE \"bare\" (\"ID\" INTEGER PRIMARY KEY)"
        );
    }

    #[test]
    fn insert_numbers_placeholders() {
        assert_eq!(
            insert("people", &["Name", "Age"]),
            "INSERT INTO \"people\" (\"Name\", \"Age\") VALUES (?1, ?2)"
        );
    }

    #[test]
    fn select_none_keeps_only_the_shape() {
        assert_eq!(
            select_none("people"),
            "SELECT * FROM \"people\" LIMIT 0"
        );
    }

    #[test]
    fn select_where_compares_as_text() {
        assert_eq!(
            select_where_eq("people", "ID"),
            "SELECT * FROM \"people\" WHERE CAST(\"ID\" AS TEXT) = ?1"
        );
    }

    #[test]
    fn update_cell_targets_one_column_by_id() {
        assert_eq!(
            update_cell("people", "Age"),
            "UPDATE \"people\" SET \"Age\" = ?1 WHERE CAST(\"ID\" AS TEXT) = ?2"
        );
    }

    #[test]
    fn delete_where_ands_conditions_in_order() {
        assert_eq!(
            delete_where_eq("people", &["Name", "Age"]),
            "DELETE FROM \"people\" WHERE CAST(\"Name\" AS TEXT) = ?1 AND CAST(\"Age\" AS TEXT) = ?2"
        );
    }
}
