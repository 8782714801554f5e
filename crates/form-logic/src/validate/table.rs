use crate::response::Answer;
use crate::spec::field::{ColumnKind, FieldDefinition};

pub(crate) fn validate_table(field: &FieldDefinition, answer: &Answer) -> Result<(), String> {
    let Answer::Table(rows) = answer else {
        return Err("table answers must be a list of rows".into());
    };
    if field.columns.is_empty() {
        return Err("table has no columns".into());
    }

    let min_rows = field.minimum_rows;
    let max_rows = if field.add_more_rows {
        field.maximum_rows
    } else {
        Some(field.minimum_rows)
    };
    if rows.len() < min_rows {
        return Err(format!("table needs at least {min_rows} rows"));
    }
    if let Some(max_rows) = max_rows
        && rows.len() > max_rows
    {
        return Err(format!("table allows at most {max_rows} rows"));
    }

    for (row_index, row) in rows.iter().enumerate() {
        if row.len() != field.columns.len() {
            return Err(format!(
                "row {} has {} cells but the table has {} columns",
                row_index + 1,
                row.len(),
                field.columns.len()
            ));
        }
        for (cell, column) in row.iter().zip(&field.columns) {
            if cell.trim().is_empty() {
                if column.required {
                    return Err(format!(
                        "row {} is missing a value for '{}'",
                        row_index + 1,
                        column.title
                    ));
                }
                continue;
            }
            if column.kind == ColumnKind::Dropdown && !column.options.iter().any(|o| o == cell) {
                return Err(format!(
                    "row {} has an invalid option for '{}'",
                    row_index + 1,
                    column.title
                ));
            }
        }
    }
    Ok(())
}
