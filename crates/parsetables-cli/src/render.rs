//! Plain-text renderings of extracted rows

use parsetables_core::TableRef;
use parsetables_sql::ParseTablesBindData;

/// Aligned text table, header first, no trailing whitespace
pub fn render_table(rows: &[TableRef]) -> String {
    let header = ParseTablesBindData::COLUMN_NAMES;

    let mut widths = header.map(str::len);
    for row in rows {
        for (width, value) in widths.iter_mut().zip(row.columns()) {
            *width = (*width).max(value.len());
        }
    }

    let format_line = |values: [&str; 3]| {
        let line = values
            .iter()
            .zip(widths)
            .map(|(value, width)| format!("{:<width$}", value, width = width))
            .collect::<Vec<_>>()
            .join("  ");
        line.trim_end().to_string()
    };

    let mut lines = vec![format_line(header)];
    lines.push(widths.iter().map(|w| "-".repeat(*w)).collect::<Vec<_>>().join("  "));
    lines.extend(rows.iter().map(|row| format_line(row.columns())));
    lines.join("\n")
}

/// CSV with a header row
pub fn render_csv(rows: &[TableRef]) -> String {
    let mut out = ParseTablesBindData::COLUMN_NAMES.join(",");
    for row in rows {
        out.push('\n');
        out.push_str(
            &row.columns()
                .iter()
                .map(|value| csv_field(value))
                .collect::<Vec<_>>()
                .join(","),
        );
    }
    out
}

fn csv_field(value: &str) -> String {
    if value.contains([',', '"', '\n']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parsetables_core::TableContext;
    use pretty_assertions::assert_eq;

    fn sample() -> Vec<TableRef> {
        vec![
            TableRef::cte_definition("recent"),
            TableRef::new("main", "orders", TableContext::JoinLeft),
        ]
    }

    #[test]
    fn table_is_aligned() {
        let expected = "\
schema  table   context
------  ------  ---------
        recent  cte
main    orders  join_left";
        assert_eq!(render_table(&sample()), expected);
    }

    #[test]
    fn empty_table_has_header() {
        assert_eq!(render_table(&[]), "schema  table  context\n------  -----  -------");
    }

    #[test]
    fn csv_output() {
        assert_eq!(render_csv(&sample()), "schema,table,context\n,recent,cte\nmain,orders,join_left");
    }

    #[test]
    fn csv_quotes_special_characters() {
        let rows = vec![TableRef::new("s", "odd,\"name\"", TableContext::From)];
        assert_eq!(render_csv(&rows), "schema,table,context\ns,\"odd,\"\"name\"\"\",from");
    }
}
