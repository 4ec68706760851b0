use chrono::{Datelike, Utc};
use diesel::pg::PgConnection;
use diesel::prelude::*;

use crate::error::AppResult;
use crate::schema::report_sequences;

pub const REPORT_PREFIX: &str = "RPT";
pub const CASE_PREFIX: &str = "CASE";

/// Allocates the next number in the year-scoped sequence for `prefix`.
/// Must run inside the caller's transaction: the `FOR UPDATE` read
/// serializes concurrent allocators on the sequence row, so numbers are
/// unique and monotonically increasing within a year.
pub fn next_number(conn: &mut PgConnection, prefix: &str) -> AppResult<String> {
    let year = Utc::now().year();

    diesel::insert_into(report_sequences::table)
        .values((
            report_sequences::prefix.eq(prefix),
            report_sequences::year.eq(year),
            report_sequences::next_value.eq(1_i64),
        ))
        .on_conflict_do_nothing()
        .execute(conn)?;

    let value: i64 = report_sequences::table
        .find((prefix, year))
        .select(report_sequences::next_value)
        .for_update()
        .first(conn)?;

    diesel::update(report_sequences::table.find((prefix, year)))
        .set(report_sequences::next_value.eq(value + 1))
        .execute(conn)?;

    Ok(format_number(prefix, year, value))
}

fn format_number(prefix: &str, year: i32, value: i64) -> String {
    format!("{prefix}-{year}-{value:05}")
}

#[cfg(test)]
mod tests {
    use super::format_number;

    #[test]
    fn numbers_are_zero_padded_and_year_scoped() {
        assert_eq!(format_number("RPT", 2026, 1), "RPT-2026-00001");
        assert_eq!(format_number("CASE", 2026, 42), "CASE-2026-00042");
        assert_eq!(format_number("RPT", 2027, 123456), "RPT-2027-123456");
    }
}
