// src/grid_tests.rs

#[cfg(test)]
mod tests {
    use crate::grid::*;
    use crate::month::TargetMonth;
    use chrono::NaiveDate;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    fn day(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }

    fn record(date: (i32, u32, u32), engineer: &str, hours: Decimal) -> DailyHours {
        DailyHours {
            day: day(date.0, date.1, date.2),
            engineer: engineer.to_string(),
            hours,
        }
    }

    fn march() -> TargetMonth {
        TargetMonth::parse("2024-03").unwrap()
    }

    // --- display_name ---

    #[test]
    fn test_display_name_dotted_identifier() {
        assert_eq!(display_name("jane.doe"), "Jane Doe");
    }

    #[test]
    fn test_display_name_single_part() {
        assert_eq!(display_name("bob"), "Bob");
    }

    #[test]
    fn test_display_name_three_parts() {
        assert_eq!(display_name("mary.jane.watson"), "Mary Jane Watson");
    }

    #[test]
    fn test_display_name_empty_input() {
        assert_eq!(display_name(""), "");
    }

    #[test]
    fn test_display_name_keeps_stray_space_for_empty_parts() {
        assert_eq!(display_name(".doe"), " Doe");
        assert_eq!(display_name("jane..doe"), "Jane  Doe");
    }

    // --- HourGrid::build ---

    #[test]
    fn test_build_empty_input_yields_none() {
        assert!(HourGrid::build(&[], &march()).is_none());
    }

    #[test]
    fn test_build_row_count_matches_days_in_month() {
        let cases = [
            ("2024-03", (2024, 3, 1), 31),
            ("2024-04", (2024, 4, 1), 30),
            ("2024-02", (2024, 2, 5), 29),
            ("2023-02", (2023, 2, 5), 28),
        ];
        for (label, date, expected_rows) in cases {
            let month = TargetMonth::parse(label).unwrap();
            let grid = HourGrid::build(&[record(date, "jane.doe", dec!(8))], &month)
                .unwrap_or_else(|| panic!("Expected a grid for {}", label));
            assert_eq!(grid.days().len(), expected_rows, "month {}", label);
        }
    }

    #[test]
    fn test_build_days_are_ascending_and_calendar_complete() {
        let grid = HourGrid::build(&[record((2024, 3, 10), "jane.doe", dec!(8))], &march()).unwrap();
        assert_eq!(grid.days().first().copied(), Some(day(2024, 3, 1)));
        assert_eq!(grid.days().last().copied(), Some(day(2024, 3, 31)));
        assert!(grid.days().windows(2).all(|pair| pair[0] < pair[1]));
    }

    #[test]
    fn test_build_is_idempotent() {
        let records = vec![
            record((2024, 3, 1), "jane.doe", dec!(8)),
            record((2024, 3, 3), "jane.doe", dec!(4)),
            record((2024, 3, 1), "bob.smith", dec!(6)),
        ];
        let first = HourGrid::build(&records, &march()).unwrap();
        let second = HourGrid::build(&records, &march()).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_build_last_write_wins_for_duplicate_pairs() {
        let records = vec![
            record((2024, 3, 4), "jane.doe", dec!(3)),
            record((2024, 3, 4), "jane.doe", dec!(7)),
        ];
        let grid = HourGrid::build(&records, &march()).unwrap();
        assert_eq!(grid.hours(day(2024, 3, 4), "Jane Doe"), Some(dec!(7)));
    }

    #[test]
    fn test_build_columns_are_union_in_first_seen_order() {
        let records = vec![
            record((2024, 3, 2), "jane.doe", dec!(8)),
            record((2024, 3, 5), "bob.smith", dec!(6)),
            record((2024, 3, 9), "jane.doe", dec!(2)),
        ];
        let grid = HourGrid::build(&records, &march()).unwrap();
        assert_eq!(grid.engineers(), ["Jane Doe", "Bob Smith"]);
    }

    #[test]
    fn test_build_missing_cells_stay_absent() {
        let grid = HourGrid::build(&[record((2024, 3, 2), "jane.doe", dec!(8))], &march()).unwrap();
        assert_eq!(grid.hours(day(2024, 3, 2), "Jane Doe"), Some(dec!(8)));
        assert_eq!(grid.hours(day(2024, 3, 3), "Jane Doe"), None);
        assert_eq!(grid.hours(day(2024, 3, 2), "Bob Smith"), None);
    }

    #[test]
    fn test_build_out_of_month_record_keeps_column_but_no_row() {
        // The fetch window's upper bound is the following month's midnight, so
        // a record dated on the 1st of the next month can slip in.
        let records = vec![
            record((2024, 3, 28), "jane.doe", dec!(8)),
            record((2024, 4, 1), "bob.smith", dec!(5)),
        ];
        let grid = HourGrid::build(&records, &march()).unwrap();
        assert_eq!(grid.days().len(), 31);
        assert!(grid.engineers().contains(&"Bob Smith".to_string()));
        assert!(grid
            .days()
            .iter()
            .all(|d| grid.hours(*d, "Bob Smith").is_none()));
    }

    #[test]
    fn test_build_march_2024_scenario() {
        let records = vec![
            record((2024, 3, 1), "jane.doe", dec!(8)),
            record((2024, 3, 3), "jane.doe", dec!(4)),
            record((2024, 3, 1), "bob.smith", dec!(6)),
        ];
        let grid = HourGrid::build(&records, &march()).unwrap();

        assert_eq!(grid.days().len(), 31);
        assert_eq!(grid.engineers(), ["Jane Doe", "Bob Smith"]);

        assert_eq!(grid.hours(day(2024, 3, 1), "Jane Doe"), Some(dec!(8)));
        assert_eq!(grid.hours(day(2024, 3, 3), "Jane Doe"), Some(dec!(4)));
        assert_eq!(grid.hours(day(2024, 3, 1), "Bob Smith"), Some(dec!(6)));
        assert_eq!(grid.hours(day(2024, 3, 3), "Bob Smith"), None);
        assert_eq!(grid.hours(day(2024, 3, 2), "Jane Doe"), None);
        assert_eq!(grid.hours(day(2024, 3, 31), "Bob Smith"), None);
    }
}
