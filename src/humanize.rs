use chrono::TimeDelta;

const WEEK: i64 = 7;
const MONTH: i64 = 4;
const YEAR: i64 = 12;

/// Coarse age for display: days, then weeks, months, years.
///
/// Each step divides the count the previous step produced, and only when it is
/// strictly above the divisor. A count of 5 to 7 days skips the week step and is
/// already above the month divisor, so it reads as 1 month, as do 40 days.
pub fn humanize(age: TimeDelta) -> (i64, &'static str) {
    let mut count = age.num_days();
    let mut unit = if count > 1 { "days" } else { "day" };

    if count > WEEK {
        count /= WEEK;
        unit = if count > 1 { "weeks" } else { "week" };
    }
    if count > MONTH {
        count /= MONTH;
        unit = if count > 1 { "months" } else { "month" };
    }
    if count > YEAR {
        count /= YEAR;
        unit = if count > 1 { "years" } else { "year" };
    }
    (count, unit)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn days(n: i64) -> (i64, &'static str) { humanize(TimeDelta::days(n)) }

    #[test]
    fn up_to_four_days() {
        assert_eq!(days(0), (0, "day"));
        assert_eq!(days(1), (1, "day"));
        assert_eq!(days(3), (3, "days"));
        assert_eq!(days(4), (4, "days"));
    }

    #[test]
    fn five_to_seven_days_read_as_a_month() {
        assert_eq!(days(5), (1, "month"));
        assert_eq!(days(7), (1, "month"));
    }

    #[test]
    fn partial_days_truncate() {
        assert_eq!(humanize(TimeDelta::hours(47)), (1, "day"));
        assert_eq!(humanize(TimeDelta::minutes(5)), (0, "day"));
    }

    #[test]
    fn weeks() {
        assert_eq!(days(8), (1, "week"));
        assert_eq!(days(10), (1, "week"));
        assert_eq!(days(14), (2, "weeks"));
        assert_eq!(days(34), (4, "weeks"));
    }

    #[test]
    fn cascades_into_months() {
        assert_eq!(days(35), (1, "month"));
        assert_eq!(days(40), (1, "month"));
        assert_eq!(days(70), (2, "months"));
        assert_eq!(days(336), (12, "months"));
    }

    #[test]
    fn cascades_into_years() {
        // 400 / 7 = 57 weeks, / 4 = 14 months, / 12 = 1 year
        assert_eq!(days(364), (1, "year"));
        assert_eq!(days(400), (1, "year"));
        assert_eq!(days(800), (2, "years"));
    }
}
