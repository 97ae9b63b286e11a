use std::sync::LazyLock;
use time::Date;

static QUOTES: LazyLock<Vec<String>> = LazyLock::new(|| {
    (1..=365)
        .map(|day| format!("Quote of the Day {day}: Keep shining!"))
        .collect()
});

/// One quote per day of the year. The 366th day of a leap year reuses the last one.
pub fn quote_of_the_day(date: Date) -> &'static str {
    let index = (usize::from(date.ordinal()) - 1).min(QUOTES.len() - 1);

    &QUOTES[index]
}
