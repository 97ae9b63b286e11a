use crate::{
    entries::{DATE_FORMAT, HABIT_COUNT, Habit},
    error::PlotError,
    store::Table,
};
use csv::StringRecord;
use std::{collections::BTreeSet, ops::Range};
use time::Date;

/// One parsed row of the diary table.
#[derive(Debug, Clone, PartialEq)]
pub struct Day {
    pub date: Date,
    pub happiness: Option<f64>,
    pub productivity: Option<f64>,
    pub nap_hours: Option<f64>,
    pub habits: [bool; HABIT_COUNT],
}

impl Day {
    pub fn habit(&self, habit: Habit) -> bool {
        self.habits[habit as usize]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HabitTally {
    pub habit: Habit,
    pub done: usize,
    pub not_done: usize,
}

/// Every saved entry, oldest first.
#[derive(Debug)]
pub struct History {
    days: Vec<Day>,
    skipped: usize,
}

struct Columns {
    date: usize,
    happiness: usize,
    productivity: usize,
    nap_hours: usize,
    habits: [usize; HABIT_COUNT],
}

impl History {
    pub fn from_table(table: &Table) -> Result<Self, PlotError> {
        let columns = Columns {
            date: table.column("Date")?,
            happiness: table.column("Happiness_Score")?,
            productivity: table.column("Productivity_Score")?,
            nap_hours: table.column("Nap_Hours")?,
            habits: [
                table.column(Habit::Coding.column())?,
                table.column(Habit::GateClasses.column())?,
                table.column(Habit::SpeakingSkills.column())?,
                table.column(Habit::Workout.column())?,
                table.column(Habit::Meditation.column())?,
            ],
        };

        let mut days = table
            .rows()
            .iter()
            .map(|row| parse_day(row, &columns))
            .collect::<Result<Vec<_>, _>>()?;

        days.sort_by_key(|day| day.date);

        Ok(Self {
            days,
            skipped: table.skipped(),
        })
    }

    pub fn days(&self) -> &[Day] {
        &self.days
    }

    pub fn skipped(&self) -> usize {
        self.skipped
    }

    /// Number of distinct dates with at least one entry.
    pub fn total_days(&self) -> usize {
        self.days
            .iter()
            .map(|day| day.date)
            .collect::<BTreeSet<_>>()
            .len()
    }

    /// First and last date. `None` only for a history without days.
    pub fn span(&self) -> Option<(Date, Date)> {
        Some((self.days.first()?.date, self.days.last()?.date))
    }

    /// Y range of the trend chart: from zero (or the lowest score) to one
    /// above the highest score.
    pub fn score_range(&self) -> Range<f64> {
        axis_range(
            self.days
                .iter()
                .flat_map(|day| [day.happiness, day.productivity])
                .flatten(),
        )
    }

    pub fn nap_range(&self) -> Range<f64> {
        axis_range(self.days.iter().filter_map(|day| day.nap_hours))
    }

    pub fn habit_tallies(&self) -> Vec<HabitTally> {
        let total_days = self.total_days();

        Habit::ALL
            .iter()
            .map(|&habit| {
                let done = self.days.iter().filter(|day| day.habit(habit)).count();
                HabitTally {
                    habit,
                    done,
                    not_done: total_days.saturating_sub(done),
                }
            })
            .collect()
    }
}

fn axis_range(values: impl Iterator<Item = f64>) -> Range<f64> {
    let (low, high) = values.fold((0.0, f64::NEG_INFINITY), |(low, high), value| {
        (f64::min(low, value), f64::max(high, value))
    });

    if high.is_finite() {
        low..high + 1.0
    } else {
        0.0..1.0
    }
}

fn parse_day(row: &StringRecord, columns: &Columns) -> Result<Day, PlotError> {
    let line = row.position().map_or(0, |pos| pos.line());

    let raw_date = Table::field(row, columns.date).trim();
    let date = Date::parse(raw_date, DATE_FORMAT).map_err(|_| PlotError::BadDate {
        line,
        value: raw_date.to_owned(),
    })?;

    let mut habits = [false; HABIT_COUNT];
    for (slot, (&habit, &idx)) in habits
        .iter_mut()
        .zip(Habit::ALL.iter().zip(columns.habits.iter()))
    {
        *slot = parse_flag(habit.column(), line, Table::field(row, idx))?;
    }

    Ok(Day {
        date,
        happiness: parse_number(
            "Happiness_Score",
            line,
            Table::field(row, columns.happiness),
        )?,
        productivity: parse_number(
            "Productivity_Score",
            line,
            Table::field(row, columns.productivity),
        )?,
        nap_hours: parse_number("Nap_Hours", line, Table::field(row, columns.nap_hours))?,
        habits,
    })
}

fn parse_number(column: &'static str, line: u64, raw: &str) -> Result<Option<f64>, PlotError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(None);
    }

    match raw.parse::<f64>() {
        Ok(value) if value.is_finite() => Ok(Some(value)),
        Ok(_) if raw.eq_ignore_ascii_case("nan") => Ok(None),
        _ => Err(PlotError::BadNumber {
            column,
            line,
            value: raw.to_owned(),
        }),
    }
}

fn parse_flag(column: &'static str, line: u64, raw: &str) -> Result<bool, PlotError> {
    match raw.trim() {
        "True" | "true" | "TRUE" | "1" => Ok(true),
        "False" | "false" | "FALSE" | "0" | "" => Ok(false),
        other => Err(PlotError::BadFlag {
            column,
            line,
            value: other.to_owned(),
        }),
    }
}
