use clap::{Args, ValueEnum, value_parser};
use serde::{Serialize, Serializer};
use time::{Date, format_description::BorrowedFormatItem, macros::format_description};

/// Format of the `Date` column.
pub const DATE_FORMAT: &[BorrowedFormatItem<'static>] = format_description!("[year]-[month]-[day]");

/// Column names of the diary table, in the order they are written.
pub const COLUMNS: [&str; 28] = [
    "Date",
    "Task1_Tomorrow",
    "Task2_Tomorrow",
    "Task3_Tomorrow",
    "Happiness_Score",
    "Productivity_Score",
    "Must_Have",
    "Should_Have",
    "Could_Have",
    "Wont_Have",
    "Unhappy_Reason",
    "Unhappy_Importance",
    "Happy_Thing1",
    "Happy_Thing2",
    "Change1",
    "Change2",
    "Change3",
    "Time_Wasters",
    "Mistakes",
    "Meals",
    "Money_Spent",
    "Nap_Hours",
    "Did_Coding",
    "Gate_Classes",
    "Speaking_Skills",
    "Workout",
    "Meditation",
    "Notes",
];

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, ValueEnum)]
pub enum Importance {
    #[default]
    #[serde(rename = "important")]
    Important,
    #[serde(rename = "not important")]
    NotImportant,
    #[serde(rename = "should not care")]
    ShouldNotCare,
}

pub const HABIT_COUNT: usize = 5;

/// The daily habits tracked by the "Did Today" checkboxes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Habit {
    Coding,
    GateClasses,
    SpeakingSkills,
    Workout,
    Meditation,
}

impl Habit {
    pub const ALL: [Habit; HABIT_COUNT] = [
        Habit::Coding,
        Habit::GateClasses,
        Habit::SpeakingSkills,
        Habit::Workout,
        Habit::Meditation,
    ];

    pub fn column(self) -> &'static str {
        match self {
            Habit::Coding => "Did_Coding",
            Habit::GateClasses => "Gate_Classes",
            Habit::SpeakingSkills => "Speaking_Skills",
            Habit::Workout => "Workout",
            Habit::Meditation => "Meditation",
        }
    }

    pub fn title(self) -> &'static str {
        self.column().trim_start_matches("Did_")
    }
}

/// Everything the user can fill in for one day.
#[derive(Args, Debug, Clone, PartialEq)]
pub struct EntryForm {
    /// Happiness score
    #[arg(long, default_value_t = 1, value_parser = value_parser!(u8).range(1..=5))]
    pub happiness: u8,

    /// Productivity score
    #[arg(long, default_value_t = 1, value_parser = value_parser!(u8).range(1..=5))]
    pub productivity: u8,

    /// Reason for the unhappy moment
    #[arg(long, default_value = "")]
    pub unhappy_reason: String,

    /// Importance of the unhappy reason
    #[arg(long, value_enum, default_value_t = Importance::Important)]
    pub importance: Importance,

    /// First thing you were happy about
    #[arg(long, default_value = "")]
    pub happy1: String,

    /// Second thing you were happy about
    #[arg(long, default_value = "")]
    pub happy2: String,

    /// Must have task
    #[arg(long, default_value = "")]
    pub must: String,

    /// Should have task
    #[arg(long, default_value = "")]
    pub should: String,

    /// Could have task
    #[arg(long, default_value = "")]
    pub could: String,

    /// Won't have task
    #[arg(long, default_value = "")]
    pub wont: String,

    /// Notes from today
    #[arg(long, default_value = "")]
    pub notes: String,

    /// Hours of nap
    #[arg(long, default_value = "")]
    pub nap_hours: String,

    /// Number of meals
    #[arg(long, default_value = "")]
    pub meals: String,

    /// Money spent
    #[arg(long, default_value = "")]
    pub money: String,

    /// Time wasters today
    #[arg(long, default_value = "")]
    pub time_wasters: String,

    /// First task for tomorrow
    #[arg(long, default_value = "")]
    pub task1: String,

    /// Second task for tomorrow
    #[arg(long, default_value = "")]
    pub task2: String,

    /// Third task for tomorrow
    #[arg(long, default_value = "")]
    pub task3: String,

    /// Mistakes to avoid tomorrow
    #[arg(long, default_value = "")]
    pub mistakes: String,

    /// First thing to change about yourself
    #[arg(long, default_value = "")]
    pub change1: String,

    /// Second thing to change about yourself
    #[arg(long, default_value = "")]
    pub change2: String,

    /// Third thing to change about yourself
    #[arg(long, default_value = "")]
    pub change3: String,

    /// Did some coding
    #[arg(long)]
    pub coding: bool,

    /// Attended gate classes
    #[arg(long)]
    pub gate_classes: bool,

    /// Practiced speaking skills
    #[arg(long)]
    pub speaking: bool,

    /// Went for a walk or a workout
    #[arg(long)]
    pub workout: bool,

    /// Meditated
    #[arg(long)]
    pub meditation: bool,
}

impl Default for EntryForm {
    fn default() -> Self {
        Self {
            happiness: 1,
            productivity: 1,
            unhappy_reason: String::new(),
            importance: Importance::default(),
            happy1: String::new(),
            happy2: String::new(),
            must: String::new(),
            should: String::new(),
            could: String::new(),
            wont: String::new(),
            notes: String::new(),
            nap_hours: String::new(),
            meals: String::new(),
            money: String::new(),
            time_wasters: String::new(),
            task1: String::new(),
            task2: String::new(),
            task3: String::new(),
            mistakes: String::new(),
            change1: String::new(),
            change2: String::new(),
            change3: String::new(),
            coding: false,
            gate_classes: false,
            speaking: false,
            workout: false,
            meditation: false,
        }
    }
}

/// One row of the diary table. Field order is the column order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DiaryEntry {
    #[serde(rename = "Date", serialize_with = "serialize_date")]
    pub date: Date,
    #[serde(rename = "Task1_Tomorrow")]
    pub task1_tomorrow: String,
    #[serde(rename = "Task2_Tomorrow")]
    pub task2_tomorrow: String,
    #[serde(rename = "Task3_Tomorrow")]
    pub task3_tomorrow: String,
    #[serde(rename = "Happiness_Score")]
    pub happiness: u8,
    #[serde(rename = "Productivity_Score")]
    pub productivity: u8,
    #[serde(rename = "Must_Have")]
    pub must_have: String,
    #[serde(rename = "Should_Have")]
    pub should_have: String,
    #[serde(rename = "Could_Have")]
    pub could_have: String,
    #[serde(rename = "Wont_Have")]
    pub wont_have: String,
    #[serde(rename = "Unhappy_Reason")]
    pub unhappy_reason: String,
    #[serde(rename = "Unhappy_Importance")]
    pub unhappy_importance: Importance,
    #[serde(rename = "Happy_Thing1")]
    pub happy_thing1: String,
    #[serde(rename = "Happy_Thing2")]
    pub happy_thing2: String,
    #[serde(rename = "Change1")]
    pub change1: String,
    #[serde(rename = "Change2")]
    pub change2: String,
    #[serde(rename = "Change3")]
    pub change3: String,
    #[serde(rename = "Time_Wasters")]
    pub time_wasters: String,
    #[serde(rename = "Mistakes")]
    pub mistakes: String,
    #[serde(rename = "Meals")]
    pub meals: String,
    #[serde(rename = "Money_Spent")]
    pub money_spent: String,
    #[serde(rename = "Nap_Hours")]
    pub nap_hours: String,
    #[serde(rename = "Did_Coding", serialize_with = "serialize_flag")]
    pub did_coding: bool,
    #[serde(rename = "Gate_Classes", serialize_with = "serialize_flag")]
    pub gate_classes: bool,
    #[serde(rename = "Speaking_Skills", serialize_with = "serialize_flag")]
    pub speaking_skills: bool,
    #[serde(rename = "Workout", serialize_with = "serialize_flag")]
    pub workout: bool,
    #[serde(rename = "Meditation", serialize_with = "serialize_flag")]
    pub meditation: bool,
    #[serde(rename = "Notes")]
    pub notes: String,
}

impl DiaryEntry {
    /// Snapshot of the form as recorded on `date`. Multi-line fields are trimmed,
    /// single-line ones are kept as typed.
    pub fn from_form(date: Date, form: &EntryForm) -> Self {
        Self {
            date,
            task1_tomorrow: form.task1.clone(),
            task2_tomorrow: form.task2.clone(),
            task3_tomorrow: form.task3.clone(),
            happiness: form.happiness,
            productivity: form.productivity,
            must_have: form.must.clone(),
            should_have: form.should.clone(),
            could_have: form.could.clone(),
            wont_have: form.wont.clone(),
            unhappy_reason: form.unhappy_reason.trim().to_owned(),
            unhappy_importance: form.importance,
            happy_thing1: form.happy1.trim().to_owned(),
            happy_thing2: form.happy2.trim().to_owned(),
            change1: form.change1.clone(),
            change2: form.change2.clone(),
            change3: form.change3.clone(),
            time_wasters: form.time_wasters.clone(),
            mistakes: form.mistakes.clone(),
            meals: form.meals.clone(),
            money_spent: form.money.clone(),
            nap_hours: form.nap_hours.clone(),
            did_coding: form.coding,
            gate_classes: form.gate_classes,
            speaking_skills: form.speaking,
            workout: form.workout,
            meditation: form.meditation,
            notes: form.notes.trim().to_owned(),
        }
    }
}

fn serialize_date<S: Serializer>(date: &Date, serializer: S) -> Result<S::Ok, S::Error> {
    let formatted = date.format(DATE_FORMAT).map_err(serde::ser::Error::custom)?;

    serializer.serialize_str(&formatted)
}

// Existing tables spell flags with a capital letter.
fn serialize_flag<S: Serializer>(flag: &bool, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(if *flag { "True" } else { "False" })
}
