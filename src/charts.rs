use crate::{
    backdrop::Backdrop,
    entries::DATE_FORMAT,
    error::PlotError,
    history::History,
};
use plotters::{
    coord::{combinators::WithKeyPoints, types::RangedCoordi32},
    element::Pie,
    prelude::*,
    style::{
        FontTransform,
        text_anchor::{HPos, Pos, VPos},
    },
};
use std::{
    collections::{BTreeSet, HashMap},
    fs,
    ops::Range,
    path::{Path, PathBuf},
};
use time::Date;
use tracing::info;

const HAPPINESS: RGBColor = RGBColor(0xFF, 0x6F, 0x61);
const PRODUCTIVITY: RGBColor = RGBColor(0x6B, 0x5B, 0x95);
const HEALTHY: RGBColor = RGBColor(0x88, 0xD8, 0xB0);
const NOT_DONE: RGBColor = RGBColor(0xFF, 0xCC, 0x5C);
const INK: RGBColor = RGBColor(0x33, 0x33, 0x33);
const EDGE: RGBColor = RGBColor(0x2F, 0x4F, 0x4F);

const TREND_SIZE: (u32, u32) = (600, 400);
const NAP_SIZE: (u32, u32) = (600, 300);
const HABIT_SIZE: (u32, u32) = (800, 600);

/// Hours of sleep highlighted as the healthy zone.
pub const HEALTHY_ZONE: Range<f64> = 5.0..8.5;

/// Pie placement as (left, bottom) fractions of the figure, two per row and
/// the last one centred underneath.
const PIE_SLOTS: [(f64, f64); 5] = [
    (0.05, 0.70),
    (0.45, 0.70),
    (0.05, 0.35),
    (0.45, 0.35),
    (0.25, 0.05),
];
const PIE_WIDTH: f64 = 0.3;
const PIE_HEIGHT: f64 = 0.25;

/// Most dates labelled on one axis. Longer histories label every n-th entry date.
const MAX_DATE_TICKS: usize = 40;

/// Render the three chart surfaces into `dir` and return their paths.
pub fn render_all(
    history: &History,
    backdrop: &Backdrop,
    dir: &Path,
) -> Result<Vec<PathBuf>, PlotError> {
    fs::create_dir_all(dir)?;

    let charts = [
        ("trend.svg", trend_chart(history, backdrop)?),
        ("naps.svg", nap_chart(history, backdrop)?),
        ("habits.svg", habit_grid(history, backdrop)?),
    ];

    let mut paths = Vec::with_capacity(charts.len());
    for (name, svg) in charts {
        let path = dir.join(name);
        fs::write(&path, svg)?;
        paths.push(path);
    }

    info!(dir = %dir.display(), days = history.days().len(), "rendered charts");

    Ok(paths)
}

/// Dates on the x axis are julian day numbers. Ticks sit on days that have an
/// entry, and only those get a label.
struct DateAxis {
    range: Range<i32>,
    ticks: Vec<i32>,
    labels: HashMap<i32, String>,
}

impl DateAxis {
    fn new(history: &History) -> Result<Self, PlotError> {
        let (first, last) = history
            .span()
            .ok_or_else(|| PlotError::Render("nothing to plot".into()))?;

        let dates: BTreeSet<i32> = history
            .days()
            .iter()
            .map(|day| day.date.to_julian_day())
            .collect();
        let step = dates.len().div_ceil(MAX_DATE_TICKS).max(1);
        let ticks: Vec<i32> = dates.into_iter().step_by(step).collect();

        let mut labels = HashMap::new();
        for day in history.days() {
            let julian = day.date.to_julian_day();
            if ticks.binary_search(&julian).is_ok() {
                labels.insert(julian, format_date(day.date)?);
            }
        }

        Ok(Self {
            range: first.to_julian_day() - 1..last.to_julian_day() + 1,
            ticks,
            labels,
        })
    }

    fn coord(&self) -> WithKeyPoints<RangedCoordi32> {
        self.range.clone().with_key_points(self.ticks.clone())
    }

    fn label(&self, day: &i32) -> String {
        self.labels.get(day).cloned().unwrap_or_default()
    }
}

fn format_date(date: Date) -> Result<String, PlotError> {
    date.format(DATE_FORMAT)
        .map_err(|err| PlotError::Render(err.to_string()))
}

fn trend_chart(history: &History, backdrop: &Backdrop) -> Result<String, PlotError> {
    let axis = DateAxis::new(history)?;
    let label = |day: &i32| axis.label(day);

    let happiness: Vec<(i32, f64)> = history
        .days()
        .iter()
        .filter_map(|day| Some((day.date.to_julian_day(), day.happiness?)))
        .collect();
    let productivity: Vec<(i32, f64)> = history
        .days()
        .iter()
        .filter_map(|day| Some((day.date.to_julian_day(), day.productivity?)))
        .collect();

    let mut svg = String::new();
    {
        let root = SVGBackend::with_string(&mut svg, TREND_SIZE).into_drawing_area();
        backdrop.paint(&root)?;

        let mut chart = ChartBuilder::on(&root)
            .caption(
                "Happiness & Productivity",
                ("sans-serif", 20).into_font().color(&INK),
            )
            .margin(10)
            .x_label_area_size(80)
            .y_label_area_size(40)
            .build_cartesian_2d(axis.coord(), history.score_range())?;

        chart
            .configure_mesh()
            .disable_x_mesh()
            .x_label_formatter(&label)
            .x_label_style(("sans-serif", 10).into_font().transform(FontTransform::Rotate90))
            .x_desc("Date")
            .y_desc("Score (1-5)")
            .axis_style(INK.stroke_width(1))
            .draw()?;

        chart
            .draw_series(LineSeries::new(
                happiness.iter().copied(),
                HAPPINESS.stroke_width(2),
            ))?
            .label("Happiness")
            .legend(|(x, y)| {
                PathElement::new(vec![(x, y), (x + 20, y)], HAPPINESS.stroke_width(2))
            });
        chart.draw_series(
            happiness
                .iter()
                .map(|&point| Circle::new(point, 4, HAPPINESS.filled())),
        )?;

        chart
            .draw_series(LineSeries::new(
                productivity.iter().copied(),
                PRODUCTIVITY.stroke_width(2),
            ))?
            .label("Productivity")
            .legend(|(x, y)| {
                PathElement::new(vec![(x, y), (x + 20, y)], PRODUCTIVITY.stroke_width(2))
            });
        chart.draw_series(
            productivity
                .iter()
                .map(|&point| Circle::new(point, 4, PRODUCTIVITY.filled())),
        )?;

        chart
            .configure_series_labels()
            .position(SeriesLabelPosition::UpperLeft)
            .background_style(&WHITE.mix(0.8))
            .border_style(&EDGE)
            .draw()?;

        root.present()?;
    }

    Ok(backdrop.embed(&svg, TREND_SIZE))
}

fn nap_chart(history: &History, backdrop: &Backdrop) -> Result<String, PlotError> {
    let axis = DateAxis::new(history)?;
    let label = |day: &i32| axis.label(day);
    let y_range = history.nap_range();

    let naps: Vec<(i32, f64)> = history
        .days()
        .iter()
        .filter_map(|day| Some((day.date.to_julian_day(), day.nap_hours?)))
        .collect();

    let mut svg = String::new();
    {
        let root = SVGBackend::with_string(&mut svg, NAP_SIZE).into_drawing_area();
        backdrop.paint(&root)?;

        let mut chart = ChartBuilder::on(&root)
            .caption("Nap Hours", ("sans-serif", 20).into_font().color(&INK))
            .margin(10)
            .x_label_area_size(80)
            .y_label_area_size(40)
            .build_cartesian_2d(axis.coord(), y_range.clone())?;

        chart.plotting_area().fill(&HAPPINESS.mix(0.3))?;

        chart
            .configure_mesh()
            .disable_x_mesh()
            .x_label_formatter(&label)
            .x_label_style(("sans-serif", 10).into_font().transform(FontTransform::Rotate90))
            .x_desc("Date")
            .y_desc("Hours")
            .axis_style(INK.stroke_width(2))
            .draw()?;

        // The band is clipped to the visible range.
        let low = HEALTHY_ZONE.start.clamp(y_range.start, y_range.end);
        let high = HEALTHY_ZONE.end.clamp(y_range.start, y_range.end);
        if high > low {
            chart
                .draw_series(std::iter::once(Rectangle::new(
                    [(axis.range.start, low), (axis.range.end, high)],
                    HEALTHY.mix(0.3).filled(),
                )))?
                .label("Healthy Zone (5-8.5h)")
                .legend(|(x, y)| {
                    Rectangle::new([(x, y - 5), (x + 20, y + 5)], HEALTHY.mix(0.3).filled())
                });
        }

        chart
            .draw_series(naps.iter().map(|&point| Circle::new(point, 5, BLACK.filled())))?
            .label("Nap Hours")
            .legend(|(x, y)| Circle::new((x + 10, y), 5, BLACK.filled()));

        chart
            .configure_series_labels()
            .position(SeriesLabelPosition::UpperLeft)
            .background_style(&WHITE.mix(0.8))
            .border_style(&EDGE)
            .draw()?;

        root.present()?;
    }

    Ok(backdrop.embed(&svg, NAP_SIZE))
}

fn habit_grid(history: &History, backdrop: &Backdrop) -> Result<String, PlotError> {
    let (width, height) = (HABIT_SIZE.0 as f64, HABIT_SIZE.1 as f64);
    let radius = (PIE_WIDTH * width).min(PIE_HEIGHT * height) * 0.4;
    let colors = [HEALTHY, NOT_DONE];
    let labels = ["Done", "Not Done"];
    let title_style = ("sans-serif", 16)
        .into_font()
        .color(&INK)
        .pos(Pos::new(HPos::Center, VPos::Center));

    let mut svg = String::new();
    {
        let root = SVGBackend::with_string(&mut svg, HABIT_SIZE).into_drawing_area();
        backdrop.paint(&root)?;

        for (tally, (left, bottom)) in history.habit_tallies().into_iter().zip(PIE_SLOTS) {
            let center = (
                ((left + PIE_WIDTH / 2.0) * width) as i32,
                ((1.0 - bottom - PIE_HEIGHT / 2.0) * height) as i32,
            );
            let sizes = [tally.done as f64, tally.not_done as f64];

            root.draw(&Text::new(
                tally.habit.title(),
                (center.0, center.1 - radius as i32 - 28),
                title_style.clone(),
            ))?;

            let mut pie = Pie::new(&center, &radius, &sizes, &colors, &labels);
            pie.start_angle(-90.0);
            pie.label_style(("sans-serif", 12).into_font().color(&INK));
            pie.percentages(("sans-serif", 11).into_font().color(&BLACK));
            root.draw(&pie)?;
        }

        root.present()?;
    }

    Ok(backdrop.embed(&svg, HABIT_SIZE))
}
