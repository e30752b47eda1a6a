//! ASCII plotting for terminal output.
//!
//! This is intentionally "dumb" (fixed-size grid), optimized for:
//! - quick visual sanity checks in a terminal
//! - deterministic output (helpful for golden tests)
//!
//! Plot elements, highest precedence first:
//! - observed months: `o`
//! - forecast line (joined to the last observation): `*`
//! - interval bounds: `.`
//! - forecast-start column: `|`

use chrono::NaiveDate;

use crate::domain::{ForecastPoint, TimeSeries};
use crate::forecast::engine::months_between;

/// Render the observed series and its forecast on one grid.
pub fn render_forecast_plot(series: &TimeSeries, forecast: &[ForecastPoint], width: usize, height: usize) -> String {
    let width = width.max(10);
    let height = height.max(5);

    let first = series.first_date().or_else(|| forecast.first().map(|p| p.date));
    let last = forecast.last().map(|p| p.date).or_else(|| series.last_date());
    let (Some(first), Some(last)) = (first, last) else {
        return "Plot: (no data)\n".to_string();
    };

    let t_of = |d: NaiveDate| months_between(first, d) as f64;
    let t_min = 0.0;
    let t_max = t_of(last).max(1.0);

    let observed: Vec<(f64, f64)> = series.observations().iter().map(|o| (t_of(o.date), o.value)).collect();
    let estimate: Vec<(f64, f64)> = forecast.iter().map(|p| (t_of(p.date), p.estimate)).collect();
    let upper: Vec<(f64, f64)> = forecast.iter().map(|p| (t_of(p.date), p.upper)).collect();
    let lower: Vec<(f64, f64)> = forecast.iter().map(|p| (t_of(p.date), p.lower)).collect();

    let (y_min, y_max) = y_range([
        observed.as_slice(),
        estimate.as_slice(),
        upper.as_slice(),
        lower.as_slice(),
    ]);
    let (y_min, y_max) = pad_range(y_min, y_max, 0.05);

    let mut grid = vec![vec![' '; width]; height];

    // Lines only fill blank cells, so draw in precedence order.
    let mut forecast_line = Vec::with_capacity(estimate.len() + 1);
    if !estimate.is_empty() {
        forecast_line.extend(observed.last().copied());
    }
    forecast_line.extend(estimate.iter().copied());
    draw_curve(&mut grid, &forecast_line, t_min, t_max, y_min, y_max, '*');
    draw_curve(&mut grid, &upper, t_min, t_max, y_min, y_max, '.');
    draw_curve(&mut grid, &lower, t_min, t_max, y_min, y_max, '.');

    if let (Some(start), false) = (series.last_date(), forecast.is_empty()) {
        let x = map_x(t_of(start), t_min, t_max, width);
        for row in grid.iter_mut() {
            if row[x] == ' ' {
                row[x] = '|';
            }
        }
    }

    for &(t, v) in &observed {
        let x = map_x(t, t_min, t_max, width);
        let y = map_y(v, y_min, y_max, height);
        grid[y][x] = 'o';
    }

    let mut out = String::new();
    out.push_str(&format!(
        "Plot: date=[{}, {}] | y=[{y_min:.2}, {y_max:.2}]\n",
        first.format("%Y-%m-%d"),
        last.format("%Y-%m-%d"),
    ));

    for row in grid {
        out.push_str(&row.into_iter().collect::<String>());
        out.push('\n');
    }

    out
}

fn y_range<const N: usize>(sets: [&[(f64, f64)]; N]) -> (f64, f64) {
    let mut min_y = f64::INFINITY;
    let mut max_y = f64::NEG_INFINITY;

    for set in sets {
        for &(_, y) in set {
            min_y = min_y.min(y);
            max_y = max_y.max(y);
        }
    }

    if !(min_y.is_finite() && max_y.is_finite()) {
        (0.0, 1.0)
    } else if max_y > min_y {
        (min_y, max_y)
    } else {
        (min_y - 1.0, max_y + 1.0)
    }
}

fn pad_range(min: f64, max: f64, frac: f64) -> (f64, f64) {
    let span = (max - min).abs();
    let pad = (span * frac).max(1e-12);
    (min - pad, max + pad)
}

fn map_x(t: f64, t_min: f64, t_max: f64, width: usize) -> usize {
    let width = width.max(2);
    let u = ((t - t_min) / (t_max - t_min)).clamp(0.0, 1.0);
    (u * (width as f64 - 1.0)).round() as usize
}

fn map_y(y: f64, y_min: f64, y_max: f64, height: usize) -> usize {
    let height = height.max(2);
    let u = ((y - y_min) / (y_max - y_min)).clamp(0.0, 1.0);
    // y=top is max -> row 0
    (height as f64 - 1.0 - (u * (height as f64 - 1.0))).round() as usize
}

fn draw_curve(
    grid: &mut [Vec<char>],
    curve: &[(f64, f64)],
    t_min: f64,
    t_max: f64,
    y_min: f64,
    y_max: f64,
    ch: char,
) {
    let height = grid.len();
    let width = grid[0].len();

    let mut prev = None;
    for &(t, y) in curve {
        let x = map_x(t, t_min, t_max, width);
        let yy = map_y(y, y_min, y_max, height);
        match prev {
            Some((x0, y0)) => draw_line(grid, x0, y0, x, yy, ch),
            None if grid[yy][x] == ' ' => grid[yy][x] = ch,
            None => {}
        }
        prev = Some((x, yy));
    }
}

/// Integer line drawing (Bresenham-ish).
fn draw_line(grid: &mut [Vec<char>], x0: usize, y0: usize, x1: usize, y1: usize, ch: char) {
    let mut x0 = x0 as isize;
    let mut y0 = y0 as isize;
    let x1 = x1 as isize;
    let y1 = y1 as isize;

    let dx = (x1 - x0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let dy = -(y1 - y0).abs();
    let sy = if y0 < y1 { 1 } else { -1 };
    let mut err = dx + dy;

    loop {
        if y0 >= 0
            && (y0 as usize) < grid.len()
            && x0 >= 0
            && (x0 as usize) < grid[0].len()
            && grid[y0 as usize][x0 as usize] == ' '
        {
            grid[y0 as usize][x0 as usize] = ch;
        }

        if x0 == x1 && y0 == y1 {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x0 += sx;
        }
        if e2 <= dx {
            err += dx;
            y0 += sy;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Observation;

    fn ymd(y: i32, m: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, 1).unwrap()
    }

    #[test]
    fn plot_golden_snapshot_small() {
        let series = TimeSeries::new(vec![
            Observation { date: ymd(2023, 1), value: 10.0 },
            Observation { date: ymd(2023, 2), value: 20.0 },
        ])
        .unwrap();
        let forecast = vec![ForecastPoint {
            date: ymd(2023, 3),
            estimate: 30.0,
            lower: 25.0,
            upper: 35.0,
        }];

        let txt = render_forecast_plot(&series, &forecast, 10, 5);
        let expected = concat!(
            "Plot: date=[2023-01-01, 2023-03-01] | y=[8.75, 36.25]\n",
            "     |   .\n",
            "     | ***\n",
            "     o*  .\n",
            "     |    \n",
            "o    |    \n",
        );
        assert_eq!(txt, expected);
    }

    #[test]
    fn flat_history_without_forecast_still_renders() {
        let series = TimeSeries::new(vec![Observation { date: ymd(2023, 1), value: 5.0 }]).unwrap();
        let txt = render_forecast_plot(&series, &[], 12, 6);

        assert!(txt.starts_with("Plot: date=[2023-01-01, 2023-01-01]"));
        assert_eq!(txt.lines().count(), 7);
        let grid: String = txt.lines().skip(1).collect();
        assert_eq!(grid.matches('o').count(), 1);
        assert!(!grid.contains('|'));
    }
}
