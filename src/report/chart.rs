//! Plotly-compatible chart specification.
//!
//! The serialized form is a `{data, layout}` figure that plotly.js (or
//! plotly.py's `from_json`) renders directly. Every trace carries an extra
//! `role` field so non-Plotly consumers can tell the series apart.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::domain::{CategoryFilter, ForecastPoint, TimeSeries};

pub const FORECAST_START_LABEL: &str = "Forecast starts";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TraceRole {
    Actual,
    Forecast,
    UpperBound,
    LowerBound,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Line {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dash: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trace {
    #[serde(rename = "type")]
    pub kind: String,
    pub mode: String,
    pub name: String,
    pub role: TraceRole,
    pub x: Vec<NaiveDate>,
    pub y: Vec<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line: Option<Line>,
}

impl Trace {
    fn scatter(name: &str, role: TraceRole, mode: &str, x: Vec<NaiveDate>, y: Vec<f64>) -> Self {
        Self {
            kind: "scatter".to_string(),
            mode: mode.to_string(),
            name: name.to_string(),
            role,
            x,
            y,
            line: None,
        }
    }

    fn dotted(mut self) -> Self {
        self.line = Some(Line {
            dash: Some("dot".to_string()),
            color: None,
        });
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Title {
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Axis {
    pub title: Title,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Shape {
    #[serde(rename = "type")]
    pub kind: String,
    pub xref: String,
    pub yref: String,
    pub x0: NaiveDate,
    pub x1: NaiveDate,
    pub y0: f64,
    pub y1: f64,
    pub line: Line,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Annotation {
    pub x: NaiveDate,
    pub xref: String,
    pub y: f64,
    pub yref: String,
    pub text: String,
    pub showarrow: bool,
    pub xanchor: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Layout {
    pub title: Title,
    pub xaxis: Axis,
    pub yaxis: Axis,
    pub template: String,
    pub shapes: Vec<Shape>,
    pub annotations: Vec<Annotation>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartSpec {
    pub data: Vec<Trace>,
    pub layout: Layout,
}

impl ChartSpec {
    pub fn trace(&self, role: TraceRole) -> Option<&Trace> {
        self.data.iter().find(|t| t.role == role)
    }

    /// Date of the forecast-start marker, if any.
    pub fn forecast_start(&self) -> Option<NaiveDate> {
        self.layout.shapes.first().map(|s| s.x0)
    }
}

pub fn chart_title(filter: &CategoryFilter) -> String {
    format!(
        "Forecast for {} - {} | {} | {}",
        filter.kpi, filter.zone, filter.technology, filter.country
    )
}

/// Build the figure: observed series, forecast line, dotted bounds, and a
/// dashed marker at the last observed month.
pub fn build_chart(series: &TimeSeries, forecast: &[ForecastPoint], filter: &CategoryFilter) -> ChartSpec {
    let future_dates: Vec<NaiveDate> = forecast.iter().map(|p| p.date).collect();

    let data = vec![
        Trace::scatter("Actual", TraceRole::Actual, "lines+markers", series.dates(), series.values()),
        Trace::scatter(
            "Forecast",
            TraceRole::Forecast,
            "lines",
            future_dates.clone(),
            forecast.iter().map(|p| p.estimate).collect(),
        ),
        Trace::scatter(
            "Upper Bound",
            TraceRole::UpperBound,
            "lines",
            future_dates.clone(),
            forecast.iter().map(|p| p.upper).collect(),
        )
        .dotted(),
        Trace::scatter(
            "Lower Bound",
            TraceRole::LowerBound,
            "lines",
            future_dates,
            forecast.iter().map(|p| p.lower).collect(),
        )
        .dotted(),
    ];

    let (shapes, annotations) = match series.last_date() {
        Some(start) => (
            vec![Shape {
                kind: "line".to_string(),
                xref: "x".to_string(),
                yref: "paper".to_string(),
                x0: start,
                x1: start,
                y0: 0.0,
                y1: 1.0,
                line: Line {
                    dash: Some("dash".to_string()),
                    color: Some("gray".to_string()),
                },
            }],
            vec![Annotation {
                x: start,
                xref: "x".to_string(),
                y: 1.0,
                yref: "paper".to_string(),
                text: FORECAST_START_LABEL.to_string(),
                showarrow: false,
                xanchor: "left".to_string(),
            }],
        ),
        None => (Vec::new(), Vec::new()),
    };

    ChartSpec {
        data,
        layout: Layout {
            title: Title {
                text: chart_title(filter),
            },
            xaxis: Axis {
                title: Title {
                    text: "Date".to_string(),
                },
            },
            yaxis: Axis {
                title: Title {
                    text: filter.kpi.clone(),
                },
            },
            template: "plotly_white".to_string(),
            shapes,
            annotations,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Observation;

    fn ymd(y: i32, m: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, 1).unwrap()
    }

    fn filter() -> CategoryFilter {
        CategoryFilter {
            country: "Ghana".to_string(),
            technology: "3G".to_string(),
            zone: "Accra".to_string(),
            kpi: "Call Completion Rate".to_string(),
        }
    }

    #[test]
    fn chart_has_four_traces_and_start_marker() {
        let series = TimeSeries::new(vec![
            Observation { date: ymd(2023, 1), value: 98.0 },
            Observation { date: ymd(2023, 2), value: 97.0 },
        ])
        .unwrap();
        let forecast = vec![ForecastPoint {
            date: ymd(2023, 3),
            estimate: 96.0,
            lower: 95.0,
            upper: 97.0,
        }];

        let chart = build_chart(&series, &forecast, &filter());

        let names: Vec<&str> = chart.data.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["Actual", "Forecast", "Upper Bound", "Lower Bound"]);
        assert_eq!(chart.trace(TraceRole::Actual).unwrap().x.len(), 2);
        assert_eq!(chart.trace(TraceRole::LowerBound).unwrap().y, vec![95.0]);
        assert_eq!(chart.forecast_start(), Some(ymd(2023, 2)));
        assert_eq!(chart.layout.annotations[0].text, "Forecast starts");
        assert_eq!(
            chart.layout.title.text,
            "Forecast for Call Completion Rate - Accra | 3G | Ghana"
        );
    }

    #[test]
    fn serializes_as_plotly_figure() {
        let series = TimeSeries::new(vec![Observation { date: ymd(2023, 1), value: 1.0 }]).unwrap();
        let chart = build_chart(&series, &[], &filter());
        let json = serde_json::to_value(&chart).unwrap();

        assert_eq!(json["data"][0]["type"], "scatter");
        assert_eq!(json["data"][0]["x"][0], "2023-01-01");
        assert_eq!(json["data"][2]["role"], "upper_bound");
        assert_eq!(json["data"][3]["line"]["dash"], "dot");
        assert_eq!(json["layout"]["template"], "plotly_white");
        assert_eq!(json["layout"]["shapes"][0]["line"]["color"], "gray");
        assert!(json["data"][0].get("line").is_none());
    }
}
