//! Render the monthly sales report from a JSON data file.
//!
//! Usage:
//!   render_report <data.json> [--output report.pdf] [--config layout.json]
//!                 [--chart chart.png] [--logo logo.png] [--month YYYY-MM]
//!                 [--http]
//!
//! With `--http` the HTTP response payload (base64 body) is printed to stdout
//! instead of writing a file. Set `RUST_LOG=debug` for layout tracing.

use chrono::{Datelike, Local, NaiveDate};
use report_oxide::output::HttpResponse;
use report_oxide::report::{PrerenderedChart, SalesData, SalesReport, REPORT_FILENAME};
use report_oxide::LayoutConfig;
use std::path::PathBuf;
use std::process;

struct RenderConfig {
    data: PathBuf,
    output: PathBuf,
    layout: Option<PathBuf>,
    chart: Option<PathBuf>,
    logo: Option<PathBuf>,
    month: Option<NaiveDate>,
    http: bool,
}

impl RenderConfig {
    fn from_args() -> Result<Self, String> {
        let args: Vec<String> = std::env::args().collect();
        let mut data = None;
        let mut output = PathBuf::from(REPORT_FILENAME);
        let mut layout = None;
        let mut chart = None;
        let mut logo = None;
        let mut month = None;
        let mut http = false;

        let mut i = 1;
        while i < args.len() {
            match args[i].as_str() {
                "--output" | "-o" => output = PathBuf::from(option_value(&args, &mut i)?),
                "--config" => layout = Some(PathBuf::from(option_value(&args, &mut i)?)),
                "--chart" => chart = Some(PathBuf::from(option_value(&args, &mut i)?)),
                "--logo" => logo = Some(PathBuf::from(option_value(&args, &mut i)?)),
                "--month" => {
                    let text = option_value(&args, &mut i)?;
                    let parsed = NaiveDate::parse_from_str(&format!("{}-01", text), "%Y-%m-%d")
                        .map_err(|e| format!("bad --month '{}': {}", text, e))?;
                    month = Some(parsed);
                },
                "--http" => http = true,
                other if other.starts_with('-') => return Err(format!("unknown option {}", other)),
                other => data = Some(PathBuf::from(other)),
            }
            i += 1;
        }

        Ok(Self {
            data: data.ok_or("missing data file")?,
            output,
            layout,
            chart,
            logo,
            month,
            http,
        })
    }
}

fn option_value(args: &[String], i: &mut usize) -> Result<String, String> {
    let flag = &args[*i];
    *i += 1;
    args.get(*i).cloned().ok_or_else(|| format!("{} needs a value", flag))
}

fn run(config: &RenderConfig) -> report_oxide::Result<report_oxide::PdfOutput> {
    let mut layout = match &config.layout {
        Some(path) => LayoutConfig::from_json(&std::fs::read_to_string(path)?)?,
        None => LayoutConfig::default(),
    };
    if let Some(logo) = &config.logo {
        layout = layout.with_logo(logo);
    }

    let data = SalesData::from_json(&std::fs::read_to_string(&config.data)?)?;
    let today = Local::now().date_naive();
    let period = config
        .month
        .or_else(|| today.with_day(1))
        .unwrap_or(today);

    let chart = config.chart.as_ref().map(PrerenderedChart::new);
    let mut report = SalesReport::new(layout, period).with_report_date(today);
    if let Some(chart) = &chart {
        report = report.with_chart(chart);
    }
    report.render(&data)
}

fn main() {
    env_logger::init();

    let config = match RenderConfig::from_args() {
        Ok(config) => config,
        Err(msg) => {
            eprintln!("Error: {}", msg);
            eprintln!("Usage: render_report <data.json> [--output FILE] [--config FILE] [--chart FILE] [--logo FILE] [--month YYYY-MM] [--http]");
            process::exit(2);
        },
    };

    match run(&config) {
        Ok(output) if config.http => {
            let response = HttpResponse::attachment(&output, REPORT_FILENAME);
            match response.to_json() {
                Ok(json) => println!("{}", json),
                Err(e) => {
                    eprintln!("Error: {}", e);
                    process::exit(1);
                },
            }
        },
        Ok(output) => {
            if let Err(e) = output.save(&config.output) {
                eprintln!("Error: {}", e);
                process::exit(1);
            }
            println!("Wrote {} pages to {}", output.page_count(), config.output.display());
        },
        Err(e) if config.http => {
            log::error!("Report failed: {}", e);
            let response = HttpResponse::error(&e);
            println!("{}", response.to_json().unwrap_or_else(|_| response.body.clone()));
            process::exit(1);
        },
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(1);
        },
    }
}
