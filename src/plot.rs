use plotters::coord::Shift;
use plotters::prelude::*;
use std::ops::Range;
use std::path::PathBuf;
use thiserror::Error;

/// The drawing capability consumed by the experiment runner: a figure made
/// of subplots that accumulate line, scatter, and annotation state, then
/// render once on [`PlotSurface::show`].
pub trait PlotSurface {
    fn subplot(&mut self, rows: usize, cols: usize, index: usize);
    fn clear_ticks(&mut self);
    fn plot(&mut self, xs: &[f64], ys: &[f64], label: &str);
    fn scatter(&mut self, xs: &[f64], ys: &[f64], edgecolor: &str, size: f64, label: &str);
    fn xlabel(&mut self, label: &str);
    fn ylabel(&mut self, label: &str);
    fn legend(&mut self);
    fn title(&mut self, title: &str);
    fn show(&mut self) -> Result<(), PlotError>;
}

#[derive(Debug, Error)]
pub enum PlotError {
    #[error("failed to render figure: {0}")]
    Render(String),
}

/// A [`PlotSurface`] backed by plotters' bitmap backend. Traces are
/// buffered per panel and rendered to a PNG file when `show` is called.
#[derive(Debug)]
pub struct BitmapSurface {
    path: PathBuf,
    size: (u32, u32),
    grid: (usize, usize),
    panels: Vec<Panel>,
    current: usize,
}

#[derive(Debug, Default)]
struct Panel {
    title: String,
    xlabel: String,
    ylabel: String,
    legend: bool,
    hide_ticks: bool,
    lines: Vec<Series>,
    points: Vec<Scatter>,
}

#[derive(Debug)]
struct Series {
    xs: Vec<f64>,
    ys: Vec<f64>,
    label: String,
}

#[derive(Debug)]
struct Scatter {
    xs: Vec<f64>,
    ys: Vec<f64>,
    color: RGBColor,
    size: f64,
    label: String,
}

impl BitmapSurface {
    pub fn new<P: Into<PathBuf>>(path: P, size: (u32, u32)) -> Self {
        Self {
            path: path.into(),
            size,
            grid: (1, 1),
            panels: Vec::new(),
            current: 0,
        }
    }

    fn panel_mut(&mut self) -> &mut Panel {
        if self.panels.is_empty() {
            self.panels.push(Panel::default());
            self.current = 0;
        }
        &mut self.panels[self.current]
    }
}

impl PlotSurface for BitmapSurface {
    fn subplot(&mut self, rows: usize, cols: usize, index: usize) {
        self.grid = (rows.max(1), cols.max(1));
        let index = index.max(1);
        if self.panels.len() < index {
            self.panels.resize_with(index, Panel::default);
        }
        self.current = index - 1;
    }

    fn clear_ticks(&mut self) {
        self.panel_mut().hide_ticks = true;
    }

    fn plot(&mut self, xs: &[f64], ys: &[f64], label: &str) {
        self.panel_mut().lines.push(Series {
            xs: xs.to_vec(),
            ys: ys.to_vec(),
            label: label.to_owned(),
        });
    }

    fn scatter(&mut self, xs: &[f64], ys: &[f64], edgecolor: &str, size: f64, label: &str) {
        let color = named_color(edgecolor);
        self.panel_mut().points.push(Scatter {
            xs: xs.to_vec(),
            ys: ys.to_vec(),
            color,
            size,
            label: label.to_owned(),
        });
    }

    fn xlabel(&mut self, label: &str) {
        self.panel_mut().xlabel = label.to_owned();
    }

    fn ylabel(&mut self, label: &str) {
        self.panel_mut().ylabel = label.to_owned();
    }

    fn legend(&mut self) {
        self.panel_mut().legend = true;
    }

    fn title(&mut self, title: &str) {
        self.panel_mut().title = title.to_owned();
    }

    fn show(&mut self) -> Result<(), PlotError> {
        let root = BitMapBackend::new(&self.path, self.size).into_drawing_area();
        root.fill(&WHITE).map_err(render_err)?;

        let areas = root.split_evenly(self.grid);
        for (panel, area) in self.panels.iter().zip(areas.iter()) {
            draw_panel(panel, area)?;
        }
        root.present().map_err(render_err)
    }
}

fn draw_panel<DB: DrawingBackend>(panel: &Panel, area: &DrawingArea<DB, Shift>) -> Result<(), PlotError> {
    if panel.lines.is_empty() && panel.points.is_empty() {
        return Ok(());
    }

    let x_range = axis_range(
        panel
            .lines
            .iter()
            .flat_map(|s| s.xs.iter())
            .chain(panel.points.iter().flat_map(|s| s.xs.iter()))
            .copied(),
    );
    let y_range = axis_range(
        panel
            .lines
            .iter()
            .flat_map(|s| s.ys.iter())
            .chain(panel.points.iter().flat_map(|s| s.ys.iter()))
            .copied(),
    );

    let mut builder = ChartBuilder::on(area);
    builder.margin(10).x_label_area_size(30).y_label_area_size(40);
    if !panel.title.is_empty() {
        // Plotters captions are single-line.
        builder.caption(panel.title.replace('\n', "  "), ("sans-serif", 16));
    }
    let mut chart = builder
        .build_cartesian_2d(x_range, y_range)
        .map_err(render_err)?;

    {
        let mut mesh = chart.configure_mesh();
        mesh.disable_x_mesh().disable_y_mesh();
        if panel.hide_ticks {
            mesh.x_labels(0).y_labels(0);
        }
        if !panel.xlabel.is_empty() {
            mesh.x_desc(panel.xlabel.as_str());
        }
        if !panel.ylabel.is_empty() {
            mesh.y_desc(panel.ylabel.as_str());
        }
        mesh.draw().map_err(render_err)?;
    }

    for line in &panel.lines {
        let series = chart
            .draw_series(LineSeries::new(
                line.xs.iter().zip(line.ys.iter()).map(|(&x, &y)| (x, y)),
                &RED,
            ))
            .map_err(render_err)?;
        if panel.legend && !line.label.is_empty() {
            series.label(line.label.clone()).legend(|(x, y)| {
                PathElement::new(vec![(x, y), (x + 20, y)], RED)
            });
        }
    }

    for scatter in &panel.points {
        let style = ShapeStyle {
            color: scatter.color.to_rgba(),
            filled: false,
            stroke_width: 1,
        };
        let radius = scatter.size.sqrt().round().max(1.0) as i32;
        chart
            .draw_series(
                scatter
                    .xs
                    .iter()
                    .zip(scatter.ys.iter())
                    .map(|(&x, &y)| Circle::new((x, y), radius, style)),
            )
            .map_err(render_err)?;
    }

    if panel.legend && panel.lines.iter().any(|l| !l.label.is_empty()) {
        chart
            .configure_series_labels()
            .background_style(&WHITE.mix(0.8))
            .border_style(&BLACK)
            .draw()
            .map_err(render_err)?;
    }
    Ok(())
}

fn axis_range(values: impl Iterator<Item = f64>) -> Range<f64> {
    let (min, max) = values
        .filter(|v| v.is_finite())
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
            (lo.min(v), hi.max(v))
        });
    if min > max {
        return 0.0..1.0;
    }
    if min == max {
        return (min - 0.5)..(max + 0.5);
    }
    let margin = (max - min) * 0.05;
    (min - margin)..(max + margin)
}

fn named_color(name: &str) -> RGBColor {
    match name {
        "b" | "blue" => BLUE,
        "r" | "red" => RED,
        "g" | "green" => GREEN,
        _ => BLACK,
    }
}

fn render_err<E: std::fmt::Display>(e: E) -> PlotError {
    PlotError::Render(e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn axis_range_pads_and_handles_degenerate_input() {
        let r = axis_range([0.0, 10.0].into_iter());
        assert!(r.start < 0.0 && r.end > 10.0);

        let r = axis_range([2.0, 2.0].into_iter());
        assert_eq!(r, 1.5..2.5);

        let r = axis_range(std::iter::empty());
        assert_eq!(r, 0.0..1.0);
    }

    #[test]
    fn renders_a_png_without_text_elements() -> Result<(), anyhow::Error> {
        let path = std::env::temp_dir().join("overfit_plot_smoke.png");
        let mut surface = BitmapSurface::new(&path, (320, 240));

        surface.subplot(1, 2, 1);
        surface.clear_ticks();
        surface.plot(&[0.0, 1.0, 2.0], &[0.0, 1.0, 4.0], "");
        surface.subplot(1, 2, 2);
        surface.clear_ticks();
        surface.scatter(&[0.0, 1.0, 2.0], &[4.0, 1.0, 0.0], "b", 20.0, "");
        surface.show()?;

        let metadata = std::fs::metadata(&path)?;
        assert!(metadata.len() > 0);
        std::fs::remove_file(&path).ok();
        Ok(())
    }
}
