//! SVG charts for the dashboard, rendered with `plotters` into strings that
//! are inlined into the page.

use plotters::element::Pie;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use plotters_svg::SVGBackend;
use std::f64::consts::PI;

use crate::models::job::RiskCategory;
use crate::services::dashboard::ForecastControls;

/// Reference value plotted on the "Market Flux" axis.
pub const MARKET_FLUX_REFERENCE: f64 = 60.0;

/// Scale applied to 0..10 sliders so they share the 0..100 radar axis.
pub const SLIDER_SCALE: f64 = 10.0;

const SIZE: u32 = 300;
const CENTER: f64 = SIZE as f64 / 2.0;
const RADAR_RADIUS: f64 = 100.0;

const GRID: RGBColor = RGBColor(0x3a, 0x42, 0x5c);
const INK: RGBColor = RGBColor(0xe6, 0xec, 0xff);
const PROFILE: RGBColor = RGBColor(0x00, 0xf5, 0xff);

#[derive(Debug, thiserror::Error)]
#[error("Chart rendering failed: {0}")]
pub struct ChartError(String);

fn draw_err(e: impl std::fmt::Display) -> ChartError {
    ChartError(e.to_string())
}

pub fn category_rgb(category: RiskCategory) -> RGBColor {
    match category {
        RiskCategory::High => RGBColor(0xff, 0x00, 0x4c),
        RiskCategory::Medium => RGBColor(0xff, 0xae, 0x00),
        RiskCategory::Low => RGBColor(0x00, 0xf5, 0xff),
    }
}

/// CSS hex form of [`category_rgb`].
pub fn category_color(category: RiskCategory) -> String {
    let RGBColor(r, g, b) = category_rgb(category);
    format!("#{r:02x}{g:02x}{b:02x}")
}

/// Escape text for HTML bodies and attribute values.
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Radar axes for a forecast: automation as-is, the two 0..10 sliders scaled
/// to 0..100, and the constant market reference.
pub fn profile_axes(controls: &ForecastControls) -> [(&'static str, f64); 4] {
    [
        ("Automation", controls.automation),
        ("Skill Gap", controls.skill_gap * SLIDER_SCALE),
        ("AI Adoption", controls.ai_adoption * SLIDER_SCALE),
        ("Market Flux", MARKET_FLUX_REFERENCE),
    ]
}

/// Ring chart of the class distribution, one labeled slice per class.
pub fn donut_chart(distribution: &[(RiskCategory, f64)]) -> Result<String, ChartError> {
    let sizes: Vec<f64> = distribution
        .iter()
        .map(|(_, p)| if p.is_finite() { p.clamp(0.0, 1.0) } else { 0.0 })
        .collect();
    if sizes.iter().sum::<f64>() <= 0.0 {
        return Err(ChartError("distribution has no probability mass".into()));
    }
    let colors: Vec<RGBColor> = distribution.iter().map(|(c, _)| category_rgb(*c)).collect();
    let labels: Vec<String> = distribution
        .iter()
        .map(|(c, p)| format!("{c} {:.1}%", p * 100.0))
        .collect();

    let center = (CENTER as i32, CENTER as i32);
    let radius = 95.0;
    let mut svg = String::new();
    {
        let root = SVGBackend::with_string(&mut svg, (SIZE, SIZE)).into_drawing_area();
        let mut pie = Pie::new(&center, &radius, &sizes, &colors, &labels);
        pie.start_angle(-90.0);
        pie.donut_hole(60.0);
        pie.label_style(("sans-serif", 12).into_font().color(&INK));
        root.draw(&pie).map_err(draw_err)?;
        root.present().map_err(draw_err)?;
    }
    Ok(svg)
}

fn polar(value: f64, index: usize, count: usize, radius: f64) -> (f64, f64) {
    let angle = -PI / 2.0 + index as f64 * 2.0 * PI / count as f64;
    let r = value.clamp(0.0, 100.0) / 100.0 * radius;
    (CENTER + r * angle.cos(), CENTER + r * angle.sin())
}

fn pixel((x, y): (f64, f64)) -> (i32, i32) {
    (x.round() as i32, y.round() as i32)
}

/// Closed outline through `values` placed on evenly spaced spokes.
fn ring(values: impl Iterator<Item = f64>, count: usize, radius: f64) -> Vec<(i32, i32)> {
    let mut points: Vec<(i32, i32)> = values
        .enumerate()
        .map(|(i, v)| pixel(polar(v, i, count, radius)))
        .collect();
    if let Some(&first) = points.first() {
        points.push(first);
    }
    points
}

/// Filled radar over 0..100 axes.
pub fn radar_chart(axes: &[(&str, f64)]) -> Result<String, ChartError> {
    let n = axes.len().max(1);
    let origin = pixel((CENTER, CENTER));
    let label_style = ("sans-serif", 11)
        .into_font()
        .color(&INK)
        .pos(Pos::new(HPos::Center, VPos::Center));

    let mut svg = String::new();
    {
        let root = SVGBackend::with_string(&mut svg, (SIZE, SIZE)).into_drawing_area();

        for level in [25.0, 50.0, 75.0, 100.0] {
            let outline = ring(std::iter::repeat(level).take(n), n, RADAR_RADIUS);
            root.draw(&PathElement::new(outline, GRID.stroke_width(1)))
                .map_err(draw_err)?;
        }

        for (i, (label, _)) in axes.iter().enumerate() {
            let tip = pixel(polar(100.0, i, n, RADAR_RADIUS));
            root.draw(&PathElement::new(vec![origin, tip], GRID.stroke_width(1)))
                .map_err(draw_err)?;
            let at = pixel(polar(100.0, i, n, RADAR_RADIUS + 22.0));
            root.draw(&Text::new(label.to_string(), at, label_style.clone()))
                .map_err(draw_err)?;
        }

        let profile = ring(axes.iter().map(|(_, v)| *v), n, RADAR_RADIUS);
        root.draw(&Polygon::new(profile.clone(), PROFILE.mix(0.35).filled()))
            .map_err(draw_err)?;
        root.draw(&PathElement::new(profile, PROFILE.stroke_width(2)))
            .map_err(draw_err)?;

        root.present().map_err(draw_err)?;
    }
    Ok(svg)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape() {
        assert_eq!(
            escape(r#"<b>"R&D" 'x'</b>"#),
            "&lt;b&gt;&quot;R&amp;D&quot; &#39;x&#39;&lt;/b&gt;"
        );
    }

    #[test]
    fn test_category_color_hex() {
        assert_eq!(category_color(RiskCategory::High), "#ff004c");
        assert_eq!(category_color(RiskCategory::Medium), "#ffae00");
        assert_eq!(category_color(RiskCategory::Low), "#00f5ff");
    }

    #[test]
    fn test_profile_axes_scale_sliders() {
        let controls = ForecastControls {
            automation: 60.0,
            skill_gap: 4.5,
            ai_adoption: 6.0,
            ..ForecastControls::default()
        };
        let axes = profile_axes(&controls);
        assert_eq!(axes[0], ("Automation", 60.0));
        assert_eq!(axes[1], ("Skill Gap", 45.0));
        assert_eq!(axes[2], ("AI Adoption", 60.0));
        assert_eq!(axes[3], ("Market Flux", MARKET_FLUX_REFERENCE));
    }

    #[test]
    fn test_donut_labels_every_class() {
        let svg = donut_chart(&[
            (RiskCategory::Low, 0.2),
            (RiskCategory::Medium, 0.3),
            (RiskCategory::High, 0.5),
        ])
        .unwrap();
        assert!(svg.contains("<svg"));
        assert!(svg.contains("Low 20.0%"));
        assert!(svg.contains("Medium 30.0%"));
        assert!(svg.contains("High 50.0%"));
        assert!(svg
            .to_lowercase()
            .contains(&category_color(RiskCategory::High)));
    }

    #[test]
    fn test_donut_rejects_empty_distribution() {
        assert!(donut_chart(&[(RiskCategory::Low, 0.0), (RiskCategory::High, f64::NAN)]).is_err());
        assert!(donut_chart(&[]).is_err());
    }

    #[test]
    fn test_radar_draws_axes_and_profile() {
        let svg = radar_chart(&[
            ("Automation", 100.0),
            ("Skill Gap", 0.0),
            ("AI Adoption", 50.0),
            ("Market Flux", 60.0),
        ])
        .unwrap();
        assert!(svg.contains("<svg"));
        for label in ["Automation", "Skill Gap", "AI Adoption", "Market Flux"] {
            assert!(svg.contains(label), "{label}");
        }
        assert!(svg.contains("<polygon"));
    }

    #[test]
    fn test_ring_is_closed_and_starts_at_top() {
        let points = ring([100.0, 0.0, 50.0, 60.0].into_iter(), 4, RADAR_RADIUS);
        assert_eq!(points.len(), 5);
        assert_eq!(points.first(), points.last());
        assert_eq!(points[0], (150, 50));
        assert_eq!(points[1], (150, 150));
    }

    #[test]
    fn test_polar_clamps_out_of_range() {
        assert_eq!(polar(250.0, 0, 4, 90.0), polar(100.0, 0, 4, 90.0));
    }
}
