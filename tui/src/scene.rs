//! Terminal rendering of the starfield scene.

use ratatui::{
    buffer::Buffer,
    layout::{Position, Rect},
    style::Style,
    text::{Line, Span},
    widgets::Widget,
};

use dream_engine::{Projected, SceneSpec, SceneState};

use crate::theme::{Glyphs, Palette, ramp, styles};

/// Terminal cells are roughly twice as tall as they are wide.
const CELL_ASPECT: f32 = 2.0;
/// Glow radius around the guiding light, in multiples of its body radius.
const HALO_SCALE: f32 = 3.0;

/// Renders stars, the guiding light, and the crosshair into an area.
pub struct SceneView<'a> {
    spec: &'a SceneSpec,
    scene: &'a SceneState,
    palette: &'a Palette,
    glyphs: &'a Glyphs,
}

impl<'a> SceneView<'a> {
    #[must_use]
    pub fn new(
        spec: &'a SceneSpec,
        scene: &'a SceneState,
        palette: &'a Palette,
        glyphs: &'a Glyphs,
    ) -> Self {
        Self {
            spec,
            scene,
            palette,
            glyphs,
        }
    }

    fn aspect(area: Rect) -> f32 {
        f32::from(area.width) / (f32::from(area.height.max(1)) * CELL_ASPECT)
    }

    fn draw_stars(&self, area: Rect, buf: &mut Buffer) {
        let aspect = Self::aspect(area);
        let stars = &self.spec.stars;
        let twinkle = stars.twinkle(self.scene.elapsed_secs());
        let factor = stars.factor.max(f32::EPSILON);

        for star in self.scene.stars() {
            let Some(p) = self
                .scene
                .project(&self.spec.camera, star.position, aspect)
            else {
                continue;
            };
            // Sizes span [0.5, 1] * factor; stretch that to [0, 1].
            let size = ((star.size / factor - 0.5) * 2.0).clamp(0.0, 1.0);
            let glyph = ramp(self.glyphs.stars, size * twinkle);
            let color = self.palette.scene_color(star.color.scale(twinkle));
            if let Some(cell) = buf.cell_mut(to_cell(area, p)) {
                cell.set_symbol(glyph).set_fg(color);
            }
        }
    }

    fn draw_guiding_light(&self, area: Rect, buf: &mut Buffer) {
        let guide = &self.spec.guide;
        let camera = &self.spec.camera;
        let Some(p) = self.scene.project(camera, guide.position, Self::aspect(area)) else {
            return;
        };

        let peak = guide.pulse_offset + guide.pulse_amplitude;
        let emissive = guide.emissive_intensity(self.scene.elapsed_secs()) / peak.max(f32::EPSILON);
        let light = &self.spec.light;
        let lit = light
            .attenuation((guide.position - light.position).length())
            .min(1.0);
        let body = guide
            .color
            .scale(emissive + lit * 0.25)
            .mix(light.color, lit * 0.1);
        let body = self.spec.fog.apply(body, p.depth);

        // Radius in cells. One NDC unit is half the rows tall and, with the
        // aspect correction, spans the same distance in twice as many columns.
        let r_ndc = SceneState::apparent_radius(camera, guide.radius, p.depth);
        let rows = (r_ndc * f32::from(area.height) / 2.0).max(0.5);
        let cols = rows * CELL_ASPECT;
        let center = to_cell(area, p);

        let reach_x = (cols * HALO_SCALE).ceil() as i32;
        let reach_y = (rows * HALO_SCALE).ceil() as i32;
        for dy in -reach_y..=reach_y {
            for dx in -reach_x..=reach_x {
                let d = ((dx as f32 / cols).powi(2) + (dy as f32 / rows).powi(2)).sqrt();
                let shade = if d <= 1.0 {
                    emissive
                } else if d <= HALO_SCALE {
                    emissive * 0.5 * (HALO_SCALE - d) / (HALO_SCALE - 1.0)
                } else {
                    continue;
                };
                let Some(pos) = offset(area, center, dx, dy) else {
                    continue;
                };
                if let Some(cell) = buf.cell_mut(pos) {
                    let color = self.palette.scene_color(body.scale(shade.max(0.35)));
                    cell.set_symbol(ramp(self.glyphs.orb, shade))
                        .set_fg(color);
                }
            }
        }
    }

    fn draw_crosshair(&self, area: Rect, buf: &mut Buffer) {
        let center = Position::new(area.x + area.width / 2, area.y + area.height / 2);
        if let Some(cell) = buf.cell_mut(center) {
            cell.set_symbol(self.glyphs.crosshair)
                .set_fg(self.palette.text_primary);
        }
    }
}

impl Widget for SceneView<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.is_empty() {
            return;
        }
        let sky = self.palette.scene_color(self.spec.fog.color);
        buf.set_style(area, Style::default().bg(sky));

        self.draw_stars(area, buf);
        self.draw_guiding_light(area, buf);
        self.draw_crosshair(area, buf);
    }
}

/// Cell for a projected point. NDC `(-1, 1)` is the top-left corner.
fn to_cell(area: Rect, p: Projected) -> Position {
    let max_x = f32::from(area.width.saturating_sub(1));
    let max_y = f32::from(area.height.saturating_sub(1));
    let x = ((p.ndc_x + 1.0) / 2.0 * max_x).round().clamp(0.0, max_x) as u16;
    let y = ((1.0 - p.ndc_y) / 2.0 * max_y).round().clamp(0.0, max_y) as u16;
    Position::new(area.x + x, area.y + y)
}

fn offset(area: Rect, from: Position, dx: i32, dy: i32) -> Option<Position> {
    let x = i32::from(from.x) + dx;
    let y = i32::from(from.y) + dy;
    let pos = Position::new(u16::try_from(x).ok()?, u16::try_from(y).ok()?);
    area.contains(pos).then_some(pos)
}

/// Bottom bar describing pointer lock and the controls.
#[must_use]
pub fn hint_line(locked: bool, palette: &Palette, glyphs: &Glyphs) -> Line<'static> {
    let mut spans = Vec::new();
    if locked {
        spans.push(Span::styled(
            format!(" {} ", glyphs.locked),
            styles::key_highlight(palette),
        ));
        spans.push(Span::styled("Looking around  ", styles::feedback(palette)));
        spans.push(Span::styled("Esc", styles::key_highlight(palette)));
        spans.push(Span::styled(" release  ", styles::key_hint(palette)));
    } else {
        spans.push(Span::styled(
            format!(" {} ", glyphs.unlocked),
            styles::key_hint(palette),
        ));
        spans.push(Span::styled("Click", styles::key_highlight(palette)));
        spans.push(Span::styled(" to look around  ", styles::key_hint(palette)));
    }
    spans.push(Span::styled("Arrows", styles::key_highlight(palette)));
    spans.push(Span::styled(" look  ", styles::key_hint(palette)));
    spans.push(Span::styled("q", styles::key_highlight(palette)));
    spans.push(Span::styled(" quit", styles::key_hint(palette)));
    Line::from(spans)
}

#[cfg(test)]
mod tests {
    use ratatui::{buffer::Buffer, layout::Rect, widgets::Widget};

    use dream_engine::{SceneSpec, SceneState};
    use dream_types::{Rgb, Star, Vec3, ui::UiOptions};

    use super::{SceneView, hint_line};
    use crate::theme::{glyphs, palette};

    fn render(scene: &SceneState, options: UiOptions, area: Rect) -> Buffer {
        let spec = SceneSpec::default();
        let palette = palette(options);
        let glyphs = glyphs(options);
        let mut buf = Buffer::empty(area);
        SceneView::new(&spec, scene, &palette, &glyphs).render(area, &mut buf);
        buf
    }

    fn ascii() -> UiOptions {
        UiOptions {
            ascii_only: true,
            ..UiOptions::default()
        }
    }

    #[test]
    fn guiding_light_and_crosshair_at_center() {
        let scene = SceneState::new(Vec::new());
        let area = Rect::new(0, 0, 41, 21);
        let buf = render(&scene, ascii(), area);

        // Crosshair is drawn last, over the light's core.
        assert_eq!(buf[(20, 10)].symbol(), "+");
        // The halo surrounds it.
        assert_ne!(buf[(21, 10)].symbol(), " ");
        // Corners stay empty sky.
        assert_eq!(buf[(0, 0)].symbol(), " ");
    }

    #[test]
    fn star_ahead_is_drawn() {
        let star = Star {
            position: Vec3::new(80.0, 0.0, -150.0),
            size: 5.0,
            color: Rgb(230, 230, 230),
        };
        let scene = SceneState::new(vec![star]);
        let area = Rect::new(0, 0, 80, 24);
        let buf = render(&scene, ascii(), area);

        let drawn = (0..area.width)
            .flat_map(|x| (0..area.height).map(move |y| (x, y)))
            .filter(|&(x, _)| x > 50)
            .any(|(x, y)| matches!(buf[(x, y)].symbol(), "." | "+" | "*"));
        assert!(drawn, "star right of center should be visible");
    }

    #[test]
    fn star_behind_is_not_drawn() {
        let star = Star {
            position: Vec3::new(0.0, 0.0, 150.0),
            size: 5.0,
            color: Rgb(230, 230, 230),
        };
        let with_star = render(&SceneState::new(vec![star]), ascii(), Rect::new(0, 0, 40, 20));
        let without = render(&SceneState::new(Vec::new()), ascii(), Rect::new(0, 0, 40, 20));
        assert_eq!(with_star, without);
    }

    #[test]
    fn empty_area_is_a_no_op() {
        let scene = SceneState::new(Vec::new());
        let buf = render(&scene, UiOptions::default(), Rect::new(0, 0, 0, 0));
        assert_eq!(buf.area, Rect::new(0, 0, 0, 0));
    }

    #[test]
    fn hint_line_reflects_lock() {
        let options = UiOptions::default();
        let palette = palette(options);
        let glyphs = glyphs(options);
        let locked = hint_line(true, &palette, &glyphs).to_string();
        let released = hint_line(false, &palette, &glyphs).to_string();
        assert!(locked.contains("Esc"));
        assert!(released.contains("Click"));
    }
}
