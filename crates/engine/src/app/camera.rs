use super::{ObjectId, Rect, Vec2};

#[derive(Debug, Clone, Copy, PartialEq)]
struct Follow {
    target: ObjectId,
    lerp: Vec2,
}

/// Scroll camera. `scroll` is the world position of the viewport's top-left
/// corner.
#[derive(Debug, Clone, PartialEq)]
pub struct Camera {
    scroll: Vec2,
    viewport: Vec2,
    bounds: Option<Rect>,
    follow: Option<Follow>,
    round_pixels: bool,
}

impl Camera {
    pub fn new(viewport_width: u32, viewport_height: u32) -> Self {
        Self {
            scroll: Vec2::ZERO,
            viewport: Vec2::new(viewport_width as f32, viewport_height as f32),
            bounds: None,
            follow: None,
            round_pixels: false,
        }
    }

    pub fn scroll(&self) -> Vec2 {
        self.scroll
    }

    /// Scroll used for drawing; snapped to whole pixels when `round_pixels`.
    pub fn render_scroll(&self) -> Vec2 {
        if self.round_pixels {
            Vec2::new(self.scroll.x.round(), self.scroll.y.round())
        } else {
            self.scroll
        }
    }

    pub fn viewport(&self) -> Vec2 {
        self.viewport
    }

    pub fn set_viewport(&mut self, width: u32, height: u32) {
        self.viewport = Vec2::new(width as f32, height as f32);
        self.scroll = self.clamp_scroll(self.scroll);
    }

    pub fn set_scroll(&mut self, scroll: Vec2) {
        self.scroll = self.clamp_scroll(scroll);
    }

    pub fn bounds(&self) -> Option<Rect> {
        self.bounds
    }

    pub fn set_bounds(&mut self, bounds: Rect) {
        self.bounds = Some(bounds);
        self.scroll = self.clamp_scroll(self.scroll);
    }

    pub fn remove_bounds(&mut self) {
        self.bounds = None;
    }

    pub fn round_pixels(&self) -> bool {
        self.round_pixels
    }

    pub fn set_round_pixels(&mut self, round_pixels: bool) {
        self.round_pixels = round_pixels;
    }

    pub fn following(&self) -> Option<ObjectId> {
        self.follow.map(|follow| follow.target)
    }

    pub fn follow_lerp(&self) -> Option<Vec2> {
        self.follow.map(|follow| follow.lerp)
    }

    /// Starts tracking `target` and centres on it immediately so the first
    /// frames do not lerp in from the origin.
    pub(crate) fn start_follow(
        &mut self,
        target: ObjectId,
        target_center: Vec2,
        round_pixels: bool,
        lerp_x: f32,
        lerp_y: f32,
    ) {
        self.follow = Some(Follow {
            target,
            lerp: Vec2::new(sanitize_lerp(lerp_x), sanitize_lerp(lerp_y)),
        });
        self.round_pixels = round_pixels;
        self.scroll = self.clamp_scroll(self.centered_scroll(target_center));
    }

    pub fn stop_follow(&mut self) {
        self.follow = None;
    }

    pub(crate) fn update_follow(&mut self, target_center: Vec2) {
        let Some(follow) = self.follow else {
            return;
        };
        let desired = self.centered_scroll(target_center);
        let next = Vec2::new(
            self.scroll.x + (desired.x - self.scroll.x) * follow.lerp.x,
            self.scroll.y + (desired.y - self.scroll.y) * follow.lerp.y,
        );
        self.scroll = self.clamp_scroll(next);
    }

    pub fn world_to_screen(&self, world: Vec2, scroll_factor: f32) -> Vec2 {
        let scroll = self.render_scroll();
        Vec2::new(
            world.x - scroll.x * scroll_factor,
            world.y - scroll.y * scroll_factor,
        )
    }

    /// World rectangle currently covered by the viewport.
    pub fn world_view(&self) -> Rect {
        let scroll = self.render_scroll();
        Rect::new(scroll.x, scroll.y, self.viewport.x, self.viewport.y)
    }

    fn centered_scroll(&self, target_center: Vec2) -> Vec2 {
        Vec2::new(
            target_center.x - self.viewport.x * 0.5,
            target_center.y - self.viewport.y * 0.5,
        )
    }

    fn clamp_scroll(&self, scroll: Vec2) -> Vec2 {
        let Some(bounds) = self.bounds else {
            return scroll;
        };
        Vec2::new(
            clamp_axis(scroll.x, bounds.x, bounds.width, self.viewport.x),
            clamp_axis(scroll.y, bounds.y, bounds.height, self.viewport.y),
        )
    }
}

fn clamp_axis(scroll: f32, bounds_start: f32, bounds_len: f32, viewport_len: f32) -> f32 {
    if bounds_len <= viewport_len {
        return bounds_start + (bounds_len - viewport_len) * 0.5;
    }
    scroll.clamp(bounds_start, bounds_start + bounds_len - viewport_len)
}

fn sanitize_lerp(lerp: f32) -> f32 {
    if lerp.is_finite() {
        lerp.clamp(0.0, 1.0)
    } else {
        1.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-4
    }

    #[test]
    fn start_follow_centres_on_target_immediately() {
        let mut camera = Camera::new(800, 600);
        camera.start_follow(ObjectId(1), Vec2::new(1000.0, 700.0), true, 0.1, 0.1);
        assert_eq!(camera.scroll(), Vec2::new(600.0, 400.0));
        assert_eq!(camera.following(), Some(ObjectId(1)));
        assert!(camera.round_pixels());
    }

    #[test]
    fn follow_moves_a_lerp_fraction_toward_target() {
        let mut camera = Camera::new(800, 600);
        camera.start_follow(ObjectId(1), Vec2::new(400.0, 300.0), false, 0.1, 0.5);
        camera.update_follow(Vec2::new(500.0, 400.0));
        assert!(approx(camera.scroll().x, 10.0));
        assert!(approx(camera.scroll().y, 50.0));
    }

    #[test]
    fn bounds_clamp_scroll_at_edges() {
        let mut camera = Camera::new(800, 600);
        camera.set_bounds(Rect::new(0.0, 0.0, 1600.0, 1200.0));
        camera.start_follow(ObjectId(1), Vec2::new(16.0, 16.0), true, 0.1, 0.1);
        assert_eq!(camera.scroll(), Vec2::ZERO);

        camera.start_follow(ObjectId(1), Vec2::new(1590.0, 1190.0), true, 0.1, 0.1);
        assert_eq!(camera.scroll(), Vec2::new(800.0, 600.0));
    }

    #[test]
    fn bounds_smaller_than_viewport_centre_the_view() {
        let mut camera = Camera::new(800, 600);
        camera.set_bounds(Rect::new(0.0, 0.0, 400.0, 600.0));
        camera.set_scroll(Vec2::new(123.0, 45.0));
        assert_eq!(camera.scroll(), Vec2::new(-200.0, 0.0));
    }

    #[test]
    fn render_scroll_rounds_only_when_enabled() {
        let mut camera = Camera::new(800, 600);
        camera.set_scroll(Vec2::new(10.4, 20.6));
        assert_eq!(camera.render_scroll(), Vec2::new(10.4, 20.6));
        camera.set_round_pixels(true);
        assert_eq!(camera.render_scroll(), Vec2::new(10.0, 21.0));
    }

    #[test]
    fn scroll_factor_zero_pins_to_screen() {
        let mut camera = Camera::new(800, 600);
        camera.set_scroll(Vec2::new(300.0, 200.0));
        assert_eq!(
            camera.world_to_screen(Vec2::new(16.0, 16.0), 0.0),
            Vec2::new(16.0, 16.0)
        );
        assert_eq!(
            camera.world_to_screen(Vec2::new(316.0, 216.0), 1.0),
            Vec2::new(16.0, 16.0)
        );
    }

    #[test]
    fn update_without_follow_is_a_no_op() {
        let mut camera = Camera::new(800, 600);
        camera.update_follow(Vec2::new(5000.0, 5000.0));
        assert_eq!(camera.scroll(), Vec2::ZERO);
    }
}
