//! Taskbar visibility engine.
//!
//! The taskbar is never hidden or destroyed. Instead a window region
//! slightly smaller than the taskbar itself is applied while it should be
//! tucked away, and removed again to show it. Both effects are idempotent.

use crate::Rect;

/// Pixels shaved off every side of the taskbar by the hide region.
pub const HIDE_MARGIN: i32 = 2;

/// How far (in pixels) the taskbar must reach past the work-area boundary
/// before it counts as visible. Absorbs rounding and slide-animation noise.
/// A protrusion of exactly this many pixels counts as *not* visible.
pub const VISIBLE_TOLERANCE: i32 = 4;

/// The screen edge the taskbar is docked to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Edge {
    Left,
    Top,
    Right,
    Bottom,
    /// The shell reported something we don't recognise.
    Unknown,
}

impl Edge {
    /// Maps the shell's `ABE_*` edge codes.
    pub fn from_raw(edge: u32) -> Self {
        match edge {
            0 => Self::Left,
            1 => Self::Top,
            2 => Self::Right,
            3 => Self::Bottom,
            _ => Self::Unknown,
        }
    }
}

/// Returns whether the taskbar currently reaches into the work area.
///
/// An auto-hidden taskbar slides out past the work-area boundary, leaving
/// only a sliver. It is visible once its screen-facing boundary extends
/// more than [`VISIBLE_TOLERANCE`] pixels across that boundary. An
/// unrecognised edge is treated as visible.
pub fn is_visible(edge: Edge, taskbar: &Rect, work_area: &Rect) -> bool {
    let tol = VISIBLE_TOLERANCE;
    match edge {
        Edge::Left => taskbar.right > work_area.left + tol,
        Edge::Top => taskbar.bottom > work_area.top + tol,
        Edge::Right => taskbar.left < work_area.right - tol,
        Edge::Bottom => taskbar.top < work_area.bottom - tol,
        Edge::Unknown => true,
    }
}

/// The window-relative region applied to tuck the taskbar away.
pub fn hide_target(taskbar: &Rect) -> Rect {
    taskbar.to_origin().inset(HIDE_MARGIN)
}

/// A window whose clipping region can be read and replaced.
///
/// Implemented by the platform crate for the real taskbar window and by
/// fakes in tests.
pub trait TaskbarSurface {
    /// The window's screen rectangle, or `None` if it can't be queried.
    fn window_rect(&self) -> Option<Rect>;

    /// Bounding box of the custom region currently applied, or `None` when
    /// the window has no custom region (or it is empty).
    fn region_box(&self) -> Option<Rect>;

    /// Applies a window-relative region, or removes the custom region.
    fn set_region(&self, region: Option<Rect>);
}

/// Removes any custom region so the whole taskbar is clickable again.
///
/// Returns `true` if a region was actually removed.
pub fn show(surface: &impl TaskbarSurface) -> bool {
    if surface.region_box().is_none() {
        return false;
    }
    surface.set_region(None);
    true
}

/// Applies the hide region unless an equal or tighter, non-empty one is
/// already set.
///
/// Returns `true` if a new region was applied.
pub fn hide(surface: &impl TaskbarSurface) -> bool {
    let Some(rect) = surface.window_rect() else {
        return false;
    };
    let target = hide_target(&rect);

    if surface
        .region_box()
        .is_some_and(|current| !current.is_empty() && target.contains(&current))
    {
        return false;
    }

    surface.set_region(Some(target));
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::{Cell, RefCell};

    /// A taskbar 40px tall along the bottom of a 1080p monitor.
    fn bottom_taskbar() -> Rect {
        Rect::new(0, 1040, 1920, 1080)
    }

    struct FakeSurface {
        rect: Option<Rect>,
        region: RefCell<Option<Rect>>,
        writes: Cell<usize>,
    }

    impl FakeSurface {
        fn new(rect: Option<Rect>) -> Self {
            Self {
                rect,
                region: RefCell::new(None),
                writes: Cell::new(0),
            }
        }
    }

    impl TaskbarSurface for FakeSurface {
        fn window_rect(&self) -> Option<Rect> {
            self.rect
        }

        fn region_box(&self) -> Option<Rect> {
            *self.region.borrow()
        }

        fn set_region(&self, region: Option<Rect>) {
            self.writes.set(self.writes.get() + 1);
            *self.region.borrow_mut() = region;
        }
    }

    // -- is_visible --

    #[test]
    fn flush_against_work_area_is_not_visible() {
        let work = Rect::new(0, 0, 1920, 1080);
        let taskbar = Rect::new(0, 1080, 1920, 1120);
        assert!(!is_visible(Edge::Bottom, &taskbar, &work));
    }

    #[test]
    fn protrusion_past_tolerance_is_visible() {
        let work = Rect::new(0, 0, 1920, 1080);
        let taskbar = Rect::new(0, 1070, 1920, 1110);
        assert!(is_visible(Edge::Bottom, &taskbar, &work));
    }

    #[test]
    fn sliver_within_tolerance_is_not_visible() {
        let work = Rect::new(0, 0, 1920, 1080);
        let taskbar = Rect::new(0, 1078, 1920, 1118);
        assert!(!is_visible(Edge::Bottom, &taskbar, &work));
    }

    #[test]
    fn protrusion_of_exactly_tolerance_is_not_visible() {
        let work = Rect::new(0, 0, 1920, 1080);

        let bottom = Rect::new(0, 1076, 1920, 1116);
        assert!(!is_visible(Edge::Bottom, &bottom, &work));

        let left = Rect::new(-36, 0, 4, 1080);
        assert!(!is_visible(Edge::Left, &left, &work));

        let top = Rect::new(0, -36, 1920, 4);
        assert!(!is_visible(Edge::Top, &top, &work));

        let right = Rect::new(1916, 0, 1956, 1080);
        assert!(!is_visible(Edge::Right, &right, &work));
    }

    #[test]
    fn one_pixel_past_tolerance_is_visible_on_every_edge() {
        let work = Rect::new(0, 0, 1920, 1080);
        assert!(is_visible(Edge::Bottom, &Rect::new(0, 1075, 1920, 1115), &work));
        assert!(is_visible(Edge::Left, &Rect::new(-35, 0, 5, 1080), &work));
        assert!(is_visible(Edge::Top, &Rect::new(0, -35, 1920, 5), &work));
        assert!(is_visible(Edge::Right, &Rect::new(1915, 0, 1955, 1080), &work));
    }

    #[test]
    fn unknown_edge_counts_as_visible() {
        let work = Rect::new(0, 0, 1920, 1080);
        assert!(is_visible(Edge::Unknown, &Rect::default(), &work));
        assert_eq!(Edge::from_raw(9), Edge::Unknown);
        assert_eq!(Edge::from_raw(3), Edge::Bottom);
    }

    // -- show / hide --

    #[test]
    fn hide_applies_inset_region() {
        let surface = FakeSurface::new(Some(bottom_taskbar()));

        assert!(hide(&surface));
        assert_eq!(surface.region_box(), Some(Rect::new(2, 2, 1918, 38)));
    }

    #[test]
    fn hide_twice_is_idempotent() {
        let surface = FakeSurface::new(Some(bottom_taskbar()));

        hide(&surface);
        let after_one = surface.region_box();
        assert!(!hide(&surface));

        assert_eq!(surface.region_box(), after_one);
        assert_eq!(surface.writes.get(), 1);
    }

    #[test]
    fn hide_replaces_a_looser_region() {
        let surface = FakeSurface::new(Some(bottom_taskbar()));
        surface.set_region(Some(Rect::new(0, 0, 1920, 40)));

        assert!(hide(&surface));
        assert_eq!(surface.region_box(), Some(hide_target(&bottom_taskbar())));
    }

    #[test]
    fn hide_replaces_an_empty_region() {
        let surface = FakeSurface::new(Some(bottom_taskbar()));
        surface.set_region(Some(Rect::new(5, 5, 5, 5)));

        assert!(hide(&surface));
        assert_eq!(surface.region_box(), Some(hide_target(&bottom_taskbar())));
        assert_eq!(surface.writes.get(), 2);
    }

    #[test]
    fn hide_without_geometry_is_noop() {
        let surface = FakeSurface::new(None);

        assert!(!hide(&surface));
        assert_eq!(surface.writes.get(), 0);
    }

    #[test]
    fn show_without_region_is_noop() {
        let surface = FakeSurface::new(Some(bottom_taskbar()));

        assert!(!show(&surface));
        assert_eq!(surface.writes.get(), 0);
    }

    #[test]
    fn show_after_repeated_hides_clears_region() {
        let surface = FakeSurface::new(Some(bottom_taskbar()));
        for _ in 0..3 {
            hide(&surface);
        }

        assert!(show(&surface));
        assert_eq!(surface.region_box(), None);

        // Same end state as showing a never-hidden taskbar.
        let fresh = FakeSurface::new(Some(bottom_taskbar()));
        show(&fresh);
        assert_eq!(surface.region_box(), fresh.region_box());
    }
}
