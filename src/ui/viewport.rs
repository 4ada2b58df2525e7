/// Camera: the part of the level visible in the terminal.
///
/// `(x, y)` is the level coordinate of the top-left visible cell
/// (x = column, y = row). `(view_w, view_h)` is how many cells fit; the
/// renderer sets them from the terminal size every frame. A level smaller
/// than the view is centred, which makes `x`/`y` negative.

#[derive(Clone, Debug, Default)]
pub struct Camera {
    pub x: i32,
    pub y: i32,
    pub view_w: usize,
    pub view_h: usize,
}

impl Camera {
    pub fn new() -> Self {
        Camera::default()
    }

    /// Keep the cursor visible. Scrolls only when the cursor enters the
    /// outer fifth of the view, so small moves don't jerk the grid.
    pub fn follow(&mut self, col: usize, row: usize, level_w: usize, level_h: usize) {
        if self.view_w == 0 || self.view_h == 0 {
            return;
        }
        self.x = follow_axis(self.x, col, self.view_w, level_w);
        self.y = follow_axis(self.y, row, self.view_h, level_h);
    }

    /// Snap so the cursor sits in the middle of the view.
    pub fn center_on(&mut self, col: usize, row: usize, level_w: usize, level_h: usize) {
        if self.view_w == 0 || self.view_h == 0 {
            return;
        }
        self.x = center_axis(col, self.view_w, level_w);
        self.y = center_axis(row, self.view_h, level_h);
    }

    /// View cell -> level cell, `None` for void around a small level or
    /// for anything outside the view.
    pub fn view_to_level(&self, vx: usize, vy: usize, level_w: usize, level_h: usize) -> Option<(usize, usize)> {
        if vx >= self.view_w || vy >= self.view_h {
            return None;
        }
        let col = self.x + vx as i32;
        let row = self.y + vy as i32;
        if col < 0 || row < 0 || col >= level_w as i32 || row >= level_h as i32 {
            return None;
        }
        Some((col as usize, row as usize))
    }
}

fn follow_axis(pos: i32, target: usize, view: usize, level: usize) -> i32 {
    if level <= view {
        return -((view as i32 - level as i32) / 2);
    }
    let margin = view as i32 / 5;
    let t = target as i32;
    let mut pos = pos;
    if t < pos + margin {
        pos = t - margin;
    } else if t > pos + view as i32 - margin - 1 {
        pos = t - view as i32 + margin + 1;
    }
    pos.clamp(0, level as i32 - view as i32)
}

fn center_axis(target: usize, view: usize, level: usize) -> i32 {
    if level <= view {
        return -((view as i32 - level as i32) / 2);
    }
    (target as i32 - view as i32 / 2).clamp(0, level as i32 - view as i32)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cam(view_w: usize, view_h: usize) -> Camera {
        Camera { x: 0, y: 0, view_w, view_h }
    }

    #[test]
    fn small_level_is_centred() {
        let mut c = cam(40, 20);
        c.follow(0, 0, 10, 10);
        assert_eq!((c.x, c.y), (-15, -5));
        assert_eq!(c.view_to_level(15, 5, 10, 10), Some((0, 0)));
        assert_eq!(c.view_to_level(14, 5, 10, 10), None);
        assert_eq!(c.view_to_level(25, 5, 10, 10), None);
    }

    #[test]
    fn follow_scrolls_near_the_edge_only() {
        let mut c = cam(20, 10);
        c.follow(10, 5, 100, 10);
        assert_eq!(c.x, 0);
        c.follow(16, 5, 100, 10);
        assert_eq!(c.x, 1);
        c.follow(99, 5, 100, 10);
        assert_eq!(c.x, 80);
        c.follow(0, 5, 100, 10);
        assert_eq!(c.x, 0);
    }

    #[test]
    fn center_clamps_to_level() {
        let mut c = cam(20, 4);
        c.center_on(50, 9, 100, 10);
        assert_eq!((c.x, c.y), (40, 6));
        c.center_on(2, 0, 100, 10);
        assert_eq!((c.x, c.y), (0, 0));
    }

    #[test]
    fn zero_view_is_ignored() {
        let mut c = Camera::new();
        c.follow(50, 5, 100, 10);
        c.center_on(50, 5, 100, 10);
        assert_eq!((c.x, c.y), (0, 0));
        assert_eq!(c.view_to_level(0, 0, 100, 10), None);
    }

    #[test]
    fn view_maps_through_scroll() {
        let mut c = cam(20, 5);
        c.x = 30;
        c.y = 3;
        assert_eq!(c.view_to_level(0, 0, 100, 10), Some((30, 3)));
        assert_eq!(c.view_to_level(19, 4, 100, 10), Some((49, 7)));
        assert_eq!(c.view_to_level(20, 0, 100, 10), None);
    }
}
