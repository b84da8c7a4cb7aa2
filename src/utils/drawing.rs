use crate::mask::MaskImage;

pub fn draw_line(image: &mut MaskImage, x0: isize, y0: isize, x1: isize, y1: isize, value: u8) {
    let dx = (x1 - x0).abs();
    let dy = -(y1 - y0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let sy = if y0 < y1 { 1 } else { -1 };
    let mut err = dx + dy; // error term

    let mut x = x0;
    let mut y = y0;

    loop {
        image.set(x, y, value);

        if x == x1 && y == y1 {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x += sx;
        }
        if e2 <= dx {
            err += dx;
            y += sy;
        }
    }
}

/// Outlines the whole image with one-pixel walls.
pub fn draw_border(image: &mut MaskImage, value: u8) {
    if image.width == 0 || image.height == 0 {
        return;
    }
    let right = image.width as isize - 1;
    let bottom = image.height as isize - 1;
    draw_line(image, 0, 0, right, 0, value);
    draw_line(image, right, 0, right, bottom, value);
    draw_line(image, right, bottom, 0, bottom, value);
    draw_line(image, 0, bottom, 0, 0, value);
}

/// Strokes a circle of `radius` around `(cx, cy)` with the given line
/// width. A pixel is covered when its center lies within the stroke.
pub fn stroke_circle(image: &mut MaskImage, cx: f32, cy: f32, radius: f32, line_width: f32, value: u8) {
    let half = line_width / 2.0;
    let reach = radius + half;
    let x_min = (cx - reach).floor().max(0.0) as usize;
    let y_min = (cy - reach).floor().max(0.0) as usize;
    let x_max = ((cx + reach).ceil().max(0.0) as usize).min(image.width);
    let y_max = ((cy + reach).ceil().max(0.0) as usize).min(image.height);

    for y in y_min..y_max {
        for x in x_min..x_max {
            let dx = x as f32 + 0.5 - cx;
            let dy = y as f32 + 0.5 - cy;
            let distance = (dx * dx + dy * dy).sqrt();
            if (distance - radius).abs() <= half {
                image.set(x as isize, y as isize, value);
            }
        }
    }
}

pub fn fill_rect(image: &mut MaskImage, x: isize, y: isize, width: usize, height: usize, value: u8) {
    for row in y..y + height as isize {
        for col in x..x + width as isize {
            image.set(col, row, value);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_diagonal_line() {
        let mut image = MaskImage::new(4, 4);
        draw_line(&mut image, 0, 0, 3, 3, 255);
        for i in 0..4 {
            assert_eq!(image.get(i, i), 255);
        }
        assert_eq!(image.pixels.iter().filter(|&&p| p == 255).count(), 4);
    }

    #[test]
    fn test_line_is_clipped() {
        let mut image = MaskImage::new(3, 3);
        draw_line(&mut image, -5, 1, 10, 1, 255);
        assert_eq!(image.pixels.iter().filter(|&&p| p == 255).count(), 3);
    }

    #[test]
    fn test_border_leaves_interior_open() {
        let mut image = MaskImage::new(5, 4);
        draw_border(&mut image, 255);
        for y in 0..4 {
            for x in 0..5 {
                let edge = x == 0 || y == 0 || x == 4 || y == 3;
                assert_eq!(image.get(x, y) == 255, edge, "pixel ({x},{y})");
            }
        }
    }

    #[test]
    fn test_circle_stroke_is_hollow() {
        let mut image = MaskImage::new(64, 64);
        stroke_circle(&mut image, 32.0, 32.0, 20.0, 4.0, 255);
        assert_eq!(image.get(32, 32), 0);
        assert_eq!(image.get(52, 32), 255);
        assert_eq!(image.get(32, 12), 255);
        assert_eq!(image.get(0, 0), 0);
    }

    #[test]
    fn test_fill_rect() {
        let mut image = MaskImage::new(4, 4);
        fill_rect(&mut image, 1, 1, 2, 2, 9);
        assert_eq!(image.pixels.iter().filter(|&&p| p == 9).count(), 4);
        assert_eq!(image.get(2, 2), 9);
    }
}
