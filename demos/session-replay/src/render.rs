//! Draws tracked hands onto a video surface frame

use signa_capture::RawFrame;
use signa_core::{Handedness, LandmarkFrame};
use signa_pose::{present_bones, to_pixels};

const BACKGROUND: [u8; 4] = [24, 24, 28, 255];
const BONE: [u8; 4] = [0, 200, 120, 255];

/// Render every hand of a tracker frame as a stick figure
pub fn render_hands(frame: &LandmarkFrame, width: u32, height: u32) -> RawFrame {
    let mut raw = RawFrame::filled(width, height, BACKGROUND);
    for hand in [Handedness::Left, Handedness::Right] {
        let joints = frame.hand_joints(hand);
        for (a, b) in present_bones(&joints) {
            let from = to_pixels(a, width, height);
            let to = to_pixels(b, width, height);
            draw_line(&mut raw, from, to);
        }
    }
    raw
}

fn draw_line(raw: &mut RawFrame, from: (f32, f32), to: (f32, f32)) {
    let steps = (to.0 - from.0).abs().max((to.1 - from.1).abs()).ceil().max(1.0) as u32;
    for step in 0..=steps {
        let t = step as f32 / steps as f32;
        let x = from.0 + (to.0 - from.0) * t;
        let y = from.1 + (to.1 - from.1) * t;
        put_pixel(raw, x, y);
    }
}

fn put_pixel(raw: &mut RawFrame, x: f32, y: f32) {
    if x < 0.0 || y < 0.0 {
        return;
    }
    let (x, y) = (x as u32, y as u32);
    if x >= raw.width || y >= raw.height {
        return;
    }
    let offset = ((y * raw.width + x) * 4) as usize;
    raw.pixels[offset..offset + 4].copy_from_slice(&BONE);
}

#[cfg(test)]
mod tests {
    use super::*;
    use signa_core::{LandmarkGroup, LandmarkPoint};

    #[test]
    fn test_renders_bone_pixels() {
        let points = vec![LandmarkPoint::new(0.1, 0.1, 0.0), LandmarkPoint::new(0.9, 0.1, 0.0)];
        let frame = LandmarkFrame::new().with_group(LandmarkGroup::RightHand, points);
        let raw = render_hands(&frame, 100, 50);

        assert!(raw.is_consistent());
        let at = |x: u32, y: u32| {
            let o = ((y * 100 + x) * 4) as usize;
            [raw.pixels[o], raw.pixels[o + 1], raw.pixels[o + 2], raw.pixels[o + 3]]
        };
        assert_eq!(at(50, 5), BONE);
        assert_eq!(at(50, 40), BACKGROUND);
    }
}
