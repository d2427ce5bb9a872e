use opencv::core::Scalar;

/// splitmix64 finalizer. One round is enough to spread consecutive class
/// ids over the whole output range.
fn mix(mut x: u64) -> u64 {
    x = x.wrapping_add(0x9e3779b97f4a7c15);
    x = (x ^ (x >> 30)).wrapping_mul(0xbf58476d1ce4e5b9);
    x = (x ^ (x >> 27)).wrapping_mul(0x94d049bb133111eb);
    x ^ (x >> 31)
}

/// Deterministic display color for a class id, as (r, g, b).
///
/// Pure function of its input: the same id always maps to the same color,
/// with no shared generator state behind it.
pub fn class_color(class_id: i32) -> (u8, u8, u8) {
    let h = mix(class_id as u32 as u64);
    ((h & 0xff) as u8, ((h >> 8) & 0xff) as u8, ((h >> 16) & 0xff) as u8)
}

/// Same color as an OpenCV scalar in BGR channel order.
pub fn class_scalar(class_id: i32) -> Scalar {
    let (r, g, b) = class_color(class_id);
    Scalar::new(b as f64, g as f64, r as f64, 0.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_color_is_deterministic() {
        for class_id in -3..100 {
            assert_eq!(class_color(class_id), class_color(class_id));
        }
    }

    #[test]
    fn test_known_colors() {
        // Pinned so a silent change to the hash shows up in review.
        assert_eq!(class_color(0), (175, 205, 29));
        assert_eq!(class_color(1), (193, 92, 2));
        assert_eq!(class_color(2), (206, 86, 151));
    }

    #[test]
    fn test_nearby_ids_differ() {
        let colors: Vec<_> = (0..16).map(class_color).collect();
        for i in 0..colors.len() {
            for j in (i + 1)..colors.len() {
                assert_ne!(colors[i], colors[j], "ids {} and {} collided", i, j);
            }
        }
    }

    #[test]
    fn test_scalar_is_bgr() {
        let (r, g, b) = class_color(7);
        let s = class_scalar(7);
        assert_eq!(s[0], b as f64);
        assert_eq!(s[1], g as f64);
        assert_eq!(s[2], r as f64);
    }
}
