use crate::detection::Detection;
use crate::utils::compute_iou;

const MATCH_IOU: f32 = 0.3;
/// Frames a track survives without a matching detection before eviction.
const MAX_MISSING: u32 = 30;

/// A single tracked object: last known box plus bookkeeping counters.
#[derive(Debug, Clone)]
pub struct Track {
    pub id: u32,
    pub bbox: [f32; 4],
    pub class_id: i32,
    pub missing: u32,
    pub hits: u32,
}

impl Track {
    fn new(id: u32, bbox: [f32; 4], class_id: i32) -> Self {
        Track {
            id,
            bbox,
            class_id,
            missing: 0,
            hits: 1,
        }
    }
}

/// Maintains stable object identities across frames by greedy IoU matching
/// of the previous frame's boxes against the current detections.
#[derive(Debug)]
pub struct TrackSet {
    tracks: Vec<Track>,
    next_id: u32,
}

impl Default for TrackSet {
    fn default() -> Self {
        Self::new()
    }
}

impl TrackSet {
    pub fn new() -> Self {
        TrackSet {
            tracks: Vec::new(),
            next_id: 1,
        }
    }

    pub fn active(&self) -> usize {
        self.tracks.iter().filter(|t| t.missing == 0).count()
    }

    pub fn tracks(&self) -> &[Track] {
        &self.tracks
    }

    /// Match detections against existing tracks, age the unmatched tracks,
    /// and open new tracks for unmatched detections.
    pub fn update(&mut self, detections: &[Detection]) {
        // Highest-IoU pairs first, greedy one-to-one assignment.
        let mut pairs: Vec<(f32, usize, usize)> = Vec::new();
        for (ti, track) in self.tracks.iter().enumerate() {
            for (di, det) in detections.iter().enumerate() {
                if det.class_id != track.class_id {
                    continue;
                }
                let iou = compute_iou(&track.bbox, &det.bbox);
                if iou >= MATCH_IOU {
                    pairs.push((iou, ti, di));
                }
            }
        }
        pairs.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(std::cmp::Ordering::Equal));

        let mut matched_tracks = vec![false; self.tracks.len()];
        let mut matched_dets = vec![false; detections.len()];
        for (_, ti, di) in pairs {
            if matched_tracks[ti] || matched_dets[di] {
                continue;
            }
            let track = &mut self.tracks[ti];
            track.bbox = detections[di].bbox;
            track.missing = 0;
            track.hits += 1;
            matched_tracks[ti] = true;
            matched_dets[di] = true;
        }

        for (ti, matched) in matched_tracks.iter().enumerate() {
            if !matched {
                self.tracks[ti].missing += 1;
            }
        }
        self.tracks.retain(|t| t.missing <= MAX_MISSING);

        for (di, det) in detections.iter().enumerate() {
            if !matched_dets[di] {
                self.tracks.push(Track::new(self.next_id, det.bbox, det.class_id));
                self.next_id += 1;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn det(bbox: [f32; 4], class_id: i32) -> Detection {
        Detection {
            bbox,
            confidence: 0.9,
            class_id,
            class_name: "person".to_string(),
        }
    }

    #[test]
    fn test_new_detection_opens_track() {
        let mut tracks = TrackSet::new();
        tracks.update(&[det([100.0, 100.0, 150.0, 150.0], 0)]);

        assert_eq!(tracks.tracks().len(), 1);
        assert_eq!(tracks.tracks()[0].id, 1);
        assert_eq!(tracks.tracks()[0].hits, 1);
        assert_eq!(tracks.active(), 1);
    }

    #[test]
    fn test_overlapping_detection_keeps_id() {
        let mut tracks = TrackSet::new();
        tracks.update(&[det([100.0, 100.0, 150.0, 150.0], 0)]);
        tracks.update(&[det([105.0, 103.0, 155.0, 153.0], 0)]);

        assert_eq!(tracks.tracks().len(), 1);
        assert_eq!(tracks.tracks()[0].id, 1);
        assert_eq!(tracks.tracks()[0].hits, 2);
        assert_eq!(tracks.tracks()[0].bbox, [105.0, 103.0, 155.0, 153.0]);
    }

    #[test]
    fn test_disjoint_detection_gets_new_id() {
        let mut tracks = TrackSet::new();
        tracks.update(&[det([0.0, 0.0, 50.0, 50.0], 0)]);
        tracks.update(&[det([300.0, 300.0, 350.0, 350.0], 0)]);

        assert_eq!(tracks.tracks().len(), 2);
        let ids: Vec<u32> = tracks.tracks().iter().map(|t| t.id).collect();
        assert_eq!(ids, vec![1, 2]);
        // The first track missed this frame.
        assert_eq!(tracks.active(), 1);
    }

    #[test]
    fn test_class_mismatch_never_matches() {
        let mut tracks = TrackSet::new();
        tracks.update(&[det([0.0, 0.0, 50.0, 50.0], 0)]);
        tracks.update(&[det([0.0, 0.0, 50.0, 50.0], 2)]);

        assert_eq!(tracks.tracks().len(), 2);
    }

    #[test]
    fn test_missed_track_is_evicted() {
        let mut tracks = TrackSet::new();
        tracks.update(&[det([0.0, 0.0, 50.0, 50.0], 0)]);

        for _ in 0..=MAX_MISSING {
            tracks.update(&[]);
        }
        assert!(tracks.tracks().is_empty());
    }
}
