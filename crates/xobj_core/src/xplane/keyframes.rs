//! Turns keyframe events into frame-indexed samples.
//!
//! Location and rotation samples are laid out on an integer frame axis:
//! the first at `first_frame`, each following one `frame_step` later.
//! Visibility toggles are a separate channel and sit on the current frame
//! without advancing it. Events driven by the `none` dataref are skipped
//! and consume no frame.

use xobj_math::Vec3;

use super::loader::ImportOptions;
use super::sink::{DatarefKey, KeyframeSample, NodeHandle, SceneSink, SinkResult};
use super::types::KeyframeEvent;

#[derive(Clone, Copy, Debug)]
pub struct KeyframeEmitter {
    first_frame: i32,
    frame_step: i32,
}

impl KeyframeEmitter {
    pub fn new(first_frame: i32, frame_step: i32) -> Self {
        Self {
            first_frame,
            frame_step,
        }
    }

    pub fn from_options(options: &ImportOptions) -> Self {
        Self::new(options.first_frame, options.frame_step)
    }

    /// Compute the `(frame, sample)` list for a node's events.
    pub fn samples(&self, events: &[KeyframeEvent]) -> Vec<(i32, KeyframeSample)> {
        let mut frame = self.first_frame;
        let mut curves = CurveTracker::default();
        let mut samples = Vec::new();

        for event in events.iter().filter(|e| !e.is_disabled()) {
            match event {
                KeyframeEvent::Translate {
                    position,
                    value,
                    dataref,
                } => {
                    let sample = KeyframeSample::Location {
                        position: *position,
                        dataref: curves.key_for(dataref),
                        value: *value,
                    };
                    samples.push((frame, sample));
                    frame = frame.saturating_add(self.frame_step);
                }
                KeyframeEvent::Rotate {
                    axis,
                    value,
                    angle_degrees,
                    dataref,
                } => {
                    let sample = KeyframeSample::Rotation {
                        euler: euler_from_axis_angle(*axis, *angle_degrees),
                        dataref: curves.key_for(dataref),
                        value: *value,
                    };
                    samples.push((frame, sample));
                    frame = frame.saturating_add(self.frame_step);
                }
                KeyframeEvent::Visibility {
                    kind,
                    v1,
                    v2,
                    dataref,
                } => {
                    let sample = KeyframeSample::Visibility {
                        kind: *kind,
                        v1: *v1,
                        v2: *v2,
                        dataref: curves.open(dataref),
                    };
                    samples.push((frame, sample));
                }
            }
        }

        samples
    }

    /// Write a node's samples to `sink`, returning how many were written.
    ///
    /// Stops at the first rejected sample. The sink's time cursor is reset
    /// to the first frame either way.
    pub fn emit<S: SceneSink>(
        &self,
        sink: &mut S,
        node: NodeHandle,
        events: &[KeyframeEvent],
    ) -> SinkResult<usize> {
        let samples = self.samples(events);
        let count = samples.len();
        let result = samples
            .into_iter()
            .try_for_each(|(frame, sample)| sink.set_keyframe(node, frame, sample));
        sink.set_current_frame(self.first_frame);
        result.map(|_| count)
    }
}

impl Default for KeyframeEmitter {
    fn default() -> Self {
        Self::from_options(&ImportOptions::default())
    }
}

/// Euler triple for a rotation of `angle_degrees` about a unit `axis`.
///
/// Exact for rotations about a principal axis, which is what X-Plane
/// exporters write in practice.
pub fn euler_from_axis_angle(axis: Vec3, angle_degrees: f32) -> Vec3 {
    axis * angle_degrees.to_radians()
}

/// Assigns curve indices as the driving dataref changes.
#[derive(Default)]
struct CurveTracker {
    current: Option<String>,
    next: usize,
}

impl CurveTracker {
    /// Reuse the current curve while the dataref stays the same.
    fn key_for(&mut self, path: &str) -> DatarefKey {
        if self.current.as_deref() != Some(path) {
            return self.open(path);
        }
        DatarefKey {
            curve: self.next - 1,
            path: path.to_string(),
        }
    }

    /// Always start a new curve.
    fn open(&mut self, path: &str) -> DatarefKey {
        let curve = self.next;
        self.next += 1;
        self.current = Some(path.to_string());
        DatarefKey {
            curve,
            path: path.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::xplane::types::VisibilityKind;

    fn translate(x: f32, value: f32, dataref: &str) -> KeyframeEvent {
        KeyframeEvent::Translate {
            position: Vec3::new(x, 0.0, 0.0),
            value,
            dataref: dataref.to_string(),
        }
    }

    fn rotate(angle: f32, value: f32, dataref: &str) -> KeyframeEvent {
        KeyframeEvent::Rotate {
            axis: Vec3::Z,
            value,
            angle_degrees: angle,
            dataref: dataref.to_string(),
        }
    }

    #[test]
    fn test_frames_advance_by_step() {
        let emitter = KeyframeEmitter::default();
        let events = vec![
            translate(0.0, 0.0, "sim/gear"),
            translate(1.0, 1.0, "sim/gear"),
            rotate(90.0, 1.0, "sim/gear"),
        ];

        let frames: Vec<i32> = emitter.samples(&events).iter().map(|(f, _)| *f).collect();
        assert_eq!(frames, vec![1, 3, 5]);
    }

    #[test]
    fn test_frames_clamp_at_timeline_end() {
        let emitter = KeyframeEmitter::new(i32::MAX - 1, 5);
        let events = vec![
            translate(0.0, 0.0, "sim/gear"),
            translate(1.0, 1.0, "sim/gear"),
            rotate(90.0, 1.0, "sim/gear"),
        ];

        let frames: Vec<i32> = emitter.samples(&events).iter().map(|(f, _)| *f).collect();
        assert_eq!(frames, vec![i32::MAX - 1, i32::MAX, i32::MAX]);
    }

    #[test]
    fn test_disabled_dataref_consumes_no_frame() {
        let emitter = KeyframeEmitter::default();
        let events = vec![
            translate(2.0, 0.0, "none"),
            translate(2.0, 0.0, "none"),
            rotate(0.0, 0.0, "sim/door"),
            rotate(90.0, 1.0, "sim/door"),
        ];

        let samples = emitter.samples(&events);
        assert_eq!(samples.len(), 2);
        assert_eq!(samples[0].0, 1);
        assert_eq!(samples[1].0, 3);
    }

    #[test]
    fn test_rotation_sample_in_radians() {
        let samples = KeyframeEmitter::default().samples(&[rotate(180.0, 1.0, "sim/x")]);

        match &samples[0].1 {
            KeyframeSample::Rotation { euler, value, .. } => {
                assert!((euler.z - std::f32::consts::PI).abs() < 1e-5);
                assert_eq!(euler.x, 0.0);
                assert_eq!(*value, 1.0);
            }
            other => panic!("Expected rotation sample, got {:?}", other),
        }
    }

    #[test]
    fn test_visibility_does_not_advance_frame() {
        let events = vec![
            KeyframeEvent::Visibility {
                kind: VisibilityKind::Hide,
                v1: 0.0,
                v2: 0.5,
                dataref: "sim/a".to_string(),
            },
            KeyframeEvent::Visibility {
                kind: VisibilityKind::Show,
                v1: 0.5,
                v2: 1.0,
                dataref: "sim/a".to_string(),
            },
            translate(1.0, 1.0, "sim/a"),
        ];

        let samples = KeyframeEmitter::default().samples(&events);
        let frames: Vec<i32> = samples.iter().map(|(f, _)| *f).collect();
        assert_eq!(frames, vec![1, 1, 1]);

        // Each toggle opens its own curve; the translation reuses the last one
        let curves: Vec<usize> = samples.iter().map(|(_, s)| s.dataref().curve).collect();
        assert_eq!(curves, vec![0, 1, 1]);
    }

    #[test]
    fn test_curves_follow_dataref_changes() {
        let events = vec![
            translate(0.0, 0.0, "sim/a"),
            translate(1.0, 1.0, "sim/a"),
            rotate(0.0, 0.0, "sim/b"),
            rotate(45.0, 1.0, "sim/b"),
            translate(2.0, 2.0, "sim/a"),
        ];

        let samples = KeyframeEmitter::new(0, 10).samples(&events);
        let curves: Vec<usize> = samples.iter().map(|(_, s)| s.dataref().curve).collect();
        assert_eq!(curves, vec![0, 0, 1, 1, 2]);
        assert_eq!(samples[4].0, 40);
    }
}
