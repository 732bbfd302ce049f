use crate::config::Configuration;
use crate::foundation::core::{FrameIndex, Fps};
use crate::foundation::error::{AnimatorError, AnimatorResult};

/// Timing inputs for [`FrameSchedule::resolve`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScheduleRequest {
    pub fps: Fps,
    /// Used in speed mode only.
    pub speedup: f64,
    /// Switches to duration mode when set.
    pub total_time_ms: Option<u64>,
    pub keep_first_frame_ms: u64,
    pub keep_last_frame_ms: u64,
    pub tail_duration_ms: u64,
    /// Frames appended by overlays beyond the timeline.
    pub extra_frames: u64,
}

impl ScheduleRequest {
    pub fn from_config(cfg: &Configuration, extra_frames: u64) -> Self {
        Self {
            fps: cfg.fps,
            speedup: cfg.speedup,
            total_time_ms: cfg.total_time_ms,
            keep_first_frame_ms: cfg.keep_first_frame_ms,
            keep_last_frame_ms: cfg.keep_last_frame_ms,
            tail_duration_ms: cfg.tail_duration_ms,
            extra_frames,
        }
    }
}

/// Frame count and speed for one render.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FrameSchedule {
    pub fps: Fps,
    pub min_time: i64,
    pub max_time: i64,
    pub speedup: f64,
    /// Timeline frames, rendered as `1..=frame_count`.
    pub frame_count: u64,
    pub keep_first_frames: u64,
    pub keep_last_frames: u64,
}

impl FrameSchedule {
    pub fn resolve(req: &ScheduleRequest, min_time: i64, max_time: i64) -> AnimatorResult<Self> {
        let fps = req.fps.as_f64();
        let animated_ms = (max_time - min_time) as f64 + req.tail_duration_ms as f64;

        let (speedup, frame_count) = match req.total_time_ms {
            None => {
                if !(req.speedup.is_finite() && req.speedup > 0.0) {
                    return Err(AnimatorError::validation("speedup must be finite and > 0"));
                }
                let frames = (animated_ms * fps / (1000.0 * req.speedup)).floor();
                (req.speedup, (frames as u64).max(1))
            }
            Some(total_ms) => {
                let animation_ms = total_ms as i64
                    - req.keep_first_frame_ms as i64
                    - req.keep_last_frame_ms as i64;
                // Every animation frame and every overlay frame needs a full frame interval.
                let needed_ms = (req.fps.frame_duration_ms() * (req.extra_frames as f64 + 1.0))
                    .ceil() as i64;
                if animation_ms < needed_ms {
                    return Err(AnimatorError::InsufficientDuration {
                        required_ms: (needed_ms - animation_ms) as u64,
                    });
                }
                let frames = ((animation_ms as f64 / 1000.0 * fps).round() as i64
                    - req.extra_frames as i64)
                    .max(1);
                let speedup = animated_ms * fps / (frames as f64 * 1000.0);
                (speedup, frames as u64)
            }
        };

        Ok(Self {
            fps: req.fps,
            min_time,
            max_time,
            speedup,
            frame_count,
            keep_first_frames: req.fps.ms_to_frames_round(req.keep_first_frame_ms),
            keep_last_frames: req.fps.ms_to_frames_round(req.keep_last_frame_ms),
        })
    }

    /// Track time shown at `frame`.
    pub fn time_for_frame(&self, frame: FrameIndex) -> i64 {
        time_for_frame(self.min_time, self.fps, self.speedup, frame)
    }

    /// Frames handed to the sink, held frames included.
    pub fn total_output_frames(&self) -> u64 {
        self.frame_count + self.keep_first_frames + self.keep_last_frames
    }
}

/// `floor(min_time + frame / fps * 1000 * speedup)`.
pub fn time_for_frame(min_time: i64, fps: Fps, speedup: f64, frame: FrameIndex) -> i64 {
    // Multiply before dividing so integral results stay exact.
    let elapsed = frame.0 as f64 * 1000.0 * speedup * f64::from(fps.den) / f64::from(fps.num);
    min_time + elapsed.floor() as i64
}

#[cfg(test)]
#[path = "../../tests/unit/schedule/scheduler.rs"]
mod tests;
