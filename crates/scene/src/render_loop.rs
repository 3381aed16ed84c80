use gpu::{ChartRenderer, Renderer};
use runtime::{DRAW_CALLS, FRAMES, Frame, FrameSource};

use crate::controller::SceneController;

/// Per-frame driver: spin, control update, then exactly one draw.
///
/// Ticks are never gated on data; a scene with nothing bound still draws.
#[derive(Debug, Default)]
pub struct RenderLoop {
    last_frame: Option<Frame>,
}

impl RenderLoop {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn last_frame(&self) -> Option<Frame> {
        self.last_frame
    }

    pub fn tick<R: Renderer, C: ChartRenderer>(
        &mut self,
        frame: Frame,
        controller: &mut SceneController<R, C>,
    ) {
        controller.advance_rotation();
        controller.update_control(frame.dt_s);
        controller.draw();

        let metrics = controller.metrics_mut();
        metrics.inc_counter(FRAMES, 1);
        metrics.inc_counter(DRAW_CALLS, 1);
        self.last_frame = Some(frame);
    }

    /// Drain `frames`, ticking once per frame. Returns the number of ticks.
    pub fn run<S, R, C>(&mut self, frames: &mut S, controller: &mut SceneController<R, C>) -> u64
    where
        S: FrameSource,
        R: Renderer,
        C: ChartRenderer,
    {
        let mut ticks = 0;
        while let Some(frame) = frames.next_frame() {
            self.tick(frame, controller);
            ticks += 1;
        }
        tracing::debug!(ticks, "frame source exhausted");
        ticks
    }
}
