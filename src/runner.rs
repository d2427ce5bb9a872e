use anyhow::Result;
use log::{debug, info};

use crate::annotate;
use crate::detection::ObjectTracker;
use crate::display::{DisplaySink, QUIT_KEY};
use crate::source::FrameSource;

/// Why the loop stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    EndOfStream,
    UserQuit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LoopState {
    Running,
    Stopped(StopReason),
}

/// Drive the read -> track -> annotate -> show loop until the stream ends
/// or the user presses `q`. The source is released and the display closed
/// before returning, whatever the stop reason.
pub fn run<S, T, D>(source: &mut S, tracker: &mut T, display: &mut D) -> Result<StopReason>
where
    S: FrameSource,
    T: ObjectTracker,
    D: DisplaySink,
{
    let mut state = LoopState::Running;
    let mut frame_count: u64 = 0;

    while state == LoopState::Running {
        let Some(mut frame) = source.read()? else {
            info!("End of video or failed to read frame.");
            state = LoopState::Stopped(StopReason::EndOfStream);
            continue;
        };
        frame_count += 1;

        let batches = tracker.track(&frame)?;
        annotate::annotate_frame(&mut frame, &batches)?;
        display.show(&frame)?;

        if display.poll_key()? == Some(QUIT_KEY) {
            info!("Exiting...");
            state = LoopState::Stopped(StopReason::UserQuit);
        }

        if frame_count % 100 == 0 {
            debug!("Processed {} frames", frame_count);
        }
    }

    source.release()?;
    display.close()?;

    match state {
        LoopState::Stopped(reason) => Ok(reason),
        LoopState::Running => unreachable!("loop exits only via Stopped"),
    }
}
