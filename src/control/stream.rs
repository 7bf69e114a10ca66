//! Draining one engine pass.

use futures_util::StreamExt;

use crate::engine::{EngineEvent, EngineInput, ExecutionEngine, SessionContext};
use crate::error::EngineError;
use crate::interrupt::Suspension;
use crate::ui::render::RenderSink;

/// Run one pass to the end of its stream.
///
/// Output messages are rendered the moment they arrive; suspension records
/// are collected in arrival order and returned. The first stream error ends
/// the pass and is returned as-is.
pub async fn drain_pass(
    engine: &dyn ExecutionEngine,
    input: EngineInput,
    session: &SessionContext,
    sink: &dyn RenderSink,
) -> Result<Vec<Suspension>, EngineError> {
    let mut stream = engine.open_stream(input, session);
    let mut suspensions = Vec::new();

    while let Some(event) = stream.next().await {
        match event? {
            EngineEvent::Interrupt(batch) => suspensions.extend(batch),
            EngineEvent::Update(messages) => {
                for message in &messages {
                    sink.assistant_message(message);
                }
            }
        }
    }

    Ok(suspensions)
}
