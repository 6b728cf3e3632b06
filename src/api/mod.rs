mod engine;
mod engine_config;
mod engine_snapshot;
mod grid_renderer;
mod interaction_controller;
mod redraw_scheduler;
mod render_coordinator;
mod series_renderer;

pub use engine::{ChartEngine, RegisteredSeries, TooltipFormatter};
pub use engine_config::{ChartEngineConfig, TimeLabelFormat, ValueLabelFormat};
pub use engine_snapshot::EngineSnapshot;
pub use grid_renderer::GridSummary;
pub use redraw_scheduler::{
    DrawDecision, LineRequest, PassReason, RedrawHandle, RedrawRequest, RedrawScheduler,
    SchedulerConfig,
};
