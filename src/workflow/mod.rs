pub mod capture_flow;
pub mod job_ctx;

pub use capture_flow::CaptureFlow;
pub use job_ctx::JobCtx;
