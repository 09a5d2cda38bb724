//! Application services - Use case implementations

mod call_pipeline;
mod dispatcher;
mod question_service;

pub use call_pipeline::{
    CallOutcome, CallPipelineService, InboundCall, PipelineCollaborators, PipelineSettings,
};
pub use dispatcher::{CallDispatcher, CallHandler};
pub use question_service::{AnsweredQuestion, QuestionService};
