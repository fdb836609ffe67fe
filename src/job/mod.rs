mod client;
mod payload;
mod types;


pub use client::JobClient;
pub use payload::{BuildParameter, BuildRequest, ParameterPayload, ParameterValue};
pub use types::{
    Build, BuildSelector, Category, CategoryItem, CreateJobPayload, DefaultParameterValue,
    IdentityBuild, IdentityCause, InputItem, JenkinsItem, Job, ParameterDefinition,
    ParametersDefinitionProperty, Pipeline, ProgressiveLog, SimpleJobBuild,
    FILE_PARAMETER_DEFINITION, STRING_PARAMETER_DEFINITION,
};
