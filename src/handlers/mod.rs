pub mod examples;
pub mod highlight;
pub mod run;
pub mod serve;
